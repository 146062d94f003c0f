use serde_json::json;

use crate::cli::config::{get_config_dir, save_settings, settings_path, Settings};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config_dir = get_config_dir()?;
    let settings_file = settings_path()?;

    let created = !settings_file.exists();
    if created {
        save_settings(&Settings::default())?;
    }

    output_success(
        &output_format,
        &format!(
            "Configuration directory {} at {}",
            if created { "initialized" } else { "already initialized" },
            config_dir.display()
        ),
        Some(json!({
            "config_dir": config_dir,
            "settings": settings_file,
            "created": created
        })),
    )
}
