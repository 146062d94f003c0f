use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{api_url_from_env, get_config_dir, load_settings, save_settings};
use crate::cli::utils::{output_json, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show the effective configuration")]
    Show,

    #[command(about = "Set the API base URL used by the console")]
    SetUrl {
        #[arg(help = "Base URL, e.g. https://api.example.com")]
        url: String,
    },

    #[command(about = "Set the default page size for list commands")]
    SetPageSize {
        #[arg(help = "Rows per page")]
        size: u32,
    },
}

pub async fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let app_config = crate::config::config();
            let settings = load_settings()?;
            let api_url = match (&settings.api_url, api_url_from_env()) {
                (Some(url), false) => url.clone(),
                _ => app_config.api.base_url.clone(),
            };
            let page_size = settings.page_size.unwrap_or(app_config.display.page_size);

            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "environment": app_config.environment,
                    "api_url": api_url,
                    "timeout_secs": app_config.api.timeout_secs,
                    "cache_enabled": app_config.cache.enabled,
                    "page_size": page_size,
                    "config_dir": get_config_dir()?,
                })),
                OutputFormat::Text => {
                    println!("Environment:  {:?}", app_config.environment);
                    println!("API URL:      {}", api_url);
                    println!("Timeout:      {}s", app_config.api.timeout_secs);
                    println!("Cache:        {}", if app_config.cache.enabled { "enabled" } else { "disabled" });
                    println!("Page size:    {}", page_size);
                    println!("Config dir:   {}", get_config_dir()?.display());
                    Ok(())
                }
            }
        }
        ConfigCommands::SetUrl { url } => {
            let parsed = url::Url::parse(url.trim()).map_err(|e| anyhow::anyhow!("invalid URL '{}': {}", url, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("API URL must use http or https");
            }

            let mut settings = load_settings()?;
            let stored = parsed.as_str().trim_end_matches('/').to_string();
            settings.api_url = Some(stored.clone());
            save_settings(&settings)?;

            if api_url_from_env() {
                tracing::warn!("WORKBENCH_API_URL is set and takes precedence over the saved URL");
            }
            output_success(
                &output_format,
                &format!("API URL set to {}", stored),
                Some(json!({ "api_url": stored })),
            )
        }
        ConfigCommands::SetPageSize { size } => {
            if size == 0 {
                anyhow::bail!("page size must be at least 1");
            }
            let mut settings = load_settings()?;
            settings.page_size = Some(size);
            save_settings(&settings)?;
            output_success(
                &output_format,
                &format!("Page size set to {}", size),
                Some(json!({ "page_size": size })),
            )
        }
    }
}
