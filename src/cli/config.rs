use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::auth::FileTokenStore;

/// Console preferences persisted in `settings.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("WORKBENCH_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("workbench")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn settings_path() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join("settings.json"))
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let settings_file = settings_path()?;

    if !settings_file.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(settings_file)?;
    let settings: Settings = serde_json::from_str(&content)?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(settings)?;
    fs::write(settings_path()?, content)?;
    Ok(())
}

pub fn token_store() -> anyhow::Result<FileTokenStore> {
    Ok(FileTokenStore::in_dir(&get_config_dir()?))
}

/// Whether the API url was set through the environment, which beats
/// `settings.json`.
pub fn api_url_from_env() -> bool {
    ["WORKBENCH_API_URL", "VITE_API_URL"]
        .iter()
        .any(|name| std::env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false))
}
