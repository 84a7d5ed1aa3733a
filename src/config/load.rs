use crate::config::types::{Config, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

pub const SETTINGS_FILE: &str = "settings.json";

impl Config {
    /// 從目前工作目錄的 settings.json 載入；檔案不存在或損壞時使用預設值
    #[must_use]
    pub fn new() -> Self {
        Self::from_path(Path::new(SETTINGS_FILE))
    }

    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let settings = load_settings(path).unwrap_or_else(|e| {
            warn!("無法載入設定，改用預設值: {e:#}");
            UserSettings::default()
        });
        Self { settings }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
        }
    }
}

pub fn load_settings(path: &Path) -> Result<UserSettings> {
    if !path.exists() {
        return Ok(UserSettings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings from {}", path.display()))
}
