use crate::config::load::SETTINGS_FILE;
use crate::config::types::{MAX_RECENT_PATHS, UserSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &UserSettings) -> Result<()> {
    save_settings_to(settings, Path::new(SETTINGS_FILE))
}

pub fn save_settings_to(settings: &UserSettings, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

/// 更新最近使用的路徑
/// 將新路徑加入最前面，去重並限制數量
pub fn add_recent_path(settings: &mut UserSettings, path: &str) {
    settings.recent_paths.retain(|p| p != path);
    settings.recent_paths.insert(0, path.to_string());
    settings.recent_paths.truncate(MAX_RECENT_PATHS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load::load_settings;
    use tempfile::TempDir;

    #[test]
    fn test_add_recent_path_dedup_and_limit() {
        let mut settings = UserSettings::default();
        for i in 0..7 {
            add_recent_path(&mut settings, &format!("/videos/{i}"));
        }
        add_recent_path(&mut settings, "/videos/4");

        assert_eq!(settings.recent_paths.len(), MAX_RECENT_PATHS);
        assert_eq!(settings.recent_paths[0], "/videos/4");
        assert_eq!(
            settings.recent_paths.iter().filter(|p| *p == "/videos/4").count(),
            1
        );
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");

        let mut settings = UserSettings::default();
        settings.compressor.bitrate = "1200k".to_string();
        settings.per_item_timeout_secs = Some(600);
        save_settings_to(&settings, &path).unwrap();

        assert_eq!(load_settings(&path).unwrap(), settings);
    }
}
