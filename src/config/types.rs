use crate::runner::RunnerConfig;
use rust_i18n::t;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const MAX_RECENT_PATHS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh-TW")]
    TraditionalChinese,
}

impl Language {
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::English, Self::TraditionalChinese]
    }

    /// rust-i18n 使用的 locale 代碼
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::TraditionalChinese => "zh-TW",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::TraditionalChinese => "繁體中文",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// 單一項目失敗時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    Continue,
    Abort,
    /// 每次失敗都詢問使用者
    Ask,
}

impl FailurePolicy {
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Continue, Self::Abort, Self::Ask]
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Continue => t!("failure_policy.continue"),
            Self::Abort => t!("failure_policy.abort"),
            Self::Ask => t!("failure_policy.ask"),
        };
        write!(f, "{label}")
    }
}

fn extensions(list: &[&str]) -> Vec<String> {
    list.iter().map(|ext| (*ext).to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenamerSettings {
    pub extensions: Vec<String>,
    pub failure_policy: FailurePolicy,
    /// 上次使用的檔名前綴
    pub last_prefix: String,
}

impl Default for RenamerSettings {
    fn default() -> Self {
        Self {
            extensions: extensions(&["mp4", "avi", "mkv", "mov", "flv"]),
            failure_policy: FailurePolicy::Abort,
            last_prefix: "v".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorSettings {
    pub extensions: Vec<String>,
    pub target_height: u32,
    pub codec: String,
    pub preset: String,
    pub bitrate: String,
    pub threads: u32,
    pub failure_policy: FailurePolicy,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            extensions: extensions(&["mp4", "avi", "mov", "mkv"]),
            target_height: 480,
            codec: "libx264".to_string(),
            preset: "medium".to_string(),
            bitrate: "800k".to_string(),
            threads: 4,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizerSettings {
    pub extensions: Vec<String>,
    /// 移動前先用 ffprobe 確認檔案可讀取
    pub verify_readable: bool,
    pub failure_policy: FailurePolicy,
}

impl Default for CategorizerSettings {
    fn default() -> Self {
        Self {
            extensions: extensions(&["mp4", "avi", "mov"]),
            verify_readable: true,
            failure_policy: FailurePolicy::Continue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub recent_paths: Vec<String>,
    /// 單一項目的處理時限（秒），`None` 表示不限制
    pub per_item_timeout_secs: Option<u64>,
    pub renamer: RenamerSettings,
    pub compressor: CompressorSettings,
    pub categorizer: CategorizerSettings,
}

impl UserSettings {
    #[must_use]
    pub fn runner_config(&self) -> RunnerConfig {
        match self.per_item_timeout_secs {
            Some(secs) if secs > 0 => {
                RunnerConfig::default().with_per_item_timeout(Duration::from_secs(secs))
            }
            _ => RunnerConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: UserSettings,
}
