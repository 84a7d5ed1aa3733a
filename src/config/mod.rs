pub mod load;
pub mod save;
pub mod types;

pub use types::{
    CategorizerSettings, CompressorSettings, Config, FailurePolicy, Language, MAX_RECENT_PATHS,
    RenamerSettings, UserSettings,
};
