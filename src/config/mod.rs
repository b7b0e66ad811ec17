pub mod load;
pub mod save;
pub mod types;

pub use types::{
    Config, DEFAULT_PREVIEW_PERCENTAGES, FileTypeTable, Language, MAX_RECENT_PATHS,
    SamplerSettings, UserSettings,
};
