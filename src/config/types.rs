use crate::component::preview_sampler::{
    DEFAULT_CLIP_LENGTH, ExtractionMode, MAX_PREVIEW_PERCENT, MIN_PREVIEW_PERCENT,
    validate_clip_length,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

pub const MAX_RECENT_PATHS: usize = 10;

/// 預覽比例試算時列出的百分比
pub const DEFAULT_PREVIEW_PERCENTAGES: [u32; 5] = [5, 10, 15, 20, 25];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        self.video_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        let video_extensions = self.video_extensions_set();
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| video_extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en-US")]
    English,
    #[default]
    #[serde(rename = "zh-TW")]
    TraditionalChinese,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::English, Self::TraditionalChinese];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::TraditionalChinese => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => write!(f, "English"),
            Self::TraditionalChinese => write!(f, "繁體中文"),
        }
    }
}

/// 預覽取樣設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    pub default_clip_length: u32,
    pub preview_percentages: Vec<u32>,
    pub extraction_mode: ExtractionMode,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            default_clip_length: DEFAULT_CLIP_LENGTH,
            preview_percentages: DEFAULT_PREVIEW_PERCENTAGES.to_vec(),
            extraction_mode: ExtractionMode::default(),
        }
    }
}

impl SamplerSettings {
    /// 修正超出範圍的設定值（手動編輯 settings.json 時可能發生）
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if validate_clip_length(self.default_clip_length).is_err() {
            self.default_clip_length = DEFAULT_CLIP_LENGTH;
        }

        self.preview_percentages
            .retain(|&p| (MIN_PREVIEW_PERCENT..=MAX_PREVIEW_PERCENT).contains(&f64::from(p)));
        self.preview_percentages.sort_unstable();
        self.preview_percentages.dedup();
        if self.preview_percentages.is_empty() {
            self.preview_percentages = DEFAULT_PREVIEW_PERCENTAGES.to_vec();
        }

        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub sampler: SamplerSettings,
    pub recent_paths: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}
