//! 取樣計畫器
//!
//! 純計算，不做任何 I/O。根據影片總長度、片段長度與預覽比例，
//! 決定要擷取幾個片段以及每個片段的起始時間。
//!
//! 片段起點均勻分布在「整部影片」上，而不是預覽長度內，
//! 讓預覽能代表整部影片的內容。

use crate::error::{SamplerError, SamplerResult};
use std::path::{Path, PathBuf};

pub const MIN_CLIP_LENGTH: u32 = 1;
pub const MAX_CLIP_LENGTH: u32 = 60;
pub const DEFAULT_CLIP_LENGTH: u32 = 10;

pub const MIN_PREVIEW_FRACTION: f64 = 0.01;
pub const MAX_PREVIEW_FRACTION: f64 = 0.50;

pub const MIN_PREVIEW_PERCENT: f64 = 1.0;
pub const MAX_PREVIEW_PERCENT: f64 = 50.0;

/// 來源影片（長度由外部探測取得）
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMedia {
    path: PathBuf,
    total_duration_seconds: f64,
}

impl SourceMedia {
    pub fn new(path: impl Into<PathBuf>, total_duration_seconds: f64) -> SamplerResult<Self> {
        validate_total_duration(total_duration_seconds)?;
        Ok(Self {
            path: path.into(),
            total_duration_seconds,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn total_duration_seconds(&self) -> f64 {
        self.total_duration_seconds
    }

    /// 依取樣設定建立計畫
    #[must_use]
    pub fn plan(&self, request: &SamplingRequest) -> ClipPlan {
        build_plan(self.total_duration_seconds, request)
    }
}

/// 取樣設定，建立時即驗證
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingRequest {
    clip_length_seconds: u32,
    preview_fraction: f64,
}

impl SamplingRequest {
    pub fn new(clip_length_seconds: u32, preview_fraction: f64) -> SamplerResult<Self> {
        validate_clip_length(clip_length_seconds)?;
        validate_preview_fraction(preview_fraction)?;
        Ok(Self {
            clip_length_seconds,
            preview_fraction,
        })
    }

    /// 以百分比（1 ~ 50）建立
    pub fn from_percent(clip_length_seconds: u32, percent: f64) -> SamplerResult<Self> {
        validate_preview_percent(percent)?;
        Self::new(clip_length_seconds, percent / 100.0)
    }

    #[must_use]
    pub const fn clip_length_seconds(&self) -> u32 {
        self.clip_length_seconds
    }

    #[must_use]
    pub const fn preview_fraction(&self) -> f64 {
        self.preview_fraction
    }
}

/// 單一片段
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipEntry {
    pub index: usize,
    pub start_offset_seconds: f64,
    pub length_seconds: u32,
}

/// 依索引排序的片段計畫，建立後不可變
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPlan {
    preview_duration_seconds: u64,
    clips: Vec<ClipEntry>,
}

impl ClipPlan {
    #[must_use]
    pub const fn preview_duration_seconds(&self) -> u64 {
        self.preview_duration_seconds
    }

    #[must_use]
    pub fn clips(&self) -> &[ClipEntry] {
        &self.clips
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClipEntry> {
        self.clips.iter()
    }
}

impl<'a> IntoIterator for &'a ClipPlan {
    type Item = &'a ClipEntry;
    type IntoIter = std::slice::Iter<'a, ClipEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.clips.iter()
    }
}

/// 預覽比例試算結果（用於提示使用者）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewEstimate {
    pub percent: u32,
    pub preview_duration_seconds: u64,
    pub clip_count: usize,
}

/// 建立取樣計畫，會重新驗證所有參數
pub fn plan(total_duration: f64, request: &SamplingRequest) -> SamplerResult<ClipPlan> {
    validate_total_duration(total_duration)?;
    Ok(build_plan(total_duration, request))
}

/// 以原始參數建立取樣計畫
pub fn plan_clips(
    total_duration: f64,
    clip_length_seconds: u32,
    preview_fraction: f64,
) -> SamplerResult<ClipPlan> {
    let request = SamplingRequest::new(clip_length_seconds, preview_fraction)?;
    plan(total_duration, &request)
}

/// 預覽總長度（秒）
///
/// 四捨五入（0.5 進位），例如 18.5 -> 19
#[must_use]
pub fn preview_duration_seconds(total_duration: f64, preview_fraction: f64) -> u64 {
    // 輸入已驗證為非負有限值
    (total_duration * preview_fraction).round() as u64
}

/// 片段數量 = ceil(預覽長度 / 片段長度)
#[must_use]
pub fn clip_count(preview_duration_seconds: u64, clip_length_seconds: u32) -> usize {
    if clip_length_seconds == 0 {
        return 0;
    }
    preview_duration_seconds.div_ceil(u64::from(clip_length_seconds)) as usize
}

/// 試算多個百分比的預覽長度與片段數，略過超出範圍的百分比
///
/// 與實際計畫使用相同的四捨五入，片段數先取整數秒再計算，
/// 因此列出的數字就是選擇該百分比後實際會擷取的片段數。
#[must_use]
pub fn estimate_previews(
    total_duration: f64,
    clip_length_seconds: u32,
    percents: &[u32],
) -> Vec<PreviewEstimate> {
    percents
        .iter()
        .filter_map(|&percent| {
            let request =
                SamplingRequest::from_percent(clip_length_seconds, f64::from(percent)).ok()?;
            let plan = plan(total_duration, &request).ok()?;
            Some(PreviewEstimate {
                percent,
                preview_duration_seconds: plan.preview_duration_seconds(),
                clip_count: plan.len(),
            })
        })
        .collect()
}

fn build_plan(total_duration: f64, request: &SamplingRequest) -> ClipPlan {
    let preview_duration = preview_duration_seconds(total_duration, request.preview_fraction);
    let count = clip_count(preview_duration, request.clip_length_seconds);

    if count == 0 {
        return ClipPlan {
            preview_duration_seconds: preview_duration,
            clips: Vec::new(),
        };
    }

    let spacing = total_duration / count as f64;
    let clips = (0..count)
        .map(|index| ClipEntry {
            index,
            start_offset_seconds: spacing * index as f64,
            // 最後一段可能超出影片結尾，由擷取端處理
            length_seconds: request.clip_length_seconds,
        })
        .collect();

    ClipPlan {
        preview_duration_seconds: preview_duration,
        clips,
    }
}

pub fn validate_clip_length(clip_length_seconds: u32) -> SamplerResult<u32> {
    if (MIN_CLIP_LENGTH..=MAX_CLIP_LENGTH).contains(&clip_length_seconds) {
        Ok(clip_length_seconds)
    } else {
        Err(SamplerError::invalid(
            "clip_length",
            format!("{clip_length_seconds} 不在 {MIN_CLIP_LENGTH} ~ {MAX_CLIP_LENGTH} 秒之間"),
        ))
    }
}

pub fn validate_preview_fraction(preview_fraction: f64) -> SamplerResult<f64> {
    if (MIN_PREVIEW_FRACTION..=MAX_PREVIEW_FRACTION).contains(&preview_fraction) {
        Ok(preview_fraction)
    } else {
        Err(SamplerError::invalid(
            "preview_fraction",
            format!("{preview_fraction} 不在 {MIN_PREVIEW_FRACTION} ~ {MAX_PREVIEW_FRACTION} 之間"),
        ))
    }
}

pub fn validate_preview_percent(percent: f64) -> SamplerResult<f64> {
    if (MIN_PREVIEW_PERCENT..=MAX_PREVIEW_PERCENT).contains(&percent) {
        Ok(percent)
    } else {
        Err(SamplerError::invalid(
            "preview_percent",
            format!("{percent} 不在 {MIN_PREVIEW_PERCENT} ~ {MAX_PREVIEW_PERCENT} 之間"),
        ))
    }
}

fn validate_total_duration(total_duration: f64) -> SamplerResult<()> {
    if total_duration.is_finite() && total_duration >= 0.0 {
        Ok(())
    } else {
        Err(SamplerError::invalid(
            "total_duration",
            format!("{total_duration} 必須為非負數"),
        ))
    }
}
