//! 影片取樣預覽元件
//!
//! 流程：
//! A. 選擇 ffmpeg 與來源影片
//! B. 探測影片長度
//! C. 依片段長度與預覽比例建立取樣計畫
//! D. 擷取片段（逐一或平行）
//! E. 依索引順序無損合併為預覽影片

mod assembler;
mod main;
mod output_path;
mod planner;

pub use assembler::{AssemblyPipeline, ExtractionMode, MediaToolkit, probe_source};
pub use main::{PreviewSampler, SamplerOutcome};
pub use output_path::{
    ExistingOutputAction, OutputResolution, default_output_path, renamed_output_path,
    resolve_output_path,
};
pub use planner::{
    ClipEntry, ClipPlan, DEFAULT_CLIP_LENGTH, MAX_CLIP_LENGTH, MAX_PREVIEW_FRACTION,
    MAX_PREVIEW_PERCENT, MIN_CLIP_LENGTH, MIN_PREVIEW_FRACTION, MIN_PREVIEW_PERCENT,
    PreviewEstimate, SamplingRequest, SourceMedia, clip_count, estimate_previews, plan,
    plan_clips, preview_duration_seconds, validate_clip_length, validate_preview_fraction,
    validate_preview_percent,
};
