use super::assembler::{AssemblyPipeline, probe_source};
use super::output_path::{
    ExistingOutputAction, OutputResolution, default_output_path, resolve_output_path,
};
use super::planner::{
    ClipPlan, MAX_CLIP_LENGTH, MAX_PREVIEW_PERCENT, MIN_CLIP_LENGTH, MIN_PREVIEW_PERCENT,
    SamplingRequest, SourceMedia, estimate_previews, validate_clip_length,
    validate_preview_percent,
};
use crate::config::Config;
use crate::error::SamplerError;
use crate::tools::{
    FfmpegToolkit, ToolError, VideoFileInfo, auto_selection, find_ffmpeg_candidates,
    format_duration, format_size_mb, probe_duration_seconds, scan_video_files,
    validate_file_exists,
};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rust_i18n::t;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 一次執行的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplerOutcome {
    Created { source: PathBuf, output: PathBuf },
    /// 預覽長度為 0，沒有產生檔案
    Empty { source: PathBuf },
    /// 使用者選擇不覆寫既有預覽
    Skipped { source: PathBuf },
    NoSource,
}

impl SamplerOutcome {
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        match self {
            Self::Created { source, .. } | Self::Empty { source } | Self::Skipped { source } => {
                Some(source)
            }
            Self::NoSource => None,
        }
    }
}

/// 影片取樣預覽產生器
pub struct PreviewSampler {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl PreviewSampler {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&self, source_arg: Option<PathBuf>) -> Result<SamplerOutcome> {
        println!("{}", style(t!("sampler.title")).cyan().bold());

        let ffmpeg = self.select_ffmpeg()?;
        println!(
            "{}",
            style(t!("sampler.using_ffmpeg", path = ffmpeg.display())).dim()
        );

        let source_path = match source_arg {
            Some(path) => {
                validate_file_exists(&path)?;
                path
            }
            None => match self.select_source(&ffmpeg)? {
                Some(path) => path,
                None => return Ok(SamplerOutcome::NoSource),
            },
        };

        // 先用預設輸出路徑探測；既有檔案等所有問題都問完才處理
        let toolkit = FfmpegToolkit::new(ffmpeg, default_output_path(&source_path));
        let source = probe_source(&toolkit, &source_path)?;

        let clip_length = self.prompt_clip_length()?;
        let (request, percent) = self.prompt_preview_request(&source, clip_length)?;
        let plan = source.plan(&request);

        println!(
            "{}",
            style(t!(
                "sampler.preview_summary",
                duration = format_duration(plan.preview_duration_seconds() as f64),
                percent = percent,
                clips = plan.len()
            ))
            .green()
        );

        if plan.is_empty() {
            println!("{}", style(t!("sampler.empty_plan")).yellow());
            warn!("預覽長度為 0，未建立檔案: {}", source_path.display());
            return Ok(SamplerOutcome::Empty {
                source: source_path,
            });
        }

        let toolkit = match resolve_output_path(toolkit.output_path().to_path_buf(), |path| {
            self.prompt_existing_output(path)
        })? {
            OutputResolution::Ready {
                path,
                replace_existing,
            } => toolkit.with_output(path, replace_existing),
            OutputResolution::Skipped => {
                println!("{}", style(t!("sampler.skipped")).yellow());
                return Ok(SamplerOutcome::Skipped {
                    source: source_path,
                });
            }
        };

        let result = self.assemble(&toolkit, &source, &plan);
        toolkit.cleanup();

        match result {
            Ok(output) => {
                println!(
                    "{} {}",
                    style("✓").green(),
                    t!("sampler.created", path = output.display())
                );
                info!("預覽已建立: {}", output.display());
                Ok(SamplerOutcome::Created {
                    source: source_path,
                    output,
                })
            }
            Err(e) if e.is_benign() => {
                println!("{}", style(t!("sampler.empty_plan")).yellow());
                warn!("預覽長度為 0，未建立檔案: {}", source_path.display());
                Ok(SamplerOutcome::Empty {
                    source: source_path,
                })
            }
            Err(e) => {
                error!("預覽建立失敗 {}: {e}", source_path.display());
                Err(e.into())
            }
        }
    }

    fn select_ffmpeg(&self) -> Result<PathBuf> {
        let candidates = find_ffmpeg_candidates();
        if candidates.is_empty() {
            return Err(ToolError::NotFound.into());
        }

        if let Some(candidate) = auto_selection(&candidates) {
            return Ok(candidate.path.clone());
        }

        println!(
            "{}",
            t!("sampler.ffmpeg_found", count = candidates.len())
        );
        let items: Vec<String> = candidates
            .iter()
            .map(|c| format!("{}: {}", c.source, c.path.display()))
            .collect();

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("sampler.select_ffmpeg"))
            .items(&items)
            .default(0)
            .interact()?;

        Ok(candidates[selection].path.clone())
    }

    fn select_source(&self, ffmpeg: &Path) -> Result<Option<PathBuf>> {
        println!("{}", style(t!("sampler.scanning")).dim());

        let probe = |path: &Path| probe_duration_seconds(ffmpeg, path).ok();
        let mut videos = scan_video_files(Path::new("."), &self.config.file_type_table, probe)?;

        // 最近使用過、但不在目前資料夾的影片
        for recent in &self.config.settings.recent_paths {
            let path = Path::new(recent);
            if videos.iter().any(|v| is_same_file(&v.path, path)) {
                continue;
            }
            if let Some(info) = VideoFileInfo::from_path(path, probe) {
                videos.push(info);
            }
        }

        if videos.is_empty() {
            println!("{}", style(t!("sampler.no_videos")).yellow());
            return Ok(None);
        }

        let items: Vec<String> = videos
            .iter()
            .map(|video| {
                let duration = video.duration_seconds.map_or_else(
                    || t!("sampler.unknown_duration").to_string(),
                    |d| format_duration(d as f64),
                );
                format!(
                    "{} - {} - {} - {} MB",
                    video.file_name(),
                    duration,
                    video.modified_label(),
                    format_size_mb(video.size)
                )
            })
            .collect();

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("sampler.select_video"))
            .items(&items)
            .default(0)
            .interact_opt()?;

        Ok(selection.map(|i| videos[i].path.clone()))
    }

    fn prompt_existing_output(&self, path: &Path) -> Result<ExistingOutputAction> {
        let options = vec![
            t!("sampler.output_overwrite"),
            t!("sampler.output_skip"),
            t!("sampler.output_rename"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("sampler.output_exists", path = path.display()))
            .items(&options)
            .default(1)
            .interact()?;

        match selection {
            0 => Ok(ExistingOutputAction::Overwrite),
            1 => Ok(ExistingOutputAction::Skip),
            _ => {
                let name: String = Input::with_theme(&ColorfulTheme::default())
                    .with_prompt(t!("sampler.rename_prompt"))
                    .validate_with(|input: &String| -> Result<(), String> {
                        let trimmed = input.trim();
                        if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
                            Err(t!("sampler.rename_invalid").to_string())
                        } else {
                            Ok(())
                        }
                    })
                    .interact_text()?;
                Ok(ExistingOutputAction::Rename(name))
            }
        }
    }

    fn prompt_clip_length(&self) -> Result<u32> {
        let clip_length: u32 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!(
                "sampler.clip_length_prompt",
                min = MIN_CLIP_LENGTH,
                max = MAX_CLIP_LENGTH
            ))
            .default(self.config.settings.sampler.default_clip_length)
            .validate_with(|value: &u32| -> Result<(), String> {
                validate_clip_length(*value)
                    .map(|_| ())
                    .map_err(|_| {
                        t!(
                            "sampler.clip_length_invalid",
                            min = MIN_CLIP_LENGTH,
                            max = MAX_CLIP_LENGTH
                        )
                        .to_string()
                    })
            })
            .interact_text()?;

        Ok(clip_length)
    }

    fn prompt_preview_request(
        &self,
        source: &SourceMedia,
        clip_length: u32,
    ) -> Result<(SamplingRequest, f64)> {
        let total = source.total_duration_seconds();

        println!();
        println!(
            "{}",
            t!("sampler.original_duration", duration = format_duration(total))
        );
        println!("{}", t!("sampler.clip_length", seconds = clip_length));
        println!("{}", t!("sampler.choose_percentage"));

        let estimates = estimate_previews(
            total,
            clip_length,
            &self.config.settings.sampler.preview_percentages,
        );
        for estimate in &estimates {
            println!(
                "  {}",
                t!(
                    "sampler.estimate_line",
                    percent = estimate.percent,
                    duration = format_duration(estimate.preview_duration_seconds as f64),
                    clips = estimate.clip_count
                )
            );
        }

        let percent: f64 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!(
                "sampler.percentage_prompt",
                min = MIN_PREVIEW_PERCENT,
                max = MAX_PREVIEW_PERCENT
            ))
            .validate_with(|value: &f64| -> Result<(), String> {
                validate_preview_percent(*value).map(|_| ()).map_err(|_| {
                    t!(
                        "sampler.percentage_invalid",
                        min = MIN_PREVIEW_PERCENT,
                        max = MAX_PREVIEW_PERCENT
                    )
                    .to_string()
                })
            })
            .interact_text()?;

        let request = SamplingRequest::from_percent(clip_length, percent)?;
        Ok((request, percent))
    }

    fn assemble(
        &self,
        toolkit: &FfmpegToolkit,
        source: &SourceMedia,
        plan: &ClipPlan,
    ) -> Result<PathBuf, SamplerError> {
        let progress_bar = ProgressBar::new(plan.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        progress_bar.set_message(t!("sampler.extracting").to_string());

        let bar = progress_bar.clone();
        let result = AssemblyPipeline::new(toolkit, Arc::clone(&self.shutdown_signal))
            .with_mode(self.config.settings.sampler.extraction_mode)
            .on_clip_extracted(move |_| bar.inc(1))
            .assemble(source, plan);

        match &result {
            Ok(_) => progress_bar.finish_with_message(t!("sampler.extract_done").to_string()),
            Err(_) => progress_bar.abandon_with_message(t!("sampler.extract_aborted").to_string()),
        }

        result
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_source() {
        let created = SamplerOutcome::Created {
            source: PathBuf::from("/a.mp4"),
            output: PathBuf::from("/a sampler.mp4"),
        };
        assert_eq!(created.source(), Some(Path::new("/a.mp4")));
        assert_eq!(SamplerOutcome::NoSource.source(), None);
    }

    #[test]
    fn test_is_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.mp4");
        fs::write(&file, b"").unwrap();

        assert!(is_same_file(&file, &dir.path().join(".").join("a.mp4")));
        assert!(!is_same_file(&file, &dir.path().join("missing.mp4")));
    }
}
