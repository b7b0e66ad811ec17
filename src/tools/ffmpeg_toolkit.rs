use super::ffmpeg_command::{ClipCommand, ConcatCommand, clip_file_name, write_concat_list};
use super::ffprobe_info::probe_duration_seconds;
use super::tool_error::{ToolError, run_tool};
use crate::component::preview_sampler::{ClipEntry, MediaToolkit};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const CONCAT_LIST_NAME: &str = "concat.txt";
const STAGED_OUTPUT_NAME: &str = "preview.mp4";

/// 以 ffmpeg 實作的媒體工具
///
/// 片段、concat 清單與合併結果都放在輸出檔旁的暫存目錄，
/// 合併成功後才移到輸出路徑。執行結束後呼叫 [`cleanup`](Self::cleanup) 移除暫存目錄。
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffmpeg: PathBuf,
    output_path: PathBuf,
    work_dir: PathBuf,
    replace_existing: bool,
}

impl FfmpegToolkit {
    #[must_use]
    pub fn new(ffmpeg: PathBuf, output_path: PathBuf) -> Self {
        let parent = output_path.parent().unwrap_or(Path::new("."));
        let work_dir = parent.join(format!(".sampler_tmp_{}", Uuid::new_v4().simple()));
        Self {
            ffmpeg,
            output_path,
            work_dir,
            replace_existing: false,
        }
    }

    /// 更換輸出路徑（需與原本在同一個資料夾）
    ///
    /// `replace_existing` 為 true 時，合併成功後才取代既有檔案。
    #[must_use]
    pub fn with_output(mut self, output_path: PathBuf, replace_existing: bool) -> Self {
        self.output_path = output_path;
        self.replace_existing = replace_existing;
        self
    }

    #[must_use]
    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// 移除暫存目錄，失敗只記錄警告
    pub fn cleanup(&self) {
        if self.work_dir.exists() && fs::remove_dir_all(&self.work_dir).is_err() {
            warn!("無法清理暫存目錄: {}", self.work_dir.display());
        }
    }

    /// 將暫存的合併結果移到輸出路徑
    fn publish(&self, staged_path: &Path) -> Result<(), ToolError> {
        if !self.replace_existing && self.output_path.exists() {
            remove_partial(staged_path);
            return Err(ToolError::OutputExists(self.output_path.clone()));
        }

        if let Err(e) = fs::rename(staged_path, &self.output_path) {
            remove_partial(staged_path);
            return Err(e.into());
        }

        debug!("預覽已移至: {}", self.output_path.display());
        Ok(())
    }
}

impl MediaToolkit for FfmpegToolkit {
    type Clip = PathBuf;
    type Artifact = PathBuf;
    type Error = ToolError;

    fn probe_duration(&self, source: &Path) -> Result<u64, ToolError> {
        probe_duration_seconds(&self.ffmpeg, source)
    }

    fn extract_clip(&self, source: &Path, clip: &ClipEntry) -> Result<PathBuf, ToolError> {
        fs::create_dir_all(&self.work_dir)?;
        let clip_path = self.work_dir.join(clip_file_name(clip.index));

        let command = ClipCommand::new(
            &self.ffmpeg,
            source,
            clip.start_offset_seconds,
            clip.length_seconds,
            &clip_path,
        );
        run_tool(command.build_command())?;

        if !clip_path.exists() {
            return Err(ToolError::MissingOutput(clip_path));
        }

        debug!("片段已建立: {}", clip_path.display());
        Ok(clip_path)
    }

    fn concatenate(&self, clips: &[PathBuf]) -> Result<PathBuf, ToolError> {
        fs::create_dir_all(&self.work_dir)?;
        let list_path = self.work_dir.join(CONCAT_LIST_NAME);
        write_concat_list(clips, &list_path)?;

        let staged_path = self.work_dir.join(STAGED_OUTPUT_NAME);
        let command = ConcatCommand::new(&self.ffmpeg, &list_path, &staged_path);
        if let Err(e) = run_tool(command.build_command()) {
            remove_partial(&staged_path);
            return Err(e);
        }

        if !staged_path.exists() {
            return Err(ToolError::MissingOutput(staged_path));
        }

        self.publish(&staged_path)?;
        Ok(self.output_path.clone())
    }
}

fn remove_partial(path: &Path) {
    if path.exists() && fs::remove_file(path).is_err() {
        warn!("無法刪除不完整的輸出: {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_dir_next_to_output() {
        let toolkit = FfmpegToolkit::new(
            PathBuf::from("ffmpeg"),
            PathBuf::from("/videos/movie sampler.mp4"),
        );

        assert_eq!(toolkit.work_dir().parent(), Some(Path::new("/videos")));
        let name = toolkit.work_dir().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(".sampler_tmp_"));
    }

    #[test]
    fn test_work_dir_unique_per_run() {
        let output = PathBuf::from("/videos/a sampler.mp4");
        let first = FfmpegToolkit::new(PathBuf::from("ffmpeg"), output.clone());
        let second = FfmpegToolkit::new(PathBuf::from("ffmpeg"), output);
        assert_ne!(first.work_dir(), second.work_dir());
    }

    #[test]
    fn test_cleanup_removes_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = FfmpegToolkit::new(
            PathBuf::from("ffmpeg"),
            dir.path().join("movie sampler.mp4"),
        );
        fs::create_dir_all(toolkit.work_dir()).unwrap();
        fs::write(toolkit.work_dir().join(clip_file_name(0)), b"clip").unwrap();

        toolkit.cleanup();

        assert!(!toolkit.work_dir().exists());
    }

    #[test]
    fn test_extract_with_missing_ffmpeg_fails() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = FfmpegToolkit::new(
            dir.path().join("no-ffmpeg-here"),
            dir.path().join("out.mp4"),
        );
        let clip = ClipEntry {
            index: 0,
            start_offset_seconds: 0.0,
            length_seconds: 10,
        };

        let err = toolkit.extract_clip(Path::new("in.mp4"), &clip).unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
        toolkit.cleanup();
    }

    /// 建立假的 ffmpeg：把 `content` 寫到最後一個參數（輸出檔），再以 `exit_code` 結束
    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path, content: &str, exit_code: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join(format!("fake_ffmpeg_{exit_code}"));
        fs::write(
            &script,
            format!("#!/bin/sh\nfor last; do :; done\nprintf '{content}' > \"$last\"\nexit {exit_code}\n"),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    fn clip_in(dir: &Path) -> PathBuf {
        let clip = dir.join("clip_0000.mp4");
        fs::write(&clip, b"clip").unwrap();
        clip
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_concat_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("movie sampler.mp4");
        let toolkit = FfmpegToolkit::new(fake_ffmpeg(dir.path(), "partial", 1), output.clone());

        let err = toolkit.concatenate(&[clip_in(dir.path())]).unwrap_err();

        assert!(matches!(err, ToolError::Failed { .. }));
        assert!(!output.exists(), "不完整的預覽不應該出現在輸出路徑");
        assert!(!toolkit.work_dir().join(STAGED_OUTPUT_NAME).exists());
        toolkit.cleanup();
    }

    #[cfg(unix)]
    #[test]
    fn test_concat_moves_result_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("movie sampler.mp4");
        let toolkit = FfmpegToolkit::new(fake_ffmpeg(dir.path(), "preview", 0), output.clone());

        let artifact = toolkit.concatenate(&[clip_in(dir.path())]).unwrap();
        toolkit.cleanup();

        assert_eq!(artifact, output);
        assert_eq!(fs::read_to_string(&output).unwrap(), "preview");
        assert!(!toolkit.work_dir().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_concat_keeps_existing_output_without_replace() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("movie sampler.mp4");
        fs::write(&output, "old").unwrap();
        let toolkit = FfmpegToolkit::new(fake_ffmpeg(dir.path(), "preview", 0), output.clone());

        let err = toolkit.concatenate(&[clip_in(dir.path())]).unwrap_err();
        toolkit.cleanup();

        assert!(matches!(err, ToolError::OutputExists(_)));
        assert_eq!(fs::read_to_string(&output).unwrap(), "old");
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_existing_only_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("movie sampler.mp4");
        fs::write(&output, "old").unwrap();

        let failing = FfmpegToolkit::new(fake_ffmpeg(dir.path(), "partial", 1), output.clone())
            .with_output(output.clone(), true);
        assert!(failing.concatenate(&[clip_in(dir.path())]).is_err());
        failing.cleanup();
        assert_eq!(fs::read_to_string(&output).unwrap(), "old");

        let succeeding = FfmpegToolkit::new(fake_ffmpeg(dir.path(), "preview", 0), output.clone())
            .with_output(output.clone(), true);
        succeeding.concatenate(&[clip_in(dir.path())]).unwrap();
        succeeding.cleanup();
        assert_eq!(fs::read_to_string(&output).unwrap(), "preview");
    }
}
