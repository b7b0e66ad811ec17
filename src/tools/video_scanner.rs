use crate::config::FileTypeTable;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct VideoFileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
    pub duration_seconds: Option<u64>,
}

impl VideoFileInfo {
    /// 讀取檔案資訊並探測長度，檔案不存在時回傳 None
    pub fn from_path(path: &Path, probe: impl Fn(&Path) -> Option<u64>) -> Option<Self> {
        let metadata = path.metadata().ok().filter(std::fs::Metadata::is_file)?;
        Some(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
            duration_seconds: probe(path),
        })
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    #[must_use]
    pub fn modified_label(&self) -> String {
        self.modified
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
    }
}

/// 掃描資料夾第一層的影片檔並平行探測長度，依檔名排序
pub fn scan_video_files(
    directory: &Path,
    file_type_table: &FileTypeTable,
    probe: impl Fn(&Path) -> Option<u64> + Sync,
) -> Result<Vec<VideoFileInfo>> {
    let entries = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("無法讀取資料夾: {}", directory.display()))?;

    let mut video_files: Vec<VideoFileInfo> = entries
        .par_iter()
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| file_type_table.is_video_file(entry.path()))
        .filter_map(|entry| VideoFileInfo::from_path(entry.path(), &probe))
        .collect();

    video_files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(video_files)
}
