//! ffmpeg 執行檔搜尋
//!
//! 搜尋順序：
//! 1. `FFMPEG_PATH` 環境變數
//! 2. PATH 中的 ffmpeg（第一個標記為 PATH，其餘標記為 System）
//! 3. PATH 中找不到時，檢查常見安裝位置；Windows 另外搜尋 Program Files 與使用者目錄

use log::debug;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 目錄搜尋的最大深度
const SEARCH_MAX_DEPTH: usize = 4;

#[cfg(windows)]
pub const FFMPEG_BINARY: &str = "ffmpeg.exe";
#[cfg(not(windows))]
pub const FFMPEG_BINARY: &str = "ffmpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Env,
    Path,
    System,
    Found,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env => write!(f, "FFMPEG_PATH"),
            Self::Path => write!(f, "PATH"),
            Self::System => write!(f, "System"),
            Self::Found => write!(f, "Found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegCandidate {
    pub source: CandidateSource,
    pub path: PathBuf,
}

/// 找出所有可用的 ffmpeg
#[must_use]
pub fn find_ffmpeg_candidates() -> Vec<FfmpegCandidate> {
    let mut candidates = Vec::new();

    if let Some(env_path) = std::env::var_os("FFMPEG_PATH") {
        let path = PathBuf::from(env_path);
        if path.is_file() {
            push_unique(&mut candidates, CandidateSource::Env, path);
        }
    }

    if let Some(path_var) = std::env::var_os("PATH") {
        for (i, path) in find_in_search_path(&path_var, FFMPEG_BINARY)
            .into_iter()
            .enumerate()
        {
            let source = if i == 0 {
                CandidateSource::Path
            } else {
                CandidateSource::System
            };
            push_unique(&mut candidates, source, path);
        }
    }

    let has_path_entry = candidates
        .iter()
        .any(|c| c.source == CandidateSource::Path);

    if !has_path_entry {
        debug!("PATH 中找不到 ffmpeg，搜尋常見安裝位置");
        for path in common_install_paths() {
            if path.is_file() {
                push_unique(&mut candidates, CandidateSource::Found, path);
            }
        }
        for root in search_roots() {
            for path in walk_for_binary(&root, FFMPEG_BINARY, SEARCH_MAX_DEPTH) {
                push_unique(&mut candidates, CandidateSource::Found, path);
            }
        }
    }

    debug!("找到 {} 個 ffmpeg", candidates.len());
    candidates
}

/// 只有一個候選且來自 PATH 時不需詢問使用者
#[must_use]
pub fn auto_selection(candidates: &[FfmpegCandidate]) -> Option<&FfmpegCandidate> {
    match candidates {
        [only] if matches!(only.source, CandidateSource::Path | CandidateSource::Env) => Some(only),
        _ => None,
    }
}

/// 在 PATH 格式的字串中尋找執行檔
#[must_use]
pub fn find_in_search_path(path_var: &OsStr, binary: &str) -> Vec<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(binary))
        .filter(|path| path.is_file())
        .collect()
}

/// 在目錄下有限深度地尋找執行檔
#[must_use]
pub fn walk_for_binary(root: &Path, binary: &str, max_depth: usize) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().eq_ignore_ascii_case(binary))
        .map(walkdir::DirEntry::into_path)
        .collect();

    found.sort();
    found
}

/// ffmpeg 同目錄下的 ffprobe
#[must_use]
pub fn ffprobe_sibling(ffmpeg: &Path) -> Option<PathBuf> {
    let file_name = ffmpeg.file_name()?.to_str()?;
    let probe_name = file_name.replacen("ffmpeg", "ffprobe", 1);
    if probe_name == file_name {
        return None;
    }

    let candidate = ffmpeg.with_file_name(probe_name);
    candidate.is_file().then_some(candidate)
}

fn push_unique(candidates: &mut Vec<FfmpegCandidate>, source: CandidateSource, path: PathBuf) {
    if !candidates.iter().any(|c| c.path == path) {
        candidates.push(FfmpegCandidate { source, path });
    }
}

fn common_install_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/opt/homebrew/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/opt/local/bin/ffmpeg"),
        ]
    }

    #[cfg(windows)]
    {
        vec![
            PathBuf::from("C:\\ffmpeg\\bin\\ffmpeg.exe"),
            PathBuf::from("C:\\Program Files\\ffmpeg\\bin\\ffmpeg.exe"),
        ]
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        vec![
            PathBuf::from("/usr/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/snap/bin/ffmpeg"),
        ]
    }

    #[cfg(not(any(unix, windows)))]
    {
        Vec::new()
    }
}

fn search_roots() -> Vec<PathBuf> {
    #[cfg(windows)]
    {
        let mut roots = vec![
            PathBuf::from("C:\\Program Files"),
            PathBuf::from("C:\\Program Files (x86)"),
        ];
        if let Some(home) = std::env::var_os("USERPROFILE") {
            roots.push(PathBuf::from(home));
        }
        roots
    }

    #[cfg(not(windows))]
    {
        Vec::new()
    }
}
