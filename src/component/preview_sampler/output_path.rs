//! 輸出檔名與既有檔案處理

use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

const OUTPUT_SUFFIX: &str = " sampler";
const OUTPUT_EXTENSION: &str = "mp4";

/// 輸出檔已存在時的處理方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistingOutputAction {
    Overwrite,
    Skip,
    /// 新檔名（不含副檔名）
    Rename(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputResolution {
    /// `replace_existing` 為 true 表示使用者同意覆寫，既有檔案在預覽完成後才被取代
    Ready {
        path: PathBuf,
        replace_existing: bool,
    },
    Skipped,
}

/// `<檔名> sampler.mp4`，與來源影片放在同一個資料夾
#[must_use]
pub fn default_output_path(source: &Path) -> PathBuf {
    let file_stem = source
        .file_stem()
        .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string());
    let parent = source.parent().unwrap_or(Path::new(""));
    parent.join(format!("{file_stem}{OUTPUT_SUFFIX}.{OUTPUT_EXTENSION}"))
}

#[must_use]
pub fn renamed_output_path(current: &Path, new_name: &str) -> PathBuf {
    let parent = current.parent().unwrap_or(Path::new(""));
    parent.join(format!("{}.{OUTPUT_EXTENSION}", new_name.trim()))
}

/// 決定最終輸出路徑
///
/// 輸出檔已存在時透過 `decide` 詢問處理方式；改名後會再次檢查新檔名。
/// 不會刪除任何檔案。
pub fn resolve_output_path(
    initial: PathBuf,
    mut decide: impl FnMut(&Path) -> Result<ExistingOutputAction>,
) -> Result<OutputResolution> {
    let mut path = initial;

    loop {
        if !path.exists() {
            return Ok(OutputResolution::Ready {
                path,
                replace_existing: false,
            });
        }

        match decide(&path)? {
            ExistingOutputAction::Overwrite => {
                info!("將覆寫既有預覽: {}", path.display());
                return Ok(OutputResolution::Ready {
                    path,
                    replace_existing: true,
                });
            }
            ExistingOutputAction::Skip => return Ok(OutputResolution::Skipped),
            ExistingOutputAction::Rename(name) => {
                path = renamed_output_path(&path, &name);
            }
        }
    }
}
