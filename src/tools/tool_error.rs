use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output};

/// stderr 摘要的最大長度（字元）
const STDERR_SUMMARY_LEN: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("找不到 ffmpeg，請安裝 ffmpeg 或將其加入 PATH")]
    NotFound,

    #[error("無法執行 {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} 執行失敗 ({status}): {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("無法解析 {0}")]
    Parse(String),

    #[error("輸出檔案未建立: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("輸出檔案已存在: {}", .0.display())]
    OutputExists(PathBuf),
}

/// 執行外部程式並在失敗時回傳 stderr 摘要
pub fn run_tool(mut command: Command) -> Result<Output, ToolError> {
    let program = command.get_program().to_string_lossy().to_string();

    let output = command.output().map_err(|source| ToolError::Spawn {
        program: program.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            program,
            status: output.status,
            stderr: summarize_stderr(&String::from_utf8_lossy(&output.stderr)),
        });
    }

    Ok(output)
}

/// 取最後一行非空白的 stderr（ffmpeg 的錯誤通常在最後）
#[must_use]
pub fn summarize_stderr(stderr: &str) -> String {
    let last = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    if last.chars().count() <= STDERR_SUMMARY_LEN {
        last.to_string()
    } else {
        let truncated: String = last.chars().take(STDERR_SUMMARY_LEN).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_stderr_last_line() {
        let stderr = "frame=1\nclip.mp4: No such file or directory\n\n";
        assert_eq!(summarize_stderr(stderr), "clip.mp4: No such file or directory");
    }

    #[test]
    fn test_summarize_stderr_empty() {
        assert_eq!(summarize_stderr(""), "");
        assert_eq!(summarize_stderr("  \n \n"), "");
    }

    #[test]
    fn test_summarize_stderr_truncates_on_char_boundary() {
        let long = "錯".repeat(250);
        let summary = summarize_stderr(&long);

        assert!(summary.ends_with('…'));
        assert_eq!(summary.chars().count(), STDERR_SUMMARY_LEN + 1);
    }

    #[test]
    fn test_run_tool_spawn_failure() {
        let err = run_tool(Command::new("definitely-not-a-real-program-xyz")).unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }
}
