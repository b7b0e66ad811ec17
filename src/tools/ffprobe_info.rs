use super::ffmpeg_locator::ffprobe_sibling;
use super::tool_error::{ToolError, run_tool};
use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

static REGEX_BANNER_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duration: (\d+):(\d+):(\d+(?:\.\d+)?)").expect("Invalid regex")
});

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    duration: Option<String>,
}

/// 取得影片長度（整數秒，小數部分捨去）
///
/// 優先使用同目錄的 ffprobe，失敗時改從 `ffmpeg -i` 的輸出解析。
pub fn probe_duration_seconds(ffmpeg: &Path, video: &Path) -> Result<u64, ToolError> {
    if let Some(ffprobe) = ffprobe_sibling(ffmpeg) {
        match probe_with_ffprobe(&ffprobe, video) {
            Ok(seconds) => return Ok(whole_seconds(seconds)),
            Err(e) => debug!("ffprobe 失敗，改用 ffmpeg 解析: {e}"),
        }
    }

    probe_with_ffmpeg(ffmpeg, video).map(whole_seconds)
}

fn probe_with_ffprobe(ffprobe: &Path, video: &Path) -> Result<f64, ToolError> {
    let mut command = Command::new(ffprobe);
    command
        .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(video);

    let output = run_tool(command)?;
    parse_ffprobe_duration(&String::from_utf8_lossy(&output.stdout))
}

fn probe_with_ffmpeg(ffmpeg: &Path, video: &Path) -> Result<f64, ToolError> {
    // 沒有指定輸出檔時 ffmpeg 必定以非零結束，只看 stderr
    let output = Command::new(ffmpeg)
        .args(["-hide_banner", "-nostdin", "-i"])
        .arg(video)
        .output()
        .map_err(|source| ToolError::Spawn {
            program: ffmpeg.to_string_lossy().to_string(),
            source,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    parse_banner_duration(&stderr)
        .ok_or_else(|| ToolError::Parse(format!("影片長度: {}", video.display())))
}

/// 解析 ffprobe JSON（優先 format，其次第一個有長度的串流）
pub fn parse_ffprobe_duration(json: &str) -> Result<f64, ToolError> {
    let probe: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| ToolError::Parse(format!("ffprobe 輸出: {e}")))?;

    let stream_duration = probe
        .streams
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find_map(|s| s.duration.as_ref());

    probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or(stream_duration)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ToolError::Parse("ffprobe 輸出中沒有影片長度".to_string()))
}

/// 解析 `Duration: 01:02:03.45` 格式
#[must_use]
pub fn parse_banner_duration(stderr: &str) -> Option<f64> {
    let caps = REGEX_BANNER_DURATION.captures(stderr)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn whole_seconds(seconds: f64) -> u64 {
    seconds.max(0.0).trunc() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_banner_duration() {
        let stderr = "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'a.mp4':\n  Duration: 01:02:03.45, start: 0.000000, bitrate: 1205 kb/s\n";
        let seconds = parse_banner_duration(stderr).unwrap();
        assert!((seconds - 3723.45).abs() < 1e-6);
    }

    #[test]
    fn test_parse_banner_duration_missing() {
        assert!(parse_banner_duration("a.mp4: Invalid data found when processing input").is_none());
        assert!(parse_banner_duration("Duration: N/A, bitrate: N/A").is_none());
    }

    #[test]
    fn test_parse_ffprobe_duration_from_format() {
        let json = r#"{"format": {"duration": "600.120000"}, "streams": [{"duration": "599.9"}]}"#;
        assert!((parse_ffprobe_duration(json).unwrap() - 600.12).abs() < 1e-6);
    }

    #[test]
    fn test_parse_ffprobe_duration_from_stream() {
        let json = r#"{"format": {}, "streams": [{"codec_type": "video"}, {"duration": "37.5"}]}"#;
        assert!((parse_ffprobe_duration(json).unwrap() - 37.5).abs() < 1e-6);
    }

    #[test]
    fn test_parse_ffprobe_duration_invalid() {
        assert!(parse_ffprobe_duration("not json").is_err());
        assert!(parse_ffprobe_duration(r#"{"format": {"duration": "N/A"}}"#).is_err());
        assert!(parse_ffprobe_duration("{}").is_err());
    }

    #[test]
    fn test_whole_seconds_truncates() {
        assert_eq!(whole_seconds(37.99), 37);
        assert_eq!(whole_seconds(0.4), 0);
        assert_eq!(whole_seconds(-1.0), 0);
    }
}
