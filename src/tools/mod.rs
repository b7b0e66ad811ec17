mod duration_format;
mod ffmpeg_command;
mod ffmpeg_locator;
mod ffmpeg_toolkit;
mod ffprobe_info;
mod path_validator;
mod tool_error;
mod video_scanner;

pub use duration_format::{format_duration, format_size_mb};
pub use ffmpeg_command::{
    ClipCommand, ConcatCommand, clip_file_name, concat_list_line, write_concat_list,
};
pub use ffmpeg_locator::{
    CandidateSource, FFMPEG_BINARY, FfmpegCandidate, auto_selection, ffprobe_sibling,
    find_ffmpeg_candidates, find_in_search_path, walk_for_binary,
};
pub use ffmpeg_toolkit::FfmpegToolkit;
pub use ffprobe_info::{parse_banner_duration, parse_ffprobe_duration, probe_duration_seconds};
pub use path_validator::validate_file_exists;
pub use tool_error::{ToolError, run_tool, summarize_stderr};
pub use video_scanner::{VideoFileInfo, scan_video_files};
