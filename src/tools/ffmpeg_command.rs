use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 片段擷取指令
///
/// `-ss` 放在 `-i` 前做快速定位；超出影片結尾的部分由 `-shortest` 截斷。
pub struct ClipCommand<'a> {
    ffmpeg: &'a Path,
    source_path: &'a Path,
    start_seconds: f64,
    length_seconds: u32,
    destination_path: &'a Path,
}

impl<'a> ClipCommand<'a> {
    #[must_use]
    pub const fn new(
        ffmpeg: &'a Path,
        source_path: &'a Path,
        start_seconds: f64,
        length_seconds: u32,
        destination_path: &'a Path,
    ) -> Self {
        Self {
            ffmpeg,
            source_path,
            start_seconds,
            length_seconds,
            destination_path,
        }
    }

    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-nostdin",
            "-loglevel",
            "error",
            "-y",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.extend([
            "-ss".into(),
            format!("{:.3}", self.start_seconds).into(),
            "-t".into(),
            self.length_seconds.to_string().into(),
            "-i".into(),
            self.source_path.as_os_str().to_owned(),
        ]);

        args.extend(
            [
                "-c:v", "libx264",
                "-crf", "10",
                "-c:a", "aac",
                "-b:a", "320k",
                "-shortest",
            ]
            .into_iter()
            .map(OsString::from),
        );

        args.push(self.destination_path.as_os_str().to_owned());
        args
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(self.ffmpeg);
        cmd.args(self.args());
        cmd
    }
}

/// 以 concat demuxer 無損合併片段
///
/// 使用 `-n`：輸出檔已存在時不覆寫，覆寫與否由呼叫端事先決定。
pub struct ConcatCommand<'a> {
    ffmpeg: &'a Path,
    list_path: &'a Path,
    destination_path: &'a Path,
}

impl<'a> ConcatCommand<'a> {
    #[must_use]
    pub const fn new(ffmpeg: &'a Path, list_path: &'a Path, destination_path: &'a Path) -> Self {
        Self {
            ffmpeg,
            list_path,
            destination_path,
        }
    }

    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-nostdin",
            "-loglevel",
            "error",
            "-n",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push(self.list_path.as_os_str().to_owned());
        args.extend(["-c", "copy"].into_iter().map(OsString::from));
        args.push(self.destination_path.as_os_str().to_owned());
        args
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(self.ffmpeg);
        cmd.args(self.args());
        cmd
    }
}

/// 暫存片段檔名
#[must_use]
pub fn clip_file_name(index: usize) -> String {
    format!("clip_{index:04}.mp4")
}

/// concat 清單的一行：統一使用 `/`，單引號需跳脫
#[must_use]
pub fn concat_list_line(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let escaped = normalized.replace('\'', r"'\''");
    format!("file '{escaped}'")
}

/// 依順序寫入 concat 清單
pub fn write_concat_list(clips: &[PathBuf], list_path: &Path) -> io::Result<()> {
    let mut content = String::new();
    for clip in clips {
        let absolute = std::path::absolute(clip)?;
        content.push_str(&concat_list_line(&absolute));
        content.push('\n');
    }
    fs::write(list_path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn test_clip_command_args() {
        let cmd = ClipCommand::new(
            Path::new("ffmpeg"),
            Path::new("/videos/movie.mp4"),
            18.5,
            10,
            Path::new("/tmp/work/clip_0001.mp4"),
        );
        let args = to_strings(&cmd.args());

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input, "-ss 必須在 -i 之前");
        assert_eq!(args[ss + 1], "18.500");
        assert_eq!(args[input + 1], "/videos/movie.mp4");

        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "10");
        assert!(args.contains(&"-shortest".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/work/clip_0001.mp4");
    }

    #[test]
    fn test_concat_command_args() {
        let cmd = ConcatCommand::new(
            Path::new("ffmpeg"),
            Path::new("/tmp/work/concat.txt"),
            Path::new("/videos/movie sampler.mp4"),
        );
        let args = to_strings(&cmd.args());

        let copy = args.iter().position(|a| a == "-c").unwrap();
        assert_eq!(args[copy + 1], "copy");
        assert!(args.contains(&"-n".to_string()));
        assert!(!args.contains(&"-y".to_string()));
        assert_eq!(args.last().unwrap(), "/videos/movie sampler.mp4");
    }

    #[test]
    fn test_build_command_program() {
        let cmd = ConcatCommand::new(
            Path::new("/opt/ffmpeg/bin/ffmpeg"),
            Path::new("list.txt"),
            Path::new("out.mp4"),
        )
        .build_command();
        assert_eq!(cmd.get_program(), "/opt/ffmpeg/bin/ffmpeg");
    }

    #[test]
    fn test_clip_file_name() {
        assert_eq!(clip_file_name(0), "clip_0000.mp4");
        assert_eq!(clip_file_name(12), "clip_0012.mp4");
    }

    #[test]
    fn test_concat_list_line_escapes() {
        assert_eq!(
            concat_list_line(Path::new(r"C:\clips\clip_0000.mp4")),
            "file 'C:/clips/clip_0000.mp4'"
        );
        assert_eq!(
            concat_list_line(Path::new("/tmp/it's/clip.mp4")),
            r"file '/tmp/it'\''s/clip.mp4'"
        );
    }

    #[test]
    fn test_write_concat_list_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let clips: Vec<PathBuf> = (0..3).map(|i| dir.path().join(clip_file_name(i))).collect();
        let list_path = dir.path().join("concat.txt");

        write_concat_list(&clips, &list_path).unwrap();

        let content = fs::read_to_string(&list_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("clip_0000.mp4'"));
        assert!(lines[2].ends_with("clip_0002.mp4'"));
    }
}
