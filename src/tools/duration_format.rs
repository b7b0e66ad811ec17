/// 將秒數格式化為 hh:mm:ss（捨去小數）
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).trunc() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// 位元組轉為 MB（小數兩位）
#[must_use]
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0 / 1024.0)
}
