//! Duration formatting.

/// Formats milliseconds as zero-padded `HH:MM:SS`.
///
/// Hours are not wrapped at 24 and grow past two digits as needed. Partial
/// seconds are floored; negative durations render as `00:00:00`.
pub fn format_hms(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Formats milliseconds as whole minutes, e.g. `83m`.
pub fn format_minutes(ms: i64) -> String {
    format!("{}m", ms.max(0) / 60_000)
}
