//! Trend command: recent days as a bar chart.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use pt_core::trend::scale_max;
use pt_core::{DailyTotals, format_hms, trend_series};

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: i64, max: i64) -> String {
    if max <= 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value.max(0) as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

pub fn run<W: Write>(writer: &mut W, totals: &DailyTotals, today: NaiveDate, days: u32) -> Result<()> {
    let points = trend_series(totals, today, days);
    if points.is_empty() {
        writeln!(writer, "No time tracked in the last {days} days.")?;
        return Ok(());
    }

    let max = scale_max(&points);
    let total: i64 = points.iter().map(|p| p.total_ms).sum();
    writeln!(writer, "Last {days} days (scale {})", format_hms(max))?;
    for point in &points {
        writeln!(
            writer,
            "{}  {}  {}",
            point.day,
            progress_bar(point.total_ms, max),
            format_hms(point.total_ms)
        )?;
    }
    writeln!(writer, "Total: {}", format_hms(total))?;
    Ok(())
}
