//! Implementation of the `pt export` command.
//!
//! Writes daily totals and log entries as CSV to stdout or a file.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::TimeZone;
use pt_core::{Storage, Tracker, export_csv, tracked_days};

pub fn run<W, S, Tz>(writer: &mut W, tracker: &Tracker<S, Tz>, output: Option<&Path>) -> Result<()>
where
    W: Write,
    S: Storage,
    Tz: TimeZone,
{
    let totals = tracker.daily_totals()?;
    let logs = tracker.logs()?;
    let csv = export_csv(&totals, &logs);
    let days = tracked_days(&totals).count();

    match output {
        Some(path) => {
            fs::write(path, &csv).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), days, "exported CSV");
            writeln!(writer, "Exported {days} day(s) to {}", path.display())?;
        }
        None => writeln!(writer, "{csv}")?,
    }
    Ok(())
}
