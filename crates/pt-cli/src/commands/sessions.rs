//! Lists the sessions recorded on one day.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use pt_core::{DayKey, Session, Storage, Tracker, format_hms};

pub fn run<W, S, Tz>(writer: &mut W, tracker: &Tracker<S, Tz>, day: DayKey) -> Result<()>
where
    W: Write,
    S: Storage,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = tracker.tz();
    let sessions: Vec<Session> = tracker
        .sessions()?
        .into_iter()
        .filter(|s| s.day(tz) == Some(day))
        .collect();

    if sessions.is_empty() {
        writeln!(writer, "No sessions on {day}.")?;
        return Ok(());
    }

    writeln!(writer, "Sessions on {day}:")?;
    let mut total = 0;
    for session in &sessions {
        total += session.duration_ms();
        writeln!(
            writer,
            "  {} - {}  {}",
            clock_time(session.start, tz),
            clock_time(session.end, tz),
            format_hms(session.duration_ms())
        )?;
    }
    writeln!(writer, "Total: {}", format_hms(total))?;
    Ok(())
}

fn clock_time<Tz>(ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    DateTime::from_timestamp_millis(ms).map_or_else(
        || "??:??:??".to_string(),
        |dt| dt.with_timezone(tz).format("%H:%M:%S").to_string(),
    )
}
