//! Start, pause and reset commands.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use pt_core::{DayKey, Storage, Tracker, format_hms};

/// A stopwatch transition requested from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Pause,
    Reset,
}

pub fn run<W, S, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, Tz>,
    action: Action,
    now: &DateTime<Tz>,
) -> Result<()>
where
    W: Write,
    S: Storage,
    Tz: TimeZone,
{
    let now_ms = now.timestamp_millis();
    let was_running = tracker.state().is_running();

    match action {
        Action::Start => {
            let state = tracker.start(now_ms)?;
            if was_running {
                writeln!(writer, "Timer already running ({})", format_hms(state.elapsed(now_ms)))?;
            } else {
                writeln!(writer, "Started at {}", format_hms(state.elapsed(now_ms)))?;
            }
        }
        Action::Pause => {
            let state = tracker.pause(now_ms)?;
            if was_running {
                writeln!(writer, "Paused at {}", format_hms(state.elapsed(now_ms)))?;
                write_today(writer, tracker, now)?;
            } else {
                writeln!(writer, "Timer is not running ({})", format_hms(state.elapsed(now_ms)))?;
            }
        }
        Action::Reset => {
            tracker.reset(now_ms)?;
            writeln!(writer, "Reset to 00:00:00")?;
            write_today(writer, tracker, now)?;
        }
    }
    Ok(())
}

fn write_today<W, S, Tz>(writer: &mut W, tracker: &Tracker<S, Tz>, now: &DateTime<Tz>) -> Result<()>
where
    W: Write,
    S: Storage,
    Tz: TimeZone,
{
    let today = DayKey::new(now.date_naive());
    let total = tracker.daily_totals()?.get(&today).copied().unwrap_or(0);
    writeln!(writer, "Today: {}", format_hms(total))?;
    Ok(())
}
