//! Status command: elapsed time and today's total.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use pt_core::session::local_midnight;
use pt_core::{DayKey, Phase, Storage, Tracker, format_hms};
use serde::Serialize;

/// Snapshot of the stopwatch for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub running: bool,
    pub elapsed_ms: i64,
    pub elapsed: String,
    pub today_ms: i64,
    pub today: String,
}

/// Builds the report at `now`.
///
/// Today's total includes the portion of an open run that falls on today.
pub fn status_report<S, Tz>(tracker: &Tracker<S, Tz>, now: &DateTime<Tz>) -> Result<StatusReport>
where
    S: Storage,
    Tz: TimeZone,
{
    let now_ms = now.timestamp_millis();
    let state = tracker.state();
    let today = DayKey::new(now.date_naive());
    let recorded = tracker.daily_totals()?.get(&today).copied().unwrap_or(0);
    let open_today = match state.phase() {
        Phase::Running { since } => {
            let midnight = local_midnight(today.date(), tracker.tz())
                .map_or(since, |dt| dt.timestamp_millis());
            (now_ms - since.max(midnight)).max(0)
        }
        Phase::Idle => 0,
    };
    let elapsed_ms = state.elapsed(now_ms);
    let today_ms = recorded + open_today;

    Ok(StatusReport {
        running: state.is_running(),
        elapsed_ms,
        elapsed: format_hms(elapsed_ms),
        today_ms,
        today: format_hms(today_ms),
    })
}

pub fn run<W, S, Tz>(writer: &mut W, tracker: &Tracker<S, Tz>, now: &DateTime<Tz>, json: bool) -> Result<()>
where
    W: Write,
    S: Storage,
    Tz: TimeZone,
{
    let report = status_report(tracker, now)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    let phase = if report.running { "running" } else { "paused" };
    writeln!(writer, "Timer:   {phase}")?;
    writeln!(writer, "Elapsed: {}", report.elapsed)?;
    writeln!(writer, "Today:   {}", report.today)?;
    Ok(())
}

/// Redraws the elapsed time on one line once per `tick`.
///
/// Display only: nothing is persisted. Returns immediately after one line when
/// the timer is not running. `limit` bounds the number of ticks; `None` runs
/// until the process is interrupted.
pub fn watch<W, S, Tz>(
    writer: &mut W,
    tracker: &Tracker<S, Tz>,
    clock: impl Fn() -> DateTime<Tz>,
    tick: Duration,
    limit: Option<usize>,
) -> Result<()>
where
    W: Write,
    S: Storage,
    Tz: TimeZone,
{
    if !tracker.state().is_running() {
        writeln!(writer, "{} (paused)", format_hms(tracker.elapsed(clock().timestamp_millis())))?;
        return Ok(());
    }

    let mut ticks = 0;
    loop {
        let elapsed = tracker.elapsed(clock().timestamp_millis());
        write!(writer, "\r{}", format_hms(elapsed))?;
        writer.flush()?;
        ticks += 1;
        if limit.is_some_and(|limit| ticks >= limit) {
            writeln!(writer)?;
            return Ok(());
        }
        std::thread::sleep(tick);
    }
}
