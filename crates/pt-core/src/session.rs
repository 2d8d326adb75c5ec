//! Sessions and day splitting.
//!
//! A run of the timer produces a raw [`Interval`] that may cross any number of
//! local midnights (the process may have been closed for days while the timer
//! was running). Before storage it is cut into [`Session`]s, each of which
//! lies entirely within one local calendar day, so that grouping sessions by
//! the day of their start attributes every millisecond to the right day.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::types::DayKey;

/// A raw closed interval emitted when a run ends.
///
/// May span several days, and may be empty or inverted when the wall clock
/// moved backwards. [`split_across_days`] discards the latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

/// A stored, single-day slice of tracked time in epoch milliseconds.
///
/// `end > start`, and both ends fall on the same local calendar day (with
/// `end` allowed to be exactly the following midnight).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub start: i64,
    pub end: i64,
}

impl Session {
    pub const fn duration_ms(&self) -> i64 {
        self.end - self.start
    }

    /// The local day this session is attributed to.
    pub fn day<Tz: TimeZone>(&self, tz: &Tz) -> Option<DayKey> {
        DayKey::from_millis(self.start, tz)
    }
}

/// Splits an interval at every local midnight it crosses.
///
/// Pieces are contiguous (`pieces[i].end == pieces[i + 1].start`) and their
/// durations sum to `end - start`. Returns an empty vector when
/// `end <= start`.
pub fn split_across_days<Tz: TimeZone>(interval: Interval, tz: &Tz) -> Vec<Session> {
    let Interval { start, end } = interval;
    if end <= start {
        return Vec::new();
    }

    let mut sessions = Vec::new();
    let mut cursor = start;
    while cursor < end {
        // A boundary that fails to advance would loop forever; close out the
        // remainder in one piece instead.
        let boundary = next_local_midnight(cursor, tz)
            .filter(|&boundary| boundary > cursor)
            .unwrap_or(end);
        let piece_end = end.min(boundary);
        if piece_end > cursor {
            sessions.push(Session {
                start: cursor,
                end: piece_end,
            });
        }
        cursor = piece_end;
    }
    sessions
}

/// Returns the instant of the first local midnight after `ms`'s local day.
fn next_local_midnight<Tz: TimeZone>(ms: i64, tz: &Tz) -> Option<i64> {
    let local = DateTime::from_timestamp_millis(ms)?.with_timezone(tz);
    let next_day = local.date_naive().succ_opt()?;
    local_midnight(next_day, tz).map(|dt| dt.timestamp_millis())
}

/// Resolves local midnight of `date` to an instant.
///
/// Ambiguous midnights (DST fall-back) resolve to the earlier instant. A
/// midnight skipped by a DST spring-forward resolves to 01:00 local.
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&date.and_time(NaiveTime::MIN)) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt),
        LocalResult::None => {
            let one_am = NaiveTime::from_hms_opt(1, 0, 0)?;
            tz.from_local_datetime(&date.and_time(one_am)).earliest()
        }
    }
}
