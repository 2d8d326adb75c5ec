//! Per-day totals derived from the session collection.

use std::collections::BTreeMap;

use chrono::TimeZone;

use crate::session::Session;
use crate::types::DayKey;

/// Tracked milliseconds per local day, ascending by day.
pub type DailyTotals = BTreeMap<DayKey, i64>;

/// Sums session durations grouped by the local day of each session's start.
///
/// Sessions never cross a local midnight, so the grouping is exact. Sessions
/// whose start cannot be represented as a date are skipped.
pub fn daily_totals<Tz: TimeZone>(sessions: &[Session], tz: &Tz) -> DailyTotals {
    let mut totals = DailyTotals::new();
    for session in sessions {
        let Some(day) = session.day(tz) else {
            tracing::debug!(start = session.start, "skipping session outside date range");
            continue;
        };
        *totals.entry(day).or_insert(0) += session.duration_ms();
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{FixedOffset, NaiveDateTime};

    use crate::session::{Interval, split_across_days};

    fn at(tz: &FixedOffset, s: &str) -> i64 {
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap();
        tz.from_local_datetime(&naive).unwrap().timestamp_millis()
    }

    fn key(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn run_across_midnight_is_attributed_to_both_days() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let start = at(&tz, "2024-01-01T23:00:00");
        let end = at(&tz, "2024-01-02T01:00:00");
        let sessions = split_across_days(Interval::new(start, end), &tz);

        let totals = daily_totals(&sessions, &tz);

        assert_eq!(
            totals,
            DailyTotals::from([(key("2024-01-01"), 3_600_000), (key("2024-01-02"), 3_600_000)])
        );
    }

    #[test]
    fn same_day_sessions_are_summed_regardless_of_order() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let sessions = [
            Session {
                start: at(&tz, "2024-05-02T10:00:00"),
                end: at(&tz, "2024-05-02T10:30:00"),
            },
            Session {
                start: at(&tz, "2024-05-01T08:00:00"),
                end: at(&tz, "2024-05-01T09:00:00"),
            },
            Session {
                start: at(&tz, "2024-05-02T14:00:00"),
                end: at(&tz, "2024-05-02T14:15:00"),
            },
        ];

        let totals = daily_totals(&sessions, &tz);

        assert_eq!(totals[&key("2024-05-01")], 3_600_000);
        assert_eq!(totals[&key("2024-05-02")], 45 * 60_000);
        let days: Vec<String> = totals.keys().map(ToString::to_string).collect();
        assert_eq!(days, ["2024-05-01", "2024-05-02"]);
    }

    #[test]
    fn derivation_is_repeatable() {
        let tz = FixedOffset::west_opt(7 * 3600).unwrap();
        let sessions = split_across_days(
            Interval::new(
                at(&tz, "2024-07-01T20:00:00"),
                at(&tz, "2024-07-04T03:00:00"),
            ),
            &tz,
        );
        assert_eq!(daily_totals(&sessions, &tz), daily_totals(&sessions, &tz));
    }

    #[test]
    fn no_sessions_means_no_totals() {
        assert!(daily_totals(&[], &chrono::Utc).is_empty());
    }
}
