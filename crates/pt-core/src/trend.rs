//! Recent-days trend series for the time chart.

use chrono::{Days, NaiveDate};

use crate::totals::DailyTotals;
use crate::types::DayKey;

/// Default window length in days, including today.
pub const DEFAULT_TREND_DAYS: u32 = 30;

/// Lower bound for the chart's value axis so a quiet month is not scaled up.
pub const MIN_SCALE_MS: i64 = 3_600_000;

/// One plotted day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    pub day: DayKey,
    pub total_ms: i64,
}

/// Days with tracked time in the window ending at `today`, ascending.
///
/// When the window has any data but nothing for today, today is appended
/// with zero so the chart always reaches the present. An empty window yields
/// an empty series.
pub fn trend_series(totals: &DailyTotals, today: NaiveDate, days: u32) -> Vec<TrendPoint> {
    let days = days.max(1);
    // Windows reaching past the earliest representable date start there.
    let window_start = DayKey::new(
        today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .unwrap_or(NaiveDate::MIN),
    );
    let today = DayKey::new(today);

    let mut points: Vec<TrendPoint> = totals
        .range(window_start..=today)
        .map(|(&day, &total_ms)| TrendPoint { day, total_ms })
        .collect();

    if !points.is_empty() && points.last().is_none_or(|p| p.day != today) {
        points.push(TrendPoint {
            day: today,
            total_ms: 0,
        });
    }
    points
}

/// The value-axis maximum: the largest point, but never below one hour.
pub fn scale_max(points: &[TrendPoint]) -> i64 {
    points
        .iter()
        .map(|p| p.total_ms)
        .max()
        .unwrap_or(0)
        .max(MIN_SCALE_MS)
}
