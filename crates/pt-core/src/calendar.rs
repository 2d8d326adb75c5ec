//! Calendar heat-map model.

use chrono::{Datelike, Duration, NaiveDate};

use crate::totals::DailyTotals;
use crate::types::{DayKey, Month};

const HOUR_MS: i64 = 3_600_000;

/// How much time was tracked on a day, bucketed for shading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Intensity {
    None,
    /// Up to one hour.
    Low,
    /// More than one and up to four hours.
    Medium,
    /// More than four and up to eight hours.
    High,
    /// More than eight hours.
    VeryHigh,
}

impl Intensity {
    pub const fn from_ms(ms: i64) -> Self {
        if ms <= 0 {
            Self::None
        } else if ms > 8 * HOUR_MS {
            Self::VeryHigh
        } else if ms > 4 * HOUR_MS {
            Self::High
        } else if ms > HOUR_MS {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Single-character shade for terminal rendering.
    pub const fn glyph(self) -> char {
        match self {
            Self::None => ' ',
            Self::Low => '░',
            Self::Medium => '▒',
            Self::High => '▓',
            Self::VeryHigh => '█',
        }
    }
}

/// One day in the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    pub day: DayKey,
    /// False for the leading and trailing days borrowed from adjacent months.
    pub in_month: bool,
    pub total_ms: i64,
    pub intensity: Intensity,
}

/// A Sunday-first week of cells.
pub type Week = [CalendarCell; 7];

/// Builds the weeks covering `month`, padded to whole Sunday-to-Saturday rows.
///
/// Returns `None` if the month cannot be represented.
pub fn month_grid(month: Month, totals: &DailyTotals) -> Option<Vec<Week>> {
    let first = month.first_day()?;
    let last = last_day_of_month(first)?;
    let grid_start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
    let grid_end = last + Duration::days(i64::from(6 - last.weekday().num_days_from_sunday()));

    let mut weeks = Vec::new();
    let mut day = grid_start;
    while day <= grid_end {
        let mut cells = Vec::with_capacity(7);
        for _ in 0..7 {
            cells.push(cell(day, first.month(), totals));
            day = day.succ_opt()?;
        }
        weeks.push(cells.try_into().ok()?);
    }
    Some(weeks)
}

fn cell(date: NaiveDate, month: u32, totals: &DailyTotals) -> CalendarCell {
    let day = DayKey::new(date);
    let total_ms = totals.get(&day).copied().unwrap_or(0);
    CalendarCell {
        day,
        in_month: date.month() == month,
        total_ms,
        intensity: Intensity::from_ms(total_ms),
    }
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}
