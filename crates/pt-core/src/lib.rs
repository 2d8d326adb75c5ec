//! Core domain logic for the persistent timer.
//!
//! This crate contains the fundamental types and logic for:
//! - Timer: the start/pause/reset/reconcile state machine
//! - Sessions: splitting runs at local midnights and deriving daily totals
//! - Views: calendar heat-map, recent trend, CSV export
//! - Tracker: binding the state machine to a [`Storage`] implementation

pub mod calendar;
pub mod debounce;
pub mod export;
pub mod format;
pub mod session;
pub mod timer;
mod totals;
pub mod tracker;
pub mod trend;
mod types;

pub use calendar::{CalendarCell, Intensity, month_grid};
pub use debounce::Debouncer;
pub use export::{DailyLog, decode_daily_log, export_csv, tracked_days};
pub use format::{format_hms, format_minutes};
pub use session::{Interval, Session, split_across_days};
pub use timer::{Phase, TimerState, Transition};
pub use totals::{DailyTotals, daily_totals};
pub use tracker::{
    LOGS_KEY, MemoryStorage, SESSIONS_KEY, Storage, TIMER_STATE_KEY, Tracker, add_session,
};
pub use trend::{TrendPoint, trend_series};
pub use types::{DayKey, Month, ValidationError};
