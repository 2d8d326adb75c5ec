//! The tracker service: timer transitions wired to storage.
//!
//! [`Tracker`] owns the current [`TimerState`] and a [`Storage`]
//! implementation. Each operation applies a pure transition from
//! [`crate::timer`], appends any closed run to the session collection (split
//! at local midnights), persists the new state if it changed, and notifies
//! session observers.

use std::collections::HashMap;
use std::fmt;

use chrono::TimeZone;

use crate::export::{DailyLog, decode_daily_log};
use crate::session::{Interval, Session, split_across_days};
use crate::timer::{TimerState, Transition};
use crate::totals::{DailyTotals, daily_totals};
use crate::types::DayKey;

/// Record key of the persisted [`TimerState`].
pub const TIMER_STATE_KEY: &str = "persistent-timer-state";
/// Record key of the session collection.
pub const SESSIONS_KEY: &str = "persistent-timer-sessions";
/// Record key of the daily log.
pub const LOGS_KEY: &str = "persistent-timer-logs";

/// Persistence for the three tracker records.
///
/// Loads must not fail on missing or corrupt data: implementations return
/// the default value instead and reserve errors for the storage medium
/// itself.
pub trait Storage {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load_timer_state(&self) -> Result<TimerState, Self::Error>;
    fn store_timer_state(&mut self, state: &TimerState) -> Result<(), Self::Error>;

    /// Sessions in insertion order.
    fn load_sessions(&self) -> Result<Vec<Session>, Self::Error>;
    fn store_sessions(&mut self, sessions: &[Session]) -> Result<(), Self::Error>;

    fn load_logs(&self) -> Result<DailyLog, Self::Error>;
    fn store_logs(&mut self, logs: &DailyLog) -> Result<(), Self::Error>;
}

/// Splits `interval` at local midnights and appends the pieces to storage.
///
/// Returns the full updated collection. Empty or inverted intervals add
/// nothing.
pub fn add_session<S: Storage, Tz: TimeZone>(
    storage: &mut S,
    interval: Interval,
    tz: &Tz,
) -> Result<Vec<Session>, S::Error> {
    let mut sessions = storage.load_sessions()?;
    let pieces = split_across_days(interval, tz);
    if pieces.is_empty() {
        tracing::debug!(?interval, "discarding empty interval");
        return Ok(sessions);
    }
    tracing::debug!(?interval, pieces = pieces.len(), "recording sessions");
    sessions.extend(pieces);
    storage.store_sessions(&sessions)?;
    Ok(sessions)
}

/// Callback invoked with the full session collection after it changes.
pub type SessionObserver = Box<dyn FnMut(&[Session])>;

/// Stopwatch bound to persistent storage.
pub struct Tracker<S, Tz> {
    storage: S,
    tz: Tz,
    state: TimerState,
    observers: Vec<SessionObserver>,
}

impl<S, Tz: fmt::Debug> fmt::Debug for Tracker<S, Tz> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("tz", &self.tz)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl<S: Storage, Tz: TimeZone> Tracker<S, Tz> {
    /// Loads the persisted state without reconciling it.
    ///
    /// Register observers, then call [`Tracker::reconcile`].
    pub fn load(mut storage: S, tz: Tz) -> Result<Self, S::Error> {
        let loaded = storage.load_timer_state()?;
        let state = loaded.normalized();
        if state != loaded {
            tracing::warn!(?loaded, ?state, "repaired inconsistent timer state");
            storage.store_timer_state(&state)?;
        }
        Ok(Self {
            storage,
            tz,
            state,
            observers: Vec::new(),
        })
    }

    /// Loads the persisted state and reconciles it at `now`.
    pub fn open(storage: S, tz: Tz, now: i64) -> Result<Self, S::Error> {
        let mut tracker = Self::load(storage, tz)?;
        tracker.reconcile(now)?;
        Ok(tracker)
    }

    /// Registers a callback for session collection changes.
    pub fn on_sessions_changed(&mut self, observer: impl FnMut(&[Session]) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Credits the unobserved gap of a run left open by a previous process.
    pub fn reconcile(&mut self, now: i64) -> Result<TimerState, S::Error> {
        let transition = self.state.reconcile(now);
        if let Some(gap) = transition.closed {
            tracing::info!(
                since = gap.start,
                gap_ms = gap.end - gap.start,
                "reconciled run left open while not observed"
            );
        }
        self.apply(transition)
    }

    pub fn start(&mut self, now: i64) -> Result<TimerState, S::Error> {
        let transition = self.state.start(now);
        self.apply(transition)
    }

    pub fn pause(&mut self, now: i64) -> Result<TimerState, S::Error> {
        let transition = self.state.pause(now);
        self.apply(transition)
    }

    pub fn reset(&mut self, now: i64) -> Result<TimerState, S::Error> {
        let transition = self.state.reset(now);
        self.apply(transition)
    }

    fn apply(&mut self, transition: Transition) -> Result<TimerState, S::Error> {
        if let Some(interval) = transition.closed {
            let sessions = add_session(&mut self.storage, interval, &self.tz)?;
            for observer in &mut self.observers {
                observer(&sessions);
            }
        }
        if transition.state != self.state {
            self.storage.store_timer_state(&transition.state)?;
            self.state = transition.state;
        }
        Ok(self.state)
    }

    pub const fn state(&self) -> TimerState {
        self.state
    }

    pub fn elapsed(&self, now: i64) -> i64 {
        self.state.elapsed(now)
    }

    pub const fn tz(&self) -> &Tz {
        &self.tz
    }

    pub fn sessions(&self) -> Result<Vec<Session>, S::Error> {
        self.storage.load_sessions()
    }

    pub fn daily_totals(&self) -> Result<DailyTotals, S::Error> {
        Ok(daily_totals(&self.sessions()?, &self.tz))
    }

    pub fn logs(&self) -> Result<DailyLog, S::Error> {
        self.storage.load_logs()
    }

    /// Overwrites the note for `day`. Empty text removes the entry.
    pub fn set_log(&mut self, day: DayKey, text: &str) -> Result<DailyLog, S::Error> {
        let mut logs = self.storage.load_logs()?;
        if text.is_empty() {
            logs.remove(&day);
        } else {
            logs.insert(day, text.to_string());
        }
        self.storage.store_logs(&logs)?;
        tracing::debug!(%day, chars = text.chars().count(), "saved log entry");
        Ok(logs)
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

/// In-memory [`Storage`], keyed like the persistent records.
///
/// Values are kept as JSON text so that corrupt records can be simulated.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    records: HashMap<&'static str, String>,
}

/// Error type for [`MemoryStorage`]; only serialization can fail.
#[derive(Debug, thiserror::Error)]
#[error("failed to serialize record: {0}")]
pub struct MemoryStorageError(#[from] serde_json::Error);

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a raw record, bypassing serialization.
    pub fn put_raw(&mut self, key: &'static str, value: impl Into<String>) {
        self.records.insert(key, value.into());
    }

    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }

    fn load<T: Default>(
        &self,
        key: &str,
        decode: impl FnOnce(&str) -> serde_json::Result<T>,
    ) -> T {
        self.get_raw(key)
            .and_then(|raw| decode(raw).ok())
            .unwrap_or_default()
    }

    fn store<T: serde::Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), MemoryStorageError> {
        self.records.insert(key, serde_json::to_string(value)?);
        Ok(())
    }
}

impl Storage for MemoryStorage {
    type Error = MemoryStorageError;

    fn load_timer_state(&self) -> Result<TimerState, Self::Error> {
        Ok(self.load(TIMER_STATE_KEY, |raw| serde_json::from_str(raw)))
    }

    fn store_timer_state(&mut self, state: &TimerState) -> Result<(), Self::Error> {
        self.store(TIMER_STATE_KEY, state)
    }

    fn load_sessions(&self) -> Result<Vec<Session>, Self::Error> {
        Ok(self.load(SESSIONS_KEY, |raw| serde_json::from_str(raw)))
    }

    fn store_sessions(&mut self, sessions: &[Session]) -> Result<(), Self::Error> {
        self.store(SESSIONS_KEY, sessions)
    }

    fn load_logs(&self) -> Result<DailyLog, Self::Error> {
        Ok(self.load(LOGS_KEY, decode_daily_log))
    }

    fn store_logs(&mut self, logs: &DailyLog) -> Result<(), Self::Error> {
        self.store(LOGS_KEY, logs)
    }
}
