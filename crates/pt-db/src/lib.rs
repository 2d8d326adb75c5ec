//! Storage layer for the persistent timer.
//!
//! Persists the timer state, the session collection and the daily log using
//! `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! There is exactly one writer per process, so no further synchronization is
//! provided.
//!
//! # Schema
//!
//! Each record lives in one row of the `records` table, keyed by a fixed
//! identifier, with its value stored as JSON text:
//!
//! | key                         | value                                                  |
//! |-----------------------------|--------------------------------------------------------|
//! | `persistent-timer-state`    | `{"startTime":…,"accumulatedTime":…,"isRunning":…}`    |
//! | `persistent-timer-sessions` | `[{"start":…,"end":…}, …]` in insertion order          |
//! | `persistent-timer-logs`     | `{"YYYY-MM-DD": "note", …}`                            |
//!
//! `updated_at` is an ISO 8601 UTC timestamp of the last write.
//!
//! A record that is missing or fails to parse loads as its default value.
//! The row is left untouched until the next write replaces it. The log
//! record is decoded per entry, so one bad day key drops only that entry.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use pt_core::{
    DailyLog, LOGS_KEY, SESSIONS_KEY, Session, Storage, TIMER_STATE_KEY, TimerState,
    decode_daily_log,
};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A record could not be serialized for storage.
    #[error("failed to serialize record {key}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for the record layout.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Reads the raw JSON text of a record.
    pub fn get_record(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM records WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Inserts or replaces the raw JSON text of a record.
    pub fn put_record(&self, key: &str, value: &str) -> Result<(), DbError> {
        let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.conn.execute(
            "
            INSERT INTO records (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, updated_at],
        )?;
        Ok(())
    }

    fn load_json<T: DeserializeOwned + Default>(&self, key: &'static str) -> Result<T, DbError> {
        self.load_with(key, |raw| serde_json::from_str(raw))
    }

    fn load_with<T: Default>(
        &self,
        key: &'static str,
        decode: impl FnOnce(&str) -> serde_json::Result<T>,
    ) -> Result<T, DbError> {
        let Some(raw) = self.get_record(key)? else {
            return Ok(T::default());
        };
        match decode(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable record");
                Ok(T::default())
            }
        }
    }

    fn store_json<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value).map_err(|source| DbError::Serialize { key, source })?;
        self.put_record(key, &json)
    }
}

impl Storage for Database {
    type Error = DbError;

    fn load_timer_state(&self) -> Result<TimerState, DbError> {
        self.load_json(TIMER_STATE_KEY)
    }

    fn store_timer_state(&mut self, state: &TimerState) -> Result<(), DbError> {
        self.store_json(TIMER_STATE_KEY, state)
    }

    fn load_sessions(&self) -> Result<Vec<Session>, DbError> {
        self.load_json(SESSIONS_KEY)
    }

    fn store_sessions(&mut self, sessions: &[Session]) -> Result<(), DbError> {
        self.store_json(SESSIONS_KEY, sessions)
    }

    fn load_logs(&self) -> Result<DailyLog, DbError> {
        self.load_with(LOGS_KEY, decode_daily_log)
    }

    fn store_logs(&mut self, logs: &DailyLog) -> Result<(), DbError> {
        self.store_json(LOGS_KEY, logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pt_core::{DayKey, Tracker};

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");
        let mut stmt = db.conn.prepare("PRAGMA table_info(records)").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(1))
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(columns, vec!["key", "value", "updated_at"]);
    }

    #[test]
    fn missing_records_load_as_defaults() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_timer_state().unwrap(), TimerState::default());
        assert!(db.load_sessions().unwrap().is_empty());
        assert!(db.load_logs().unwrap().is_empty());
    }

    #[test]
    fn corrupt_records_load_as_defaults() {
        let db = Database::open_in_memory().unwrap();
        db.put_record(TIMER_STATE_KEY, "not json").unwrap();
        db.put_record(SESSIONS_KEY, r#"{"start":1}"#).unwrap();
        db.put_record(LOGS_KEY, "[]").unwrap();

        assert_eq!(db.load_timer_state().unwrap(), TimerState::default());
        assert!(db.load_sessions().unwrap().is_empty());
        assert!(db.load_logs().unwrap().is_empty());
    }

    #[test]
    fn records_are_stored_as_json() {
        let mut db = Database::open_in_memory().unwrap();
        db.store_timer_state(&TimerState::running(1_000, 250)).unwrap();
        db.store_sessions(&[Session { start: 1, end: 2 }]).unwrap();
        let logs = DailyLog::from([("2024-01-01".parse::<DayKey>().unwrap(), "note".to_string())]);
        db.store_logs(&logs).unwrap();

        assert_eq!(
            db.get_record(TIMER_STATE_KEY).unwrap().as_deref(),
            Some(r#"{"startTime":1000,"accumulatedTime":250,"isRunning":true}"#)
        );
        assert_eq!(
            db.get_record(SESSIONS_KEY).unwrap().as_deref(),
            Some(r#"[{"start":1,"end":2}]"#)
        );
        assert_eq!(
            db.get_record(LOGS_KEY).unwrap().as_deref(),
            Some(r#"{"2024-01-01":"note"}"#)
        );
    }

    #[test]
    fn malformed_log_key_does_not_discard_other_notes() {
        let db = Database::open_in_memory().unwrap();
        db.put_record(LOGS_KEY, r#"{"2024-01-01":"important","2024-1-2":"x"}"#)
            .unwrap();
        let mut tracker = Tracker::open(db, chrono::Utc, 0).unwrap();

        tracker
            .set_log("2024-01-03".parse().unwrap(), "new")
            .unwrap();

        let db = tracker.into_storage();
        assert_eq!(
            db.get_record(LOGS_KEY).unwrap().as_deref(),
            Some(r#"{"2024-01-01":"important","2024-01-03":"new"}"#)
        );
    }

    #[test]
    fn put_record_overwrites_existing_value() {
        let db = Database::open_in_memory().unwrap();
        db.put_record("k", "1").unwrap();
        db.put_record("k", "2").unwrap();
        assert_eq!(db.get_record("k").unwrap().as_deref(), Some("2"));
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn state_survives_reopening_the_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pt.db");

        let db = Database::open(&path).unwrap();
        let mut tracker = Tracker::open(db, chrono::Utc, 0).unwrap();
        tracker.start(1_000).unwrap();
        drop(tracker);

        let db = Database::open(&path).unwrap();
        let tracker = Tracker::open(db, chrono::Utc, 61_000).unwrap();

        assert_eq!(tracker.state(), TimerState::running(61_000, 60_000));
        assert_eq!(
            tracker.sessions().unwrap(),
            vec![Session {
                start: 1_000,
                end: 61_000
            }]
        );
    }
}
