//! Daily log commands.
//!
//! `edit` treats each line read from stdin as more typing in the day's note.
//! Saving is debounced: every line reschedules the save, which only runs once
//! input has been quiet for the configured delay, and once more at end of
//! input if an edit is still pending.

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use pt_core::{DayKey, Debouncer, Storage, Tracker};

pub fn show<W, S, Tz>(writer: &mut W, tracker: &Tracker<S, Tz>, day: DayKey) -> Result<()>
where
    W: Write,
    S: Storage,
    Tz: TimeZone,
{
    let logs = tracker.logs()?;
    match logs.get(&day) {
        Some(note) => writeln!(writer, "{note}")?,
        None => writeln!(writer, "No log for {day}.")?,
    }
    Ok(())
}

pub fn set<W, S, Tz>(writer: &mut W, tracker: &mut Tracker<S, Tz>, day: DayKey, text: &str) -> Result<()>
where
    W: Write,
    S: Storage,
    Tz: TimeZone,
{
    tracker.set_log(day, text)?;
    if text.is_empty() {
        writeln!(writer, "Cleared log for {day}.")?;
    } else {
        writeln!(writer, "Saved log for {day}.")?;
    }
    Ok(())
}

/// Appends lines from `input` to the note for `day`, with debounced saves.
///
/// Returns the number of saves performed.
pub fn edit<R, W, S, Tz>(
    input: R,
    writer: &mut W,
    tracker: &mut Tracker<S, Tz>,
    day: DayKey,
    delay_ms: u64,
) -> Result<usize>
where
    R: BufRead + Send + 'static,
    W: Write,
    S: Storage,
    Tz: TimeZone,
{
    let mut note = tracker.logs()?.remove(&day).unwrap_or_default();
    let mut debouncer = Debouncer::new(delay_ms);
    let mut saves = 0;

    let (tx, rx) = mpsc::channel::<String>();
    let reader = thread::spawn(move || -> std::io::Result<()> {
        for line in input.lines() {
            if tx.send(line?).is_err() {
                break;
            }
        }
        Ok(())
    });

    loop {
        let received = match debouncer.deadline() {
            Some(due_at) => {
                let wait = u64::try_from(due_at - now_ms()).unwrap_or(0);
                rx.recv_timeout(Duration::from_millis(wait))
            }
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(line) => {
                if !note.is_empty() {
                    note.push('\n');
                }
                note.push_str(&line);
                if debouncer.schedule(note.clone(), now_ms()).is_some() {
                    tracing::trace!("rescheduled pending log save");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Some(text) = debouncer.poll(now_ms()) {
                    save(writer, tracker, day, &text)?;
                    saves += 1;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(text) = debouncer.flush() {
                    save(writer, tracker, day, &text)?;
                    saves += 1;
                }
                break;
            }
        }
    }

    reader
        .join()
        .map_err(|_| anyhow::anyhow!("stdin reader panicked"))?
        .context("failed to read log input")?;
    Ok(saves)
}

fn save<W, S, Tz>(writer: &mut W, tracker: &mut Tracker<S, Tz>, day: DayKey, text: &str) -> Result<()>
where
    W: Write,
    S: Storage,
    Tz: TimeZone,
{
    tracker.set_log(day, text)?;
    writeln!(writer, "Saved log for {day}.")?;
    Ok(())
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pt_core::MemoryStorage;

    fn key(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn set_then_show_round_trips() {
        let mut tracker = Tracker::open(MemoryStorage::new(), Utc, 0).unwrap();
        let mut output = Vec::new();
        set(&mut output, &mut tracker, key("2024-01-01"), "wrote spec").unwrap();
        show(&mut output, &tracker, key("2024-01-01")).unwrap();
        show(&mut output, &tracker, key("2024-01-02")).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Saved log for 2024-01-01.\nwrote spec\nNo log for 2024-01-02.\n"
        );
    }

    #[test]
    fn set_empty_clears_entry() {
        let mut tracker = Tracker::open(MemoryStorage::new(), Utc, 0).unwrap();
        let mut output = Vec::new();
        set(&mut output, &mut tracker, key("2024-01-01"), "draft").unwrap();
        set(&mut output, &mut tracker, key("2024-01-01"), "").unwrap();
        assert!(tracker.logs().unwrap().is_empty());
    }

    #[test]
    fn edit_appends_to_existing_note() {
        let mut tracker = Tracker::open(MemoryStorage::new(), Utc, 0).unwrap();
        tracker.set_log(key("2024-01-01"), "morning").unwrap();

        let input = Cursor::new(b"afternoon\nevening\n".to_vec());
        let mut output = Vec::new();
        let saves = edit(input, &mut output, &mut tracker, key("2024-01-01"), 60_000).unwrap();

        // A long delay means only the final flush at end of input saves.
        assert_eq!(saves, 1);
        assert_eq!(
            tracker.logs().unwrap()[&key("2024-01-01")],
            "morning\nafternoon\nevening"
        );
    }

    #[test]
    fn edit_without_input_saves_nothing() {
        let mut tracker = Tracker::open(MemoryStorage::new(), Utc, 0).unwrap();
        let mut output = Vec::new();
        let saves = edit(Cursor::new(Vec::new()), &mut output, &mut tracker, key("2024-01-01"), 10).unwrap();
        assert_eq!(saves, 0);
        assert!(output.is_empty());
        assert!(tracker.logs().unwrap().is_empty());
    }
}
