//! A cancellable one-shot delayed task, for saving text after input settles.
//!
//! The scheduler holds at most one pending task. Scheduling replaces any
//! pending task and restarts the delay, so only the last edit in a burst is
//! ever executed. Time is passed in explicitly as epoch milliseconds.

/// Default settle delay before a log edit is saved.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending<T> {
    due_at: i64,
    task: T,
}

/// Delayed-task scheduler with last-write-wins semantics.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: i64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms: i64::try_from(delay_ms).unwrap_or(i64::MAX),
            pending: None,
        }
    }

    /// Schedules `task` to become due at `now + delay`.
    ///
    /// Returns the task that was cancelled to make room, if any.
    pub fn schedule(&mut self, task: T, now: i64) -> Option<T> {
        let due_at = now.saturating_add(self.delay_ms);
        self.pending
            .replace(Pending { due_at, task })
            .map(|cancelled| cancelled.task)
    }

    /// Takes the pending task if its delay has elapsed at `now`.
    pub fn poll(&mut self, now: i64) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due_at) {
            self.pending.take().map(|p| p.task)
        } else {
            None
        }
    }

    /// Drops the pending task without running it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.task)
    }

    /// Takes the pending task regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.cancel()
    }

    /// When the pending task becomes due, if there is one.
    pub fn deadline(&self) -> Option<i64> {
        self.pending.as_ref().map(|p| p.due_at)
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_fires_only_after_delay() {
        let mut debouncer = Debouncer::new(500);
        assert_eq!(debouncer.schedule("a", 1_000), None);
        assert_eq!(debouncer.deadline(), Some(1_500));
        assert_eq!(debouncer.poll(1_499), None);
        assert_eq!(debouncer.poll(1_500), Some("a"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(5_000), None);
    }

    #[test]
    fn new_edit_cancels_and_reschedules() {
        let mut debouncer = Debouncer::new(500);
        debouncer.schedule("draft", 1_000);
        assert_eq!(debouncer.schedule("final", 1_400), Some("draft"));

        // The first deadline has passed but the task was rescheduled.
        assert_eq!(debouncer.poll(1_600), None);
        assert_eq!(debouncer.poll(1_900), Some("final"));
    }

    #[test]
    fn cancel_drops_pending_task() {
        let mut debouncer = Debouncer::new(500);
        debouncer.schedule(1, 0);
        assert_eq!(debouncer.cancel(), Some(1));
        assert_eq!(debouncer.poll(10_000), None);
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn flush_ignores_deadline() {
        let mut debouncer: Debouncer<String> = Debouncer::default();
        debouncer.schedule("note".to_string(), 0);
        assert_eq!(debouncer.flush().as_deref(), Some("note"));
        assert_eq!(debouncer.flush(), None);
    }
}
