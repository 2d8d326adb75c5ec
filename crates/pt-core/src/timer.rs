//! The stopwatch state machine.
//!
//! Transitions are pure: each takes the current [`TimerState`] by value plus
//! the current instant and returns a [`Transition`] carrying the next state
//! and, when a run was closed, the raw [`Interval`] to record. Persisting the
//! state and storing the interval is the caller's job.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::session::Interval;

/// Whether the stopwatch is currently timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running { since: i64 },
}

/// Persisted stopwatch state.
///
/// All instants are epoch milliseconds. The field names match the stored
/// JSON record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Anchor of the current run; `Some` iff running.
    pub start_time: Option<i64>,

    /// Sum of all closed runs since the last reset.
    #[serde(default)]
    pub accumulated_time: i64,

    #[serde(default)]
    pub is_running: bool,
}

/// Result of applying a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Transition {
    pub state: TimerState,

    /// The run closed by this transition, not yet split into days.
    pub closed: Option<Interval>,
}

impl Transition {
    const fn unchanged(state: TimerState) -> Self {
        Self {
            state,
            closed: None,
        }
    }
}

impl TimerState {
    /// A state anchored at `since`, with `accumulated` ms already banked.
    pub const fn running(since: i64, accumulated: i64) -> Self {
        Self {
            start_time: Some(since),
            accumulated_time: accumulated,
            is_running: true,
        }
    }

    pub const fn phase(&self) -> Phase {
        match (self.is_running, self.start_time) {
            (true, Some(since)) => Phase::Running { since },
            _ => Phase::Idle,
        }
    }

    pub const fn is_running(&self) -> bool {
        matches!(self.phase(), Phase::Running { .. })
    }

    /// Repairs a loaded state so that `is_running` implies an anchor.
    ///
    /// A running flag without an anchor becomes idle, as does an anchor
    /// outside the representable date range. A stale anchor on an idle state
    /// is dropped and negative accumulated time is clamped to zero.
    pub fn normalized(self) -> Self {
        let accumulated_time = self.accumulated_time.max(0);
        match self.phase() {
            Phase::Running { since } if DateTime::from_timestamp_millis(since).is_some() => {
                Self::running(since, accumulated_time)
            }
            _ => Self {
                start_time: None,
                accumulated_time,
                is_running: false,
            },
        }
    }

    /// Elapsed time at `now`: banked time plus the open run, if any.
    pub fn elapsed(&self, now: i64) -> i64 {
        match self.phase() {
            Phase::Running { since } => {
                self.accumulated_time.saturating_add(run_length(since, now))
            }
            Phase::Idle => self.accumulated_time,
        }
    }

    /// Opens a run at `now`. No-op when already running.
    pub fn start(self, now: i64) -> Transition {
        match self.phase() {
            Phase::Running { .. } => Transition::unchanged(self),
            Phase::Idle => Transition::unchanged(Self::running(now, self.accumulated_time)),
        }
    }

    /// Closes the current run at `now`, banking its length. No-op when idle.
    pub fn pause(self, now: i64) -> Transition {
        match self.phase() {
            Phase::Idle => Transition::unchanged(self),
            Phase::Running { since } => Transition {
                state: Self {
                    start_time: None,
                    accumulated_time: self.accumulated_time.saturating_add(run_length(since, now)),
                    is_running: false,
                },
                closed: Some(Interval::new(since, now)),
            },
        }
    }

    /// Zeroes the stopwatch. A running run is closed and recorded first.
    pub fn reset(self, now: i64) -> Transition {
        let closed = match self.phase() {
            Phase::Running { since } => Some(Interval::new(since, now)),
            Phase::Idle => None,
        };
        Transition {
            state: Self::default(),
            closed,
        }
    }

    /// Accounts for time that passed while nobody was observing the timer.
    ///
    /// A state loaded as running could not have seen a stop event while the
    /// process was down, so the whole gap counts as running time. The gap is
    /// closed as exactly one interval and a new run opens at `now`. No-op
    /// when idle.
    pub fn reconcile(self, now: i64) -> Transition {
        match self.phase() {
            Phase::Idle => Transition::unchanged(self),
            Phase::Running { since } => Transition {
                state: Self::running(
                    now,
                    self.accumulated_time.saturating_add(run_length(since, now)),
                ),
                closed: Some(Interval::new(since, now)),
            },
        }
    }
}

/// Length of a run from `since` to `now`; zero if the clock went backwards.
fn run_length(since: i64, now: i64) -> i64 {
    now.saturating_sub(since).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_704_067_200_000;
    const MINUTE: i64 = 60_000;

    #[test]
    fn start_from_idle_anchors_run() {
        let t = TimerState::default().start(T0);
        assert_eq!(t.state, TimerState::running(T0, 0));
        assert_eq!(t.closed, None);
    }

    #[test]
    fn start_while_running_is_noop() {
        let running = TimerState::running(T0, 5);
        let t = running.start(T0 + MINUTE);
        assert_eq!(t.state, running);
        assert_eq!(t.closed, None);
    }

    #[test]
    fn pause_banks_run_and_emits_interval() {
        let t = TimerState::running(T0, 10 * MINUTE).pause(T0 + 3 * MINUTE);
        assert_eq!(
            t.state,
            TimerState {
                start_time: None,
                accumulated_time: 13 * MINUTE,
                is_running: false,
            }
        );
        assert_eq!(t.closed, Some(Interval::new(T0, T0 + 3 * MINUTE)));
    }

    #[test]
    fn pause_while_idle_is_noop() {
        let t = TimerState::default().pause(T0);
        assert_eq!(t.state, TimerState::default());
        assert_eq!(t.closed, None);
    }

    #[test]
    fn pause_start_pause_accumulates_both_runs() {
        let first = TimerState::default().start(T0).state.pause(T0 + MINUTE);
        let second = first
            .state
            .start(T0 + 5 * MINUTE)
            .state
            .pause(T0 + 7 * MINUTE);

        assert_eq!(second.state.accumulated_time, 3 * MINUTE);
        assert_eq!(first.closed, Some(Interval::new(T0, T0 + MINUTE)));
        assert_eq!(
            second.closed,
            Some(Interval::new(T0 + 5 * MINUTE, T0 + 7 * MINUTE))
        );
    }

    #[test]
    fn reset_while_running_records_run() {
        let t = TimerState::running(T0, MINUTE).reset(T0 + 2 * MINUTE);
        assert_eq!(t.state, TimerState::default());
        assert_eq!(t.closed, Some(Interval::new(T0, T0 + 2 * MINUTE)));
    }

    #[test]
    fn reset_while_idle_emits_nothing() {
        let paused = TimerState {
            accumulated_time: 42 * MINUTE,
            ..TimerState::default()
        };
        let t = paused.reset(T0);
        assert_eq!(t.state, TimerState::default());
        assert_eq!(t.closed, None);
    }

    #[test]
    fn reconcile_closes_gap_and_reopens_at_now() {
        let t1 = T0 + 3 * 24 * 60 * MINUTE;
        let t = TimerState::running(T0, 7).reconcile(t1);
        assert_eq!(t.state, TimerState::running(t1, 7 + (t1 - T0)));
        assert_eq!(t.closed, Some(Interval::new(T0, t1)));
        assert_eq!(t.state.elapsed(t1), 7 + (t1 - T0));
    }

    #[test]
    fn reconcile_while_idle_is_noop() {
        let idle = TimerState {
            accumulated_time: MINUTE,
            ..TimerState::default()
        };
        assert_eq!(idle.reconcile(T0), Transition::unchanged(idle));
    }

    #[test]
    fn elapsed_includes_open_run() {
        let running = TimerState::running(T0, 30 * MINUTE);
        assert_eq!(running.elapsed(T0 + MINUTE), 31 * MINUTE);
        assert_eq!(TimerState::default().elapsed(T0), 0);
    }

    #[test]
    fn backwards_clock_banks_nothing() {
        let t = TimerState::running(T0, MINUTE).pause(T0 - MINUTE);
        assert_eq!(t.state.accumulated_time, MINUTE);
        assert_eq!(t.closed, Some(Interval::new(T0, T0 - MINUTE)));
    }

    #[test]
    fn normalized_repairs_inconsistent_states() {
        let no_anchor = TimerState {
            start_time: None,
            accumulated_time: 5,
            is_running: true,
        };
        assert_eq!(
            no_anchor.normalized(),
            TimerState {
                accumulated_time: 5,
                ..TimerState::default()
            }
        );

        let stale_anchor = TimerState {
            start_time: Some(T0),
            accumulated_time: -3,
            is_running: false,
        };
        assert_eq!(stale_anchor.normalized(), TimerState::default());
    }

    #[test]
    fn normalized_drops_unrepresentable_anchor() {
        let far_past = TimerState::running(i64::MIN, 7);
        assert_eq!(
            far_past.normalized(),
            TimerState {
                accumulated_time: 7,
                ..TimerState::default()
            }
        );
    }

    #[test]
    fn extreme_values_saturate() {
        let t = TimerState::running(i64::MIN, 0).reconcile(T0);
        assert_eq!(t.state.accumulated_time, i64::MAX);

        let t = TimerState::running(T0, i64::MAX).pause(T0 + MINUTE);
        assert_eq!(t.state.accumulated_time, i64::MAX);
        assert_eq!(TimerState::running(T0, i64::MAX).elapsed(T0 + MINUTE), i64::MAX);
    }

    #[test]
    fn serializes_with_record_field_names() {
        let json = serde_json::to_string(&TimerState::running(T0, 5)).unwrap();
        assert_eq!(
            json,
            r#"{"startTime":1704067200000,"accumulatedTime":5,"isRunning":true}"#
        );
        let idle: TimerState =
            serde_json::from_str(r#"{"startTime":null,"accumulatedTime":0,"isRunning":false}"#)
                .unwrap();
        assert_eq!(idle, TimerState::default());
    }
}
