//! Countdown timer implementation.
//!
//! The timer is a host-driven state machine. It does not use internal
//! threads or sleeps - it only remembers when its next tick is due, and the
//! caller is responsible for calling `tick()` once that instant has passed.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Idle | Expired)
//! Disabled (terminal, fixed at construction)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = CountdownTimer::new(3_000, 1_000);
//! timer.start(now);
//! // Whenever timer.next_tick_at() <= now:
//! timer.tick(now); // Returns Some(Event::TimerExpired) on the last tick
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Not scheduled. `start()` resumes from the current remaining time.
    Idle,
    Running,
    /// Remaining time reached zero. Only `reset()` leaves this state.
    Expired,
    /// Configured with a zero duration: never starts, ticks or expires.
    Disabled,
}

/// Countdown with a fixed tick cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownTimer {
    state: TimerState,
    /// Configured total duration in milliseconds.
    duration_ms: u64,
    /// Amount subtracted per tick, and the interval between ticks.
    tick_ms: u64,
    remaining_ms: u64,
    /// Host time at which the pending tick is due. `None` means no tick is
    /// scheduled, so stopping the timer is just clearing this.
    next_tick_at_ms: Option<u64>,
}

impl CountdownTimer {
    /// Create a timer for `duration_ms`. A zero duration disables it for
    /// good.
    pub fn new(duration_ms: u64, tick_ms: u64) -> Self {
        let state = if duration_ms == 0 {
            TimerState::Disabled
        } else {
            TimerState::Idle
        };
        Self {
            state,
            duration_ms,
            tick_ms: tick_ms.max(1),
            remaining_ms: duration_ms,
            next_tick_at_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn next_tick_at(&self) -> Option<u64> {
        self.next_tick_at_ms
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.state == TimerState::Expired
    }

    pub fn is_disabled(&self) -> bool {
        self.state == TimerState::Disabled
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Schedule the next tick one cadence after `now_ms`.
    ///
    /// No-op when disabled, expired, or already running.
    pub fn start(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Running;
                self.next_tick_at_ms = Some(now_ms.saturating_add(self.tick_ms));
                debug!(remaining_ms = self.remaining_ms, "countdown started");
                Some(Event::TimerStarted {
                    remaining_ms: self.remaining_ms,
                    at_ms: now_ms,
                })
            }
            TimerState::Running | TimerState::Expired | TimerState::Disabled => None,
        }
    }

    /// Cancel the pending tick. Remaining time is kept.
    pub fn stop(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Idle;
                self.next_tick_at_ms = None;
                debug!(remaining_ms = self.remaining_ms, "countdown stopped");
                Some(Event::TimerStopped {
                    remaining_ms: self.remaining_ms,
                    at_ms: now_ms,
                })
            }
            _ => None,
        }
    }

    /// Back to the configured duration, not scheduled.
    pub fn reset(&mut self) {
        if self.state == TimerState::Disabled {
            return;
        }
        self.state = TimerState::Idle;
        self.remaining_ms = self.duration_ms;
        self.next_tick_at_ms = None;
    }

    /// Fire the pending tick if it is due at `now_ms`.
    ///
    /// Handles at most one tick per call so the host can interleave ticks
    /// with other deadlines; call again while `next_tick_at() <= now`.
    /// Returns `TimerTicked` for an intermediate tick and `TimerExpired`
    /// (exactly once per run) when the remaining time hits zero.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        let due = self.next_tick_at_ms?;
        if due > now_ms {
            return None;
        }

        self.remaining_ms = self.remaining_ms.saturating_sub(self.tick_ms);
        if self.remaining_ms == 0 {
            self.state = TimerState::Expired;
            self.next_tick_at_ms = None;
            debug!(at_ms = due, "countdown expired");
            return Some(Event::TimerExpired { at_ms: due });
        }

        // Keep the cadence anchored to the schedule, not to when the host
        // got around to calling us.
        self.next_tick_at_ms = Some(due.saturating_add(self.tick_ms));
        Some(Event::TimerTicked {
            remaining_ms: self.remaining_ms,
            at_ms: due,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run_until_idle(timer: &mut CountdownTimer, until_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(due) = timer.next_tick_at() {
            if due > until_ms {
                break;
            }
            events.extend(timer.tick(due));
        }
        events
    }

    #[test]
    fn start_stop_start_resumes_remaining() {
        let mut timer = CountdownTimer::new(5_000, 1_000);
        assert_eq!(timer.state(), TimerState::Idle);

        assert!(timer.start(0).is_some());
        assert!(timer.start(0).is_none(), "second start must not reschedule");
        run_until_idle(&mut timer, 2_000);
        assert_eq!(timer.remaining_ms(), 3_000);

        assert!(timer.stop(2_500).is_some());
        assert!(timer.stop(2_500).is_none());
        assert_eq!(timer.next_tick_at(), None);
        assert_eq!(timer.remaining_ms(), 3_000);

        timer.start(10_000);
        assert_eq!(timer.next_tick_at(), Some(11_000));
    }

    #[test]
    fn expires_exactly_once() {
        let mut timer = CountdownTimer::new(3_000, 1_000);
        timer.start(0);

        let events = run_until_idle(&mut timer, 60_000);
        let expiries = events
            .iter()
            .filter(|e| matches!(e, Event::TimerExpired { .. }))
            .count();
        assert_eq!(expiries, 1);
        assert_eq!(events.last(), Some(&Event::TimerExpired { at_ms: 3_000 }));
        assert!(timer.is_expired());

        assert!(timer.start(60_000).is_none());
        assert!(timer.tick(120_000).is_none());
    }

    #[test]
    fn disabled_timer_never_runs() {
        let mut timer = CountdownTimer::new(0, 1_000);
        assert!(timer.is_disabled());
        assert!(timer.start(0).is_none());
        assert!(timer.tick(1_000_000).is_none());
        timer.reset();
        assert!(timer.is_disabled());
        assert_eq!(timer.next_tick_at(), None);
    }

    #[test]
    fn stopped_timer_ignores_late_tick() {
        let mut timer = CountdownTimer::new(2_000, 1_000);
        timer.start(0);
        timer.stop(500);
        assert!(timer.tick(1_000).is_none());
        assert_eq!(timer.remaining_ms(), 2_000);
    }

    #[test]
    fn duration_not_a_multiple_of_cadence_still_expires() {
        let mut timer = CountdownTimer::new(2_500, 1_000);
        timer.start(0);
        let events = run_until_idle(&mut timer, 10_000);
        assert_eq!(events.last(), Some(&Event::TimerExpired { at_ms: 3_000 }));
    }

    #[test]
    fn reset_restores_duration() {
        let mut timer = CountdownTimer::new(2_000, 1_000);
        timer.start(0);
        run_until_idle(&mut timer, 5_000);
        assert!(timer.is_expired());

        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_ms(), 2_000);
        assert!(timer.start(5_000).is_some());
    }

    proptest! {
        #[test]
        fn expiry_lands_on_first_tick_covering_duration(
            seconds in 1u64..120,
            start in 0u64..1_000_000,
        ) {
            let duration = seconds * 1_000;
            let mut timer = CountdownTimer::new(duration, 1_000);
            timer.start(start);

            let events = run_until_idle(&mut timer, start + duration * 2);
            prop_assert_eq!(events.len() as u64, seconds);
            prop_assert_eq!(
                events.last(),
                Some(&Event::TimerExpired { at_ms: start + duration })
            );
        }
    }
}
