use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use crate::state::Phase;
use crate::surface::InteractionKind;

/// Every state change in the system produces an Event.
/// Hosts drain them after each call; the CLI prints them as JSON lines.
///
/// `at_ms` is host time in milliseconds (virtual or wall clock, whichever
/// the host drives the state with).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ListenersAttached {
        at_ms: u64,
    },
    ListenersDetached {
        at_ms: u64,
    },
    TimerStarted {
        remaining_ms: u64,
        at_ms: u64,
    },
    TimerStopped {
        remaining_ms: u64,
        at_ms: u64,
    },
    TimerTicked {
        remaining_ms: u64,
        at_ms: u64,
    },
    TimerExpired {
        at_ms: u64,
    },
    UserInteracted {
        kind: InteractionKind,
        at_ms: u64,
    },
    /// Listener reattachment was deferred to the next frame.
    FrameRequested {
        at_ms: u64,
    },
    NavigationStarted {
        at_ms: u64,
    },
    NavigationCompleted {
        at_ms: u64,
    },
    Unmounted {
        at_ms: u64,
    },
    StateSnapshot {
        phase: Phase,
        has_interacted: bool,
        listeners_active: bool,
        timer_running: bool,
        timer_disabled: bool,
        remaining_ms: u64,
        at_ms: u64,
    },
}

impl Event {
    /// Host time the event was recorded at.
    pub fn at_ms(&self) -> u64 {
        match self {
            Event::ListenersAttached { at_ms }
            | Event::ListenersDetached { at_ms }
            | Event::TimerStarted { at_ms, .. }
            | Event::TimerStopped { at_ms, .. }
            | Event::TimerTicked { at_ms, .. }
            | Event::TimerExpired { at_ms }
            | Event::UserInteracted { at_ms, .. }
            | Event::FrameRequested { at_ms }
            | Event::NavigationStarted { at_ms }
            | Event::NavigationCompleted { at_ms }
            | Event::Unmounted { at_ms }
            | Event::StateSnapshot { at_ms, .. } => *at_ms,
        }
    }
}

/// Write `events` as JSON lines, one event per line.
pub fn write_json_lines<W: Write>(mut out: W, events: &[Event]) -> Result<()> {
    for event in events {
        serde_json::to_writer(&mut out, event)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
