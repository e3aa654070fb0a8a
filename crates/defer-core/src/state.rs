//! Interaction state orchestration.
//!
//! [`InteractionState`] owns the three components (listener tracker,
//! countdown timer, optional navigation observer) and is the only place
//! that starts or stops them. Like the components it is host-driven: the
//! host forwards listener firings, timer deadlines, painted frames and
//! navigation events, passing its current time along.
//!
//! ## State Transitions
//!
//! ```text
//! Armed --user event--------> Interacted   (timer stopped, listeners removed)
//! Armed --timer expiry------> Expired      (listeners removed)
//! *     --navigation start--> Idle         (everything stopped and reset)
//! Idle  --navigation done---> Armed        (timer now, listeners next frame)
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::context::InteractionContext;
use crate::events::Event;
use crate::navigation::{NavigationEmitter, NavigationObserver, NavigationPhase, SubscriptionId};
use crate::surface::{InputSurface, ListenerId};
use crate::timer::CountdownTimer;
use crate::tracker::UserEventTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Nothing is watching: a navigation is in progress.
    Idle,
    /// Waiting for an interaction or the timeout.
    Armed,
    /// The user interacted.
    Interacted,
    /// The timeout elapsed first. Opens the gate just like `Interacted`.
    Expired,
}

/// State of one provider scope, from mount to unmount.
#[derive(Debug)]
pub struct InteractionState {
    config: ProviderConfig,
    tracker: UserEventTracker,
    timer: CountdownTimer,
    navigation: Option<NavigationObserver>,
    user_triggered: bool,
    /// Listener reattachment waiting for the next painted frame.
    frame_requested: bool,
    events: Vec<Event>,
}

impl InteractionState {
    /// Mount without a router: navigation never resets the state.
    pub fn mount<S>(config: ProviderConfig, surface: &mut S, now_ms: u64) -> Self
    where
        S: InputSurface + ?Sized,
    {
        Self::mount_inner(config, surface, None, now_ms)
    }

    /// Mount and reset on every navigation `emitter` reports.
    pub fn mount_with_navigation<S>(
        config: ProviderConfig,
        surface: &mut S,
        emitter: &mut dyn NavigationEmitter,
        now_ms: u64,
    ) -> Self
    where
        S: InputSurface + ?Sized,
    {
        Self::mount_inner(config, surface, Some(emitter), now_ms)
    }

    fn mount_inner<S>(
        config: ProviderConfig,
        surface: &mut S,
        emitter: Option<&mut dyn NavigationEmitter>,
        now_ms: u64,
    ) -> Self
    where
        S: InputSurface + ?Sized,
    {
        let mut state = Self {
            config,
            tracker: UserEventTracker::new(),
            timer: CountdownTimer::new(config.timeout_ms, config.tick_ms),
            navigation: emitter.map(NavigationObserver::attach),
            user_triggered: false,
            frame_requested: false,
            events: Vec::new(),
        };
        debug!(
            timeout_ms = config.timeout_ms,
            navigation = state.navigation.is_some(),
            "interaction provider mounted"
        );
        let attached = state.tracker.start(surface, now_ms);
        state.record(attached);
        let started = state.timer.start(now_ms);
        state.record(started);
        state
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn has_interacted(&self) -> bool {
        self.user_triggered || self.timer.is_expired()
    }

    pub fn phase(&self) -> Phase {
        if self.user_triggered {
            Phase::Interacted
        } else if self.timer.is_expired() {
            Phase::Expired
        } else if self.tracker.is_active() || self.timer.is_running() || self.frame_requested {
            Phase::Armed
        } else {
            Phase::Idle
        }
    }

    pub fn listeners_active(&self) -> bool {
        self.tracker.is_active()
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn observes_navigation(&self) -> bool {
        self.navigation.is_some()
    }

    /// Next instant the host must call [`advance`](Self::advance) at.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timer.next_tick_at()
    }

    /// Whether the host should call [`on_frame`](Self::on_frame) after its
    /// next paint.
    pub fn has_pending_frame(&self) -> bool {
        self.frame_requested
    }

    pub fn context(&self) -> InteractionContext {
        InteractionContext::new(self.has_interacted())
    }

    /// See [`InteractionContext::after_interaction`].
    pub fn after_interaction<T>(&self, callback: impl FnOnce() -> T) -> Option<T> {
        self.context().after_interaction(callback)
    }

    pub fn snapshot(&self, now_ms: u64) -> Event {
        Event::StateSnapshot {
            phase: self.phase(),
            has_interacted: self.has_interacted(),
            listeners_active: self.tracker.is_active(),
            timer_running: self.timer.is_running(),
            timer_disabled: self.timer.is_disabled(),
            remaining_ms: self.timer.remaining_ms(),
            at_ms: now_ms,
        }
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Host input ───────────────────────────────────────────────────

    /// A listener on the input surface fired.
    ///
    /// Ids that are not ours are ignored. Returns `true` if this event
    /// opened the gate.
    pub fn handle_input<S>(&mut self, id: ListenerId, surface: &mut S, now_ms: u64) -> bool
    where
        S: InputSurface + ?Sized,
    {
        let Some(kind) = self.tracker.handle_event(id) else {
            return false;
        };
        debug!(%kind, "user interaction observed");
        self.user_triggered = true;
        self.record(Some(Event::UserInteracted { kind, at_ms: now_ms }));

        // The pending tick is cancelled before anything else can run.
        let stopped = self.timer.stop(now_ms);
        self.record(stopped);
        let detached = self.tracker.stop(surface, now_ms);
        self.record(detached);
        true
    }

    /// Fire every timer tick due at or before `now_ms`.
    ///
    /// Returns `true` if the timeout expired during this call.
    pub fn advance<S>(&mut self, surface: &mut S, now_ms: u64) -> bool
    where
        S: InputSurface + ?Sized,
    {
        while let Some(event) = self.timer.tick(now_ms) {
            let expired = matches!(event, Event::TimerExpired { .. });
            let at_ms = event.at_ms();
            self.record(Some(event));
            if expired {
                let detached = self.tracker.stop(surface, at_ms);
                self.record(detached);
                return true;
            }
        }
        false
    }

    /// The host painted a frame.
    pub fn on_frame<S>(&mut self, surface: &mut S, now_ms: u64)
    where
        S: InputSurface + ?Sized,
    {
        if !std::mem::take(&mut self.frame_requested) {
            return;
        }
        if self.has_interacted() {
            return;
        }
        let attached = self.tracker.start(surface, now_ms);
        self.record(attached);
    }

    /// A navigation subscription fired.
    ///
    /// Returns the phase if the subscription is ours. Always `None` for a
    /// provider mounted without a router.
    pub fn handle_navigation<S>(
        &mut self,
        id: SubscriptionId,
        surface: &mut S,
        now_ms: u64,
    ) -> Option<NavigationPhase>
    where
        S: InputSurface + ?Sized,
    {
        let phase = self.navigation.as_ref()?.resolve(id)?;
        match phase {
            NavigationPhase::Start => self.navigation_started(surface, now_ms),
            NavigationPhase::Complete => self.navigation_completed(now_ms),
        }
        Some(phase)
    }

    fn navigation_started<S>(&mut self, surface: &mut S, now_ms: u64)
    where
        S: InputSurface + ?Sized,
    {
        self.record(Some(Event::NavigationStarted { at_ms: now_ms }));
        // A previous navigation may still be waiting for its frame.
        self.frame_requested = false;
        let detached = self.tracker.stop(surface, now_ms);
        self.record(detached);
        let stopped = self.timer.stop(now_ms);
        self.record(stopped);

        self.user_triggered = false;
        self.timer.reset();
        debug!("interaction state reset for navigation");
    }

    fn navigation_completed(&mut self, now_ms: u64) {
        self.record(Some(Event::NavigationCompleted { at_ms: now_ms }));
        if self.has_interacted() {
            return;
        }
        // The router scrolls to the top right after completing; listening
        // from the next frame on skips that scroll.
        if !self.tracker.is_active() && !self.frame_requested {
            self.frame_requested = true;
            self.record(Some(Event::FrameRequested { at_ms: now_ms }));
        }
        let started = self.timer.start(now_ms);
        self.record(started);
    }

    /// Tear the scope down: listeners, pending tick, pending frame and
    /// navigation subscriptions are all released before this returns.
    ///
    /// `emitter` must be the one given to
    /// [`mount_with_navigation`](Self::mount_with_navigation), if any.
    /// Returns the events that had not been drained yet.
    pub fn unmount<S>(
        mut self,
        surface: &mut S,
        emitter: Option<&mut dyn NavigationEmitter>,
        now_ms: u64,
    ) -> Vec<Event>
    where
        S: InputSurface + ?Sized,
    {
        self.frame_requested = false;
        let detached = self.tracker.stop(surface, now_ms);
        self.record(detached);
        let stopped = self.timer.stop(now_ms);
        self.record(stopped);
        match (self.navigation.take(), emitter) {
            (Some(observer), Some(emitter)) => observer.detach(emitter),
            (Some(_), None) => {
                warn!("unmounted without its router; navigation subscriptions stay registered")
            }
            (None, _) => {}
        }
        self.record(Some(Event::Unmounted { at_ms: now_ms }));
        debug!("interaction provider unmounted");
        self.events
    }

    fn record(&mut self, event: Option<Event>) {
        if let Some(event) = event {
            self.events.push(event);
        }
    }
}
