//! User interaction tracking.
//!
//! The tracker owns at most one [`ListenerHandle`] at a time: one listener
//! per [`InteractionKind`] on the shared surface. The handle is the only
//! thing that can remove those listeners, so two trackers on the same
//! surface never interfere with each other.

use tracing::{debug, warn};

use crate::events::Event;
use crate::surface::{InputSurface, InteractionKind, ListenerId};

/// Registrations made by one `start()`, released by the matching `stop()`.
///
/// Deliberately not `Clone`: releasing it consumes it.
#[derive(Debug)]
pub struct ListenerHandle {
    registrations: Vec<(InteractionKind, ListenerId)>,
}

impl ListenerHandle {
    fn register<S: InputSurface + ?Sized>(surface: &mut S) -> Self {
        let registrations = InteractionKind::ALL
            .into_iter()
            .map(|kind| (kind, surface.add_listener(kind)))
            .collect();
        Self { registrations }
    }

    pub fn ids(&self) -> impl Iterator<Item = ListenerId> + '_ {
        self.registrations.iter().map(|(_, id)| *id)
    }

    /// Kind of the listener `id`, if it belongs to this handle.
    pub fn kind_of(&self, id: ListenerId) -> Option<InteractionKind> {
        self.registrations
            .iter()
            .find(|(_, own)| *own == id)
            .map(|(kind, _)| *kind)
    }

    fn release<S: InputSurface + ?Sized>(self, surface: &mut S) {
        for (kind, id) in self.registrations {
            if !surface.remove_listener(id) {
                warn!(%kind, ?id, "listener was already gone from the input surface");
            }
        }
    }
}

/// Edge-triggered detector for the first interaction.
#[derive(Debug, Default)]
pub struct UserEventTracker {
    handle: Option<ListenerHandle>,
    /// Set once an event has been reported for the current registration.
    fired: bool,
}

impl UserEventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&ListenerHandle> {
        self.handle.as_ref()
    }

    /// Register the listeners. No-op if they are already registered.
    pub fn start<S: InputSurface + ?Sized>(&mut self, surface: &mut S, now_ms: u64) -> Option<Event> {
        if self.handle.is_some() {
            return None;
        }
        self.handle = Some(ListenerHandle::register(surface));
        self.fired = false;
        debug!("interaction listeners attached");
        Some(Event::ListenersAttached { at_ms: now_ms })
    }

    /// Remove the listeners. No-op if none are registered.
    pub fn stop<S: InputSurface + ?Sized>(&mut self, surface: &mut S, now_ms: u64) -> Option<Event> {
        let handle = self.handle.take()?;
        handle.release(surface);
        debug!("interaction listeners detached");
        Some(Event::ListenersDetached { at_ms: now_ms })
    }

    /// Deliver listener `id` firing.
    ///
    /// Returns the kind the first time one of our listeners fires while
    /// active; `None` for foreign ids and for every later event.
    pub fn handle_event(&mut self, id: ListenerId) -> Option<InteractionKind> {
        let kind = self.handle.as_ref()?.kind_of(id)?;
        if self.fired {
            return None;
        }
        self.fired = true;
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::ListenerRegistry;

    #[test]
    fn start_is_idempotent() {
        let mut surface = ListenerRegistry::new();
        let mut tracker = UserEventTracker::new();

        assert!(tracker.start(&mut surface, 0).is_some());
        assert!(tracker.start(&mut surface, 0).is_none());
        assert_eq!(surface.len(), InteractionKind::ALL.len());
    }

    #[test]
    fn stop_without_start_is_a_no_op() {
        let mut surface = ListenerRegistry::new();
        let mut tracker = UserEventTracker::new();
        assert!(tracker.stop(&mut surface, 0).is_none());
    }

    #[test]
    fn stop_only_removes_own_listeners() {
        let mut surface = ListenerRegistry::new();
        let foreign = surface.add_listener(InteractionKind::Scroll);
        let mut tracker = UserEventTracker::new();

        tracker.start(&mut surface, 0);
        tracker.stop(&mut surface, 0);

        assert_eq!(surface.len(), 1);
        assert!(surface.contains(foreign));
    }

    #[test]
    fn reports_first_event_only() {
        let mut surface = ListenerRegistry::new();
        let mut tracker = UserEventTracker::new();
        tracker.start(&mut surface, 0);

        let click = surface.dispatch(InteractionKind::Click)[0];
        let scroll = surface.dispatch(InteractionKind::Scroll)[0];
        assert_eq!(tracker.handle_event(click), Some(InteractionKind::Click));
        assert_eq!(tracker.handle_event(scroll), None);
    }

    #[test]
    fn ignores_foreign_and_stale_ids() {
        let mut surface = ListenerRegistry::new();
        let foreign = surface.add_listener(InteractionKind::Click);
        let mut tracker = UserEventTracker::new();
        assert_eq!(tracker.handle_event(foreign), None);

        tracker.start(&mut surface, 0);
        assert_eq!(tracker.handle_event(foreign), None);

        let stale: Vec<_> = tracker.handle().unwrap().ids().collect();
        tracker.stop(&mut surface, 0);
        tracker.start(&mut surface, 0);
        assert_eq!(tracker.handle_event(stale[0]), None);
    }

    #[test]
    fn restart_re_arms_the_edge() {
        let mut surface = ListenerRegistry::new();
        let mut tracker = UserEventTracker::new();
        tracker.start(&mut surface, 0);
        let id = surface.dispatch(InteractionKind::TouchStart)[0];
        assert!(tracker.handle_event(id).is_some());

        tracker.stop(&mut surface, 0);
        tracker.start(&mut surface, 0);
        let id = surface.dispatch(InteractionKind::TouchStart)[0];
        assert_eq!(tracker.handle_event(id), Some(InteractionKind::TouchStart));
    }
}
