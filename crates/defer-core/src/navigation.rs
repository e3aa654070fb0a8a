//! Navigation lifecycle observation.
//!
//! A router is consumed only as an emitter of two named events with
//! subscribe/unsubscribe. The observer holds exactly one subscription per
//! phase for the lifetime of a provider.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NavigationPhase {
    /// The current page is about to go away.
    #[serde(rename = "routeChangeStart")]
    Start,
    /// The new page is in place.
    #[serde(rename = "routeChangeComplete")]
    Complete,
}

impl NavigationPhase {
    pub fn event_name(self) -> &'static str {
        match self {
            NavigationPhase::Start => "routeChangeStart",
            NavigationPhase::Complete => "routeChangeComplete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

/// Event-subscription interface of a router.
pub trait NavigationEmitter {
    fn subscribe(&mut self, phase: NavigationPhase) -> SubscriptionId;

    /// Returns `false` if the subscription is unknown.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// In-process router event emitter.
#[derive(Debug, Default)]
pub struct RouterEvents {
    next_id: u64,
    subscriptions: BTreeMap<SubscriptionId, NavigationPhase>,
}

impl RouterEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriptions to notify for `phase`, in subscription order.
    pub fn emit(&self, phase: NavigationPhase) -> Vec<SubscriptionId> {
        self.subscriptions
            .iter()
            .filter(|(_, p)| **p == phase)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl NavigationEmitter for RouterEvents {
    fn subscribe(&mut self, phase: NavigationPhase) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.insert(id, phase);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }
}

/// Subscriptions held on behalf of one provider.
#[derive(Debug)]
pub struct NavigationObserver {
    on_start: SubscriptionId,
    on_complete: SubscriptionId,
}

impl NavigationObserver {
    pub fn attach(emitter: &mut dyn NavigationEmitter) -> Self {
        let on_start = emitter.subscribe(NavigationPhase::Start);
        let on_complete = emitter.subscribe(NavigationPhase::Complete);
        debug!("navigation observer subscribed");
        Self {
            on_start,
            on_complete,
        }
    }

    /// Which phase subscription `id` stands for, if it is ours.
    pub fn resolve(&self, id: SubscriptionId) -> Option<NavigationPhase> {
        if id == self.on_start {
            Some(NavigationPhase::Start)
        } else if id == self.on_complete {
            Some(NavigationPhase::Complete)
        } else {
            None
        }
    }

    pub fn detach(self, emitter: &mut dyn NavigationEmitter) {
        for id in [self.on_start, self.on_complete] {
            if !emitter.unsubscribe(id) {
                warn!(?id, "navigation subscription was already gone");
            }
        }
        debug!("navigation observer unsubscribed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_subscribes_both_phases() {
        let mut router = RouterEvents::new();
        let observer = NavigationObserver::attach(&mut router);

        let start = router.emit(NavigationPhase::Start);
        let complete = router.emit(NavigationPhase::Complete);
        assert_eq!(start.len(), 1);
        assert_eq!(complete.len(), 1);
        assert_eq!(observer.resolve(start[0]), Some(NavigationPhase::Start));
        assert_eq!(observer.resolve(complete[0]), Some(NavigationPhase::Complete));
    }

    #[test]
    fn detach_leaves_other_subscribers() {
        let mut router = RouterEvents::new();
        let other = router.subscribe(NavigationPhase::Start);
        let observer = NavigationObserver::attach(&mut router);

        assert_eq!(observer.resolve(other), None);
        observer.detach(&mut router);
        assert_eq!(router.emit(NavigationPhase::Start), vec![other]);
        assert!(router.emit(NavigationPhase::Complete).is_empty());
    }

    #[test]
    fn phase_names_match_router_events() {
        assert_eq!(NavigationPhase::Start.event_name(), "routeChangeStart");
        let json = serde_json::to_string(&NavigationPhase::Complete).unwrap();
        assert_eq!(json, "\"routeChangeComplete\"");
    }
}
