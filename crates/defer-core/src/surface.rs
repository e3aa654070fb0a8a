//! The shared input surface interaction listeners are registered on.
//!
//! The surface is a singleton owned by the host (the page, the window).
//! Several components may listen on it at once, so every registration is
//! identified by a [`ListenerId`] and only that id can remove it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input kinds treated as evidence that the user is engaged with the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Click,
    #[serde(rename = "touchstart")]
    TouchStart,
    Scroll,
}

impl InteractionKind {
    /// Every kind the tracker listens for.
    pub const ALL: [InteractionKind; 3] = [
        InteractionKind::Click,
        InteractionKind::TouchStart,
        InteractionKind::Scroll,
    ];

    /// DOM event name.
    pub fn event_name(self) -> &'static str {
        match self {
            InteractionKind::Click => "click",
            InteractionKind::TouchStart => "touchstart",
            InteractionKind::Scroll => "scroll",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.event_name() == name)
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Opaque id of one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenerId(u64);

/// Anything listeners can be added to and removed from.
pub trait InputSurface {
    /// Register a listener for `kind` and return its id.
    fn add_listener(&mut self, kind: InteractionKind) -> ListenerId;

    /// Remove a previously returned registration.
    ///
    /// Returns `false` if the id is unknown (already removed, or never
    /// issued by this surface).
    fn remove_listener(&mut self, id: ListenerId) -> bool;
}

/// In-process input surface.
///
/// Hosts dispatch an input kind with [`ListenerRegistry::dispatch`] and
/// route each returned id to whichever component owns it.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: BTreeMap<ListenerId, InteractionKind>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every listener registered for `kind`, in registration order.
    pub fn dispatch(&self, kind: InteractionKind) -> Vec<ListenerId> {
        self.listeners
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Total number of live registrations, across all owners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn count(&self, kind: InteractionKind) -> usize {
        self.listeners.values().filter(|k| **k == kind).count()
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }
}

impl InputSurface for ListenerRegistry {
    fn add_listener(&mut self, kind: InteractionKind) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, kind);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }
}
