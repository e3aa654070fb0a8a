//! Read interface for consuming code.
//!
//! [`InteractionContext`] is a cheap `Copy` snapshot of the gate. Hosts
//! install it for a render pass with [`provide`], and any code running
//! inside that pass reads it with [`use_interaction`] without the value
//! being passed down explicitly. Outside of any provider the default
//! context applies: not interacted, gate closed.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

/// What descendants see of the interaction state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionContext {
    pub has_interacted: bool,
}

impl InteractionContext {
    pub fn new(has_interacted: bool) -> Self {
        Self { has_interacted }
    }

    /// Run `callback` only if the page has been interacted with.
    ///
    /// This is a gate, not a queue: a closed gate drops the callback and
    /// returns `None`, and the caller asks again on its next render.
    pub fn after_interaction<T>(&self, callback: impl FnOnce() -> T) -> Option<T> {
        if self.has_interacted {
            Some(callback())
        } else {
            None
        }
    }
}

thread_local! {
    static SCOPES: RefCell<Vec<InteractionContext>> = const { RefCell::new(Vec::new()) };
}

/// Pops its context when dropped, so a panicking render does not leave a
/// stale scope behind.
struct ScopeGuard;

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
    }
}

/// Make `context` visible to [`use_interaction`] for the duration of
/// `render`. Scopes nest; the innermost one wins.
pub fn provide<R>(context: InteractionContext, render: impl FnOnce() -> R) -> R {
    SCOPES.with(|scopes| scopes.borrow_mut().push(context));
    let _guard = ScopeGuard;
    render()
}

/// The innermost provided context, or the default one.
pub fn use_interaction() -> InteractionContext {
    SCOPES.with(|scopes| scopes.borrow().last().copied().unwrap_or_default())
}
