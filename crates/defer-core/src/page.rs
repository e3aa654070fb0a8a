//! Deterministic page host.
//!
//! [`Page`] plays the part of the browser around one provider: it owns the
//! shared input surface, the optional router, the current time and the
//! frame cadence, and delivers everything to the [`InteractionState`] in
//! chronological order. The CLI and the scenario tests both drive it.

use tracing::debug;

use crate::config::{Config, ProviderConfig, DEFAULT_FRAME_MS};
use crate::context::{provide, InteractionContext};
use crate::error::Result;
use crate::events::Event;
use crate::navigation::{NavigationEmitter, NavigationPhase, RouterEvents};
use crate::script::{parse_steps, Step};
use crate::state::InteractionState;
use crate::surface::{InteractionKind, ListenerRegistry};

#[derive(Debug)]
pub struct Page {
    surface: ListenerRegistry,
    router: Option<RouterEvents>,
    /// `None` once unmounted.
    state: Option<InteractionState>,
    now_ms: u64,
    frame_ms: u64,
    log: Vec<Event>,
}

impl Page {
    /// Mount a provider at time zero.
    pub fn mount(config: ProviderConfig, with_router: bool) -> Self {
        Self::mount_with_frame(config, with_router, DEFAULT_FRAME_MS)
    }

    pub fn from_config(config: &Config, with_router: bool) -> Self {
        Self::mount_with_frame(config.provider(), with_router, config.frame_ms)
    }

    pub fn mount_with_frame(config: ProviderConfig, with_router: bool, frame_ms: u64) -> Self {
        let mut surface = ListenerRegistry::new();
        let mut router = with_router.then(RouterEvents::new);
        let state = match router.as_mut() {
            Some(router) => InteractionState::mount_with_navigation(config, &mut surface, router, 0),
            None => InteractionState::mount(config, &mut surface, 0),
        };
        let mut page = Self {
            surface,
            router,
            state: Some(state),
            now_ms: 0,
            frame_ms: frame_ms.max(1),
            log: Vec::new(),
        };
        page.collect();
        page
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn state(&self) -> Option<&InteractionState> {
        self.state.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.state.is_some()
    }

    pub fn surface(&self) -> &ListenerRegistry {
        &self.surface
    }

    /// For other components sharing the page's input surface.
    pub fn surface_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.surface
    }

    pub fn router(&self) -> Option<&RouterEvents> {
        self.router.as_ref()
    }

    /// Context descendants currently see. The default context once
    /// unmounted.
    pub fn context(&self) -> InteractionContext {
        self.state
            .as_ref()
            .map(InteractionState::context)
            .unwrap_or_default()
    }

    pub fn has_interacted(&self) -> bool {
        self.context().has_interacted
    }

    /// Run one render pass with the provider's context installed.
    pub fn render<R>(&self, render: impl FnOnce() -> R) -> R {
        provide(self.context(), render)
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.collect();
        std::mem::take(&mut self.log)
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn click(&mut self) -> bool {
        self.dispatch(InteractionKind::Click)
    }

    pub fn touch(&mut self) -> bool {
        self.dispatch(InteractionKind::TouchStart)
    }

    pub fn scroll(&mut self) -> bool {
        self.dispatch(InteractionKind::Scroll)
    }

    /// Deliver `kind` to every listener registered for it.
    ///
    /// Returns `true` if it opened the gate.
    pub fn dispatch(&mut self, kind: InteractionKind) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        let mut opened = false;
        for id in self.surface.dispatch(kind) {
            opened |= state.handle_input(id, &mut self.surface, self.now_ms);
        }
        self.collect();
        opened
    }

    /// Route change: start, complete, then the router's scroll-to-top.
    pub fn navigate(&mut self) {
        debug!(at_ms = self.now_ms, "navigating");
        self.emit_navigation(NavigationPhase::Start);
        self.emit_navigation(NavigationPhase::Complete);
        self.scroll();
    }

    pub fn emit_navigation(&mut self, phase: NavigationPhase) {
        let (Some(router), Some(state)) = (self.router.as_ref(), self.state.as_mut()) else {
            return;
        };
        for id in router.emit(phase) {
            state.handle_navigation(id, &mut self.surface, self.now_ms);
        }
        self.collect();
    }

    // ── Time ─────────────────────────────────────────────────────────

    /// Paint a frame now.
    pub fn paint(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.on_frame(&mut self.surface, self.now_ms);
        }
        self.collect();
    }

    pub fn advance(&mut self, ms: u64) {
        self.advance_to(self.now_ms.saturating_add(ms));
    }

    /// Move time forward to `target_ms`, firing timer ticks and pending
    /// frames in the order they fall due.
    pub fn advance_to(&mut self, target_ms: u64) {
        while let Some(at) = self.next_wakeup().filter(|at| *at <= target_ms) {
            let frame_due = self.next_frame_at() == Some(at);
            self.now_ms = at;
            let Some(state) = self.state.as_mut() else {
                break;
            };
            if frame_due && state.has_pending_frame() {
                state.on_frame(&mut self.surface, at);
            }
            state.advance(&mut self.surface, at);
            self.collect();
        }
        self.now_ms = self.now_ms.max(target_ms);
    }

    /// First frame boundary strictly after now; `None` past the end of the
    /// clock.
    fn next_frame_at(&self) -> Option<u64> {
        (self.now_ms / self.frame_ms)
            .checked_add(1)?
            .checked_mul(self.frame_ms)
    }

    fn next_wakeup(&self) -> Option<u64> {
        let state = self.state.as_ref()?;
        let frame = state
            .has_pending_frame()
            .then(|| self.next_frame_at())
            .flatten();
        match (state.next_deadline(), frame) {
            (Some(tick), Some(frame)) => Some(tick.min(frame)),
            (tick, frame) => tick.or(frame),
        }
    }

    // ── Scripted sessions ────────────────────────────────────────────

    pub fn apply(&mut self, step: Step) {
        match step {
            Step::Click => {
                self.click();
            }
            Step::Touch => {
                self.touch();
            }
            Step::Scroll => {
                self.scroll();
            }
            Step::Wait(ms) => self.advance(ms),
            Step::Navigate => self.navigate(),
            Step::Paint => self.paint(),
            Step::Render => {
                if let Some(state) = self.state.as_ref() {
                    self.log.push(state.snapshot(self.now_ms));
                }
            }
        }
    }

    /// Parse a whole script, then apply it. Nothing runs if any step is
    /// invalid.
    pub fn run_script(&mut self, script: &str) -> Result<()> {
        let steps = parse_steps(script)?;
        debug!(steps = steps.len(), "running script");
        for step in steps {
            self.apply(step);
        }
        Ok(())
    }

    /// Tear the provider down. Safe to call twice.
    pub fn unmount(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };
        self.log.extend(state.drain_events());
        let emitter = self
            .router
            .as_mut()
            .map(|r| r as &mut dyn NavigationEmitter);
        self.log
            .extend(state.unmount(&mut self.surface, emitter, self.now_ms));
    }

    fn collect(&mut self) {
        if let Some(state) = self.state.as_mut() {
            self.log.extend(state.drain_events());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_frame_is_on_the_cadence() {
        let mut page = Page::mount(ProviderConfig::default(), true);
        page.advance(20);
        assert_eq!(page.next_frame_at(), Some(32));
    }

    #[test]
    fn waiting_to_the_end_of_the_clock_schedules_no_frame() {
        let mut page = Page::mount(ProviderConfig::default(), true);
        page.run_script("wait:18446744073709551615 click navigate wait:1").unwrap();

        assert_eq!(page.now_ms(), u64::MAX);
        assert_eq!(page.next_frame_at(), None);
        // The restarted countdown still runs out at the last instant.
        assert!(page.has_interacted());
        assert!(!page.state().unwrap().listeners_active());
    }

    #[test]
    fn invalid_script_runs_nothing() {
        let mut page = Page::mount(ProviderConfig::default(), false);
        page.drain_events();
        let err = page.run_script("wait:100 hover").unwrap_err();

        assert!(matches!(err, crate::CoreError::Script(_)));
        assert_eq!(page.now_ms(), 0);
        assert!(page.drain_events().is_empty());
    }

    #[test]
    fn render_installs_the_context() {
        let mut page = Page::mount(ProviderConfig::default(), false);
        assert!(!page.render(|| crate::context::use_interaction().has_interacted));
        page.click();
        assert!(page.render(|| crate::context::use_interaction().has_interacted));
    }

    #[test]
    fn unmount_twice_is_harmless() {
        let mut page = Page::mount(ProviderConfig::default(), true);
        page.unmount();
        page.unmount();
        assert!(!page.is_mounted());
        assert!(page.surface().is_empty());
        assert_eq!(page.router().map(RouterEvents::subscriber_count), Some(0));
    }
}
