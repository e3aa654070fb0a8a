//! Live session on the wall clock.
//!
//! Input comes from stdin, one step per line (`click`, `touch`, `scroll`,
//! `navigate`, `paint`, `render`, `quit`). A frame interval keeps timer
//! ticks and frames flowing between lines. Events print as JSON lines.

use std::path::Path;
use std::time::Duration;

use clap::Args;
use defer_core::{Clock, Config, Event, Page, Step, SystemClock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use super::{load_config, print_events};

#[derive(Args)]
pub struct WatchArgs {
    /// Timeout in milliseconds (0 disables it); overrides the config file
    #[arg(long)]
    timeout: Option<u64>,
    /// Attach a router so `navigate` resets the state
    #[arg(long)]
    router: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// A page whose time follows a clock.
pub struct LiveSession<C: Clock> {
    page: Page,
    clock: C,
    origin_ms: u64,
}

impl<C: Clock> LiveSession<C> {
    pub fn new(config: &Config, router: bool, clock: C) -> Self {
        let origin_ms = clock.now_ms();
        Self {
            page: Page::from_config(config, router),
            clock,
            origin_ms,
        }
    }

    /// Bring the page up to the clock's current time.
    pub fn sync(&mut self) {
        let elapsed = self.clock.now_ms().saturating_sub(self.origin_ms);
        self.page.advance_to(elapsed);
    }

    pub fn handle_line(&mut self, line: &str) -> Control {
        self.sync();
        let line = line.trim();
        if line.is_empty() {
            return Control::Continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return Control::Quit;
        }
        match line.parse::<Step>() {
            Ok(Step::Wait(_)) => warn!("wait steps are ignored in live mode"),
            Ok(step) => self.page.apply(step),
            Err(e) => warn!(error = %e, "ignoring input line"),
        }
        Control::Continue
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.page.drain_events()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn finish(mut self) -> Vec<Event> {
        self.sync();
        self.page.unmount();
        self.page.drain_events()
    }
}

pub fn run(args: WatchArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    if let Some(timeout) = args.timeout {
        config.timeout_ms = timeout;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(config, args.router))
}

async fn watch(config: Config, router: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = LiveSession::new(&config, router, SystemClock);
    let mut frames = tokio::time::interval(Duration::from_millis(config.frame_ms));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    debug!(timeout_ms = config.timeout_ms, router, "live session started");

    loop {
        tokio::select! {
            _ = frames.tick() => session.sync(),
            line = lines.next_line() => match line? {
                Some(line) => {
                    if session.handle_line(&line) == Control::Quit {
                        break;
                    }
                }
                None => break,
            },
        }
        print_events(&session.drain_events())?;
    }

    print_events(&session.finish())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use defer_core::ManualClock;

    fn session(clock: &ManualClock, timeout_ms: u64, router: bool) -> LiveSession<&ManualClock> {
        let config = Config {
            timeout_ms,
            ..Config::default()
        };
        LiveSession::new(&config, router, clock)
    }

    #[test]
    fn click_line_opens_gate() {
        let clock = ManualClock::new(1_000_000);
        let mut live = session(&clock, 10_000, false);
        assert_eq!(live.handle_line("click"), Control::Continue);
        assert!(live.page().has_interacted());
    }

    #[test]
    fn clock_drives_the_timeout() {
        let clock = ManualClock::new(500);
        let mut live = session(&clock, 2_000, false);

        clock.advance(1_999);
        live.sync();
        assert!(!live.page().has_interacted());
        clock.advance(1);
        live.sync();
        assert!(live.page().has_interacted());
    }

    #[test]
    fn quit_and_garbage_lines() {
        let clock = ManualClock::new(0);
        let mut live = session(&clock, 0, true);
        assert_eq!(live.handle_line("   "), Control::Continue);
        assert_eq!(live.handle_line("keydown"), Control::Continue);
        assert_eq!(live.handle_line("wait:100"), Control::Continue);
        assert!(!live.page().has_interacted());
        assert_eq!(live.handle_line("QUIT"), Control::Quit);
    }

    #[test]
    fn finish_unmounts() {
        let clock = ManualClock::new(0);
        let live = session(&clock, 10_000, true);
        let events = live.finish();
        assert!(matches!(events.last(), Some(Event::Unmounted { .. })));
    }
}
