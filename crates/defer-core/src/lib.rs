//! # defer-interaction core library
//!
//! Gates low-priority page work until the user has interacted with the
//! page (click, touch, scroll) or a timeout elapses, whichever comes first.
//!
//! ## Architecture
//!
//! - **Components**: a listener tracker on the shared input surface, a
//!   countdown timer, and an optional navigation observer. Each exposes
//!   only start/stop and a one-shot signal.
//! - **Orchestrator**: [`InteractionState`] holds all three and implements
//!   the transition table. It is host-driven, like the components: no
//!   threads, no sleeps, the host passes its current time in.
//! - **Context**: [`InteractionContext`] is what consuming code reads,
//!   installed per render pass with [`context::provide`].
//! - **Host**: [`Page`] is a deterministic host used by the CLI and tests.
//!
//! ## Key Components
//!
//! - [`InteractionState`]: the state machine
//! - [`CountdownTimer`]: host-driven countdown
//! - [`UserEventTracker`]: first-interaction detector
//! - [`NavigationObserver`]: router lifecycle subscriptions
//! - [`Config`]: TOML configuration

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod navigation;
pub mod page;
pub mod script;
pub mod state;
pub mod surface;
pub mod timer;
pub mod tracker;


pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ProviderConfig};
pub use context::{provide, use_interaction, InteractionContext};
pub use error::{ConfigError, CoreError, ScriptError};
pub use events::{write_json_lines, Event};
pub use navigation::{NavigationEmitter, NavigationObserver, NavigationPhase, RouterEvents, SubscriptionId};
pub use page::Page;
pub use script::{parse_steps, Step};
pub use state::{InteractionState, Phase};
pub use surface::{InputSurface, InteractionKind, ListenerId, ListenerRegistry};
pub use timer::{CountdownTimer, TimerState};
pub use tracker::{ListenerHandle, UserEventTracker};
