//! Application layer: the aggregation engine.
//!
//! # Architecture
//!
//! The engine follows a unidirectional data flow:
//!
//! ```text
//! Commands → Events → handle_event → State mutations → Actions → Executor
//!                         ↑                                         ↓
//!                         └─────────────── Completions ─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effects emitted by the event handler
//! - [`engine`]: Actor task, command handle, and view subscriptions
//! - [`handler`]: Event processing and state transitions
//! - [`modes`]: Load phase state machine and error signal types
//! - [`projection`]: Pure read-side projection and the view snapshot
//! - [`state`]: Aggregate state container
//! - [`throttle`]: Next-page rate limiting

pub mod actions;
pub mod engine;
pub mod handler;
pub mod modes;
pub mod projection;
pub mod state;
pub mod throttle;

pub use actions::Action;
pub use engine::{Engine, EngineConfig, EngineHandle, ViewSubscription};
pub use handler::{handle_event, Event};
pub use modes::{CommandFailure, CommandKind, Phase};
pub use projection::{MovieListItem, MovieListView, QUERY_FILTER_THRESHOLD};
pub use state::AggregateState;
pub use throttle::Throttle;
