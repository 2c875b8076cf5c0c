//! Background execution of engine actions.
//!
//! # Architecture
//!
//! - `messages`: [`Completion`] results posted back to the engine
//! - `executor`: [`ActionExecutor`] spawning catalog and favorites work on tokio

pub mod executor;
pub mod messages;

pub use executor::ActionExecutor;
pub use messages::Completion;
