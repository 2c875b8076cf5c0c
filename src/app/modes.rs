//! Engine phase and command types.
//!
//! # State Machine
//!
//! ```text
//! Idle ──load──▶ Loading ──ok──▶ Ready ──next page──▶ LoadingMore
//!   ▲               │              ▲                      │
//!   └─────err───────┘              └──────ok / err────────┘
//! ```
//!
//! `load` is accepted from every phase and restarts the machine at `Loading`.
//! Filtering is synchronous and never leaves `Ready`.

use serde::Serialize;

/// Lifecycle phase of one aggregate session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    /// No data. Initial phase and the phase after a failed `load`.
    #[default]
    Idle,

    /// Waiting for page 1 after a `load`.
    Loading,

    /// At least page 1 is present and no page fetch is in flight.
    Ready,

    /// Waiting for the next page; already fetched pages stay visible.
    LoadingMore,
}

impl Phase {
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::Loading | Self::LoadingMore)
    }
}

/// Command whose failure is being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommandKind {
    Load,
    LoadNextPage,
    FetchSuggestions,
    ToggleFavorite,
}

/// Error signal exposed to the presenter.
///
/// Cleared when the same kind of command is issued again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandFailure {
    pub command: CommandKind,
    pub message: String,
    /// Whether a retry affordance makes sense.
    pub retryable: bool,
}

impl CommandFailure {
    #[must_use]
    pub fn new(command: CommandKind, error: &crate::ReelError) -> Self {
        Self {
            command,
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}
