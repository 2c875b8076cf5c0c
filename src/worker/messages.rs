//! Completion messages posted back to the engine.
//!
//! Each [`Action`](crate::app::Action) executed by the
//! [`ActionExecutor`](super::ActionExecutor) produces exactly one [`Completion`].
//! Completions travel over an unbounded channel into the engine's select loop,
//! so they are always applied on the engine's own serialization context and
//! never from the task that performed the I/O.

use crate::domain::{Page, Result, SearchSuggestion};

/// Outcome of an executed action.
#[derive(Debug)]
pub enum Completion {
    /// A page fetch finished.
    PageFetched {
        /// Epoch the fetch was issued under.
        epoch: u64,
        /// Requested 1-based page index.
        index: u32,
        result: Result<Page>,
    },

    /// A suggestion fetch finished.
    SuggestionsFetched {
        /// Normalized query the fetch was issued for.
        query: String,
        result: Result<Vec<SearchSuggestion>>,
    },

    /// A favorite toggle was persisted or failed.
    FavoriteToggled {
        id: i64,
        /// The favorite state after the toggle.
        result: Result<bool>,
    },
}

impl Completion {
    /// Whether the underlying operation failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        match self {
            Self::PageFetched { result, .. } => result.is_err(),
            Self::SuggestionsFetched { result, .. } => result.is_err(),
            Self::FavoriteToggled { result, .. } => result.is_err(),
        }
    }
}
