//! Side effects requested by the event handler.
//!
//! [`handle_event`](super::handle_event) never touches the network or the
//! favorites store itself. It returns a `Vec<Action>` which the engine hands to
//! the [`ActionExecutor`](crate::worker::ActionExecutor). Every action answers
//! with exactly one [`Completion`](crate::worker::Completion) that re-enters the
//! handler as [`Event::Completion`](super::Event::Completion).

/// Effectful command produced by a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Fetches one catalog page.
    ///
    /// `epoch` identifies the `load` session that requested the page. The
    /// completion is discarded if a newer `load` has started since.
    FetchPage {
        epoch: u64,
        /// 1-based page index.
        index: u32,
    },

    /// Fetches search suggestions for an already normalized query.
    FetchSuggestions { query: String },

    /// Flips the favorite state of a catalog item in the favorites store.
    ///
    /// Whether to add or remove is decided against the store at execution
    /// time, not against the last projected view.
    ToggleFavorite { id: i64 },
}
