//! Event handling and state transition logic.
//!
//! Every input the engine receives, presenter commands and completions of
//! earlier actions alike, is turned into an [`Event`] and passed through
//! [`handle_event`]. The handler mutates [`AggregateState`] and returns the
//! actions to execute. It never awaits and never performs I/O, so the whole
//! state machine can be driven synchronously in tests.
//!
//! # Architecture
//!
//! ```text
//! Presenter ──command──▶ Event ──▶ handle_event ──▶ Actions ──▶ ActionExecutor
//!                          ▲                                        │
//!                          └───────────── Completion ◀──────────────┘
//! ```
//!
//! The returned `bool` tells the engine whether a transition was committed,
//! which is exactly when subscribers receive a new view.

use crate::app::{Action, AggregateState, CommandKind};
use crate::worker::Completion;
use tokio::time::Instant;

/// Inputs of the aggregation state machine.
#[derive(Debug)]
pub enum Event {
    /// Resets the aggregate and fetches page 1.
    Load,

    /// Fetches the page after the cursor, subject to phase and throttle.
    LoadNextPage,

    /// Replaces the query text.
    ///
    /// Filtering is applied on read; this only decides about suggestions.
    UpdateQuery(String),

    /// Requests a favorite flip for a catalog id.
    ToggleFavorite(i64),

    /// The favorites store committed a change.
    ///
    /// Carries no payload: the next view reads the store afresh.
    FavoritesChanged,

    /// Outcome of a previously emitted [`Action`].
    Completion(Completion),
}

/// Processes an event, mutates state, and returns the actions to execute.
///
/// # Returns
///
/// `(changed, actions)`. `changed` is `true` if the visible state moved and
/// a new view must be published.
///
/// # Example
///
/// ```
/// use reelsync::app::{handle_event, Action, AggregateState, Event};
/// use std::time::Duration;
///
/// let mut state = AggregateState::new(Duration::ZERO);
/// let (changed, actions) = handle_event(&mut state, Event::Load);
/// assert!(changed);
/// assert_eq!(actions, vec![Action::FetchPage { epoch: 1, index: 1 }]);
/// ```
pub fn handle_event(state: &mut AggregateState, event: Event) -> (bool, Vec<Action>) {
    let _span = tracing::debug_span!("handle_event", event_type = event_name(&event)).entered();

    match event {
        Event::Load => {
            tracing::debug!(previous_epoch = state.epoch, "starting load");
            let action = state.begin_load();
            (true, vec![action])
        }
        Event::LoadNextPage => match state.begin_next_page(Instant::now()) {
            Some(action) => {
                tracing::debug!(cursor = state.cursor, epoch = state.epoch, "requesting next page");
                (true, vec![action])
            }
            None => (false, vec![]),
        },
        Event::UpdateQuery(text) => {
            if text == state.query {
                return (false, vec![]);
            }
            let action = state.set_query(text);
            tracing::debug!(
                query = %state.query,
                fetch_suggestions = action.is_some(),
                "query updated"
            );
            (true, action.into_iter().collect())
        }
        Event::ToggleFavorite(id) => {
            let cleared = state.clear_error(CommandKind::ToggleFavorite);
            (cleared, vec![Action::ToggleFavorite { id }])
        }
        Event::FavoritesChanged => (true, vec![]),
        Event::Completion(completion) => handle_completion(state, completion),
    }
}

fn handle_completion(state: &mut AggregateState, completion: Completion) -> (bool, Vec<Action>) {
    match completion {
        Completion::PageFetched { epoch, index, result } => {
            let applied = state.apply_page(epoch, index, result);
            if applied.is_committed() {
                tracing::debug!(
                    epoch,
                    index,
                    phase = ?state.phase,
                    pages = state.pages.len(),
                    "page completion applied"
                );
            }
            (applied.is_committed(), vec![])
        }
        Completion::SuggestionsFetched { query, result } => {
            let applied = state.apply_suggestions(&query, result);
            (applied.is_committed(), vec![])
        }
        Completion::FavoriteToggled { id, result } => match result {
            // The store broadcast already schedules the recompute.
            Ok(is_favorite) => {
                tracing::debug!(movie_id = id, is_favorite, "favorite toggled");
                (false, vec![])
            }
            Err(e) => {
                tracing::warn!(movie_id = id, error = %e, "favorite toggle failed");
                state.record_toggle_failure(&e);
                (true, vec![])
            }
        },
    }
}

const fn event_name(event: &Event) -> &'static str {
    match event {
        Event::Load => "load",
        Event::LoadNextPage => "load_next_page",
        Event::UpdateQuery(_) => "update_query",
        Event::ToggleFavorite(_) => "toggle_favorite",
        Event::FavoritesChanged => "favorites_changed",
        Event::Completion(Completion::PageFetched { .. }) => "page_fetched",
        Event::Completion(Completion::SuggestionsFetched { .. }) => "suggestions_fetched",
        Event::Completion(Completion::FavoriteToggled { .. }) => "favorite_toggled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Phase;
    use crate::domain::{Movie, Page, ReelError};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn dune_and_nope() -> Page {
        let date = NaiveDate::from_ymd_opt(2022, 7, 22).unwrap();
        Page::new(1, vec![Movie::new(1, "Dune", date), Movie::new(2, "Nope", date)], 1)
    }

    fn loaded() -> AggregateState {
        let mut state = AggregateState::new(Duration::ZERO);
        handle_event(&mut state, Event::Load);
        handle_event(
            &mut state,
            Event::Completion(Completion::PageFetched {
                epoch: 1,
                index: 1,
                result: Ok(dune_and_nope()),
            }),
        );
        state
    }

    #[test]
    fn query_filters_only_past_threshold() {
        let mut state = loaded();
        let favorites = BTreeSet::new();
        let full = state.view(&favorites).items;

        handle_event(&mut state, Event::UpdateQuery("du".into()));
        assert_eq!(state.view(&favorites).items, full);

        let (_, actions) = handle_event(&mut state, Event::UpdateQuery("dun".into()));
        assert_eq!(actions, vec![Action::FetchSuggestions { query: "dun".into() }]);
        let ids: Vec<i64> = state.view(&favorites).items.iter().map(|i| i.movie.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn same_query_is_not_a_transition() {
        let mut state = loaded();
        handle_event(&mut state, Event::UpdateQuery("dune".into()));
        assert_eq!(handle_event(&mut state, Event::UpdateQuery("dune".into())), (false, vec![]));
    }

    #[test]
    fn toggle_emits_store_action_without_view_change() {
        let mut state = loaded();
        let (changed, actions) = handle_event(&mut state, Event::ToggleFavorite(2));
        assert!(!changed);
        assert_eq!(actions, vec![Action::ToggleFavorite { id: 2 }]);
    }

    #[test]
    fn failed_toggle_surfaces_error() {
        let mut state = loaded();
        let (changed, _) = handle_event(
            &mut state,
            Event::Completion(Completion::FavoriteToggled {
                id: 2,
                result: Err(ReelError::Storage("disk full".into())),
            }),
        );
        assert!(changed);
        assert_eq!(state.last_error.as_ref().unwrap().command, CommandKind::ToggleFavorite);
        assert_eq!(state.phase, Phase::Ready);
    }

    #[test]
    fn stale_page_completion_is_not_a_transition() {
        let mut state = loaded();
        handle_event(&mut state, Event::Load);
        let (changed, _) = handle_event(
            &mut state,
            Event::Completion(Completion::PageFetched {
                epoch: 1,
                index: 1,
                result: Ok(dune_and_nope()),
            }),
        );
        assert!(!changed);
        assert_eq!(state.phase, Phase::Loading);
    }
}
