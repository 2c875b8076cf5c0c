//! Aggregate state owned by the engine.
//!
//! [`AggregateState`] is the single source of truth for everything the engine
//! knows that is not a favorite: fetched pages, the pagination cursor, the raw
//! query, the suggestion gate and the phase of the load state machine. It is
//! only mutated from the engine's serialization context, through the methods
//! below, each of which either applies completely or not at all.
//!
//! # Pages
//!
//! Pages are kept in a contiguous `Vec` where position `n` holds page `n + 1`.
//! A page is appended only when its index is exactly one past the last stored
//! page, so the list can never contain gaps or duplicates.
//!
//! # Epochs
//!
//! Every `load` bumps `epoch`. Page fetches carry the epoch they were issued
//! under and completions from an older epoch are dropped. This is what keeps a
//! slow page 2 of a previous session from landing after a reset.

use crate::app::actions::Action;
use crate::app::modes::{CommandFailure, CommandKind, Phase};
use crate::app::projection::{self, MovieListView};
use crate::app::throttle::Throttle;
use crate::domain::{Movie, MovieHandle, Page, ReelError, SearchSuggestion};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::Instant;

/// A fetched item paired with its process-local handle.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    pub handle: MovieHandle,
    pub movie: Movie,
}

/// A page as stored in the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPage {
    pub index: u32,
    pub entries: Vec<PageEntry>,
}

impl StoredPage {
    /// Wraps every movie of `page` with a freshly generated handle.
    #[must_use]
    pub fn from_page(page: Page) -> Self {
        let entries = page
            .movies
            .into_iter()
            .map(|movie| PageEntry {
                handle: MovieHandle::generate(),
                movie,
            })
            .collect();

        Self {
            index: page.index,
            entries,
        }
    }
}

/// Outcome of offering a completion to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The completion was committed.
    Committed,
    /// The completion no longer matched the state and was dropped.
    Discarded,
}

impl Applied {
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Mutable state of one engine.
#[derive(Debug, Clone)]
pub struct AggregateState {
    /// Fetched pages; `pages[n].index == n + 1`.
    pub pages: Vec<StoredPage>,

    /// Index of the highest page fetched or being fetched. `0` before any load.
    pub cursor: u32,

    /// Page count reported by the catalog with the most recent page.
    pub total_pages: Option<u32>,

    /// Raw query text as last set by the presenter.
    pub query: String,

    pub phase: Phase,

    /// Incremented by every `load`.
    pub epoch: u64,

    pub last_error: Option<CommandFailure>,

    /// Normalized query the current suggestions belong to, if any.
    suggestion_query: Option<String>,

    /// Normalized queries with a suggestion fetch still running.
    suggestions_in_flight: BTreeSet<String>,

    suggestions: Vec<SearchSuggestion>,

    next_page_throttle: Throttle,
}

impl AggregateState {
    #[must_use]
    pub fn new(next_page_cooldown: Duration) -> Self {
        Self {
            pages: Vec::new(),
            cursor: 0,
            total_pages: None,
            query: String::new(),
            phase: Phase::Idle,
            epoch: 0,
            last_error: None,
            suggestion_query: None,
            suggestions_in_flight: BTreeSet::new(),
            suggestions: Vec::new(),
            next_page_throttle: Throttle::new(next_page_cooldown),
        }
    }

    /// Whether the catalog has pages beyond the cursor.
    ///
    /// Unknown until the first page arrives, in which case more is assumed.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.total_pages.map_or(true, |total| self.cursor < total)
    }

    /// Starts a fresh session at page 1.
    ///
    /// Accepted from every phase. Discards all pages and invalidates every
    /// page fetch still in flight.
    pub fn begin_load(&mut self) -> Action {
        self.epoch += 1;
        self.pages.clear();
        self.cursor = 1;
        self.total_pages = None;
        self.phase = Phase::Loading;
        self.clear_error(CommandKind::Load);
        self.clear_error(CommandKind::LoadNextPage);
        self.next_page_throttle.reset();

        Action::FetchPage {
            epoch: self.epoch,
            index: 1,
        }
    }

    /// Advances the cursor and requests the next page.
    ///
    /// Returns `None` when the request is dropped: outside `Ready`, past the
    /// last page, or inside the throttle interval.
    pub fn begin_next_page(&mut self, now: Instant) -> Option<Action> {
        if self.phase != Phase::Ready {
            tracing::debug!(phase = ?self.phase, "next page ignored outside ready phase");
            return None;
        }

        if !self.has_more() {
            tracing::debug!(cursor = self.cursor, "next page ignored at end of catalog");
            return None;
        }

        if !self.next_page_throttle.try_acquire(now) {
            tracing::debug!(cursor = self.cursor, "next page throttled");
            return None;
        }

        self.cursor += 1;
        self.phase = Phase::LoadingMore;
        self.clear_error(CommandKind::LoadNextPage);

        Some(Action::FetchPage {
            epoch: self.epoch,
            index: self.cursor,
        })
    }

    /// Applies the outcome of a page fetch.
    pub fn apply_page(
        &mut self,
        epoch: u64,
        index: u32,
        result: Result<Page, ReelError>,
    ) -> Applied {
        if epoch != self.epoch {
            tracing::debug!(epoch, current = self.epoch, index, "discarding page from stale load");
            return Applied::Discarded;
        }

        if index != self.cursor {
            tracing::debug!(index, cursor = self.cursor, "discarding page for unexpected index");
            return Applied::Discarded;
        }

        match (self.phase, result) {
            (Phase::Loading, Ok(page)) => {
                self.total_pages = Some(page.total_pages);
                self.pages = vec![StoredPage::from_page(page)];
                self.phase = Phase::Ready;
                Applied::Committed
            }
            (Phase::Loading, Err(e)) => {
                tracing::warn!(error = %e, "initial page load failed");
                self.pages.clear();
                self.cursor = 0;
                self.total_pages = None;
                self.phase = Phase::Idle;
                self.last_error = Some(CommandFailure::new(CommandKind::Load, &e));
                Applied::Committed
            }
            (Phase::LoadingMore, Ok(page)) => {
                let expected = u32::try_from(self.pages.len()).map_or(u32::MAX, |len| len + 1);
                if page.index != expected {
                    tracing::warn!(index = page.index, expected, "page does not extend the list");
                    self.cursor -= 1;
                    self.phase = Phase::Ready;
                    return Applied::Committed;
                }
                self.total_pages = Some(page.total_pages);
                self.pages.push(StoredPage::from_page(page));
                self.phase = Phase::Ready;
                Applied::Committed
            }
            (Phase::LoadingMore, Err(e)) => {
                tracing::warn!(index, error = %e, "next page load failed, rolling back cursor");
                self.cursor -= 1;
                self.phase = Phase::Ready;
                self.last_error = Some(CommandFailure::new(CommandKind::LoadNextPage, &e));
                Applied::Committed
            }
            (phase, _) => {
                tracing::debug!(?phase, index, "discarding page outside a loading phase");
                Applied::Discarded
            }
        }
    }

    /// Stores the raw query and decides whether suggestions must be fetched.
    ///
    /// A fetch is requested only when the query passes the filter threshold,
    /// its normalized form differs from the one already requested, and no
    /// fetch for that normalized form is still running. A running fetch is
    /// adopted instead: its result lands once it arrives. Short queries clear
    /// the suggestions.
    pub fn set_query(&mut self, text: String) -> Option<Action> {
        self.query = text;

        let Some(normalized) = projection::active_filter(&self.query) else {
            self.suggestion_query = None;
            self.suggestions.clear();
            return None;
        };

        if self.suggestion_query.as_deref() == Some(normalized.as_str()) {
            return None;
        }

        self.suggestion_query = Some(normalized.clone());
        self.suggestions.clear();
        self.clear_error(CommandKind::FetchSuggestions);

        if !self.suggestions_in_flight.insert(normalized.clone()) {
            tracing::debug!(query = %normalized, "suggestion fetch already running");
            return None;
        }

        Some(Action::FetchSuggestions { query: normalized })
    }

    /// Applies fetched suggestions if they still belong to the current query.
    pub fn apply_suggestions(
        &mut self,
        query: &str,
        result: Result<Vec<SearchSuggestion>, ReelError>,
    ) -> Applied {
        self.suggestions_in_flight.remove(query);

        if self.suggestion_query.as_deref() != Some(query) {
            tracing::debug!(query, "discarding suggestions for a superseded query");
            return Applied::Discarded;
        }

        match result {
            Ok(suggestions) => self.suggestions = suggestions,
            Err(e) => {
                tracing::warn!(query, error = %e, "suggestion fetch failed");
                // Allow the same query to be retried.
                self.suggestion_query = None;
                self.last_error = Some(CommandFailure::new(CommandKind::FetchSuggestions, &e));
            }
        }
        Applied::Committed
    }

    /// Records a failed favorite toggle.
    pub fn record_toggle_failure(&mut self, error: &ReelError) {
        self.last_error = Some(CommandFailure::new(CommandKind::ToggleFavorite, error));
    }

    /// Clears the error signal if it belongs to `command`. Returns whether it did.
    pub fn clear_error(&mut self, command: CommandKind) -> bool {
        let matches = self.last_error.as_ref().is_some_and(|e| e.command == command);
        if matches {
            self.last_error = None;
        }
        matches
    }

    #[must_use]
    pub fn suggestions(&self) -> &[SearchSuggestion] {
        &self.suggestions
    }

    /// Builds the presenter snapshot against the given favorite ids.
    #[must_use]
    pub fn view(&self, favorites: &BTreeSet<i64>) -> MovieListView {
        MovieListView {
            items: projection::project(&self.pages, &self.query, favorites),
            query: self.query.clone(),
            phase: self.phase,
            page_count: u32::try_from(self.pages.len()).unwrap_or(u32::MAX),
            has_more: self.has_more(),
            suggestions: self.suggestions.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn page(index: u32, ids: &[i64], total_pages: u32) -> Page {
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let movies = ids
            .iter()
            .map(|id| Movie::new(*id, format!("Movie {id}"), date))
            .collect();
        Page::new(index, movies, total_pages)
    }

    fn ready_state() -> AggregateState {
        let mut state = AggregateState::new(Duration::ZERO);
        state.begin_load();
        assert!(state.apply_page(1, 1, Ok(page(1, &[1, 2], 3))).is_committed());
        state
    }

    #[test]
    fn load_requests_first_page_of_new_epoch() {
        let mut state = AggregateState::new(Duration::ZERO);
        assert_eq!(state.begin_load(), Action::FetchPage { epoch: 1, index: 1 });
        assert_eq!(state.phase, Phase::Loading);
        assert_eq!(state.begin_load(), Action::FetchPage { epoch: 2, index: 1 });
    }

    #[test]
    fn stale_epoch_is_discarded() {
        let mut state = AggregateState::new(Duration::ZERO);
        state.begin_load();
        state.begin_load();

        let applied = state.apply_page(1, 1, Ok(page(1, &[9], 1)));
        assert_eq!(applied, Applied::Discarded);
        assert!(state.pages.is_empty());
        assert_eq!(state.phase, Phase::Loading);
    }

    #[test]
    fn next_page_only_from_ready() {
        let mut state = AggregateState::new(Duration::ZERO);
        assert!(state.begin_next_page(Instant::now()).is_none());

        state.begin_load();
        assert!(state.begin_next_page(Instant::now()).is_none());
    }

    #[test]
    fn next_page_appends_in_order() {
        let mut state = ready_state();
        let action = state.begin_next_page(Instant::now());
        assert_eq!(action, Some(Action::FetchPage { epoch: 1, index: 2 }));
        assert_eq!(state.phase, Phase::LoadingMore);

        state.apply_page(1, 2, Ok(page(2, &[3], 3)));
        let indices: Vec<u32> = state.pages.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(state.phase, Phase::Ready);
    }

    #[test]
    fn failed_next_page_rolls_back_cursor() {
        let mut state = ready_state();
        state.begin_next_page(Instant::now());

        state.apply_page(1, 2, Err(ReelError::Network("timeout".into())));
        assert_eq!(state.cursor, 1);
        assert_eq!(state.pages.len(), 1);
        assert_eq!(state.phase, Phase::Ready);

        let failure = state.last_error.clone().unwrap();
        assert_eq!(failure.command, CommandKind::LoadNextPage);
        assert!(failure.retryable);

        // Retrying asks for the same index and clears the error.
        assert_eq!(
            state.begin_next_page(Instant::now()),
            Some(Action::FetchPage { epoch: 1, index: 2 })
        );
        assert!(state.last_error.is_none());
    }

    #[test]
    fn failed_load_returns_to_idle_without_data() {
        let mut state = ready_state();
        state.begin_load();
        state.apply_page(2, 1, Err(ReelError::Decode("bad json".into())));

        assert_eq!(state.phase, Phase::Idle);
        assert!(state.pages.is_empty());
        assert_eq!(state.cursor, 0);
        assert!(!state.last_error.unwrap().retryable);
    }

    #[test]
    fn end_of_catalog_stops_pagination() {
        let mut state = AggregateState::new(Duration::ZERO);
        state.begin_load();
        state.apply_page(1, 1, Ok(page(1, &[1], 1)));

        assert!(!state.has_more());
        assert!(state.begin_next_page(Instant::now()).is_none());
    }

    #[test]
    fn throttle_drops_rapid_next_page() {
        let mut state = AggregateState::new(Duration::from_secs(3));
        state.begin_load();
        state.apply_page(1, 1, Ok(page(1, &[1], 5)));

        let start = Instant::now();
        assert!(state.begin_next_page(start).is_some());
        state.apply_page(1, 2, Ok(page(2, &[2], 5)));
        assert!(state.begin_next_page(start + Duration::from_secs(1)).is_none());
        assert!(state.begin_next_page(start + Duration::from_secs(3)).is_some());
    }

    #[test]
    fn duplicate_queries_request_suggestions_once() {
        let mut state = AggregateState::new(Duration::ZERO);
        assert_eq!(
            state.set_query("Dune".into()),
            Some(Action::FetchSuggestions { query: "dune".into() })
        );
        assert_eq!(state.set_query(" dune ".into()), None);
        assert_eq!(state.set_query("du".into()), None);
        assert_eq!(state.set_query("dune".into()), None);

        state.apply_suggestions("dune", Ok(vec![SearchSuggestion::new("Dune")]));
        state.set_query("du".into());
        assert!(state.set_query("dune".into()).is_some());
    }

    #[test]
    fn returning_to_a_running_query_adopts_its_fetch() {
        let mut state = AggregateState::new(Duration::ZERO);
        assert!(state.set_query("dun".into()).is_some());
        assert!(state.set_query("dune".into()).is_some());
        assert_eq!(state.set_query("dun".into()), None);

        let stale = state.apply_suggestions("dune", Ok(vec![SearchSuggestion::new("Dune")]));
        assert_eq!(stale, Applied::Discarded);
        let applied = state.apply_suggestions("dun", Ok(vec![SearchSuggestion::new("Dunkirk")]));
        assert!(applied.is_committed());
        assert_eq!(state.suggestions(), &[SearchSuggestion::new("Dunkirk")]);

        // Both fetches have finished, so a later change of mind fetches again.
        assert!(state.set_query("dune".into()).is_some());
    }

    #[test]
    fn failed_suggestions_release_the_query_for_retry() {
        let mut state = AggregateState::new(Duration::ZERO);
        state.set_query("dune".into());
        state.apply_suggestions("dune", Err(ReelError::Network("offline".into())));

        assert_eq!(state.last_error.clone().unwrap().command, CommandKind::FetchSuggestions);
        assert!(state.set_query("Dune".into()).is_some());
    }

    #[test]
    fn superseded_suggestions_are_dropped() {
        let mut state = AggregateState::new(Duration::ZERO);
        state.set_query("dun".into());
        state.set_query("dune".into());

        let stale = state.apply_suggestions("dun", Ok(vec![SearchSuggestion::new("Dunkirk")]));
        assert_eq!(stale, Applied::Discarded);

        state.apply_suggestions("dune", Ok(vec![SearchSuggestion::new("Dune")]));
        assert_eq!(state.suggestions(), &[SearchSuggestion::new("Dune")]);
    }
}
