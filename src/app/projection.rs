//! Read-side projection of the aggregate.
//!
//! [`project`] turns the fetched pages, the current query and the current set
//! of favorite ids into the ordered list a presenter renders. It holds no state
//! of its own: calling it twice with the same inputs yields equal item lists,
//! and the favorite flag always reflects the set passed in.

use crate::app::modes::{CommandFailure, Phase};
use crate::app::state::StoredPage;
use crate::domain::{Movie, MovieHandle, SearchSuggestion};
use serde::Serialize;
use std::collections::BTreeSet;

/// Queries whose trimmed length is at or below this many characters do not
/// filter the list and do not trigger suggestion fetches.
///
/// Leading and trailing whitespace is removed before counting, and the count
/// is in `char`s. `"a  "` is three characters long as typed but counts as one,
/// so it leaves the list unfiltered.
pub const QUERY_FILTER_THRESHOLD: usize = 2;

/// Trims and lowercases a query.
///
/// # Examples
///
/// ```
/// use reelsync::app::projection::normalize_query;
///
/// assert_eq!(normalize_query("  DUNE "), "dune");
/// ```
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Returns the normalized needle when `query` is long enough to filter.
///
/// # Examples
///
/// ```
/// use reelsync::app::projection::active_filter;
///
/// assert_eq!(active_filter("du"), None);
/// assert_eq!(active_filter("a  "), None);
/// assert_eq!(active_filter(" Dun"), Some("dun".to_string()));
/// ```
#[must_use]
pub fn active_filter(query: &str) -> Option<String> {
    let trimmed = query.trim();
    (trimmed.chars().count() > QUERY_FILTER_THRESHOLD).then(|| trimmed.to_lowercase())
}

/// One row of the projected list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieListItem {
    pub handle: MovieHandle,
    /// 1-based index of the page the item was fetched in.
    pub page: u32,
    pub movie: Movie,
    pub is_favorite: bool,
}

/// Projects pages into the filtered, favorite-annotated list.
///
/// Items keep page order and fetch order within each page.
#[must_use]
pub fn project(pages: &[StoredPage], query: &str, favorites: &BTreeSet<i64>) -> Vec<MovieListItem> {
    let needle = active_filter(query);

    pages
        .iter()
        .flat_map(|page| page.entries.iter().map(move |entry| (page.index, entry)))
        .filter(|(_, entry)| {
            needle
                .as_deref()
                .map_or(true, |needle| entry.movie.title_contains(needle))
        })
        .map(|(index, entry)| MovieListItem {
            handle: entry.handle,
            page: index,
            movie: entry.movie.clone(),
            is_favorite: favorites.contains(&entry.movie.id),
        })
        .collect()
}

/// Immutable snapshot handed to presenters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieListView {
    pub items: Vec<MovieListItem>,
    /// Raw query text as last set by the presenter.
    pub query: String,
    pub phase: Phase,
    /// Number of pages fetched so far.
    pub page_count: u32,
    /// `false` once the last page reported by the catalog is present.
    pub has_more: bool,
    /// Suggestions for the current normalized query, if any were fetched.
    pub suggestions: Vec<SearchSuggestion>,
    pub last_error: Option<CommandFailure>,
}

impl MovieListView {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    /// Groups the items into one section per page, in page order.
    ///
    /// Pages with no item left after filtering produce no section.
    #[must_use]
    pub fn sections(&self) -> Vec<(u32, Vec<&MovieListItem>)> {
        let mut sections: Vec<(u32, Vec<&MovieListItem>)> = Vec::new();
        for item in &self.items {
            match sections.last_mut() {
                Some((page, items)) if *page == item.page => items.push(item),
                _ => sections.push((item.page, vec![item])),
            }
        }
        sections
    }

    /// Finds the row of a catalog item.
    #[must_use]
    pub fn item(&self, id: i64) -> Option<&MovieListItem> {
        self.items.iter().find(|item| item.movie.id == id)
    }
}
