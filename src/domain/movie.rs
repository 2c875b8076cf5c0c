//! Movie domain model.
//!
//! This module defines the catalog item type [`Movie`], the [`Page`] batch it is
//! fetched in, and the process-local [`MovieHandle`] that gives every fetched
//! item a stable identity for list diffing. The derived favorite flag is not part
//! of [`Movie`]: it is computed from the favorites store whenever a view is read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ReelError, Result};

/// Date format used by the catalog for release dates (`YYYY-MM-DD`).
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single catalog item.
///
/// `id` is assigned by the remote catalog and is stable across fetches. The
/// remaining fields are display data copied from the catalog response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub grade: f32,
    pub release_date: NaiveDate,
    /// Path fragment of the poster image, resolved through the catalog client.
    pub poster_path: Option<String>,
}

impl Movie {
    /// Creates a movie with empty display fields apart from `id`, `title`, and date.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use reelsync::Movie;
    ///
    /// let date = NaiveDate::from_ymd_opt(2021, 9, 15).unwrap();
    /// let movie = Movie::new(1, "Dune", date);
    /// assert_eq!(movie.title, "Dune");
    /// assert!(movie.poster_path.is_none());
    /// ```
    #[must_use]
    pub fn new(id: i64, title: impl Into<String>, release_date: NaiveDate) -> Self {
        Self {
            id,
            title: title.into(),
            overview: String::new(),
            grade: 0.0,
            release_date,
            poster_path: None,
        }
    }

    /// Case-insensitive substring match on the title.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn title_contains(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
    }
}

/// One fetched batch of movies at a 1-based page index.
///
/// Once fetched the movie list of a page is never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: u32,
    pub movies: Vec<Movie>,
    /// Total number of pages the catalog reports for this listing.
    pub total_pages: u32,
}

impl Page {
    #[must_use]
    pub const fn new(index: u32, movies: Vec<Movie>, total_pages: u32) -> Self {
        Self {
            index,
            movies,
            total_pages,
        }
    }
}

/// Process-local unique identity of a fetched item.
///
/// Generated once when a page enters the aggregate and kept for as long as the
/// page stays there. Two fetches of the same catalog item yield two handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MovieHandle(Uuid);

impl MovieHandle {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for MovieHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A text suggestion for a partially typed search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    pub text: String,
}

impl SearchSuggestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Parses a catalog release date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns [`ReelError::DateParse`] when the value is empty or malformed.
///
/// # Examples
///
/// ```
/// use reelsync::domain::movie::parse_release_date;
///
/// let date = parse_release_date("2023-10-18").unwrap();
/// assert_eq!(date.to_string(), "2023-10-18");
/// assert!(parse_release_date("").is_err());
/// ```
pub fn parse_release_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), RELEASE_DATE_FORMAT)
        .map_err(|e| ReelError::DateParse(format!("{value:?}: {e}")))
}
