//! Wire types of the remote catalog API.
//!
//! These mirror the JSON bodies of the "now playing" list endpoint and the movie
//! search endpoint. Unknown fields are ignored. Conversion into domain types
//! happens here so the rest of the crate never sees the wire format.

use crate::domain::movie::parse_release_date;
use crate::domain::{Movie, Page, SearchSuggestion};
use serde::Deserialize;

/// Body of `GET /3/movie/now_playing`.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieListResponse {
    pub page: u32,
    pub results: Vec<MovieRecord>,
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// One movie as returned by the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieRecord {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
}

/// Body of `GET /3/search/movie`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<SearchRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRecord {
    pub original_title: String,
}

impl MovieRecord {
    /// Converts the record into a domain movie.
    ///
    /// Returns `None` when the release date cannot be parsed; such items are
    /// dropped from their page.
    #[must_use]
    pub fn into_movie(self) -> Option<Movie> {
        let release_date = match parse_release_date(&self.release_date) {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!(
                    movie_id = self.id,
                    error = %e,
                    "dropping movie with unparseable release date"
                );
                return None;
            }
        };

        let title = if self.title.trim().is_empty() {
            self.original_title
        } else {
            self.title
        };

        #[allow(clippy::cast_possible_truncation)]
        let grade = self.vote_average as f32;

        Some(Movie {
            id: self.id,
            title,
            overview: self.overview,
            grade,
            release_date,
            poster_path: self.poster_path.or(self.backdrop_path),
        })
    }
}

impl MovieListResponse {
    /// Converts the response into the page stored under `index`.
    ///
    /// The requested index wins over the echoed `page` field.
    #[must_use]
    pub fn into_page(self, index: u32) -> Page {
        if self.page != index {
            tracing::debug!(
                requested = index,
                echoed = self.page,
                "catalog echoed a different page index"
            );
        }

        let received = self.results.len();
        let movies: Vec<Movie> = self
            .results
            .into_iter()
            .filter_map(MovieRecord::into_movie)
            .collect();

        tracing::debug!(
            index = index,
            received = received,
            kept = movies.len(),
            total_pages = self.total_pages,
            "page decoded"
        );

        Page::new(index, movies, self.total_pages)
    }
}

impl SearchResponse {
    #[must_use]
    pub fn into_suggestions(self) -> Vec<SearchSuggestion> {
        self.results
            .into_iter()
            .map(|record| SearchSuggestion::new(record.original_title))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_BODY: &str = r#"{
        "dates": {"maximum": "2023-12-20", "minimum": "2023-11-01"},
        "page": 1,
        "results": [
            {"adult": false, "backdrop_path": "/back.jpg", "genre_ids": [878], "id": 438631,
             "original_language": "en", "original_title": "Dune", "overview": "Spice.",
             "popularity": 100.5, "poster_path": null, "release_date": "2021-09-15",
             "title": "Diuna", "video": false, "vote_average": 7.8, "vote_count": 9000},
            {"id": 762430, "original_title": "Nope", "title": "", "overview": "",
             "poster_path": "/nope.jpg", "release_date": "", "vote_average": 6.9}
        ],
        "total_pages": 42,
        "total_results": 830
    }"#;

    #[test]
    fn list_response_decodes_into_page() {
        let response: MovieListResponse = serde_json::from_str(LIST_BODY).unwrap();
        let page = response.into_page(1);

        assert_eq!(page.index, 1);
        assert_eq!(page.total_pages, 42);
        // The second movie has no release date and is dropped.
        assert_eq!(page.movies.len(), 1);

        let dune = &page.movies[0];
        assert_eq!(dune.id, 438_631);
        assert_eq!(dune.title, "Diuna");
        assert_eq!(dune.poster_path.as_deref(), Some("/back.jpg"));
        assert!((dune.grade - 7.8).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_title_falls_back_to_original() {
        let record = MovieRecord {
            id: 1,
            title: "  ".to_string(),
            original_title: "Nope".to_string(),
            overview: String::new(),
            poster_path: Some("/p.jpg".to_string()),
            backdrop_path: Some("/b.jpg".to_string()),
            release_date: "2022-07-22".to_string(),
            vote_average: 0.0,
        };
        let movie = record.into_movie().unwrap();
        assert_eq!(movie.title, "Nope");
        assert_eq!(movie.poster_path.as_deref(), Some("/p.jpg"));
    }

    #[test]
    fn search_response_yields_original_titles() {
        let body = r#"{
            "page": 1,
            "results": [{"original_title": "Dune"}, {"original_title": "Dune: Part Two"}],
            "total_pages": 1,
            "total_results": 2
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let texts: Vec<String> = response.into_suggestions().into_iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["Dune", "Dune: Part Two"]);
    }
}
