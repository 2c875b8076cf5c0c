//! Catalog client abstraction.
//!
//! [`CatalogClient`] is the seam between the aggregation engine and the remote
//! movie catalog. The engine only depends on this trait; the HTTP implementation
//! lives in [`crate::catalog::tmdb`].

use crate::catalog::image::ImageResource;
use crate::domain::error::Result;
use crate::domain::{Page, SearchSuggestion};
use async_trait::async_trait;

/// Remote source of movie pages and search suggestions.
///
/// Implementations are stateless across calls: page caching is the engine's job.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetches one page of movies for a 1-based page index.
    ///
    /// # Errors
    ///
    /// - [`ReelError::Network`](crate::ReelError::Network) on transport failure (retryable)
    /// - [`ReelError::Decode`](crate::ReelError::Decode) on a malformed payload
    async fn fetch_page(&self, index: u32) -> Result<Page>;

    /// Fetches text suggestions for a partial query.
    ///
    /// Callers never pass an empty query.
    ///
    /// # Errors
    ///
    /// Same failure classes as [`CatalogClient::fetch_page`].
    async fn fetch_suggestions(&self, query: &str) -> Result<Vec<SearchSuggestion>>;

    /// Resolves a poster path fragment into a lazily-loaded image handle.
    ///
    /// Nothing is fetched until [`ImageResource::load`] is awaited.
    fn resolve_image(&self, reference: &str) -> ImageResource;
}
