//! HTTP catalog client for a TMDB-compatible API.
//!
//! Endpoints used:
//!
//! - `GET {base}/3/movie/now_playing?page={n}&language={locale}`
//! - `GET {base}/3/search/movie?query={text}&page=1&language={locale}`
//!
//! A bearer token is attached when configured. Non-success statuses and transport
//! failures map to [`ReelError::Network`]; bodies that do not decode map to
//! [`ReelError::Decode`].

use crate::catalog::client::CatalogClient;
use crate::catalog::image::{HttpImageFetcher, ImageFetcher, ImageResource};
use crate::catalog::schema::{MovieListResponse, SearchResponse};
use crate::domain::error::{ReelError, Result};
use crate::domain::{Page, SearchSuggestion};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

const NOW_PLAYING_PATH: &str = "/3/movie/now_playing";
const SEARCH_PATH: &str = "/3/search/movie";

/// Connection settings for [`TmdbCatalog`].
#[derive(Debug, Clone)]
pub struct TmdbSettings {
    pub api_base_url: String,
    pub image_base_url: String,
    pub api_token: Option<String>,
    pub language: String,
    pub request_timeout: Duration,
}

/// [`CatalogClient`] talking to a TMDB-compatible HTTP API.
#[derive(Clone)]
pub struct TmdbCatalog {
    http: reqwest::Client,
    settings: TmdbSettings,
    images: Arc<dyn ImageFetcher>,
}

impl TmdbCatalog {
    /// Builds a client with its own HTTP connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Config`] if the HTTP client cannot be built.
    pub fn new(settings: TmdbSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| ReelError::Config(format!("failed to build HTTP client: {e}")))?;
        let images: Arc<dyn ImageFetcher> =
            Arc::new(HttpImageFetcher::new(settings.request_timeout)?);

        Ok(Self { http, settings, images })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.settings.api_base_url.trim_end_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self
            .http
            .get(self.endpoint(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query);

        if let Some(token) = &self.settings.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ReelError::Network(format!("request to {path} failed: {e}")))?;

        check_status(path, response.status())?;

        let body = response
            .text()
            .await
            .map_err(|e| ReelError::Network(format!("reading {path} body failed: {e}")))?;

        decode_body(path, &body)
    }
}

fn check_status(path: &str, status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ReelError::Network(format!("catalog responded with {status} for {path}")))
    }
}

fn decode_body<T: DeserializeOwned>(path: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| ReelError::Decode(format!("{path}: {e}")))
}

#[async_trait]
impl CatalogClient for TmdbCatalog {
    async fn fetch_page(&self, index: u32) -> Result<Page> {
        let response: MovieListResponse = self
            .get_json(
                NOW_PLAYING_PATH,
                &[
                    ("page", index.to_string()),
                    ("language", self.settings.language.clone()),
                ],
            )
            .await?;

        Ok(response.into_page(index))
    }

    async fn fetch_suggestions(&self, query: &str) -> Result<Vec<SearchSuggestion>> {
        let response: SearchResponse = self
            .get_json(
                SEARCH_PATH,
                &[
                    ("query", query.to_string()),
                    ("page", "1".to_string()),
                    ("language", self.settings.language.clone()),
                ],
            )
            .await?;

        Ok(response.into_suggestions())
    }

    fn resolve_image(&self, reference: &str) -> ImageResource {
        let url = format!("{}{reference}", self.settings.image_base_url.trim_end_matches('/'));
        ImageResource::new(url, self.images.clone())
    }
}

impl std::fmt::Debug for TmdbCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbCatalog")
            .field("api_base_url", &self.settings.api_base_url)
            .field("language", &self.settings.language)
            .finish_non_exhaustive()
    }
}
