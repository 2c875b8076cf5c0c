//! Lazily-loaded poster images.
//!
//! An [`ImageResource`] is a descriptor: it knows where the image lives and how
//! to fetch it, but holds no bytes until [`ImageResource::load`] is awaited. A
//! failed load only affects that one image.

use crate::domain::error::{ReelError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Fetches raw image bytes from a URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ReelError::Network`] when the image cannot be downloaded.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Handle to a not-yet-fetched image.
#[derive(Clone)]
pub struct ImageResource {
    url: String,
    fetcher: Arc<dyn ImageFetcher>,
}

impl ImageResource {
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Downloads the image bytes.
    ///
    /// # Errors
    ///
    /// Propagates the fetcher's error for this image only.
    pub async fn load(&self) -> Result<Vec<u8>> {
        let bytes = self.fetcher.fetch(&self.url).await?;
        tracing::debug!(url = %self.url, size = bytes.len(), "image loaded");
        Ok(bytes)
    }
}

impl std::fmt::Debug for ImageResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResource")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// [`ImageFetcher`] backed by an HTTP client.
///
/// Poster URLs are public, so no authorization header is attached.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    /// # Errors
    ///
    /// Returns [`ReelError::Config`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReelError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ReelError::Network(format!("image request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ReelError::Network(format!(
                "image server responded with {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ReelError::Network(format!("image download interrupted: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticFetcher;

    #[async_trait]
    impl ImageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            if url.ends_with("missing.jpg") {
                Err(ReelError::Network("404".to_string()))
            } else {
                Ok(vec![0xFF, 0xD8])
            }
        }
    }

    #[tokio::test]
    async fn failures_stay_local_to_one_image() {
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(StaticFetcher);
        let ok = ImageResource::new("https://img/a.jpg", fetcher.clone());
        let broken = ImageResource::new("https://img/missing.jpg", fetcher);

        assert!(broken.load().await.is_err());
        assert_eq!(ok.load().await.unwrap(), vec![0xFF, 0xD8]);
    }
}
