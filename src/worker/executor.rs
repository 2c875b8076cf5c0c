//! Executes engine actions off the engine's context.
//!
//! Catalog requests run as plain tokio tasks. Favorite toggles touch the
//! favorites store, whose backend does blocking file I/O, so they run on the
//! blocking pool. Either way the result is posted back as a [`Completion`] and
//! the engine applies it in arrival order on its own loop.

use crate::app::Action;
use crate::catalog::CatalogClient;
use crate::domain::error::ReelError;
use crate::storage::FavoritesStore;
use crate::worker::messages::Completion;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Runs [`Action`]s and reports their outcome.
#[derive(Clone)]
pub struct ActionExecutor {
    catalog: Arc<dyn CatalogClient>,
    favorites: Arc<FavoritesStore>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl ActionExecutor {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        favorites: Arc<FavoritesStore>,
        completions: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            catalog,
            favorites,
            completions,
        }
    }

    /// Spawns the work for `action` and returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn execute(&self, action: Action) {
        match action {
            Action::FetchPage { epoch, index } => {
                let catalog = Arc::clone(&self.catalog);
                let completions = self.completions.clone();
                let span = tracing::debug_span!("fetch_page", epoch, index);

                tokio::spawn(
                    async move {
                        let result = catalog.fetch_page(index).await;
                        let completion = Completion::PageFetched { epoch, index, result };
                        report(&completions, completion);
                    }
                    .instrument(span),
                );
            }
            Action::FetchSuggestions { query } => {
                let catalog = Arc::clone(&self.catalog);
                let completions = self.completions.clone();
                let span = tracing::debug_span!("fetch_suggestions", query = %query);

                tokio::spawn(
                    async move {
                        let result = catalog.fetch_suggestions(&query).await;
                        report(&completions, Completion::SuggestionsFetched { query, result });
                    }
                    .instrument(span),
                );
            }
            Action::ToggleFavorite { id } => {
                let favorites = Arc::clone(&self.favorites);
                let completions = self.completions.clone();
                let span = tracing::debug_span!("toggle_favorite", movie_id = id);

                tokio::spawn(
                    async move {
                        let result = tokio::task::spawn_blocking(move || favorites.toggle(id))
                            .await
                            .unwrap_or_else(|e| {
                                Err(ReelError::Engine(format!("toggle task failed: {e}")))
                            });
                        report(&completions, Completion::FavoriteToggled { id, result });
                    }
                    .instrument(span),
                );
            }
        }
    }
}

/// Logs the outcome and posts the completion.
///
/// A closed channel means the engine shut down; the result is dropped.
fn report(completions: &mpsc::UnboundedSender<Completion>, completion: Completion) {
    if completion.is_failure() {
        tracing::debug!(completion = ?completion, "action failed");
    } else {
        tracing::debug!("action completed");
    }

    if completions.send(completion).is_err() {
        tracing::debug!("engine stopped before completion was delivered");
    }
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ImageResource;
    use crate::domain::{Page, SearchSuggestion};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    struct NoCatalog;

    #[async_trait]
    impl CatalogClient for NoCatalog {
        async fn fetch_page(&self, index: u32) -> crate::domain::error::Result<Page> {
            Err(ReelError::Network(format!("no page {index}")))
        }

        async fn fetch_suggestions(
            &self,
            _query: &str,
        ) -> crate::domain::error::Result<Vec<SearchSuggestion>> {
            Ok(Vec::new())
        }

        fn resolve_image(&self, reference: &str) -> ImageResource {
            unreachable!("no image for {reference}")
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn back_to_back_toggles_cancel_out() {
        let favorites = Arc::new(FavoritesStore::new(MemoryStore::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = ActionExecutor::new(Arc::new(NoCatalog), Arc::clone(&favorites), tx);

        for _ in 0..20 {
            executor.execute(Action::ToggleFavorite { id: 7 });
            executor.execute(Action::ToggleFavorite { id: 7 });
        }

        let mut added = 0;
        for _ in 0..40 {
            match rx.recv().await.unwrap() {
                Completion::FavoriteToggled { id: 7, result } => {
                    if result.unwrap() {
                        added += 1;
                    }
                }
                other => panic!("unexpected completion {other:?}"),
            }
        }

        assert_eq!(added, 20);
        assert!(!favorites.contains(7));
    }
}
