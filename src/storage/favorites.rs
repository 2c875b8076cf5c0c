//! Persisted set of favorite movie IDs.
//!
//! [`FavoritesStore`] is shared by every engine session in the process. It owns
//! the favorite-ID set exclusively, serializes its own mutations behind a mutex,
//! persists each mutation before returning, and broadcasts a [`FavoritesChange`]
//! once the new state is durable.
//!
//! # Read policy
//!
//! The set is loaded lazily on first access. A missing or malformed blob reads as
//! an empty set; a backend read failure also reads as empty but is retried on the
//! next access instead of being cached.
//!
//! Once loaded, reads are served from a committed snapshot behind its own
//! `RwLock`. They never wait for a write to reach the backend and observe the
//! previous set until the write is durable. Only the very first read can touch
//! the backend.

use crate::domain::error::{ReelError, Result};
use crate::storage::backend::KeyValueStore;
use crate::storage::models::{FavoriteIdsRecord, FAVORITES_SLOT};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Capacity of the change notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Notification emitted after a favorites mutation became durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoritesChange {
    pub id: i64,
    pub is_favorite: bool,
}

/// App-wide store of favorite movie IDs.
///
/// # Examples
///
/// ```
/// use reelsync::storage::{FavoritesStore, MemoryStore};
///
/// let store = FavoritesStore::new(MemoryStore::new());
/// store.add(7)?;
/// store.add(7)?;
/// assert!(store.contains(7));
/// store.remove(7)?;
/// assert!(store.list_ids().is_empty());
/// # Ok::<(), reelsync::ReelError>(())
/// ```
pub struct FavoritesStore {
    /// Held for the whole read-modify-persist cycle of a mutation.
    backend: Mutex<Box<dyn KeyValueStore>>,
    /// Last durable set. `None` until the first successful load.
    committed: RwLock<Option<BTreeSet<i64>>>,
    changes: broadcast::Sender<FavoritesChange>,
}

impl FavoritesStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            backend: Mutex::new(Box::new(backend)),
            committed: RwLock::new(None),
            changes,
        }
    }

    /// Subscribes to change notifications.
    ///
    /// Only mutations that changed the persisted set are broadcast.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FavoritesChange> {
        self.changes.subscribe()
    }

    /// Returns the current favorite IDs.
    #[must_use]
    pub fn list_ids(&self) -> BTreeSet<i64> {
        if let Some(ids) = self.snapshot() {
            return ids;
        }
        let backend = self.lock();
        self.load(&**backend)
    }

    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.list_ids().contains(&id)
    }

    /// Marks `id` as favorite. Adding an ID that is already present is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Storage`] if the new set could not be persisted; the
    /// set is unchanged in that case.
    pub fn add(&self, id: i64) -> Result<()> {
        self.mutate(id, |_| true)?;
        Ok(())
    }

    /// Removes `id` from the favorites. Removing an absent ID is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Storage`] if the new set could not be persisted; the
    /// set is unchanged in that case.
    pub fn remove(&self, id: i64) -> Result<()> {
        self.mutate(id, |_| false)?;
        Ok(())
    }

    /// Flips `id` and returns whether it is a favorite afterwards.
    ///
    /// The decision and the write happen under one lock, so concurrent toggles
    /// of the same ID always alternate.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Storage`] if the new set could not be persisted; the
    /// set is unchanged in that case.
    pub fn toggle(&self, id: i64) -> Result<bool> {
        self.mutate(id, |present| !present)
    }

    /// Sets `id` to `target(currently_present)` and returns the new state.
    fn mutate(&self, id: i64, target: impl FnOnce(bool) -> bool) -> Result<bool> {
        let mut backend = self.lock();
        let mut ids = self.load(&**backend);
        let is_favorite = target(ids.contains(&id));

        let _span = tracing::debug_span!("favorites_mutate", id, is_favorite).entered();

        let changed = if is_favorite { ids.insert(id) } else { ids.remove(&id) };
        if !changed {
            tracing::debug!("favorites already in requested state");
            return Ok(is_favorite);
        }

        let blob = FavoriteIdsRecord::encode(&ids)
            .map_err(|e| ReelError::Storage(format!("failed to encode favorites: {e}")))?;

        if let Err(e) = backend.set(FAVORITES_SLOT, &blob) {
            tracing::warn!(error = %e, "failed to persist favorites");
            return Err(match e {
                ReelError::Storage(_) => e,
                other => ReelError::Storage(other.to_string()),
            });
        }

        self.commit(ids);
        drop(backend);

        // No receivers is fine: nobody is looking at a view right now.
        let _ = self.changes.send(FavoritesChange { id, is_favorite });
        tracing::debug!("favorites persisted");
        Ok(is_favorite)
    }

    /// Returns the committed set, reading the backend if nothing is loaded yet.
    ///
    /// Callers hold the backend lock, so at most one load runs at a time.
    fn load(&self, backend: &dyn KeyValueStore) -> BTreeSet<i64> {
        if let Some(ids) = self.snapshot() {
            return ids;
        }

        match backend.get(FAVORITES_SLOT) {
            Ok(Some(blob)) => {
                let ids = FavoriteIdsRecord::parse(&blob).unwrap_or_else(|| {
                    tracing::warn!(
                        slot = FAVORITES_SLOT,
                        "favorites blob is malformed, treating as empty"
                    );
                    BTreeSet::new()
                });
                tracing::debug!(count = ids.len(), "favorites loaded");
                self.commit(ids.clone());
                ids
            }
            Ok(None) => {
                tracing::debug!("no favorites stored yet");
                self.commit(BTreeSet::new());
                BTreeSet::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read favorites, treating as empty");
                BTreeSet::new()
            }
        }
    }

    fn snapshot(&self) -> Option<BTreeSet<i64>> {
        self.committed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn commit(&self, ids: BTreeSet<i64>) {
        *self.committed.write().unwrap_or_else(PoisonError::into_inner) = Some(ids);
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn KeyValueStore>> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore").finish_non_exhaustive()
    }
}
