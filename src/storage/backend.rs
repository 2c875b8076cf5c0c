//! Storage backend abstraction.
//!
//! This module defines the [`KeyValueStore`] trait that abstracts over the place
//! where named blobs are persisted. The favorites store keeps its whole state in
//! one named slot, so a backend only has to read and replace string values.
//!
//! # Design Philosophy
//!
//! The trait is minimal and maps directly to what the favorites store needs: read
//! one slot, overwrite one slot. There is no merge and no partial update; the last
//! writer wins.

use crate::domain::error::Result;

/// Abstraction over persistent key-value backends.
///
/// Implementations are driven from behind the favorites store's lock, so they only
/// need to be `Send`.
///
/// # Implementations
///
/// - [`JsonFileStore`](crate::storage::JsonFileStore): JSON file with atomic writes (default)
/// - [`MemoryStore`](crate::storage::MemoryStore): in-process map, nothing survives a restart
///
/// # Examples
///
/// ```no_run
/// use reelsync::storage::{JsonFileStore, KeyValueStore};
/// use std::path::PathBuf;
///
/// let mut store = JsonFileStore::new(PathBuf::from("/tmp/reelsync.json"))?;
/// store.set("greeting", "hello")?;
/// assert_eq!(store.get("greeting")?.as_deref(), Some("hello"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait KeyValueStore: Send {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the slot has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    ///
    /// The value must be durable when this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write could not be made durable. The previous value
    /// stays in place in that case.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}
