//! JSON file-based storage backend.
//!
//! This module provides a simple, human-readable slot store using JSON
//! serialization. It uses atomic file writes (write-to-temp + rename) so the file
//! is never observed half written.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(1) - the whole file is loaded into memory once
//! - **Write**: O(n) - serializes and writes every slot
//! - **Best for**: a handful of small slots, infrequent writes

use crate::domain::error::{ReelError, Result};
use crate::storage::backend::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// JSON storage container format.
///
/// Top-level structure serialized to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    /// Version of the storage format for future migrations.
    version: u32,

    /// Named slots and their string values.
    #[serde(default)]
    slots: BTreeMap<String, String>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            slots: BTreeMap::new(),
        }
    }
}

/// JSON file slot store.
///
/// Keeps every slot in memory and rewrites the file on each `set`.
///
/// # Thread Safety
///
/// This type is `Send` but not `Sync`. The favorites store wraps it in a mutex.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "slots": {
///     "favorite_movie_ids": "{\"ids\":[2,7]}"
///   }
/// }
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    /// Path to the JSON file on disk.
    file_path: PathBuf,

    /// In-memory copy of the file, loaded on creation.
    data: StorageData,
}

impl JsonFileStore {
    /// Creates or opens a JSON slot store.
    ///
    /// If the file exists its slots are loaded. A file that cannot be parsed is
    /// treated as empty and replaced on the next write, so a damaged file never
    /// prevents startup. Parent directories are created automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - File exists but cannot be read (permissions)
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON slot store");

        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty store");
            StorageData::default()
        };

        tracing::debug!(slot_count = data.slots.len(), "slot store initialized");

        Ok(Self { file_path, data })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<StorageData> {
        let contents = std::fs::read_to_string(path)?;
        match serde_json::from_str::<StorageData>(&contents) {
            Ok(data) => {
                tracing::debug!(
                    version = data.version,
                    slots = data.slots.len(),
                    "loaded slot data"
                );
                Ok(data)
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "slot file is corrupt, starting empty");
                Ok(StorageData::default())
            }
        }
    }

    /// Writes `data` to disk using an atomic rename.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or renamed.
    fn save_to_file(&self, data: &StorageData) -> Result<()> {
        tracing::debug!(path = ?self.file_path, "saving slot data");

        let json = serde_json::to_string_pretty(data)
            .map_err(|e| ReelError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;

        tracing::trace!("renaming temporary file to final location");
        std::fs::rename(&tmp_path, &self.file_path)?;

        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _span = tracing::debug_span!("json_get", key = %key).entered();

        let value = self.data.slots.get(key).cloned();
        tracing::debug!(found = value.is_some(), "slot lookup complete");
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_set", key = %key, len = value.len()).entered();

        // Commit in memory only once the file write went through.
        let mut next = self.data.clone();
        next.slots.insert(key.to_string(), value.to_string());
        self.save_to_file(&next)?;
        self.data = next;

        tracing::debug!("slot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = JsonFileStore::new(path.clone()).unwrap();
        store.set("favorite_movie_ids", r#"{"ids":[1]}"#).unwrap();
        drop(store);

        let reopened = JsonFileStore::new(path).unwrap();
        assert_eq!(
            reopened.get("favorite_movie_ids").unwrap().as_deref(),
            Some(r#"{"ids":[1]}"#)
        );
        assert_eq!(reopened.get("missing").unwrap(), None);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut store = JsonFileStore::new(path.clone()).unwrap();
        assert_eq!(store.get("favorite_movie_ids").unwrap(), None);

        store.set("favorite_movie_ids", "[]").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"version\": 1"));
        assert!(!path.with_extension("tmp").exists());
    }
}
