//! Storage record models for the persistence layer.
//!
//! These types describe the serialized blob format and are kept separate from the
//! in-memory representation used by the favorites store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name of the storage slot holding the favorite IDs.
pub const FAVORITES_SLOT: &str = "favorite_movie_ids";

/// Serialized form of the favorites set.
///
/// ```json
/// {"ids":[2,7,13]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteIdsRecord {
    pub ids: Vec<i64>,
}

impl FavoriteIdsRecord {
    /// Parses a blob, returning `None` if it is malformed.
    ///
    /// Duplicate IDs in the blob collapse into one set entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use reelsync::storage::FavoriteIdsRecord;
    ///
    /// let ids = FavoriteIdsRecord::parse(r#"{"ids":[3,1,3]}"#).unwrap();
    /// assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    /// assert!(FavoriteIdsRecord::parse("garbage").is_none());
    /// ```
    #[must_use]
    pub fn parse(blob: &str) -> Option<BTreeSet<i64>> {
        serde_json::from_str::<Self>(blob)
            .ok()
            .map(|record| record.ids.into_iter().collect())
    }

    /// Serializes a set of IDs into the blob format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode(ids: &BTreeSet<i64>) -> serde_json::Result<String> {
        serde_json::to_string(&Self {
            ids: ids.iter().copied().collect(),
        })
    }
}
