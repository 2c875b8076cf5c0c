//! Storage layer for persistent favorites.
//!
//! This module provides the slot-store abstraction used to persist the favorite
//! movie IDs and the app-wide [`FavoritesStore`] built on top of it.
//!
//! # Modules
//!
//! - `backend`: Slot store trait abstraction
//! - `json`: JSON file-based slot store
//! - `memory`: In-process slot store
//! - `models`: Serialized blob format
//! - `favorites`: Shared favorites store with change notifications

pub mod backend;
pub mod favorites;
pub mod json;
pub mod memory;
pub mod models;

pub use backend::KeyValueStore;
pub use favorites::{FavoritesChange, FavoritesStore};
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use models::{FavoriteIdsRecord, FAVORITES_SLOT};
