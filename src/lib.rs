//! Reelsync: the reactive data-synchronization core of a movie catalog app.
//!
//! Reelsync sits between a presentation layer and two collaborators:
//! - a remote movie catalog, fetched page by page
//! - a locally persisted set of favorite movie ids
//!
//! It combines them into a single view that is ordered by page, filtered by the
//! search query, and annotated with favorites. The view stays consistent while
//! pages are appended, favorites are toggled, and the query changes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Presenter (external)                               │  ← Commands, view reads
//! └─────────────────────────────────────────────────────┘
//!                        │ EngineHandle
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling                                   │
//! │  - Pagination, epochs, throttling                   │
//! │  - Read-side projection                             │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Catalog Layer │   │ Storage Layer │   │ Worker Layer  │
//! │ (catalog/)    │   │ (storage/)    │   │ (worker/)     │
//! │ - HTTP client │   │ - JSON slots  │   │ - Executor    │
//! │ - Wire schema │   │ - Favorites   │   │ - Completions │
//! │ - Images      │   │ - Backend API │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Platform paths (infrastructure/)                 │
//! │  - Error types (domain/error)                       │
//! │  - Movie model (domain/movie)                       │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - OpenTelemetry tracing                            │
//! │  - File-based span export                           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Aggregation engine with its event/action model
//! - [`catalog`]: Remote catalog client and image handles
//! - [`domain`]: Core domain types (movies, pages, errors)
//! - [`infrastructure`]: Platform paths
//! - [`storage`]: Slot stores and the favorites store
//! - [`worker`]: Background execution of engine actions
//! - [`observability`]: OpenTelemetry tracing
//!
//! # Configuration
//!
//! [`Config`] can be built from a string map or from TOML:
//!
//! ```toml
//! api_token = "eyJhbGciOi..."
//! language = "pl-PL"
//! favorites_path = "~/.config/movies/favorites.json"
//! next_page_cooldown_ms = 3000
//! trace_level = "reelsync=debug"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use reelsync::{initialize, Config};
//!
//! # async fn run() -> reelsync::Result<()> {
//! let config = Config::from_toml_str(r#"api_token = "secret""#)?;
//! let engine = initialize(&config)?;
//!
//! let mut views = engine.subscribe().await?;
//! engine.load()?;
//! engine.update_query("dune")?;
//!
//! while let Some(view) = views.next().await {
//!     for item in &view.items {
//!         println!("{} {}", if item.is_favorite { "★" } else { " " }, item.movie.title);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod catalog;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod storage;
pub mod worker;

pub use app::{
    CommandFailure, CommandKind, Engine, EngineConfig, EngineHandle, MovieListItem, MovieListView,
    Phase, ViewSubscription,
};
pub use catalog::{CatalogClient, ImageResource};
pub use domain::{Movie, MovieHandle, Page, ReelError, Result, SearchSuggestion};
pub use storage::FavoritesStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// File name of the favorites store inside the data directory.
pub const FAVORITES_FILE_NAME: &str = "favorites.json";

/// Runtime configuration.
///
/// Every field has a default, so an empty TOML document or map is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the catalog API. Default: `https://api.themoviedb.org`
    pub api_base_url: String,

    /// Base URL poster references are appended to.
    /// Default: `https://image.tmdb.org/t/p/original`
    pub image_base_url: String,

    /// Bearer token sent with every catalog request.
    pub api_token: Option<String>,

    /// Locale passed to the catalog. Default: `"en-US"`
    pub language: String,

    /// Location of the favorites file. `~` is expanded.
    /// Default: `<data dir>/favorites.json`
    pub favorites_path: Option<PathBuf>,

    /// Minimum interval between two accepted next-page requests. Default: 3000
    pub next_page_cooldown_ms: u64,

    /// Timeout of a single catalog or image request. Default: 10
    pub request_timeout_secs: u64,

    /// Tracing filter directive, overridden by `RUST_LOG`. Default: `"info"`
    pub trace_level: Option<String>,

    /// Trace output file. Default: `<data dir>/reelsync-traces.jsonl`
    pub trace_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.themoviedb.org".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/original".to_string(),
            api_token: None,
            language: "en-US".to_string(),
            favorites_path: None,
            next_page_cooldown_ms: 3000,
            request_timeout_secs: 10,
            trace_level: None,
            trace_file: None,
        }
    }
}

impl Config {
    /// Parses configuration from a string map.
    ///
    /// Unknown keys are ignored. Numeric values that do not parse and empty
    /// strings fall back to their defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use reelsync::Config;
    /// use std::collections::BTreeMap;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("language".to_string(), "pl-PL".to_string());
    /// map.insert("next_page_cooldown_ms".to_string(), "oops".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.language, "pl-PL");
    /// assert_eq!(config.next_page_cooldown_ms, 3000);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| {
            map.get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(String::from)
        };
        let number = |key: &str, fallback: u64| {
            text(key)
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(fallback)
        };

        Self {
            api_base_url: text("api_base_url").unwrap_or(defaults.api_base_url),
            image_base_url: text("image_base_url").unwrap_or(defaults.image_base_url),
            api_token: text("api_token"),
            language: text("language").unwrap_or(defaults.language),
            favorites_path: text("favorites_path").map(PathBuf::from),
            next_page_cooldown_ms: number("next_page_cooldown_ms", defaults.next_page_cooldown_ms),
            request_timeout_secs: number("request_timeout_secs", defaults.request_timeout_secs),
            trace_level: text("trace_level"),
            trace_file: text("trace_file").map(PathBuf::from),
        }
    }

    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Config`] if the document is not valid TOML or a
    /// value has the wrong type.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ReelError::Config(format!("invalid configuration: {e}")))
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Io`] if the file cannot be read and
    /// [`ReelError::Config`] if it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Resolved location of the favorites file.
    #[must_use]
    pub fn favorites_file(&self) -> PathBuf {
        self.favorites_path.as_ref().map_or_else(
            || infrastructure::get_data_dir().join(FAVORITES_FILE_NAME),
            |path| infrastructure::expand_tilde(&path.to_string_lossy()),
        )
    }

    #[must_use]
    pub fn tmdb_settings(&self) -> catalog::TmdbSettings {
        catalog::TmdbSettings {
            api_base_url: self.api_base_url.clone(),
            image_base_url: self.image_base_url.clone(),
            api_token: self.api_token.clone(),
            language: self.language.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            next_page_cooldown: Duration::from_millis(self.next_page_cooldown_ms),
        }
    }
}

/// Wires the HTTP catalog, the on-disk favorites store and an engine.
///
/// Must be called from within a tokio runtime. Tracing is not installed here;
/// call [`observability::init_tracing`] first if spans should be exported.
///
/// # Errors
///
/// - [`ReelError::Config`] if the HTTP client cannot be built
/// - [`ReelError::Io`] if the favorites directory cannot be created or the
///   favorites file cannot be read
pub fn initialize(config: &Config) -> Result<EngineHandle> {
    let favorites_file = config.favorites_file();
    tracing::debug!(
        api_base_url = %config.api_base_url,
        language = %config.language,
        favorites_file = %favorites_file.display(),
        "initializing reelsync"
    );

    let catalog = catalog::TmdbCatalog::new(config.tmdb_settings())?;
    let backend = storage::JsonFileStore::new(favorites_file)?;
    let favorites = Arc::new(FavoritesStore::new(backend));

    Ok(Engine::spawn(Arc::new(catalog), favorites, config.engine_config()))
}
