//! Domain layer for the synchronization core.
//!
//! This module contains the core domain types, independent of the remote catalog
//! wire format and of the persistence backend.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`movie`]: Movie, page, handle, and suggestion types
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use reelsync::domain::{Movie, Page, Result};
//!
//! fn first_page() -> Result<Page> {
//!     let date = NaiveDate::from_ymd_opt(2021, 9, 15).unwrap();
//!     Ok(Page::new(1, vec![Movie::new(1, "Dune", date)], 1))
//! }
//! ```

pub mod error;
pub mod movie;

pub use error::{ReelError, Result};
pub use movie::{Movie, MovieHandle, Page, SearchSuggestion};
