//! Remote catalog layer.
//!
//! # Modules
//!
//! - `client`: [`CatalogClient`] trait consumed by the engine
//! - `schema`: Wire types of the remote API and their conversion into pages
//! - `tmdb`: HTTP implementation of the client
//! - `image`: Lazily-loaded poster image handles

pub mod client;
pub mod image;
pub mod schema;
pub mod tmdb;

pub use client::CatalogClient;
pub use image::{HttpImageFetcher, ImageFetcher, ImageResource};
pub use tmdb::{TmdbCatalog, TmdbSettings};
