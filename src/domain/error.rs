//! Error types for the synchronization core.
//!
//! This module defines the centralized error type [`ReelError`] and a type alias
//! [`Result`] used throughout the crate. All errors are implemented using the
//! `thiserror` crate for automatic `Error` trait implementation.

use thiserror::Error;

/// The main error type for catalog, storage, and engine operations.
///
/// The variants follow the failure taxonomy of the core: transient transport
/// failures, malformed payloads, favorites persistence failures, and per-item
/// date parse failures. Infrastructure failures (I/O, configuration, a closed
/// engine) complete the set.
///
/// # Examples
///
/// ```
/// use reelsync::ReelError;
///
/// let err = ReelError::Network("connection reset".to_string());
/// assert!(err.is_retryable());
///
/// let err = ReelError::Decode("missing field `results`".to_string());
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Error)]
pub enum ReelError {
    /// The remote catalog could not be reached or answered with a failure status.
    ///
    /// Transient: surfaced to the caller, never retried inside the core.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote catalog answered with a payload that could not be decoded.
    ///
    /// Fatal for the request that produced it; existing aggregate state is untouched.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Reading or writing the favorites blob failed.
    ///
    /// Read failures are degraded to an empty set by the favorites store; write
    /// failures are surfaced so the view keeps showing the persisted truth.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A single item's release date did not match the catalog date format.
    #[error("Date parse error: {0}")]
    DateParse(String),

    /// Filesystem or I/O operation failed.
    ///
    /// Automatically converts from `std::io::Error` using the `#[from]` attribute.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or could not be read.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The aggregation engine is no longer running.
    ///
    /// Occurs when a command is issued through a handle after the engine task
    /// stopped, or when a reply channel was dropped.
    #[error("Engine error: {0}")]
    Engine(String),
}

impl ReelError {
    /// Returns `true` when the caller may reasonably retry the failed operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// A specialized `Result` type for crate operations.
pub type Result<T> = std::result::Result<T, ReelError>;
