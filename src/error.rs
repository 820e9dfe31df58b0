//! Error types for the data layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Storage Error Enum ==
/// Failures of the durable cache medium.
///
/// The durable tier is a best-effort optimization, so these errors stop at
/// the cache boundary: callers of the cache facade see a log line and a
/// memory-only entry, never an `Err`.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data did not serialize or parse as JSON
    #[error("storage encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

// == Api Error Enum ==
/// Unified error type for remote document API calls.
///
/// Unlike [`StorageError`], these propagate: a failed fetch or mutation is
/// reported to the caller through the adapter's own result, and the cache
/// is left untouched.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network-level failure reaching the endpoint
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("api responded {status}: {message}")]
    Api { status: u16, message: String },

    /// Requested document does not exist
    #[error("document not found: {0}")]
    NotFound(String),

    /// A response or payload did not match the expected shape
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

// == Result Type Aliases ==
/// Convenience Result type for durable storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Convenience Result type for remote document API calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
