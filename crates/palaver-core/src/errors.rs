//! Collaborator-boundary errors.
//!
//! The context subsystem talks to two external collaborators — the message
//! store and the cache backend. Their failures are represented here and are
//! always absorbed at the history-loader boundary (logged, degraded to an
//! empty result); they never propagate out of the core.

use thiserror::Error;

/// Message store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("message store unavailable: {0}")]
    Unavailable(String),
    /// A persisted record could not be decoded.
    #[error("malformed message record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Cache backend failure.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache backend rejected or failed the operation.
    #[error("cache backend error: {0}")]
    Backend(String),
}
