//! Hook crate errors.

use thiserror::Error;

/// Settings loading failure.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read hooks settings: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid JSON, or does not match the schema.
    #[error("invalid hooks settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Webhook dispatch failure.
#[derive(Debug, Error)]
pub enum HookError {
    /// The request could not be built or sent.
    #[error("webhook '{name}' request failed: {source}")]
    Request {
        /// Webhook name.
        name: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-success status.
    #[error("webhook '{name}' returned status {status}")]
    Status {
        /// Webhook name.
        name: String,
        /// HTTP status code.
        status: u16,
    },
}
