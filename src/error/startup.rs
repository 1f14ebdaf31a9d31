//! Errors raised while wiring clients and watches at process start.

use thiserror::Error;

use super::api::ApiError;
use super::category::ErrorCategory;
use super::credential::CredentialError;
use super::watch::WatchError;

/// Startup failures. All of them are fatal to the caller.
#[derive(Debug, Error)]
pub enum StartupError {
    /// No usable credential could be loaded.
    #[error("failed to load credentials: {0}")]
    Credential(#[from] CredentialError),

    /// The primary API rejected the connectivity check.
    #[error("failed to reach the cloud API: {0}")]
    Api(#[from] ApiError),

    /// The credential watch could not be registered.
    #[error("failed to watch credentials: {0}")]
    Watch(#[from] WatchError),
}

impl StartupError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StartupError::Credential(err) => err.category(),
            StartupError::Api(err) => err.category(),
            StartupError::Watch(err) => err.category(),
        }
    }
}
