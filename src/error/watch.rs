//! Errors raised by the credential watch orchestrator.

use std::path::PathBuf;

use thiserror::Error;

use super::category::ErrorCategory;
use super::credential::CredentialError;
use crate::hotreload::ApiFamily;

/// Errors from setting up or running a credential watch.
///
/// `DirectoryNotFound`, `NoTargets`, `NoRuntime`, `Notify` and `InitialLoad` are returned
/// synchronously from `watch`. `Reload` and `Notify` are delivered to the
/// error sink of a running watch, which keeps watching afterwards.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The credential directory does not exist (or is not a directory).
    #[error("credential directory '{}' does not exist", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// `watch` was called without any reload targets.
    #[error("no reload targets registered for '{}'", path.display())]
    NoTargets { path: PathBuf },

    /// The OS file watch failed.
    #[error("file watch error: {0}")]
    Notify(#[from] notify::Error),

    /// The synchronous initial load failed; no valid credential exists yet.
    #[error("initial {family} credential load failed: {source}")]
    InitialLoad {
        family: ApiFamily,
        #[source]
        source: CredentialError,
    },

    /// `watch` was called outside a Tokio runtime.
    #[error("credential watch must be started from within a Tokio runtime")]
    NoRuntime,

    /// A background reload failed; the previous credential remains active.
    #[error("{family} credential reload failed: {source}")]
    Reload {
        family: ApiFamily,
        #[source]
        source: CredentialError,
    },
}

impl WatchError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            WatchError::DirectoryNotFound { .. } | WatchError::Notify(_) => ErrorCategory::Watcher,
            WatchError::NoTargets { .. } | WatchError::NoRuntime => ErrorCategory::Configuration,
            WatchError::InitialLoad { source, .. } | WatchError::Reload { source, .. } => {
                source.category()
            }
        }
    }

    /// The API family affected by this error, if it is tied to one.
    pub fn family(&self) -> Option<ApiFamily> {
        match self {
            WatchError::InitialLoad { family, .. } | WatchError::Reload { family, .. } => {
                Some(*family)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_not_found_message() {
        let err = WatchError::DirectoryNotFound {
            path: PathBuf::from("/etc/hetzner-secret"),
        };
        assert!(err.to_string().contains("/etc/hetzner-secret"));
        assert_eq!(err.category(), ErrorCategory::Watcher);
        assert!(err.family().is_none());
    }

    #[test]
    fn test_reload_error_carries_family_and_source() {
        let err = WatchError::Reload {
            family: ApiFamily::Hcloud,
            source: CredentialError::InvalidTokenLength {
                expected: 64,
                actual: 3,
            },
        };
        assert_eq!(err.family(), Some(ApiFamily::Hcloud));
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.to_string().starts_with("hcloud credential reload failed"));
    }
}
