//! Error category classification.
//!
//! Categories drive the few handling decisions the credential layer makes:
//! whether an upstream failure is worth retrying by the caller, and how a
//! failed reload is labelled in logs.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential material is absent or malformed.
    /// The previous credential stays active until a valid one appears.
    Validation,

    /// Local filesystem errors while reading credential files.
    /// Usually transient (a file rewritten mid-read).
    Io,

    /// The OS file watch could not be set up or reported an error.
    Watcher,

    /// The remote API rejected the active credential.
    Auth,

    /// The remote API throttled the request.
    RateLimit,

    /// Connection, DNS or timeout errors talking to a remote API.
    Network,

    /// Remote API errors that are not authentication related (HTTP 5xx,
    /// unexpected payloads).
    Server,

    /// Invalid process configuration.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCategory::Network | ErrorCategory::Server | ErrorCategory::RateLimit
        )
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Io => "io",
            ErrorCategory::Watcher => "watcher",
            ErrorCategory::Auth => "auth",
            ErrorCategory::RateLimit => "rate_limit",
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => {
                "Rewrite the credential files with valid content; the previous credential remains active"
            }
            ErrorCategory::Io => "The next change notification retries the read",
            ErrorCategory::Watcher => "Check that the credential directory exists and is readable",
            ErrorCategory::Auth => "Rotate the credential files with a credential the API accepts",
            ErrorCategory::RateLimit => "Wait before issuing further requests",
            ErrorCategory::Network => "Check connectivity to the API endpoint",
            ErrorCategory::Server => "The API may be experiencing issues; try again later",
            ErrorCategory::Configuration => "Check the environment configuration",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
