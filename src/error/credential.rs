//! Credential validation errors.

use std::path::PathBuf;

use thiserror::Error;

use super::category::ErrorCategory;

/// Errors raised while reading or validating credential material.
///
/// None of these mutate the active credential of a client: a failed
/// apply always leaves the previous value in place.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// A credential file does not exist.
    #[error("credential file '{}' is missing", path.display())]
    MissingFile { path: PathBuf },

    /// A credential file exists but could not be read.
    #[error("failed to read credential file '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A credential file is empty (or only whitespace).
    #[error("credential file '{file}' is empty")]
    Empty { file: String },

    /// A credential file does not hold valid UTF-8.
    #[error("credential file '{file}' is not valid UTF-8")]
    InvalidEncoding { file: String },

    /// The bearer token does not have the required length.
    #[error("entered token is invalid (must be exactly {expected} characters long)")]
    InvalidTokenLength { expected: usize, actual: usize },
}

impl CredentialError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CredentialError::Unreadable { .. } => ErrorCategory::Io,
            _ => ErrorCategory::Validation,
        }
    }
}
