//! Configuration errors.

use thiserror::Error;

/// Errors produced while building a [`crate::config::Config`] from the
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A boolean setting holds something other than a recognised literal.
    #[error("{key}: invalid boolean '{value}'")]
    InvalidBool { key: String, value: String },

    /// A duration setting could not be parsed.
    #[error("{key}: invalid duration '{value}'")]
    InvalidDuration { key: String, value: String },

    /// A duration setting parsed but exceeds the accepted maximum.
    #[error("{key}: '{value}' exceeds the maximum of {max:?}")]
    OutOfRange {
        key: String,
        value: String,
        max: std::time::Duration,
    },

    /// Only one half of a pair of settings was provided.
    #[error("{present} is set but {missing} is not; set both or neither")]
    Incomplete { present: String, missing: String },
}
