//! Errors returned by the primary and secondary API clients.

use serde::Deserialize;
use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::{HttpError, Response};

/// Error envelope shared by both APIs: `{"error": {"code": .., "message": ..}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// Error type for remote API calls.
///
/// An upstream rejection of the active credential surfaces here as an
/// ordinary call failure; the client never retries with other credentials.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport failed before a response was received.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The API answered with a non-success status.
    #[error("{message} ({code})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The response body did not match the expected schema.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A node provider ID that does not name a cloud server.
    #[error("invalid provider id '{0}'")]
    InvalidProviderId(String),
}

impl ApiError {
    /// Build an [`ApiError::Api`] from a non-success response.
    ///
    /// Bodies that are not an error envelope still produce an error, with
    /// code `http_<status>` and the raw body (or nothing) as message.
    pub fn from_response(response: &Response) -> Self {
        match response.json::<ErrorEnvelope>() {
            Ok(envelope) => ApiError::Api {
                status: response.status,
                code: envelope.error.code,
                message: envelope.error.message,
            },
            Err(_) => {
                let body = response.text().unwrap_or_default();
                let message = match body.trim() {
                    "" => format!("request failed with status {}", response.status),
                    text => text.to_string(),
                };
                ApiError::Api {
                    status: response.status,
                    code: format!("http_{}", response.status),
                    message,
                }
            }
        }
    }

    /// HTTP status of an API error response, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Http(HttpError::ServerError { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// The API rejected the credential that was used for the call.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ApiError::Api { status, code, .. } => {
                *status == 401 || code.eq_ignore_ascii_case("unauthorized")
            }
            _ => false,
        }
    }

    /// The API throttled the call.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ApiError::Api { status, code, .. } => {
                *status == 429 || code.eq_ignore_ascii_case("rate_limit_exceeded")
            }
            _ => false,
        }
    }

    /// The requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        if self.is_unauthorized() {
            return ErrorCategory::Auth;
        }
        if self.is_rate_limited() {
            return ErrorCategory::RateLimit;
        }
        match self {
            ApiError::Http(HttpError::ServerError { .. }) => ErrorCategory::Server,
            ApiError::Http(_) => ErrorCategory::Network,
            ApiError::Api { status, .. } if *status == 403 => ErrorCategory::Auth,
            ApiError::Api { .. } | ApiError::Decode { .. } => ErrorCategory::Server,
            ApiError::InvalidProviderId(_) => ErrorCategory::Configuration,
        }
    }
}
