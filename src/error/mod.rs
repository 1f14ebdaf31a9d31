//! Error types for the credential layer.
//!
//! | Type | Raised by | Category |
//! |------|-----------|----------|
//! | [`CredentialError`] | reading / validating credential files | Validation, Io |
//! | [`WatchError`] | the watch orchestrator | Watcher, Validation, Io |
//! | [`ApiError`] | primary and secondary API clients | Auth, RateLimit, Network, Server |
//! | [`ConfigError`] | environment configuration | Configuration |
//! | [`StartupError`] | client and watch wiring | any of the above |
//!
//! Transport errors ([`crate::traits::HttpError`]) live next to the
//! `HttpClient` trait and convert into [`ApiError`].

mod api;
mod category;
mod config;
mod credential;
mod startup;
mod watch;

pub use api::ApiError;
pub use category::ErrorCategory;
pub use config::ConfigError;
pub use credential::CredentialError;
pub use startup::StartupError;
pub use watch::WatchError;
