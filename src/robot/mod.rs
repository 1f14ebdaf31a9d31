//! Bare-metal API client with hot-reloadable basic auth and a response cache.

mod auth;
mod cache;
mod client;
mod models;

pub use auth::{BasicAuth, BasicCredentials};
pub use cache::{CacheStats, CachedResponse, CachedRobotClient, RequestKind, DEFAULT_FRESHNESS};
pub use client::{RobotClient, DEFAULT_ENDPOINT};
pub use models::{Server, ServerResponse};
