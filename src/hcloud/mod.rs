//! Cloud API client with a hot-reloadable bearer token.

mod client;
mod models;
mod token;

/// Prefix of node provider IDs that name a cloud server.
pub const PROVIDER_ID_PREFIX: &str = "hcloud://";

pub use client::{parse_provider_id, HcloudClient, DEFAULT_ENDPOINT};
pub use models::{IpAddress, Network, PrivateNet, PublicNet, Server, ServerStatus, ServerType};
pub use token::{validate_token, BearerToken, TOKEN_LENGTH};
