//! Data models for the bare-metal API responses.

use serde::{Deserialize, Serialize};

/// A dedicated server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub server_ip: String,
    #[serde(default)]
    pub server_ipv6_net: String,
    pub server_number: u32,
    #[serde(rename = "server_name", default)]
    pub name: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub dc: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cancelled: bool,
}

/// The API wraps every server object: `{"server": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub server: Server,
}
