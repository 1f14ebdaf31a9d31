//! Data models for the cloud API responses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a cloud server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Running,
    Initializing,
    Starting,
    Stopping,
    Off,
    Deleting,
    Migrating,
    Rebuilding,
    #[serde(other)]
    Unknown,
}

/// A cloud server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: u64,
    pub name: String,
    pub status: ServerStatus,
    #[serde(default)]
    pub public_net: PublicNet,
    #[serde(default)]
    pub private_net: Vec<PrivateNet>,
    #[serde(default)]
    pub server_type: Option<ServerType>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Server {
    /// Provider ID used for the node object of this server.
    pub fn provider_id(&self) -> String {
        format!("{}{}", super::PROVIDER_ID_PREFIX, self.id)
    }
}

/// Public addresses of a server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicNet {
    #[serde(default)]
    pub ipv4: Option<IpAddress>,
    #[serde(default)]
    pub ipv6: Option<IpAddress>,
}

/// A single public address (IPv4) or prefix (IPv6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpAddress {
    pub ip: String,
}

/// Attachment of a server to a private network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateNet {
    pub network: u64,
    pub ip: String,
}

/// Server type (size) of a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerType {
    pub name: String,
}

/// A private network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: u64,
    pub name: String,
    pub ip_range: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerEnvelope {
    pub server: Server,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerListEnvelope {
    pub servers: Vec<Server>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NetworkEnvelope {
    pub network: Network,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Meta {
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Pagination {
    #[serde(default)]
    pub next_page: Option<u32>,
}
