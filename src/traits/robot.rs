//! Capability exposed to reconciliation code for the bare-metal API.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::robot::Server;

/// Operations on the bare-metal ("robot") API.
///
/// Implemented by both the plain [`crate::robot::RobotClient`] and the
/// [`crate::robot::CachedRobotClient`], so callers do not need to know
/// whether responses are cached or whether credentials were rotated.
#[async_trait]
pub trait RobotApi: Send + Sync {
    /// List all dedicated servers of the account.
    async fn server_get_list(&self) -> Result<Vec<Server>, ApiError>;

    /// Fetch one dedicated server by its number.
    async fn server_get(&self, server_number: u32) -> Result<Server, ApiError>;
}
