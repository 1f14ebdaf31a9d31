//! Startup wiring.
//!
//! # Components
//!
//! - [`clients`] - build the API clients from [`crate::config::Config`]
//! - [`preflight`] - connectivity check and watch registration
//!
//! # Usage
//!
//! ```ignore
//! use hccm::config::Config;
//! use hccm::startup::start;
//!
//! let config = Config::from_env()?;
//! let clients = start(&config).await?;
//! let servers = clients.hcloud.server_list().await?;
//! ```

pub mod clients;
pub mod preflight;

pub use clients::{new_cached_robot_client, new_hcloud_client};
pub use preflight::{start, Clients};
