//! hccm - credential hot reload and API clients for a Hetzner cloud
//! controller
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod config;
pub mod error;
pub mod hcloud;
pub mod hotreload;
pub mod logging;
pub mod robot;
pub mod startup;
pub mod traits;
