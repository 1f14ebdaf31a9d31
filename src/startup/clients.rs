//! Client construction from configuration.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::CredentialError;
use crate::hcloud::HcloudClient;
use crate::hotreload::{ROBOT_PASSWORD_FILE, ROBOT_USER_FILE};
use crate::robot::{CachedRobotClient, RobotClient};

/// Build the cloud API client.
///
/// `HCLOUD_TOKEN` wins over the `hcloud` file. There is no fallback: a
/// missing or invalid token is an error.
pub fn new_hcloud_client(config: &Config) -> Result<HcloudClient, CredentialError> {
    let client = match &config.hcloud_token {
        Some(token) => {
            tracing::debug!("Using cloud API token from environment");
            HcloudClient::new(token)?
        }
        None => HcloudClient::from_directory(&config.credentials_directory())?,
    };
    Ok(client.with_endpoint(config.hcloud_endpoint.as_str()))
}

fn robot_files_absent(dir: &Path) -> bool {
    !dir.join(ROBOT_USER_FILE).exists() && !dir.join(ROBOT_PASSWORD_FILE).exists()
}

/// Build the cached bare-metal API client.
///
/// Returns `None` when neither the environment nor the credential directory
/// holds bare-metal credentials. Only one of the two files is an error.
pub fn new_cached_robot_client(
    config: &Config,
) -> Result<Option<CachedRobotClient>, CredentialError> {
    let client = match &config.robot_credentials {
        Some((username, password)) => {
            tracing::debug!("Using bare-metal API credentials from environment");
            RobotClient::new(username, password)?
        }
        None => {
            let dir = config.credentials_directory();
            if robot_files_absent(&dir) {
                tracing::info!(path = %dir.display(), "No bare-metal API credentials, robot support disabled");
                return Ok(None);
            }
            RobotClient::from_directory(&dir)?
        }
    };

    let client = client.with_endpoint(config.robot_endpoint.as_str());
    Ok(Some(CachedRobotClient::new(
        Arc::new(client),
        config.robot_cache_timeout,
    )))
}
