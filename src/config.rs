//! Process configuration.
//!
//! Values come from environment variables. Parsing is separated from the
//! environment through [`Config::from_lookup`] so tests can feed any map.
//!
//! # Example
//!
//! ```ignore
//! use hccm::config::Config;
//!
//! let config = Config::default()
//!     .with_credentials_root("/tmp/secrets")
//!     .with_hot_reload(false);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::hotreload::{credentials_directory, DEFAULT_DEBOUNCE, MAX_DEBOUNCE};

pub const ENV_HCLOUD_TOKEN: &str = "HCLOUD_TOKEN";
pub const ENV_HCLOUD_ENDPOINT: &str = "HCLOUD_ENDPOINT";
pub const ENV_HCLOUD_DEBUG: &str = "HCLOUD_DEBUG";
pub const ENV_ROBOT_USER_NAME: &str = "ROBOT_USER_NAME";
pub const ENV_ROBOT_PASSWORD: &str = "ROBOT_PASSWORD";
pub const ENV_ROBOT_ENDPOINT: &str = "ROBOT_ENDPOINT";
pub const ENV_ROBOT_CACHE_TIMEOUT: &str = "ROBOT_CACHE_TIMEOUT";
pub const ENV_CREDENTIALS_ROOT: &str = "HCLOUD_CREDENTIALS_ROOT";
pub const ENV_HOT_RELOAD_ENABLED: &str = "HCLOUD_HOT_RELOAD_ENABLED";
pub const ENV_RELOAD_DEBOUNCE: &str = "HCLOUD_RELOAD_DEBOUNCE";
pub const ENV_METRICS_ENABLED: &str = "HCLOUD_METRICS_ENABLED";

/// Runtime configuration.
#[derive(Clone)]
pub struct Config {
    /// Cloud token from the environment; overrides the `hcloud` file
    pub hcloud_token: Option<String>,
    pub hcloud_endpoint: String,
    /// Debug logging
    pub debug: bool,
    /// Bare-metal credentials from the environment; override the files
    pub robot_credentials: Option<(String, String)>,
    pub robot_endpoint: String,
    /// Freshness window of the bare-metal response cache (zero disables it)
    pub robot_cache_timeout: Duration,
    /// Root below which `etc/hetzner-secret` lives
    pub credentials_root: PathBuf,
    /// Follow credential file changes
    pub hot_reload_enabled: bool,
    pub reload_debounce: Duration,
    /// Report reload counters while running and at shutdown
    pub metrics_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hcloud_token: None,
            hcloud_endpoint: crate::hcloud::DEFAULT_ENDPOINT.to_string(),
            debug: false,
            robot_credentials: None,
            robot_endpoint: crate::robot::DEFAULT_ENDPOINT.to_string(),
            robot_cache_timeout: crate::robot::DEFAULT_FRESHNESS,
            credentials_root: PathBuf::from("/"),
            hot_reload_enabled: true,
            reload_debounce: DEFAULT_DEBOUNCE,
            metrics_enabled: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hcloud_token(mut self, token: impl Into<String>) -> Self {
        self.hcloud_token = Some(token.into());
        self
    }

    pub fn with_hcloud_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.hcloud_endpoint = endpoint.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_robot_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.robot_credentials = Some((username.into(), password.into()));
        self
    }

    pub fn with_robot_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.robot_endpoint = endpoint.into();
        self
    }

    pub fn with_robot_cache_timeout(mut self, timeout: Duration) -> Self {
        self.robot_cache_timeout = timeout;
        self
    }

    pub fn with_credentials_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.credentials_root = root.into();
        self
    }

    pub fn with_hot_reload(mut self, enabled: bool) -> Self {
        self.hot_reload_enabled = enabled;
        self
    }

    pub fn with_reload_debounce(mut self, debounce: Duration) -> Self {
        self.reload_debounce = debounce;
        self
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// The directory holding the credential files.
    pub fn credentials_directory(&self) -> PathBuf {
        credentials_directory(Path::new(&self.credentials_root))
    }

    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        config.hcloud_token = get(ENV_HCLOUD_TOKEN);
        if let Some(endpoint) = get(ENV_HCLOUD_ENDPOINT) {
            config.hcloud_endpoint = endpoint;
        }
        if let Some(value) = get(ENV_HCLOUD_DEBUG) {
            config.debug = parse_bool(ENV_HCLOUD_DEBUG, &value)?;
        }

        config.robot_credentials = match (get(ENV_ROBOT_USER_NAME), get(ENV_ROBOT_PASSWORD)) {
            (Some(user), Some(password)) => Some((user, password)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Incomplete {
                    present: ENV_ROBOT_USER_NAME.to_string(),
                    missing: ENV_ROBOT_PASSWORD.to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Incomplete {
                    present: ENV_ROBOT_PASSWORD.to_string(),
                    missing: ENV_ROBOT_USER_NAME.to_string(),
                })
            }
        };
        if let Some(endpoint) = get(ENV_ROBOT_ENDPOINT) {
            config.robot_endpoint = endpoint;
        }
        if let Some(value) = get(ENV_ROBOT_CACHE_TIMEOUT) {
            config.robot_cache_timeout = parse_duration(ENV_ROBOT_CACHE_TIMEOUT, &value)?;
        }

        if let Some(root) = get(ENV_CREDENTIALS_ROOT) {
            config.credentials_root = PathBuf::from(root);
        }
        if let Some(value) = get(ENV_HOT_RELOAD_ENABLED) {
            config.hot_reload_enabled = parse_bool(ENV_HOT_RELOAD_ENABLED, &value)?;
        }
        if let Some(value) = get(ENV_RELOAD_DEBOUNCE) {
            let debounce = parse_duration(ENV_RELOAD_DEBOUNCE, &value)?;
            if debounce > MAX_DEBOUNCE {
                return Err(ConfigError::OutOfRange {
                    key: ENV_RELOAD_DEBOUNCE.to_string(),
                    value,
                    max: MAX_DEBOUNCE,
                });
            }
            config.reload_debounce = debounce;
        }
        if let Some(value) = get(ENV_METRICS_ENABLED) {
            config.metrics_enabled = parse_bool(ENV_METRICS_ENABLED, &value)?;
        }

        Ok(config)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("hcloud_token", &self.hcloud_token.as_ref().map(|_| "<redacted>"))
            .field("hcloud_endpoint", &self.hcloud_endpoint)
            .field("debug", &self.debug)
            .field(
                "robot_user",
                &self.robot_credentials.as_ref().map(|(user, _)| user),
            )
            .field("robot_endpoint", &self.robot_endpoint)
            .field("robot_cache_timeout", &self.robot_cache_timeout)
            .field("credentials_root", &self.credentials_root)
            .field("hot_reload_enabled", &self.hot_reload_enabled)
            .field("reload_debounce", &self.reload_debounce)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

/// Parse a boolean: `1 t T TRUE true True` or `0 f F FALSE false False`.
pub fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Parse a duration: bare seconds (`300`) or a human-readable value
/// (`500ms`, `30s`, `5m`, `1h30m`).
pub fn parse_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let text = value.trim();
    if let Ok(seconds) = text.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }
    humantime::parse_duration(text).map_err(|err| {
        tracing::debug!(key, value, error = %err, "Rejected duration");
        ConfigError::InvalidDuration {
            key: key.to_string(),
            value: value.to_string(),
        }
    })
}
