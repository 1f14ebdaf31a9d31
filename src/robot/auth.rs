//! Basic-auth credentials for the bare-metal API.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::CredentialError;
use crate::hotreload::{
    ApiFamily, CredentialMaterial, ReloadCounters, ROBOT_PASSWORD_FILE, ROBOT_USER_FILE,
};
use crate::traits::{ApplyOutcome, Reloadable};

/// A user name and password pair. Both are non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    username: String,
    password: String,
}

impl BasicCredentials {
    /// Trim both values; reject empty ones.
    pub fn new(username: &str, password: &str) -> Result<Self, CredentialError> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() {
            return Err(CredentialError::Empty {
                file: ROBOT_USER_FILE.to_string(),
            });
        }
        if password.is_empty() {
            return Err(CredentialError::Empty {
                file: ROBOT_PASSWORD_FILE.to_string(),
            });
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Read the pair from `robot-user` and `robot-password`.
    ///
    /// Both halves must be present; one alone is an error.
    pub fn from_material(material: &CredentialMaterial) -> Result<Self, CredentialError> {
        let username = material.text(ROBOT_USER_FILE)?;
        let password = material.text(ROBOT_PASSWORD_FILE)?;
        Self::new(username, password)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `Authorization` header value for this pair.
    pub fn header_value(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", encoded)
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The active credential pair, replaceable while requests are in flight.
///
/// User name and password are swapped together as one value, so a request
/// never pairs the new user with the old password.
pub struct BasicAuth {
    active: ArcSwap<BasicCredentials>,
    counters: &'static ReloadCounters,
}

impl BasicAuth {
    /// Start with `credentials`. Construction does not count as a reload.
    pub fn new(credentials: BasicCredentials) -> Self {
        Self {
            active: ArcSwap::from_pointee(credentials),
            counters: ReloadCounters::global(),
        }
    }

    /// Count reloads on `counters` instead of the process-wide counters.
    pub fn with_counters(mut self, counters: &'static ReloadCounters) -> Self {
        self.counters = counters;
        self
    }

    /// Snapshot of the active pair.
    pub fn current(&self) -> Arc<BasicCredentials> {
        self.active.load_full()
    }

    /// `Authorization` header value for the active pair.
    pub fn authorization(&self) -> String {
        self.active.load().header_value()
    }

    /// Replace the active pair; identical pairs are not counted.
    pub fn replace(&self, credentials: BasicCredentials) -> ApplyOutcome {
        let next = Arc::new(credentials);
        let previous = self.active.swap(Arc::clone(&next));
        if *previous == *next {
            return ApplyOutcome::Unchanged;
        }
        let reloads = self.counters.increment(ApiFamily::Robot);
        tracing::debug!(
            family = %ApiFamily::Robot,
            reloads,
            username = next.username(),
            "Basic auth credentials replaced"
        );
        ApplyOutcome::Applied
    }
}

impl Reloadable for BasicAuth {
    fn family(&self) -> ApiFamily {
        ApiFamily::Robot
    }

    fn apply(&self, material: &CredentialMaterial) -> Result<ApplyOutcome, CredentialError> {
        let credentials = BasicCredentials::from_material(material)?;
        Ok(self.replace(credentials))
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("active", &self.current())
            .finish()
    }
}
