//! Shared types for credential change detection.

use std::fmt;
use std::path::PathBuf;

use super::material::{HCLOUD_TOKEN_FILE, ROBOT_PASSWORD_FILE, ROBOT_USER_FILE};

/// The remote API a credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiFamily {
    /// Cloud API, bearer token.
    Hcloud,
    /// Bare-metal API, basic auth.
    Robot,
}

impl ApiFamily {
    /// All families, in counter order.
    pub const ALL: [ApiFamily; 2] = [ApiFamily::Hcloud, ApiFamily::Robot];

    /// Short label for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiFamily::Hcloud => "hcloud",
            ApiFamily::Robot => "robot",
        }
    }

    /// Credential file names this family reads from the secret directory.
    pub fn credential_files(&self) -> &'static [&'static str] {
        match self {
            ApiFamily::Hcloud => &[HCLOUD_TOKEN_FILE],
            ApiFamily::Robot => &[ROBOT_USER_FILE, ROBOT_PASSWORD_FILE],
        }
    }
}

impl fmt::Display for ApiFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filesystem change observed in a watched credential directory.
#[derive(Debug, Clone)]
pub struct CredentialChangeEvent {
    /// Paths reported by the OS for this event
    pub paths: Vec<PathBuf>,
    /// When the change was detected
    pub timestamp: std::time::Instant,
}

impl CredentialChangeEvent {
    /// Create a new change event for the given paths.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            timestamp: std::time::Instant::now(),
        }
    }

    /// Human-readable description for logging
    pub fn description(&self) -> String {
        let names: Vec<String> = self
            .paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        if names.is_empty() {
            "directory".to_string()
        } else {
            names.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_family_files() {
        assert_eq!(ApiFamily::Hcloud.credential_files(), &["hcloud"]);
        assert_eq!(
            ApiFamily::Robot.credential_files(),
            &["robot-user", "robot-password"]
        );
    }

    #[test]
    fn test_api_family_display() {
        assert_eq!(ApiFamily::Hcloud.to_string(), "hcloud");
        assert_eq!(ApiFamily::Robot.to_string(), "robot");
    }

    #[test]
    fn test_change_event_description() {
        let event = CredentialChangeEvent::new(vec![PathBuf::from("/secret/hcloud")]);
        assert!(event.description().contains("hcloud"));

        let empty = CredentialChangeEvent::new(Vec::new());
        assert_eq!(empty.description(), "directory");
    }
}
