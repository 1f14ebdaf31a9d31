//! The capability a client exposes to the credential watch orchestrator.

use crate::error::CredentialError;
use crate::hotreload::{ApiFamily, CredentialMaterial};

/// Result of a successful [`Reloadable::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The active credential was replaced and the reload counter incremented.
    Applied,
    /// The material was byte-identical to the active credential. Nothing
    /// changed and the counter was left alone.
    Unchanged,
}

impl ApplyOutcome {
    /// Whether the active credential changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }
}

/// A live API client whose credential can be replaced in place.
///
/// The orchestrator reads [`Reloadable::credential_files`] from the watched
/// directory and hands the result to [`Reloadable::apply`]. Implementations
/// validate the material, swap the active credential atomically with
/// respect to concurrent requests, and bump the family's reload counter.
/// A failed apply leaves the previous credential untouched.
pub trait Reloadable: Send + Sync {
    /// Which API this client talks to.
    fn family(&self) -> ApiFamily;

    /// File names (relative to the watched directory) this client reads.
    fn credential_files(&self) -> &'static [&'static str] {
        self.family().credential_files()
    }

    /// Validate `material` and make it the active credential.
    fn apply(&self, material: &CredentialMaterial) -> Result<ApplyOutcome, CredentialError>;
}
