//! Bearer token holder for the cloud API.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::CredentialError;
use crate::hotreload::{ApiFamily, CredentialMaterial, ReloadCounters, HCLOUD_TOKEN_FILE};
use crate::traits::{ApplyOutcome, Reloadable};

/// Required length of a cloud API token.
pub const TOKEN_LENGTH: usize = 64;

/// Check that `token` has exactly [`TOKEN_LENGTH`] characters.
pub fn validate_token(token: &str) -> Result<(), CredentialError> {
    let actual = token.chars().count();
    if actual != TOKEN_LENGTH {
        return Err(CredentialError::InvalidTokenLength {
            expected: TOKEN_LENGTH,
            actual,
        });
    }
    Ok(())
}

/// The active bearer token, replaceable while requests are in flight.
///
/// Readers get a whole `Arc<String>`; a concurrent [`BearerToken::replace`]
/// swaps the pointer, so a request sees either the old or the new token.
pub struct BearerToken {
    active: ArcSwap<String>,
    counters: &'static ReloadCounters,
}

impl BearerToken {
    /// Validate `token` (after trimming) and make it the initial value.
    ///
    /// Construction does not count as a reload.
    pub fn new(token: &str) -> Result<Self, CredentialError> {
        let token = token.trim();
        validate_token(token)?;
        Ok(Self {
            active: ArcSwap::from_pointee(token.to_string()),
            counters: ReloadCounters::global(),
        })
    }

    /// Count reloads on `counters` instead of the process-wide counters.
    pub fn with_counters(mut self, counters: &'static ReloadCounters) -> Self {
        self.counters = counters;
        self
    }

    /// Snapshot of the active token.
    pub fn current(&self) -> Arc<String> {
        self.active.load_full()
    }

    /// `Authorization` header value for the active token.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.active.load().as_str())
    }

    /// Replace the active token.
    ///
    /// An invalid token is rejected without touching the active one. An
    /// identical token yields [`ApplyOutcome::Unchanged`] and is not
    /// counted.
    pub fn replace(&self, token: &str) -> Result<ApplyOutcome, CredentialError> {
        let token = token.trim();
        validate_token(token)?;

        let previous = self.active.swap(Arc::new(token.to_string()));
        if previous.as_str() == token {
            return Ok(ApplyOutcome::Unchanged);
        }

        let reloads = self.counters.increment(ApiFamily::Hcloud);
        tracing::debug!(family = %ApiFamily::Hcloud, reloads, "Bearer token replaced");
        Ok(ApplyOutcome::Applied)
    }
}

impl Reloadable for BearerToken {
    fn family(&self) -> ApiFamily {
        ApiFamily::Hcloud
    }

    fn apply(&self, material: &CredentialMaterial) -> Result<ApplyOutcome, CredentialError> {
        self.replace(material.text(HCLOUD_TOKEN_FILE)?)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(c: char) -> String {
        std::iter::repeat(c).take(TOKEN_LENGTH).collect()
    }

    fn local_counters() -> &'static ReloadCounters {
        Box::leak(Box::new(ReloadCounters::new()))
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = BearerToken::new("short").unwrap_err();
        assert_eq!(
            err.to_string(),
            "entered token is invalid (must be exactly 64 characters long)"
        );
        assert!(BearerToken::new(&format!("{}x", token('a'))).is_err());
    }

    #[test]
    fn test_new_trims_whitespace() {
        let bearer = BearerToken::new(&format!("{}\n", token('a'))).unwrap();
        assert_eq!(bearer.current().as_str(), token('a'));
        assert_eq!(bearer.authorization(), format!("Bearer {}", token('a')));
    }

    #[test]
    fn test_replace_counts_changes_only() {
        let counters = local_counters();
        let bearer = BearerToken::new(&token('a')).unwrap().with_counters(counters);

        assert_eq!(bearer.replace(&token('b')).unwrap(), ApplyOutcome::Applied);
        assert_eq!(counters.get(ApiFamily::Hcloud), 1);

        assert_eq!(bearer.replace(&token('b')).unwrap(), ApplyOutcome::Unchanged);
        assert_eq!(counters.get(ApiFamily::Hcloud), 1);
        assert_eq!(bearer.current().as_str(), token('b'));
    }

    #[test]
    fn test_invalid_replace_keeps_active_token() {
        let counters = local_counters();
        let bearer = BearerToken::new(&token('a')).unwrap().with_counters(counters);

        assert!(matches!(
            bearer.replace("too-short"),
            Err(CredentialError::InvalidTokenLength { actual: 9, .. })
        ));
        assert_eq!(bearer.current().as_str(), token('a'));
        assert_eq!(counters.get(ApiFamily::Hcloud), 0);
    }

    #[test]
    fn test_apply_reads_hcloud_file() {
        let counters = local_counters();
        let bearer = BearerToken::new(&token('a')).unwrap().with_counters(counters);
        let material = CredentialMaterial::from_pairs([(HCLOUD_TOKEN_FILE, token('c'))]);

        assert!(bearer.apply(&material).unwrap().is_applied());
        assert_eq!(bearer.current().as_str(), token('c'));

        let empty = CredentialMaterial::default();
        assert!(matches!(
            bearer.apply(&empty),
            Err(CredentialError::MissingFile { .. })
        ));
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_token() {
        let counters = local_counters();
        let bearer = Arc::new(BearerToken::new(&token('a')).unwrap().with_counters(counters));
        let old = token('a');
        let new = token('b');

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let bearer = Arc::clone(&bearer);
                let (old, new) = (old.clone(), new.clone());
                std::thread::spawn(move || {
                    for _ in 0..10_000 {
                        let seen = bearer.current();
                        assert!(*seen == old || *seen == new);
                    }
                })
            })
            .collect();

        for i in 0..1000 {
            let next = if i % 2 == 0 { &new } else { &old };
            bearer.replace(next).unwrap();
        }
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(counters.get(ApiFamily::Hcloud), 1000);
    }

    #[test]
    fn test_debug_redacts_token() {
        let bearer = BearerToken::new(&token('z')).unwrap();
        assert!(!format!("{:?}", bearer).contains("zzzz"));
    }
}
