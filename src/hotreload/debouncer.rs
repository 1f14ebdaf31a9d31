//! Debouncing of credential change events.
//!
//! A single `cp` or a secret-volume update produces a burst of events
//! (create, several writes, symlink renames). The debouncer coalesces them:
//! every event pushes the deadline out by the quiet period, and the burst is
//! flushed once no event arrived for that long.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;

use super::types::CredentialChangeEvent;

/// Default quiet period before a burst of events is flushed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Longest quiet period accepted; larger values are clamped.
pub const MAX_DEBOUNCE: Duration = Duration::from_secs(3600);

/// Manages debouncing of credential change events.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    pending_since: Option<Instant>,
    last_event: Option<Instant>,
    paths: Vec<PathBuf>,
    coalesced: usize,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period: quiet_period.min(MAX_DEBOUNCE),
            pending_since: None,
            last_event: None,
            paths: Vec::new(),
            coalesced: 0,
        }
    }

    /// Record an event observed at `now`.
    pub fn record(&mut self, event: CredentialChangeEvent, now: Instant) {
        if self.pending_since.is_none() {
            self.pending_since = Some(now);
        }
        self.last_event = Some(now);
        self.coalesced += 1;
        for path in event.paths {
            if !self.paths.contains(&path) {
                self.paths.push(path);
            }
        }
    }

    /// When the pending burst becomes ready, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_event.map(|last| {
            last.checked_add(self.quiet_period)
                .or_else(|| last.checked_add(MAX_DEBOUNCE))
                .unwrap_or(last)
        })
    }

    /// Take the pending burst, resetting the debouncer.
    ///
    /// Returns `None` when nothing is pending.
    pub fn flush(&mut self) -> Option<DebouncedChange> {
        let first_event = self.pending_since.take()?;
        self.last_event = None;
        let change = DebouncedChange {
            paths: std::mem::take(&mut self.paths),
            events: self.coalesced,
            first_event,
        };
        self.coalesced = 0;
        Some(change)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// A coalesced burst of change events.
#[derive(Debug, Clone)]
pub struct DebouncedChange {
    /// Distinct paths touched during the burst
    pub paths: Vec<PathBuf>,
    /// Number of raw events coalesced
    pub events: usize,
    /// When the first event of the burst arrived
    pub first_event: Instant,
}
