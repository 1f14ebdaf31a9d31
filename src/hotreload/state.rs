//! State tracking for a running credential watch.

use std::time::Instant;

/// Observable state of one watch registration.
///
/// Tracks:
/// - How many reload passes applied new credentials or failed
/// - The streak of consecutive failures (reset only by a pass in which no
///   target failed)
/// - The most recent error message
#[derive(Debug, Clone, Default)]
pub struct WatchState {
    /// Reload passes that replaced at least one credential
    pub reloads: u64,

    /// Reload passes where every target saw identical material
    pub unchanged: u64,

    /// Failed apply attempts (one per failing target)
    pub failures: u64,

    /// Failures since the last successful reload pass
    pub consecutive_failures: u32,

    /// Timestamp of the last reload that changed a credential
    pub last_reload: Option<Instant>,

    /// Message of the most recent failure
    pub last_error: Option<String>,

    /// Whether the background task has stopped
    pub stopped: bool,
}

impl WatchState {
    /// Create a new watch state with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a reload pass that changed at least one credential.
    pub fn reload_succeeded(&mut self) {
        self.reloads += 1;
        self.consecutive_failures = 0;
        self.last_reload = Some(Instant::now());
    }

    /// Mark a reload pass where some targets applied new credentials and
    /// others failed. The failure streak is kept.
    pub fn reload_partially_succeeded(&mut self) {
        self.reloads += 1;
        self.last_reload = Some(Instant::now());
    }

    /// Mark a reload pass where nothing changed.
    pub fn reload_unchanged(&mut self) {
        self.unchanged += 1;
        self.consecutive_failures = 0;
    }

    /// Mark a failed apply attempt.
    pub fn reload_failed(&mut self, error: impl Into<String>) {
        self.failures += 1;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(error.into());
    }

    /// Mark the background task as stopped.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Whether the last reload attempt left the watch healthy.
    pub fn is_healthy(&self) -> bool {
        !self.stopped && self.consecutive_failures == 0
    }
}
