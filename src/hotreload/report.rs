//! Periodic reporting of the reload counters.
//!
//! When metrics are enabled the process logs the counters whenever they
//! moved since the previous tick, and once more at shutdown.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::counters::{CounterSnapshot, ReloadCounters};

/// How often the counters are checked for changes.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(60);

const MIN_REPORT_INTERVAL: Duration = Duration::from_millis(10);

/// Background task logging reload counter changes.
///
/// Dropping it stops the task without a final report; use
/// [`CounterReporter::stop`] for an orderly shutdown.
#[derive(Debug)]
pub struct CounterReporter {
    counters: &'static ReloadCounters,
    last: Arc<Mutex<CounterSnapshot>>,
    task: JoinHandle<()>,
}

impl CounterReporter {
    /// Start reporting `counters` every `interval`. Must be called from
    /// within a Tokio runtime.
    pub fn spawn(counters: &'static ReloadCounters, interval: Duration) -> Self {
        let last = Arc::new(Mutex::new(counters.snapshot()));
        let shared = Arc::clone(&last);
        let period = interval.max(MIN_REPORT_INTERVAL);

        let task = tokio::spawn(async move {
            tracing::debug!(interval = ?period, "Reload counter reporter started");
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let current = counters.snapshot();
                let mut last = shared.lock().unwrap_or_else(|p| p.into_inner());
                if *last != current {
                    tracing::info!(
                        hcloud_reloads = current.hcloud,
                        robot_reloads = current.robot,
                        "Credential reload counters"
                    );
                    *last = current;
                }
            }
        });

        Self {
            counters,
            last,
            task,
        }
    }

    /// The values logged most recently (or seen at start).
    pub fn last_reported(&self) -> CounterSnapshot {
        *self.last.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Stop the task and log the final values.
    pub fn stop(self) -> CounterSnapshot {
        self.task.abort();
        let last = self.counters.snapshot();
        tracing::info!(
            hcloud_reloads = last.hcloud,
            robot_reloads = last.robot,
            "Final credential reload counters"
        );
        last
    }
}

impl Drop for CounterReporter {
    fn drop(&mut self) {
        self.task.abort();
    }
}
