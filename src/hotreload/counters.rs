//! Process-wide reload counters.
//!
//! One counter per API family, starting at zero when the process starts.
//! A counter is bumped exactly once for every apply that actually replaced
//! the active credential; byte-identical re-applies and failures leave it
//! alone. Counters are never decremented or reset.

use std::sync::atomic::{AtomicU64, Ordering};

use super::types::ApiFamily;

static GLOBAL: ReloadCounters = ReloadCounters::new();

/// Monotonic per-family reload counters.
#[derive(Debug)]
pub struct ReloadCounters {
    hcloud: AtomicU64,
    robot: AtomicU64,
}

impl ReloadCounters {
    /// Fresh counters at zero. Production code uses [`ReloadCounters::global`].
    pub const fn new() -> Self {
        Self {
            hcloud: AtomicU64::new(0),
            robot: AtomicU64::new(0),
        }
    }

    /// The process-wide counters.
    pub fn global() -> &'static ReloadCounters {
        &GLOBAL
    }

    fn counter(&self, family: ApiFamily) -> &AtomicU64 {
        match family {
            ApiFamily::Hcloud => &self.hcloud,
            ApiFamily::Robot => &self.robot,
        }
    }

    /// Record one successful reload and return the new value.
    pub fn increment(&self, family: ApiFamily) -> u64 {
        self.counter(family).fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Current value for `family`.
    pub fn get(&self, family: ApiFamily) -> u64 {
        self.counter(family).load(Ordering::Acquire)
    }

    /// Both counters at once.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            hcloud: self.get(ApiFamily::Hcloud),
            robot: self.get(ApiFamily::Robot),
        }
    }
}

/// Point-in-time values of the reload counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    pub hcloud: u64,
    pub robot: u64,
}

impl Default for ReloadCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Successful cloud API credential reloads since process start.
pub fn hcloud_reload_count() -> u64 {
    ReloadCounters::global().get(ApiFamily::Hcloud)
}

/// Successful bare-metal API credential reloads since process start.
pub fn robot_reload_count() -> u64 {
    ReloadCounters::global().get(ApiFamily::Robot)
}
