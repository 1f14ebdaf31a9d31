//! Credential hot reload.
//!
//! Keeps running API clients in sync with the credential files in a
//! watched directory, without restarting the process.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  File Watcher   │  notify, non-recursive on the secret directory
//! └────────┬────────┘
//!          ▼
//!  ┌───────────────┐
//!  │   Debouncer   │  500ms quiet period by default
//!  └───────┬───────┘
//!          ▼
//!  ┌───────────────┐
//!  │    Reloader   │  read files, apply to every target
//!  └───────┬───────┘
//!          ▼
//!  ┌───────────────┐
//!  │  Reloadable   │  validate, swap, count
//!  └───────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let dir = credentials_directory(Path::new("/"));
//! let handle = watch(&dir, vec![client.clone() as Arc<dyn Reloadable>], None)?;
//! // keep `handle` alive for as long as the client should follow the files
//! ```

mod coordinator;
mod counters;
mod debouncer;
mod file_watcher;
mod material;
mod report;
mod state;
mod types;

pub use coordinator::{watch, watch_with_options, ErrorSink, WatchHandle, WatchOptions};
pub use counters::{hcloud_reload_count, robot_reload_count, CounterSnapshot, ReloadCounters};
pub use debouncer::{DebouncedChange, Debouncer, DEFAULT_DEBOUNCE, MAX_DEBOUNCE};
pub use file_watcher::{spawn_file_watcher, WatchMessage};
pub use material::{
    credentials_directory, CredentialMaterial, HCLOUD_TOKEN_FILE, ROBOT_PASSWORD_FILE,
    ROBOT_USER_FILE,
};
pub use report::{CounterReporter, DEFAULT_REPORT_INTERVAL};
pub use state::WatchState;
pub use types::{ApiFamily, CredentialChangeEvent};
