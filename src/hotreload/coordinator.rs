//! Wires a file watcher to reloadable clients.
//!
//! [`watch`] loads the current credentials synchronously, then hands the
//! directory over to a background task that re-reads and re-applies the
//! credential files after every debounced burst of changes. One task per
//! registration; change bursts are processed strictly in order.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::debouncer::{DebouncedChange, Debouncer, DEFAULT_DEBOUNCE};
use super::file_watcher::{spawn_file_watcher, WatchMessage};
use super::material::CredentialMaterial;
use super::state::WatchState;
use crate::error::{CredentialError, WatchError};
use crate::traits::{ApplyOutcome, Reloadable};

/// Callback receiving background reload failures.
pub type ErrorSink = Arc<dyn Fn(&WatchError) + Send + Sync>;

/// Tuning for a watch registration.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Quiet period before a burst of file events triggers a reload.
    pub debounce: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl WatchOptions {
    /// Set the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

fn lock(state: &Mutex<WatchState>) -> MutexGuard<'_, WatchState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read the files `target` needs from `dir` and apply them.
fn apply_from_dir(dir: &Path, target: &dyn Reloadable) -> Result<ApplyOutcome, CredentialError> {
    let material = CredentialMaterial::read(dir, target.credential_files())?;
    target.apply(&material)
}

/// Watch `path` with default options.
///
/// See [`watch_with_options`].
pub fn watch(
    path: impl AsRef<Path>,
    targets: Vec<Arc<dyn Reloadable>>,
    on_error: Option<ErrorSink>,
) -> Result<WatchHandle, WatchError> {
    watch_with_options(path, targets, on_error, WatchOptions::default())
}

/// Load credentials from `path` into every target, then keep them in sync.
///
/// When this returns `Ok`, every target holds the credential currently on
/// disk. Afterwards a background task reloads on change; failures there are
/// logged and passed to `on_error`, and the previous credential stays
/// active. The returned handle owns the OS watch and the task: dropping it
/// ends the registration.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// - [`WatchError::NoTargets`] if `targets` is empty
/// - [`WatchError::DirectoryNotFound`] if `path` is not a directory
/// - [`WatchError::Notify`] if the OS watch cannot be created
/// - [`WatchError::InitialLoad`] if a target rejects the current files
/// - [`WatchError::NoRuntime`] outside a Tokio runtime
pub fn watch_with_options(
    path: impl AsRef<Path>,
    targets: Vec<Arc<dyn Reloadable>>,
    on_error: Option<ErrorSink>,
    options: WatchOptions,
) -> Result<WatchHandle, WatchError> {
    let dir = path.as_ref().to_path_buf();
    if targets.is_empty() {
        return Err(WatchError::NoTargets { path: dir });
    }
    let runtime = tokio::runtime::Handle::try_current().map_err(|_| WatchError::NoRuntime)?;

    // Watch before the initial read so a write landing in between is not lost.
    let (tx, rx) = mpsc::unbounded_channel();
    let watcher = spawn_file_watcher(&dir, tx)?;

    for target in &targets {
        let family = target.family();
        let outcome = apply_from_dir(&dir, target.as_ref())
            .map_err(|source| WatchError::InitialLoad { family, source })?;
        tracing::info!(
            family = %family,
            path = %dir.display(),
            applied = outcome.is_applied(),
            "Initial credentials loaded"
        );
    }

    let state = Arc::new(Mutex::new(WatchState::new()));
    let reloader = Reloader {
        dir: dir.clone(),
        targets,
        on_error,
        state: Arc::clone(&state),
    };
    let task = runtime.spawn(reloader.run(rx, options.debounce));

    Ok(WatchHandle {
        dir,
        watcher: Some(watcher),
        task: Some(task),
        state,
    })
}

/// Background half of a watch registration.
struct Reloader {
    dir: PathBuf,
    targets: Vec<Arc<dyn Reloadable>>,
    on_error: Option<ErrorSink>,
    state: Arc<Mutex<WatchState>>,
}

impl Reloader {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<WatchMessage>, debounce: Duration) {
        tracing::debug!(path = %self.dir.display(), "Credential reload task started");
        let mut debouncer = Debouncer::new(debounce);

        loop {
            let deadline = debouncer.deadline();
            tokio::select! {
                message = rx.recv() => match message {
                    Some(Ok(event)) => {
                        tracing::trace!(paths = %event.description(), "Credential change event");
                        debouncer.record(event, Instant::now());
                    }
                    Some(Err(err)) => self.report(WatchError::Notify(err)),
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(change) = debouncer.flush() {
                        self.reload(&change);
                    }
                }
            }
        }

        lock(&self.state).stop();
        tracing::debug!(path = %self.dir.display(), "Credential reload task stopped");
    }

    fn reload(&self, change: &DebouncedChange) {
        tracing::debug!(
            path = %self.dir.display(),
            events = change.events,
            paths = change.paths.len(),
            waited_ms = change.first_event.elapsed().as_millis() as u64,
            "Reloading credentials"
        );

        let mut changed = false;
        let mut failed = false;
        for target in &self.targets {
            let family = target.family();
            match apply_from_dir(&self.dir, target.as_ref()) {
                Ok(ApplyOutcome::Applied) => {
                    changed = true;
                    tracing::info!(family = %family, "Credentials reloaded");
                }
                Ok(ApplyOutcome::Unchanged) => {
                    tracing::debug!(family = %family, "Credentials unchanged");
                }
                Err(source) => {
                    failed = true;
                    let err = WatchError::Reload { family, source };
                    lock(&self.state).reload_failed(err.to_string());
                    self.report(err);
                }
            }
        }

        let mut state = lock(&self.state);
        match (changed, failed) {
            (true, false) => state.reload_succeeded(),
            (true, true) => state.reload_partially_succeeded(),
            (false, false) => state.reload_unchanged(),
            (false, true) => {}
        }
    }

    fn report(&self, err: WatchError) {
        tracing::warn!(
            path = %self.dir.display(),
            category = %err.category(),
            "{}",
            err
        );
        if let Some(sink) = &self.on_error {
            sink(&err);
        }
    }
}

/// Handle to a running watch registration.
///
/// Keep it alive for as long as credentials should follow the directory.
/// Dropping it (or calling [`WatchHandle::stop`]) releases the OS watch and
/// ends the background task.
pub struct WatchHandle {
    dir: PathBuf,
    watcher: Option<RecommendedWatcher>,
    task: Option<JoinHandle<()>>,
    state: Arc<Mutex<WatchState>>,
}

impl WatchHandle {
    /// The watched directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Snapshot of the registration's state.
    pub fn state(&self) -> WatchState {
        lock(&self.state).clone()
    }

    /// Whether the background task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Unregister: release the OS watch and wait for the task to end.
    pub async fn stop(mut self) {
        self.watcher.take();
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        lock(&self.state).stop();
        tracing::debug!(path = %self.dir.display(), "Credential watch stopped");
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.watcher.take();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("dir", &self.dir)
            .field("running", &self.is_running())
            .finish()
    }
}
