//! File-based credential change detection using the `notify` crate.

use std::path::Path;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::types::CredentialChangeEvent;
use crate::error::WatchError;

/// Messages delivered by the OS watch.
pub type WatchMessage = notify::Result<CredentialChangeEvent>;

/// Whether an event kind can change credential content.
///
/// Reads show up as `Access` events; the reload task reads the files it
/// watches, so those must not trigger another reload.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}

/// Start watching `dir` (non-recursively) and forward change events to `tx`.
///
/// Returns the watcher handle. It MUST be kept alive: dropping it stops
/// delivery and releases the OS watch.
///
/// Fails fast when `dir` does not exist.
pub fn spawn_file_watcher(
    dir: &Path,
    tx: mpsc::UnboundedSender<WatchMessage>,
) -> Result<RecommendedWatcher, WatchError> {
    if !dir.is_dir() {
        return Err(WatchError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let message = match res {
            Ok(event) if is_content_change(&event.kind) => {
                Ok(CredentialChangeEvent::new(event.paths))
            }
            Ok(_) => return,
            Err(err) => Err(err),
        };
        // receiver gone means the watch is shutting down
        let _ = tx.send(message);
    })?;

    // Kubernetes secret volumes swap a `..data` symlink inside the
    // directory, so the directory itself is watched rather than each file.
    watcher.watch(dir, RecursiveMode::NonRecursive)?;

    tracing::debug!(path = %dir.display(), "Credential file watcher started");
    Ok(watcher)
}
