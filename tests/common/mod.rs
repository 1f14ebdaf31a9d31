//! Common test utilities for integration tests.
//!
//! Credential directory fixtures, token builders and polling helpers shared
//! by the reload tests.
//!
//! # Example
//!
//! ```ignore
//! let (_temp, dir) = secret_dir();
//! write_token(&dir, &token('a'));
//! assert!(wait_for(|| hcloud_reload_count() > before).await);
//! ```

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use hccm::hotreload::{
    credentials_directory, ReloadCounters, WatchOptions, HCLOUD_TOKEN_FILE, ROBOT_PASSWORD_FILE,
    ROBOT_USER_FILE,
};
use tempfile::TempDir;

/// Upper bound for an asynchronous rotation to become visible.
pub const ROTATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Debounce used by tests; short enough to keep them fast.
pub const TEST_DEBOUNCE: Duration = Duration::from_millis(100);

/// Watch options with [`TEST_DEBOUNCE`].
pub fn fast_watch() -> WatchOptions {
    WatchOptions::default().with_debounce(TEST_DEBOUNCE)
}

/// A temp root with an empty `etc/hetzner-secret` below it.
///
/// Keep the `TempDir` alive for the duration of the test.
pub fn secret_dir() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let dir = credentials_directory(temp.path());
    std::fs::create_dir_all(&dir).unwrap();
    (temp, dir)
}

/// A valid 64-character token made of `c`.
pub fn token(c: char) -> String {
    std::iter::repeat(c).take(64).collect()
}

pub fn write_token(dir: &Path, token: &str) {
    std::fs::write(dir.join(HCLOUD_TOKEN_FILE), token).unwrap();
}

pub fn write_robot_credentials(dir: &Path, user: &str, password: &str) {
    std::fs::write(dir.join(ROBOT_USER_FILE), user).unwrap();
    std::fs::write(dir.join(ROBOT_PASSWORD_FILE), password).unwrap();
}

/// Expected `Authorization` value for a basic-auth pair.
pub fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
}

/// Expected `Authorization` value for a bearer token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Counters private to one test.
pub fn local_counters() -> &'static ReloadCounters {
    Box::leak(Box::new(ReloadCounters::new()))
}

/// Poll `condition` until it holds or [`ROTATION_TIMEOUT`] passes.
pub async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < ROTATION_TIMEOUT {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    condition()
}

/// `Authorization` headers of every request the mock server received.
pub async fn authorization_headers(server: &wiremock::MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| {
            request
                .headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .collect()
}
