//! Tracing subscriber setup for the binary.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

/// Default level: `debug` when `debug` is set, `info` otherwise.
pub fn default_level(debug: bool) -> Level {
    if debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install a stderr fmt subscriber filtered by `RUST_LOG`.
///
/// Fails if a global subscriber is already installed.
pub fn init(debug: bool) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level(debug).into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).try_init()
}
