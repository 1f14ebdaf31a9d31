//! Process start: build clients, check connectivity, register the watch.

use std::sync::Arc;

use super::clients::{new_cached_robot_client, new_hcloud_client};
use crate::config::Config;
use crate::error::StartupError;
use crate::hcloud::HcloudClient;
use crate::hotreload::{
    watch_with_options, CounterReporter, ReloadCounters, WatchHandle, WatchOptions,
    DEFAULT_REPORT_INTERVAL,
};
use crate::robot::CachedRobotClient;
use crate::traits::Reloadable;

/// Live clients plus the watch keeping their credentials current.
#[derive(Debug)]
pub struct Clients {
    pub hcloud: Arc<HcloudClient>,
    pub robot: Option<Arc<CachedRobotClient>>,
    /// `None` when hot reload is disabled or every credential came from the
    /// environment
    pub watch: Option<WatchHandle>,
    /// Reload counter reporting; `None` when metrics are disabled
    pub metrics: Option<CounterReporter>,
}

impl Clients {
    /// Stop following credential files. The clients stay usable.
    pub async fn stop_watching(&mut self) {
        if let Some(handle) = self.watch.take() {
            handle.stop().await;
        }
    }

    /// Stop the watch, then the counter reporter (logging final counts).
    pub async fn shutdown(&mut self) {
        self.stop_watching().await;
        if let Some(reporter) = self.metrics.take() {
            reporter.stop();
        }
    }
}

/// Build every client from `config` and start following credential files.
///
/// Clients whose credentials came from the environment are not registered
/// with the watch.
///
/// # Errors
///
/// Any credential, connectivity or watch failure is fatal.
pub async fn start(config: &Config) -> Result<Clients, StartupError> {
    let hcloud = Arc::new(new_hcloud_client(config)?);
    hcloud.verify().await?;
    tracing::info!(endpoint = hcloud.endpoint(), "Cloud API credentials verified");

    let robot = new_cached_robot_client(config)?.map(Arc::new);
    if let Some(robot) = &robot {
        tracing::info!(
            endpoint = robot.inner().endpoint(),
            cache_timeout = ?robot.freshness(),
            "Bare-metal API client ready"
        );
    }

    let mut targets: Vec<Arc<dyn Reloadable>> = Vec::new();
    if config.hcloud_token.is_none() {
        targets.push(hcloud.clone());
    }
    if let (Some(robot), None) = (&robot, &config.robot_credentials) {
        targets.push(robot.clone());
    }

    let dir = config.credentials_directory();
    let watch = if !config.hot_reload_enabled {
        tracing::info!("Credential hot reload disabled");
        None
    } else if targets.is_empty() {
        tracing::debug!("All credentials from environment, nothing to watch");
        None
    } else {
        let options = WatchOptions::default().with_debounce(config.reload_debounce);
        let handle = watch_with_options(&dir, targets, None, options)?;
        tracing::info!(path = %dir.display(), "Watching credential files");
        Some(handle)
    };

    let metrics = config
        .metrics_enabled
        .then(|| CounterReporter::spawn(ReloadCounters::global(), DEFAULT_REPORT_INTERVAL));

    Ok(Clients {
        hcloud,
        robot,
        watch,
        metrics,
    })
}
