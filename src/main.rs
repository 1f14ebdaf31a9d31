use color_eyre::eyre::WrapErr;
use color_eyre::Result;

use hccm::config::Config;
use hccm::{logging, startup};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::from_env().wrap_err("invalid configuration")?;
    logging::init(config.debug)?;
    tracing::debug!(config = ?config, "Configuration loaded");

    let mut clients = startup::start(&config)
        .await
        .wrap_err("startup failed")?;

    tracing::info!(
        robot = clients.robot.is_some(),
        hot_reload = clients.watch.is_some(),
        metrics = clients.metrics.is_some(),
        "hccm started"
    );

    tokio::signal::ctrl_c()
        .await
        .wrap_err("failed to listen for shutdown signal")?;

    clients.shutdown().await;
    tracing::info!("hccm stopped");
    Ok(())
}
