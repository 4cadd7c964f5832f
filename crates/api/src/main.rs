use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::signal;

use warehouse_api::app::{build_app, services};
use warehouse_infra::config::{AppConfig, DEFAULT_CONFIG_PATH};

/// `warehouse-api` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "warehouse-api",
    about = "Serve product stock and removals over HTTP",
    version
)]
struct CliArgs {
    /// TOML config file; `WAREHOUSE_*` environment variables override it.
    #[arg(long, value_name = "path", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("load config from {}", args.config.display()))?;

    warehouse_observability::init(&config.telemetry.log_level, config.telemetry.json);
    tracing::debug!(?config, "configuration loaded");

    let services = services::build_services(&config)
        .await
        .context("build services")?;
    let app = build_app(
        services,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("bind {address}"))?;

    tracing::info!(
        address = %listener.local_addr()?,
        storage = ?config.storage,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
