mod app;
mod bootstrap;
mod docs;
mod error;
mod health;
mod products;
mod request_log;

use anyhow::Result;
use catalog_core::config::{AppConfig, LoadOptions};
use tokio::net::TcpListener;

fn init_logging(config: &AppConfig) {
    use catalog_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Logging comes up before the store is touched so bootstrap events are visible.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let address = app.config.listen_address();
    let listener = TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        listen_address = %address,
        storage_backend = app.catalog.backend(),
        "catalog-server listening"
    );

    let router = app::router(app.catalog.clone(), &app.config.server);
    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(event_name = "system.server.stopped", "catalog-server stopped");
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(
            event_name = "system.server.signal_error",
            error = %error,
            "could not listen for shutdown signal"
        );
        std::future::pending::<()>().await;
    }
    tracing::info!(event_name = "system.server.stopping", "shutdown signal received, draining");
}
