//! HTTP server command

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::CliConfigLoader;
use crate::server::{self, AppState};

/// Serve the generate endpoint until Ctrl-C
pub async fn serve_command(config_loader: CliConfigLoader) -> Result<()> {
    let config = config_loader.load().await?;
    let orchestrator = super::build_orchestrator(&config);

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on http://{}", listener.local_addr()?);
    info!(
        "Pacing delay {:?}, init timeout {:?}",
        config.settings.pacing_delay, config.settings.init_timeout
    );

    server::serve(listener, AppState::new(orchestrator), shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested, finishing in-flight requests");
}
