//! medipredict HTTP server.
//!
//! Services are built before the async runtime starts and dropped after it
//! has shut down, since the chat client is blocking.

use anyhow::{Context, Result};

use medipredict::api::{ApiServer, ApiServerConfig};
use medipredict::bootstrap;
use medipredict::config::Settings;

fn main() -> Result<()> {
    let settings = Settings::from_env()?;
    let _guard = bootstrap::init_logging(&settings, false)?;

    tracing::info!("Starting medipredict server...");
    tracing::debug!("Settings: {:?}", settings);

    let services = bootstrap::build_services(&settings).context("Failed to initialize services")?;
    let server = ApiServer::new(
        ApiServerConfig {
            addr: settings.http_addr,
        },
        services.api_state(),
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(server.serve(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("Shutdown signal received");
    }))?;

    drop(runtime);
    drop(services);

    tracing::info!("medipredict server shutdown complete.");
    Ok(())
}
