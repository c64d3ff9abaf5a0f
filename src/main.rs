// Composition root wiring the session manager to the HTTP server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use booth_session_engine::config::ServiceConfig;
use booth_session_engine::engine::lifecycle::SessionManager;
use booth_session_engine::engine::store::SessionStore;
use booth_session_engine::server::handler::SessionServer;
use booth_session_engine::storage::blob_sas::BlobSasProvisioner;
use booth_session_engine::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ServiceConfig::from_env().context("failed to load configuration")?;
    info!(
        "starting session service on {} (session ttl {}s, container {}/{})",
        config.bind_addr,
        config.session_ttl_secs,
        config.blob.account_name,
        config.blob.container_name
    );

    let store = Arc::new(SessionStore::new());
    let provisioner = Arc::new(BlobSasProvisioner::new(&config.blob)?);
    let manager = Arc::new(SessionManager::new(
        store,
        provisioner,
        config.session_ttl(),
    ));

    let server = SessionServer::start(manager.clone(), &config.bind_addr).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown requested");

    server.shutdown().await;
    manager.shutdown();
    info!("session service stopped");
    Ok(())
}
