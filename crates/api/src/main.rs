use std::sync::Arc;

use anyhow::Context;

use petadopt_infra::{AppConfig, PostgresStore, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    petadopt_observability::init();

    let config = AppConfig::from_env();

    // Store connection and schema setup are the only fatal startup paths.
    let store = PostgresStore::connect(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to the database")?;
    store
        .init()
        .await
        .context("failed to initialize the database schema")?;

    let app = petadopt_api::app::build_app(&config, Arc::new(store));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
