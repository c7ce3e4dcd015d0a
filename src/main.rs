use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use nexum::api::{start_server, AppState, Metrics, ServerConfig};
use nexum::storage::{RetryConfig, SqliteStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nexum=info".parse()?))
        .init();

    tracing::info!("Nexum starting...");

    let db_path = std::env::var("NEXUM_DB_PATH").unwrap_or_else(|_| "numbers.db".into());
    let store = Arc::new(SqliteStore::open(&db_path)?.with_retry(RetryConfig::from_env()));
    tracing::info!("Opened SQLite store at {}", db_path);

    let state = Arc::new(AppState::new(store, Arc::new(Metrics::new())));

    start_server(ServerConfig::from_env(), state, shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
