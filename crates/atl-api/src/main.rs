//! # atl-api: Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the environment
//! (see [`atl_api::config`]).

use std::sync::Arc;

use atl_api::config::{AppConfig, LogFormat};
use atl_api::db::{init_pool, PgStore};
use atl_api::state::AppState;
use atl_api::store::{MemoryStore, TranslationStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let store: Arc<dyn TranslationStore> = match &config.database {
        Some(database) => {
            let pool = init_pool(database).await.map_err(|e| {
                tracing::error!("Database initialization failed: {e}");
                e
            })?;
            tracing::info!("PostgreSQL store ready");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!(
                "No database configured. Using the in-memory store; data is lost on restart."
            );
            Arc::new(MemoryStore::new())
        }
    };

    let port = config.port;
    let state = AppState::new(store, config).map_err(|e| {
        tracing::error!("Credential hasher setup failed: {e}");
        e
    })?;

    let app = atl_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Address translation API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
