//! # Storefront API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Browser / client ───► HTTP (8000) ───► axum router ───► SQLite        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use storefront_api::{build_router, AppConfig, AppState};
use storefront_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,sqlx=warn")),
        )
        .with_target(true)
        .init();

    info!("Starting Storefront API server...");

    // Load configuration
    let config = AppConfig::load()?;
    info!(
        addr = %config.bind_addr(),
        db_url = %config.database_url_for_log(),
        "Configuration loaded"
    );
    if config.uses_dev_secret() {
        warn!("SECRET_KEY not set, using the development secret");
    }

    // Open database (runs migrations)
    let db_config =
        DbConfig::from_url(&config.database_url).max_connections(config.database_max_connections);
    let db = Database::new(db_config).await?;
    info!("Database ready");

    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(db, config));
    let app = build_router(state.clone());

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
