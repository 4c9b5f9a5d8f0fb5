//! # Kasir API Server
//!
//! ## Running
//! ```bash
//! # SQLite file in the working directory
//! cargo run -p kasir-api
//!
//! # Throwaway in-memory store
//! KASIR_STORAGE=memory KASIR_PORT=3000 cargo run -p kasir-api
//! ```
//!
//! See [`kasir_api::config`] for every variable.

use tokio::net::TcpListener;
use tracing::{error, info};

use kasir_api::config::{AppConfig, StorageBackend};
use kasir_api::logging::init_logging;
use kasir_api::{build_router, AppState};
use kasir_db::{Database, DbConfig, Repositories};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = AppConfig::load()?;
    init_logging(&config.log_level);

    info!("Starting Kasir API server...");
    info!(
        storage = %config.storage,
        currency = %config.currency_code,
        "Configuration loaded"
    );

    // Build the repository backend
    let (repos, db) = match config.storage {
        StorageBackend::Sqlite => {
            // Every pooled connection to :memory: would be its own database
            let db_config = if config.database_path == ":memory:" {
                DbConfig::in_memory()
            } else {
                DbConfig::new(&config.database_path).max_connections(config.db_max_connections)
            };
            let db = Database::new(db_config).await?;
            info!(path = %config.database_path, "Connected to SQLite");
            (Repositories::sqlite(&db), Some(db))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on exit");
            (Repositories::in_memory(), None)
        }
    };

    let app = build_router(AppState::new(repos, &config));

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
