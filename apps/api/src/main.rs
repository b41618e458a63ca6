//! # Shopfloor API
//!
//! HTTP server entry point.
//!
//! ```text
//! .env ─► ApiConfig::load ─► Database::new (migrations) ─► CredentialService
//!                                   │
//!                                   ▼
//!                        build_router ─► axum::serve (graceful shutdown)
//! ```

use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use shopfloor_api::{build_router, ApiConfig, AppState, DEFAULT_LOG_FILTER};
use shopfloor_core::CredentialService;
use shopfloor_db::Database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is normal
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    info!("Starting Shopfloor API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        bind_addr = %config.bind_addr,
        database = %config.database_path.display(),
        max_connections = config.db_max_connections,
        lock_timeout_ms = config.db_lock_timeout_ms,
        "Configuration loaded"
    );
    if config.uses_dev_secret() {
        warn!("JWT_SECRET is not set; using the development signing key");
    }

    // Connect to database (runs migrations)
    let db = Database::new(config.db_config()).await?;
    let credentials = CredentialService::new(&config.auth_config())?;

    let state = AppState::new(db.clone(), credentials);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
