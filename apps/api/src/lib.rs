//! # Shopfloor API
//!
//! JSON HTTP server for the Shopfloor back office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Request Flow                                │
//! │                                                                         │
//! │  request                                                                │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  CorsLayer ─► TraceLayer ─► Router (/ and /api/...)                    │
//! │                                │                                        │
//! │                                ▼                                        │
//! │           ┌───────────── extractors ─────────────┐                     │
//! │           │ CurrentAccount  ApiJson  ApiQuery     │                     │
//! │           └──────────────────┬───────────────────┘                     │
//! │                              ▼                                          │
//! │  routes::{items, auth, accounts, orders, health}                       │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  AppState { Database, CredentialService }                              │
//! │                              │                                          │
//! │     Result<_, ApiError> ─────┴──► { code, message } + status           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig`]):
//! - `BIND_ADDR` - listen address (default: 0.0.0.0:8000)
//! - `DATABASE_PATH` - SQLite file (default: ./shopfloor.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `DB_LOCK_TIMEOUT_MS` - write lock wait bound (default: 5000)
//! - `JWT_SECRET` - token signing key
//! - `JWT_ACCESS_LIFETIME_SECS` - token lifetime, 1 to 2592000 (default: 1800)

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

// Re-exports
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use state::{AppState, SharedState};

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "shopfloor_api=info,shopfloor_db=info,tower_http=debug";

/// Builds the full application router.
pub fn build_router(state: SharedState) -> Router {
    use routes::{accounts, auth, health, items, orders};

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/stats", get(health::stats))
        .route("/items", get(items::list).post(items::create))
        .route(
            "/items/{id}",
            get(items::get).put(items::update).delete(items::delete),
        )
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/profile", get(auth::profile))
        .route("/accounts", get(accounts::list))
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/{id}", get(orders::get))
        .route("/orders/{id}/status", put(orders::update_status));

    Router::new()
        .route("/", get(health::root))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
