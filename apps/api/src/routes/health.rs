//! Service info, health and dashboard statistics.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use shopfloor_core::InventoryStats;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    /// `"applied/total"` embedded migrations, absent when unreachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<String>,
}

/// `GET /`
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /api/health`. 503 when the store does not answer or the schema
/// is behind the embedded migrations.
pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    if !state.db.health_check().await {
        warn!("Health check failed: database unreachable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                database: "unreachable",
                migrations: None,
            }),
        );
    }

    match state.db.migration_status().await {
        Ok((total, applied)) if applied >= total => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "connected",
                migrations: Some(format!("{applied}/{total}")),
            }),
        ),
        Ok((total, applied)) => {
            warn!(applied, total, "Health check failed: pending migrations");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "connected",
                    migrations: Some(format!("{applied}/{total}")),
                }),
            )
        }
        Err(e) => {
            warn!(error = %e, "Health check failed: migration status unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "connected",
                    migrations: None,
                }),
            )
        }
    }
}

/// `GET /api/stats`
pub async fn stats(State(state): State<SharedState>) -> Result<Json<InventoryStats>, ApiError> {
    Ok(Json(state.db.stats().await?))
}
