//! Order endpoints.
//!
//! ```text
//! POST /api/orders ──► OrderRepository::place_order (one transaction)
//!                        ├── Rejected(Validation)        → 400 VALIDATION_ERROR
//!                        ├── Rejected(ItemNotFound)      → 404 NOT_FOUND
//!                        ├── Rejected(InsufficientStock) → 400 INSUFFICIENT_STOCK
//!                        ├── Store(Busy | PoolExhausted) → 503 STORE_BUSY
//!                        └── Ok(view)                    → 201
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use shopfloor_core::{Capability, CoreError, OrderRequest, OrderStatus, OrderView};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, CurrentAccount, ListParams};
use crate::state::SharedState;

/// Body of `PUT /api/orders/{id}/status`.
///
/// Taken as a string so an unknown value reports the allowed set.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// `POST /api/orders`
pub async fn create(
    State(state): State<SharedState>,
    caller: CurrentAccount,
    ApiJson(req): ApiJson<OrderRequest>,
) -> Result<(StatusCode, Json<OrderView>), ApiError> {
    let view = state.db.orders().place_order(&caller.0.id, &req).await?;

    info!(order_id = %view.id, total_cents = view.total_cents, "Order created");
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /api/orders?offset&limit`. Admins see every order.
pub async fn list(
    State(state): State<SharedState>,
    caller: CurrentAccount,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let page = params.page()?;

    let orders = if caller.can(Capability::ViewAllOrders) {
        state.db.orders().list_all(page).await?
    } else {
        state.db.orders().list_by_account(&caller.0.id, page).await?
    };

    Ok(Json(orders))
}

/// `GET /api/orders/{id}`. 403 unless the caller owns it or is an admin.
pub async fn get(
    State(state): State<SharedState>,
    caller: CurrentAccount,
    Path(id): Path<String>,
) -> Result<Json<OrderView>, ApiError> {
    let view = state
        .db
        .orders()
        .get(&id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(id.clone()))?;

    if view.account_id != caller.0.id && !caller.can(Capability::ViewAllOrders) {
        return Err(ApiError::not_permitted());
    }

    Ok(Json(view))
}

/// `PUT /api/orders/{id}/status`, admin only.
pub async fn update_status(
    State(state): State<SharedState>,
    caller: CurrentAccount,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> Result<Json<OrderView>, ApiError> {
    caller.require(Capability::ManageOrders)?;

    let status: OrderStatus = body.status.parse()?;
    let view = state.db.orders().update_status(&id, status).await?;

    info!(order_id = %view.id, status = %view.status, by = %caller.0.email, "Order status updated");
    Ok(Json(view))
}
