//! Catalog endpoints. Reads are open; writes need `ManageInventory`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use shopfloor_core::validation::validate_search_query;
use shopfloor_core::{Capability, CoreError, InventoryItem, InventoryItemPatch, NewInventoryItem};

use super::MessageResponse;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, CurrentAccount, ListParams};
use crate::state::SharedState;

/// `GET /api/items?offset&limit&search`
///
/// With a non-blank `search` the result is a name search ordered by name;
/// otherwise the newest items come first.
pub async fn list(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    let page = params.page()?;
    let term = match params.search.as_deref() {
        Some(raw) => validate_search_query(raw)?,
        None => None,
    };

    let items = match term {
        Some(term) => state.db.inventory().search(&term, page).await?,
        None => state.db.inventory().list(page).await?,
    };

    Ok(Json(items))
}

/// `GET /api/items/{id}`
pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<InventoryItem>, ApiError> {
    state
        .db
        .inventory()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::ItemNotFound(id).into())
}

/// `POST /api/items`
pub async fn create(
    State(state): State<SharedState>,
    caller: CurrentAccount,
    ApiJson(item): ApiJson<NewInventoryItem>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    caller.require(Capability::ManageInventory)?;

    let created = state.db.inventory().create(item.validated()?).await?;

    info!(id = %created.id, name = %created.name, by = %caller.0.email, "Item created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/items/{id}`. Only the supplied fields change.
pub async fn update(
    State(state): State<SharedState>,
    caller: CurrentAccount,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<InventoryItemPatch>,
) -> Result<Json<InventoryItem>, ApiError> {
    caller.require(Capability::ManageInventory)?;

    let updated = state.db.inventory().update(&id, patch.validated()?).await?;

    info!(id = %updated.id, by = %caller.0.email, "Item updated");
    Ok(Json(updated))
}

/// `DELETE /api/items/{id}`. 409 while orders still reference the item.
pub async fn delete(
    State(state): State<SharedState>,
    caller: CurrentAccount,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    caller.require(Capability::ManageInventory)?;

    state.db.inventory().delete(&id).await?;

    info!(id = %id, by = %caller.0.email, "Item deleted");
    Ok(Json(MessageResponse::new("Item deleted successfully")))
}
