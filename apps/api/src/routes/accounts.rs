//! Account administration.

use axum::extract::State;
use axum::Json;

use shopfloor_core::{Account, Capability};

use crate::error::ApiError;
use crate::extract::{ApiQuery, CurrentAccount, ListParams};
use crate::state::SharedState;

/// `GET /api/accounts?offset&limit`, admin only, newest first.
pub async fn list(
    State(state): State<SharedState>,
    caller: CurrentAccount,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Account>>, ApiError> {
    caller.require(Capability::ListAccounts)?;

    let accounts = state.db.accounts().list(params.page()?).await?;
    Ok(Json(accounts))
}
