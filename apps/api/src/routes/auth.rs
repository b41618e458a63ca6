//! Registration, login and profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use shopfloor_core::{Account, CoreError, NewAccount, Role};

use crate::error::ApiError;
use crate::extract::{ApiJson, CurrentAccount};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued on register and login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub account: Account,
}

fn token_response(state: &SharedState, account: Account) -> Result<TokenResponse, ApiError> {
    let access_token = state.credentials.issue_token(&account.email)?;
    Ok(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.credentials.access_token_ttl_secs(),
        account,
    })
}

/// `POST /api/auth/register`. Always creates a customer.
pub async fn register(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let new_account = NewAccount {
        email: req.email,
        password: req.password,
        first_name: req.first_name,
        last_name: req.last_name,
        role: Role::Customer,
    }
    .validated()?;

    let account = state
        .db
        .accounts()
        .create(new_account, &state.credentials)
        .await?;

    info!(account_id = %account.id, "Account registered");
    Ok((StatusCode::CREATED, Json(token_response(&state, account)?)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let account = state
        .db
        .accounts()
        .authenticate(&req.email, &req.password, &state.credentials)
        .await?
        .ok_or_else(|| {
            warn!("Login failed");
            ApiError::from(CoreError::AuthenticationFailed)
        })?;

    info!(account_id = %account.id, "Login succeeded");
    Ok(Json(token_response(&state, account)?))
}

/// `GET /api/auth/profile`
pub async fn profile(CurrentAccount(account): CurrentAccount) -> Json<Account> {
    Json(account)
}
