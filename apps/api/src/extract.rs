//! Request extractors.
//!
//! - [`CurrentAccount`] - the caller behind `Authorization: Bearer <token>`
//! - [`ApiJson`] / [`ApiQuery`] - `Json` / `Query` whose rejections render
//!   as [`ApiError`] bodies
//! - [`ListParams`] - `?offset&limit&search`

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::{header, request::Parts};
use serde::Deserialize;
use tracing::debug;

use shopfloor_core::credentials::extract_bearer_token;
use shopfloor_core::{Account, Capability, CoreError, Page};

use crate::error::ApiError;
use crate::state::SharedState;

/// JSON body extractor with [`ApiError`] rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor with [`ApiError`] rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Offset/limit pagination plus an optional search term.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl ListParams {
    pub fn page(&self) -> Result<Page, ApiError> {
        Ok(Page::new(self.offset, self.limit)?)
    }
}

/// Extractor that requires a valid bearer token for an active account.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(CurrentAccount(account): CurrentAccount) -> Json<Account> {
///     Json(account)
/// }
/// ```
///
/// Missing, malformed, expired or unknown-subject tokens give 401. A valid
/// token for a deactivated account gives 403.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

impl CurrentAccount {
    /// Fails with 403 unless the caller's role grants `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
        if self.0.role.can(capability) {
            Ok(())
        } else {
            debug!(account_id = %self.0.id, ?capability, "Capability denied");
            Err(ApiError::not_permitted())
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.0.role.can(capability)
    }
}

impl FromRequestParts<SharedState> for CurrentAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let email = state.credentials.verify_token(token)?;

        let account = state
            .db
            .accounts()
            .get_by_email(&email)
            .await?
            .ok_or_else(ApiError::invalid_credentials)?;

        if !account.active {
            return Err(CoreError::AccountInactive.into());
        }

        Ok(CurrentAccount(account))
    }
}
