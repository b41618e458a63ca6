//! Error types for the HTTP API.
//!
//! Every failure leaves a handler as an [`ApiError`], which renders as
//! `{ "code": "SCREAMING_SNAKE", "message": "..." }` with the matching
//! status. Detail behind a 500 is logged, never returned.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use shopfloor_core::{CoreError, CredentialError, ValidationError};
use shopfloor_db::{DbError, OrderError};

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InsufficientStock(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Retryable: the store was locked or out of connections.
    #[error("{0}")]
    Busy(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error code carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    Conflict,
    InsufficientStock,
    Unauthorized,
    Forbidden,
    StoreBusy,
    InternalError,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Validation(_) => ErrorCode::ValidationError,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::Conflict(_) => ErrorCode::Conflict,
            ApiError::InsufficientStock(_) => ErrorCode::InsufficientStock,
            ApiError::Unauthorized(_) => ErrorCode::Unauthorized,
            ApiError::Forbidden(_) => ErrorCode::Forbidden,
            ApiError::Busy(_) => ErrorCode::StoreBusy,
            ApiError::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Busy(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 401 for a missing or unusable bearer token.
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("Could not validate credentials".to_string())
    }

    /// 403 for an authenticated caller without the needed capability.
    pub fn not_permitted() -> Self {
        ApiError::Forbidden("Not enough permissions".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        // Don't expose internal error details to clients
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed with internal error");
                "Internal server error".to_string()
            }
            ApiError::Busy(detail) => {
                tracing::warn!(reason = %detail, "Store busy, asking client to retry");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let mut response = (status, Json(ErrorBody { code, message })).into_response();

        match status {
            StatusCode::SERVICE_UNAVAILABLE => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
            }
            StatusCode::UNAUTHORIZED => {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            _ => {}
        }

        response
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(_) | CoreError::OrderNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            CoreError::InsufficientStock { .. } => ApiError::InsufficientStock(err.to_string()),
            CoreError::AuthenticationFailed => ApiError::Unauthorized(err.to_string()),
            CoreError::AccountInactive => ApiError::Forbidden(err.to_string()),
            CoreError::Validation(inner) => inner.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::ForeignKeyViolation { .. } => {
                ApiError::Conflict("Resource is referenced by other records".to_string())
            }
            err if err.is_retryable() => ApiError::Busy(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Rejected(core) => core.into(),
            OrderError::Store(db) => db.into(),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidToken => ApiError::invalid_credentials(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
