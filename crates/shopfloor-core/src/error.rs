//! # Error Types
//!
//! Domain-specific error types for shopfloor-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopfloor-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopfloor-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── OrderError       - CoreError | DbError from the order transaction │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                │
//! │  └── ApiError         - code + message + status                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → OrderError → ApiError → client    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These are the failures a client can act on. Persistence failures never
/// appear here; they live in `shopfloor_db::DbError`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Inventory item cannot be found.
    ///
    /// ## When This Occurs
    /// - Item ID doesn't exist in the catalog
    /// - An order line names an item that was deleted
    #[error("Inventory item not found: {0}")]
    ItemNotFound(String),

    /// Not enough stock to satisfy an order line.
    ///
    /// ## Order Workflow
    /// ```text
    /// POST /api/orders  [{ Widget, qty: 11 }]
    ///      │
    ///      ▼
    /// Check stock: available=10
    ///      │
    ///      ▼
    /// InsufficientStock { item: "Widget", available: 10, requested: 11 }
    ///      │
    ///      ▼
    /// 400: "Insufficient stock for Widget: available 10, requested 11"
    /// ```
    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        item: String,
        available: i64,
        requested: i64,
    },

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Email/password pair did not match an active account.
    ///
    /// The message is the same whether the email is unknown or the
    /// password is wrong.
    #[error("Incorrect email or password")]
    AuthenticationFailed,

    /// The account exists but has been deactivated.
    #[error("Account is inactive")]
    AccountInactive,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage access, so they never have side effects.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
