//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── OrderError::Store  (order transaction)                       │
//! │       ▼                                                                 │
//! │  ApiError (apps/api) ← status code + generic message                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shopfloor_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Creating or renaming an item to a name already in use
    /// - Registering an email that already has an account
    #[error("{field} '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Deleting an inventory item that existing orders reference
    /// - Inserting an order for an account that doesn't exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// The write lock could not be taken within the busy timeout.
    ///
    /// Retryable: nothing was committed.
    #[error("Database is busy, retry the request")]
    Busy,

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (no connection within the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for failures that a client may simply retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::Busy | DbError::PoolExhausted)
    }
}

/// SQLite primary result codes that mean "someone else holds the lock".
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Extended result code SQLite reports for a RESTRICT foreign key action.
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound        → DbError::NotFound
/// Database, unique violation      → DbError::UniqueViolation (column parsed from message)
/// Database, foreign key violation → DbError::ForeignKeyViolation (787 or RESTRICT's 1811)
/// Database, SQLITE_BUSY / LOCKED  → DbError::Busy
/// sqlx::Error::PoolTimedOut       → DbError::PoolExhausted
/// Other                           → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if db_err.is_unique_violation() {
                    // "UNIQUE constraint failed: inventory_items.name"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .and_then(|target| target.rsplit('.').next())
                        .unwrap_or("unknown")
                        .to_string();
                    return DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    };
                }

                // ON DELETE RESTRICT fails with 1811 (SQLITE_CONSTRAINT_TRIGGER)
                // rather than 787, which is all `is_foreign_key_violation` knows.
                if db_err.is_foreign_key_violation()
                    || db_err.code().as_deref() == Some(SQLITE_CONSTRAINT_TRIGGER)
                    || msg.starts_with("FOREIGN KEY constraint failed")
                {
                    return DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    };
                }

                // Extended codes (e.g. 517 SQLITE_BUSY_SNAPSHOT) keep the
                // primary code in the low byte.
                let primary = db_err
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| code & 0xff);
                if matches!(primary, Some(SQLITE_BUSY) | Some(SQLITE_LOCKED))
                    || msg.contains("database is locked")
                {
                    return DbError::Busy;
                }

                DbError::QueryFailed(msg.to_string())
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Order Error
// =============================================================================

/// Failure of the order placement transaction.
///
/// Business rejections and persistence failures are kept apart so the
/// caller can answer 4xx for one and 5xx for the other. In both cases the
/// transaction has been rolled back.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request was refused: validation, unknown item, not enough stock.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] DbError),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Store(err.into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
