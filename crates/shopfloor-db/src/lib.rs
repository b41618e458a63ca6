//! # shopfloor-db: Database Layer for Shopfloor
//!
//! This crate provides database access for Shopfloor.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopfloor Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/orders)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   shopfloor-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ InventoryRepo │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ AccountRepo   │    │ 001_initial_ │  │   │
//! │  │   │ busy_timeout  │    │ OrderRepo ★   │    │  schema.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   ★ place_order: lock → check → decrement → persist → commit   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (inventory, account, order)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopfloor_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./shopfloor.db")).await?;
//!
//! let widgets = db.inventory().search("widget", Page::default()).await?;
//! let order = db.orders().place_order(&account.id, &request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, OrderError};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::account::AccountRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::order::OrderRepository;
