//! # shopfloor-core: Pure Business Logic for Shopfloor
//!
//! This crate holds the domain of the Shopfloor back office as pure
//! functions and plain data types. Nothing in here touches a database,
//! a socket or the file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopfloor Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    /items, /auth, /orders, /accounts, /stats                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ shopfloor-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   order   │  │credentials│  │   │
//! │  │   │   Item    │  │   Money   │  │  pricing  │  │  argon2   │  │   │
//! │  │   │  Account  │  │           │  │  checks   │  │   JWT     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopfloor-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, the order transaction        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, Account, Order, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`order`] - Stock checks and pricing for an order request
//! - [`credentials`] - Password hashing and bearer tokens
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use shopfloor_core::money::Money;
//!
//! let unit_price = Money::from_cents(250); // $2.50
//! let subtotal = unit_price.multiply_quantity(4);
//! assert_eq!(subtotal.to_string(), "$10.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod credentials;
pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use credentials::{AuthConfig, CredentialError, CredentialService};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{price_order, PricedLine, PricedOrder};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines accepted in a single order request.
pub const MAX_ORDER_LINES: usize = 100;

/// Default page size when a list request does not pass `limit`.
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Largest page a list request may ask for.
pub const MAX_PAGE_LIMIT: i64 = 1000;
