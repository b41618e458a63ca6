//! # Repository Module
//!
//! Database repository implementations for Shopfloor.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.inventory().search("widget", page)                         │
//! │       ▼                                                                 │
//! │  InventoryRepository   get_by_id, list, search, create, update,        │
//! │                        delete, count, name_exists                      │
//! │  AccountRepository     get_by_email, get_by_id, create, authenticate,  │
//! │                        list, set_active, count                         │
//! │  OrderRepository       place_order, get, list_by_account, list_all,    │
//! │                        update_status                                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`inventory::InventoryRepository`] - Catalog CRUD and search
//! - [`account::AccountRepository`] - Accounts and login
//! - [`order::OrderRepository`] - Order placement and the order read path

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

pub mod account;
pub mod inventory;
pub mod order;

/// Generates a new entity ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time in the fixed-width text form every table stores.
///
/// Microsecond precision with a `Z` suffix keeps the lexical order of the
/// TEXT column equal to chronological order.
pub(crate) fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Escapes `%`, `_` and `\` for a `LIKE … ESCAPE '\'` pattern.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
