//! Route handlers.
//!
//! ```text
//! GET    /                         service name + version
//! GET    /api/health               store reachability
//! GET    /api/stats                dashboard figures
//!
//! GET    /api/items                ?offset&limit&search
//! POST   /api/items                admin
//! GET    /api/items/{id}
//! PUT    /api/items/{id}           admin, partial
//! DELETE /api/items/{id}           admin
//!
//! POST   /api/auth/register
//! POST   /api/auth/login
//! GET    /api/auth/profile         bearer
//!
//! GET    /api/accounts             admin
//!
//! POST   /api/orders               bearer
//! GET    /api/orders               own orders, or all for admin
//! GET    /api/orders/{id}          owner or admin
//! PUT    /api/orders/{id}/status   admin
//! ```

use serde::Serialize;

pub mod accounts;
pub mod auth;
pub mod health;
pub mod items;
pub mod orders;

/// `{ "message": "..." }` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}
