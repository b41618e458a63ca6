//! Shared application state.

use std::sync::Arc;

use shopfloor_core::CredentialService;
use shopfloor_db::Database;

/// Everything a handler needs, built once at startup.
pub struct AppState {
    pub db: Database,
    pub credentials: CredentialService,
}

/// The router state type. Cloned per request.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Database, credentials: CredentialService) -> SharedState {
        Arc::new(AppState { db, credentials })
    }
}
