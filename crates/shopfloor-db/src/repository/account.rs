//! # Account Repository
//!
//! Database operations for accounts and login.
//!
//! Password hashing and verification are CPU-bound (Argon2), so they run
//! on tokio's blocking pool rather than on the async workers.
//!
//! ## Login
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  authenticate(email, password)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT … WHERE email = lower(email)                                   │
//! │       │                                                                 │
//! │       ├── no row      → verify against dummy hash → None               │
//! │       ├── bad password                            → None               │
//! │       ├── inactive                                → None               │
//! │       ▼                                                                 │
//! │  UPDATE last_access_at → Some(account)                                 │
//! │                                                                         │
//! │  Every failure looks the same to the caller and costs one hash         │
//! │  verification, so responses do not reveal which emails exist.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use shopfloor_core::{Account, CredentialService, NewAccount, Page};

use super::{generate_id, now_timestamp};
use crate::error::{DbError, DbResult};

const ACCOUNT_COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, role, active, created_at, last_access_at";

/// Repository for account database operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Gets an account by email. The lookup ignores case.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1");

        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Gets an account by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1");

        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Creates an account, hashing its password first.
    ///
    /// `account` is expected to have passed [`NewAccount::validated`].
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - The email is already registered
    pub async fn create(
        &self,
        account: NewAccount,
        credentials: &CredentialService,
    ) -> DbResult<Account> {
        debug!(email = %account.email, role = %account.role, "Creating account");

        let hasher = credentials.clone();
        let password = account.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| DbError::Internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| DbError::Internal(e.to_string()))?;

        let sql = format!(
            "INSERT INTO accounts \
                (id, email, first_name, last_name, password_hash, role, active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7) \
             RETURNING {ACCOUNT_COLUMNS}"
        );

        let created = sqlx::query_as::<_, Account>(&sql)
            .bind(generate_id())
            .bind(&account.email)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&password_hash)
            .bind(account.role)
            .bind(now_timestamp())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("email", &account.email),
                other => other,
            })?;

        info!(id = %created.id, role = %created.role, "Account created");
        Ok(created)
    }

    /// Checks an email/password pair.
    ///
    /// ## Returns
    /// * `Ok(Some(Account))` - Credentials match an active account; its
    ///   `last_access_at` has been refreshed
    /// * `Ok(None)` - Unknown email, wrong password, or inactive account
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        credentials: &CredentialService,
    ) -> DbResult<Option<Account>> {
        let verifier = credentials.clone();
        let password = password.to_string();

        let Some(account) = self.get_by_email(email).await? else {
            tokio::task::spawn_blocking(move || verifier.verify_against_dummy(&password))
                .await
                .map_err(|e| DbError::Internal(format!("Password check task failed: {e}")))?;
            debug!("Login for unknown email");
            return Ok(None);
        };

        let hash = account.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verifier.verify_password(&password, &hash))
            .await
            .map_err(|e| DbError::Internal(format!("Password check task failed: {e}")))?;

        if !matches {
            debug!(id = %account.id, "Login with wrong password");
            return Ok(None);
        }
        if !account.active {
            debug!(id = %account.id, "Login for inactive account");
            return Ok(None);
        }

        let sql = format!(
            "UPDATE accounts SET last_access_at = ?2 WHERE id = ?1 RETURNING {ACCOUNT_COLUMNS}"
        );
        let touched = sqlx::query_as::<_, Account>(&sql)
            .bind(&account.id)
            .bind(now_timestamp())
            .fetch_one(&self.pool)
            .await?;

        Ok(Some(touched))
    }

    /// Lists accounts, newest first.
    pub async fn list(&self, page: Page) -> DbResult<Vec<Account>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             ORDER BY created_at DESC, rowid DESC \
             LIMIT ?1 OFFSET ?2"
        );

        let accounts = sqlx::query_as::<_, Account>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(accounts)
    }

    /// Enables or disables an account.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<Account> {
        debug!(id = %id, active, "Setting account active flag");

        let sql = format!("UPDATE accounts SET active = ?2 WHERE id = ?1 RETURNING {ACCOUNT_COLUMNS}");
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Account", id))
    }

    /// Counts accounts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
