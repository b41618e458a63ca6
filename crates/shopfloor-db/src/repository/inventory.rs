//! # Inventory Repository
//!
//! Database operations for catalog items.
//!
//! ## Key Operations
//! - Paginated listing, newest first
//! - Case-insensitive substring search by name
//! - CRUD with partial update
//!
//! ## Name Uniqueness
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Layers of Name Checking                          │
//! │                                                                         │
//! │  create / update("Widget")                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  name_exists("Widget", exclude_id) ──── yes ──► UniqueViolation        │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  INSERT / UPDATE                                                       │
//! │       │                                                                 │
//! │       └── idx_inventory_items_name ── violated ──► UniqueViolation     │
//! │                                                                         │
//! │  The pre-check gives a quick answer. The unique index is what holds    │
//! │  when two writers race past the pre-check together.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use shopfloor_core::{InventoryItem, InventoryItemPatch, NewInventoryItem, Page};

use super::{escape_like, generate_id, now_timestamp};
use crate::error::{DbError, DbResult};

const ITEM_COLUMNS: &str = "id, name, description, quantity, price_cents, created_at, updated_at";

/// Repository for inventory item database operations.
///
/// Field constraints are the caller's job (`NewInventoryItem::validated`,
/// `InventoryItemPatch::validated`). The table CHECKs back them up.
///
/// ## Usage
/// ```rust,ignore
/// let repo = InventoryRepository::new(pool);
///
/// let widget = repo.create(new_item.validated()?).await?;
/// let hits = repo.search("widg", Page::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets an item by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(InventoryItem))` - Item found
    /// * `Ok(None)` - Item not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ?1");

        let item = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists items, newest first.
    pub async fn list(&self, page: Page) -> DbResult<Vec<InventoryItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             ORDER BY created_at DESC, rowid DESC \
             LIMIT ?1 OFFSET ?2"
        );

        let items = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Searches items whose name contains `term`, ignoring ASCII case.
    ///
    /// `%`, `_` and `\` in `term` match literally. Results are ordered by
    /// name.
    pub async fn search(&self, term: &str, page: Page) -> DbResult<Vec<InventoryItem>> {
        debug!(term = %term, limit = page.limit, "Searching inventory");

        let pattern = format!("%{}%", escape_like(term));
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items \
             WHERE name LIKE ?1 ESCAPE '\\' \
             ORDER BY name ASC \
             LIMIT ?2 OFFSET ?3"
        );

        let items = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(pattern)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = items.len(), "Search returned items");
        Ok(items)
    }

    /// Inserts a new item.
    ///
    /// ## Returns
    /// * `Ok(InventoryItem)` - The stored row
    /// * `Err(DbError::UniqueViolation)` - The name is taken
    pub async fn create(&self, item: NewInventoryItem) -> DbResult<InventoryItem> {
        debug!(name = %item.name, "Creating inventory item");

        if self.name_exists(&item.name, None).await? {
            return Err(DbError::duplicate("name", &item.name));
        }

        let id = generate_id();
        let now = now_timestamp();
        let sql = format!(
            "INSERT INTO inventory_items \
                (id, name, description, quantity, price_cents, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
             RETURNING {ITEM_COLUMNS}"
        );

        let created = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(&id)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.price_cents)
            .bind(&now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| name_conflict(e, &item.name))?;

        debug!(id = %created.id, "Inventory item created");
        Ok(created)
    }

    /// Applies a partial update. Only `Some` fields change.
    ///
    /// An empty patch returns the current row untouched.
    ///
    /// ## Returns
    /// * `Ok(InventoryItem)` - The row after the update
    /// * `Err(DbError::NotFound)` - No item with this ID
    /// * `Err(DbError::UniqueViolation)` - The new name belongs to another item
    pub async fn update(&self, id: &str, patch: InventoryItemPatch) -> DbResult<InventoryItem> {
        debug!(id = %id, "Updating inventory item");

        if patch.is_empty() {
            return self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::not_found("Item", id));
        }

        if let Some(name) = patch.name.as_deref() {
            if self.name_exists(name, Some(id)).await? {
                return Err(DbError::duplicate("name", name));
            }
        }

        let sql = format!(
            "UPDATE inventory_items SET \
                name = COALESCE(?2, name), \
                description = COALESCE(?3, description), \
                quantity = COALESCE(?4, quantity), \
                price_cents = COALESCE(?5, price_cents), \
                updated_at = ?6 \
             WHERE id = ?1 \
             RETURNING {ITEM_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.description)
            .bind(patch.quantity)
            .bind(patch.price_cents)
            .bind(now_timestamp())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| name_conflict(e, patch.name.as_deref().unwrap_or_default()))?;

        updated.ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Deletes an item.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No item with this ID
    /// * `Err(DbError::ForeignKeyViolation)` - Existing order lines reference it
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting inventory item");

        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Counts catalog items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Checks whether `name` is used by an item other than `exclude_id`.
    pub async fn name_exists(&self, name: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM inventory_items WHERE name = ?1 AND (?2 IS NULL OR id <> ?2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }
}

/// Attaches the offending name to a unique index violation.
fn name_conflict(err: sqlx::Error, name: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
            field,
            value: name.to_string(),
        },
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
