//! # Order Repository
//!
//! Order placement and every order read.
//!
//! ## Placement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    place_order(account_id, request)                     │
//! │                                                                         │
//! │  request.validate()            shape only, before touching storage     │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │  ① UPDATE inventory_items SET quantity = quantity WHERE id = ?         │
//! │       │   (one per distinct item; takes the write lock, waits at most   │
//! │       │    busy_timeout for a concurrent order to finish)               │
//! │       ▼                                                                 │
//! │  ② SELECT … WHERE id IN (…)     stock as of now, nobody else can move  │
//! │       ▼                                                                 │
//! │  ③ price_order()                every line checked before any write    │
//! │       ▼                                                                 │
//! │  ④ INSERT orders                                                       │
//! │  ⑤ per line:                                                           │
//! │       UPDATE … SET quantity = quantity - q WHERE id = ? AND quantity >= q│
//! │       (0 rows → InsufficientStock, whole transaction dropped)          │
//! │       INSERT order_lines          unit price snapshot                  │
//! │       ▼                                                                 │
//! │  ⑥ load the view                                                       │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any early return drops `tx` un-committed, which rolls everything back.│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Read Path
//! All reads (`get`, `list_by_account`, `list_all`, and the result of
//! `place_order` / `update_status`) go through [`load_views`], which joins
//! lines back to item names in one query for the whole page.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use shopfloor_core::{
    price_order, CoreError, InventoryItem, Order, OrderLineView, OrderRequest, OrderStatus,
    OrderView, Page,
};

use super::{generate_id, now_timestamp};
use crate::error::{DbError, DbResult, OrderError};

const HEADER_SELECT: &str = "SELECT o.id, o.account_id, o.total_cents, o.status, \
     o.shipping_address, o.notes, o.created_at, o.updated_at, a.email AS account_email \
     FROM orders o JOIN accounts a ON a.id = o.account_id";

/// An order header joined with its owner's email.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderHeaderRow {
    #[sqlx(flatten)]
    order: Order,
    account_email: String,
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    order_id: String,
    #[sqlx(flatten)]
    line: OrderLineView,
}

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places an order for `account_id`, atomically.
    ///
    /// On success the order, its lines and the stock decrements are
    /// committed together. On any error nothing is written.
    ///
    /// ## Errors
    /// * `OrderError::Rejected(CoreError::Validation)` - Empty request, bad quantity, oversized text
    /// * `OrderError::Rejected(CoreError::ItemNotFound)` - First unknown item, in request order
    /// * `OrderError::Rejected(CoreError::InsufficientStock)` - First line that cannot be filled
    /// * `OrderError::Store(DbError::Busy)` - The write lock was not free within the busy timeout
    /// * `OrderError::Store(_)` - Any other storage failure
    pub async fn place_order(
        &self,
        account_id: &str,
        request: &OrderRequest,
    ) -> Result<OrderView, OrderError> {
        request.validate().map_err(CoreError::from)?;

        let mut item_ids: Vec<&str> = Vec::with_capacity(request.items.len());
        for line in &request.items {
            if !item_ids.contains(&line.item_id.as_str()) {
                item_ids.push(&line.item_id);
            }
        }

        debug!(
            account_id = %account_id,
            lines = request.items.len(),
            items = item_ids.len(),
            "Placing order"
        );

        let mut tx = self.pool.begin().await?;

        // ① Write lock before any stock is read.
        for id in &item_ids {
            sqlx::query("UPDATE inventory_items SET quantity = quantity WHERE id = ?1")
                .bind(*id)
                .execute(&mut *tx)
                .await?;
        }

        // ② + ③
        let stock = fetch_items(&mut tx, &item_ids).await?;
        let priced = price_order(&request.items, &stock)?;
        let names: HashMap<&str, &str> = stock
            .iter()
            .map(|item| (item.id.as_str(), item.name.as_str()))
            .collect();

        // ④
        let order_id = generate_id();
        let now = now_timestamp();
        sqlx::query(
            "INSERT INTO orders \
                (id, account_id, total_cents, status, shipping_address, notes, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(&order_id)
        .bind(account_id)
        .bind(priced.total.cents())
        .bind(OrderStatus::Pending)
        .bind(&request.shipping_address)
        .bind(&request.notes)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        // ⑤
        for line in &priced.lines {
            let decremented = sqlx::query(
                "UPDATE inventory_items \
                 SET quantity = quantity - ?1, updated_at = ?2 \
                 WHERE id = ?3 AND quantity >= ?1",
            )
            .bind(line.quantity)
            .bind(&now)
            .bind(&line.item_id)
            .execute(&mut *tx)
            .await?;

            if decremented.rows_affected() == 0 {
                let available: i64 =
                    sqlx::query_scalar("SELECT quantity FROM inventory_items WHERE id = ?1")
                        .bind(&line.item_id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .unwrap_or(0);
                warn!(
                    item_id = %line.item_id,
                    available,
                    requested = line.quantity,
                    "Conditional stock decrement matched no row"
                );
                return Err(CoreError::InsufficientStock {
                    item_id: line.item_id.clone(),
                    item: names
                        .get(line.item_id.as_str())
                        .copied()
                        .unwrap_or(line.item_id.as_str())
                        .to_string(),
                    available,
                    requested: line.quantity,
                }
                .into());
            }

            sqlx::query(
                "INSERT INTO order_lines \
                    (order_id, line_no, item_id, quantity, unit_price_cents, subtotal_cents) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&order_id)
            .bind(line.line_no)
            .bind(&line.item_id)
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .bind(line.subtotal.cents())
            .execute(&mut *tx)
            .await?;
        }

        // ⑥
        let header = fetch_header(&mut tx, &order_id)
            .await?
            .ok_or_else(|| DbError::Internal(format!("Order {order_id} vanished before commit")))?;
        let view = single_view(&mut tx, header).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            order_id = %view.id,
            account_id = %account_id,
            total = %priced.total,
            lines = view.lines.len(),
            "Order placed"
        );
        Ok(view)
    }

    /// Gets an order view by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<OrderView>> {
        let mut conn = self.pool.acquire().await?;

        match fetch_header(&mut conn, id).await? {
            Some(header) => Ok(Some(single_view(&mut conn, header).await?)),
            None => Ok(None),
        }
    }

    /// Lists one account's orders, newest first.
    pub async fn list_by_account(&self, account_id: &str, page: Page) -> DbResult<Vec<OrderView>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "{HEADER_SELECT} WHERE o.account_id = ?1 \
             ORDER BY o.created_at DESC, o.rowid DESC LIMIT ?2 OFFSET ?3"
        );
        let headers = sqlx::query_as::<_, OrderHeaderRow>(&sql)
            .bind(account_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&mut *conn)
            .await?;

        load_views(&mut conn, headers).await
    }

    /// Lists every order, newest first.
    pub async fn list_all(&self, page: Page) -> DbResult<Vec<OrderView>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "{HEADER_SELECT} ORDER BY o.created_at DESC, o.rowid DESC LIMIT ?1 OFFSET ?2"
        );
        let headers = sqlx::query_as::<_, OrderHeaderRow>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&mut *conn)
            .await?;

        load_views(&mut conn, headers).await
    }

    /// Sets an order's status. Lines and total are untouched.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No order with this ID
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<OrderView> {
        debug!(id = %id, status = %status, "Updating order status");

        let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(now_timestamp())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Counts orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Queries shared by the transaction and the read path
// =============================================================================

async fn fetch_items(conn: &mut SqliteConnection, ids: &[&str]) -> DbResult<Vec<InventoryItem>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT id, name, description, quantity, price_cents, created_at, updated_at \
         FROM inventory_items WHERE id IN (",
    );
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let items = query
        .build_query_as::<InventoryItem>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(items)
}

async fn fetch_header(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<OrderHeaderRow>> {
    let sql = format!("{HEADER_SELECT} WHERE o.id = ?1");

    let header = sqlx::query_as::<_, OrderHeaderRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(header)
}

async fn single_view(conn: &mut SqliteConnection, header: OrderHeaderRow) -> DbResult<OrderView> {
    let id = header.order.id.clone();
    load_views(conn, vec![header])
        .await?
        .pop()
        .ok_or_else(|| DbError::not_found("Order", id))
}

/// The order read path: attaches lines (with current item names) to each
/// header, preserving header order.
///
/// Works on a pooled connection or inside an open transaction.
pub(crate) async fn load_views(
    conn: &mut SqliteConnection,
    headers: Vec<OrderHeaderRow>,
) -> DbResult<Vec<OrderView>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT l.order_id, l.line_no, l.item_id, i.name AS item_name, l.quantity, \
                l.unit_price_cents, l.subtotal_cents \
         FROM order_lines l \
         LEFT JOIN inventory_items i ON i.id = l.item_id \
         WHERE l.order_id IN (",
    );
    let mut separated = query.separated(", ");
    for header in &headers {
        separated.push_bind(header.order.id.as_str());
    }
    separated.push_unseparated(") ORDER BY l.order_id, l.line_no");

    let rows = query
        .build_query_as::<LineRow>()
        .fetch_all(&mut *conn)
        .await?;

    let mut lines_by_order: HashMap<String, Vec<OrderLineView>> = HashMap::new();
    for row in rows {
        lines_by_order.entry(row.order_id).or_default().push(row.line);
    }

    Ok(headers
        .into_iter()
        .map(|header| {
            let lines = lines_by_order.remove(&header.order.id).unwrap_or_default();
            OrderView::new(header.order, header.account_email, lines)
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
