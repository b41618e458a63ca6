//! # Order Pricing
//!
//! The pure half of order placement: given the requested lines and a
//! snapshot of the referenced inventory rows, decide whether the order can
//! be filled and what it costs. The transactional half (locking, stock
//! decrements, persistence) lives in `shopfloor_db::repository::order`.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderRequest.items  +  InventoryItem rows (read inside the tx)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_order() ← THIS MODULE                                           │
//! │       │                                                                 │
//! │       ├── empty / qty <= 0  → CoreError::Validation                    │
//! │       ├── unknown item      → CoreError::ItemNotFound     (1st in order)│
//! │       ├── qty > remaining   → CoreError::InsufficientStock(1st in order)│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PricedOrder { lines: [unit_price ❄, subtotal], total = Σ subtotal }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every line is checked before anything is mutated. Lines are scanned in
//! request order and the first violation is the one reported.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{InventoryItem, OrderLineRequest};
use crate::validation::validate_order_lines;

/// A validated order line with its price captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    /// 0-based position in the request.
    pub line_no: i64,
    pub item_id: String,
    pub quantity: i64,
    /// Catalog price at the moment of pricing. Stored on the line as-is.
    pub unit_price: Money,
    pub subtotal: Money,
}

/// The outcome of a successful stock check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub total: Money,
}

/// Checks requested lines against `stock` and prices them.
///
/// `stock` holds the current rows for the referenced items; ids missing
/// from it are reported as [`CoreError::ItemNotFound`].
///
/// When the same item appears on several lines the quantities accumulate:
/// each line is checked against what the earlier lines left over, and that
/// remainder is the `available` figure reported on failure.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use shopfloor_core::{price_order, InventoryItem, OrderLineRequest};
///
/// let widget = InventoryItem {
///     id: "w".into(),
///     name: "Widget".into(),
///     description: None,
///     quantity: 10,
///     price_cents: 250,
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
/// let lines = [OrderLineRequest { item_id: "w".into(), quantity: 4 }];
///
/// let priced = price_order(&lines, &[widget]).unwrap();
/// assert_eq!(priced.total.cents(), 1000);
/// ```
pub fn price_order(lines: &[OrderLineRequest], stock: &[InventoryItem]) -> CoreResult<PricedOrder> {
    validate_order_lines(lines)?;

    let by_id: HashMap<&str, &InventoryItem> =
        stock.iter().map(|item| (item.id.as_str(), item)).collect();
    let mut claimed: HashMap<&str, i64> = HashMap::new();

    let mut priced = Vec::with_capacity(lines.len());
    let mut total = Money::zero();

    for (line_no, line) in lines.iter().enumerate() {
        let item = by_id
            .get(line.item_id.as_str())
            .copied()
            .ok_or_else(|| CoreError::ItemNotFound(line.item_id.clone()))?;

        let already = claimed.entry(item.id.as_str()).or_insert(0);
        let available = item.quantity - *already;
        if line.quantity > available {
            return Err(CoreError::InsufficientStock {
                item_id: item.id.clone(),
                item: item.name.clone(),
                available,
                requested: line.quantity,
            });
        }
        *already += line.quantity;

        let unit_price = item.price();
        let subtotal = unit_price
            .checked_multiply_quantity(line.quantity)
            .ok_or_else(total_overflow)?;
        total = total.checked_add(subtotal).ok_or_else(total_overflow)?;

        priced.push(PricedLine {
            line_no: line_no as i64,
            item_id: item.id.clone(),
            quantity: line.quantity,
            unit_price,
            subtotal,
        });
    }

    Ok(PricedOrder {
        lines: priced,
        total,
    })
}

fn total_overflow() -> CoreError {
    CoreError::Validation(ValidationError::OutOfRange {
        field: "total".to_string(),
        min: 0,
        max: i64::MAX,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: &str, name: &str, quantity: i64, price_cents: i64) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            quantity,
            price_cents,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(item_id: &str, quantity: i64) -> OrderLineRequest {
        OrderLineRequest {
            item_id: item_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_widget_order_totals_ten_dollars() {
        let stock = [item("w", "Widget", 10, 250)];
        let priced = price_order(&[line("w", 4)], &stock).unwrap();

        assert_eq!(priced.total, Money::from_cents(1000));
        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.lines[0].unit_price.cents(), 250);
        assert_eq!(priced.lines[0].subtotal.cents(), 1000);
    }

    #[test]
    fn test_total_is_sum_of_subtotals() {
        let stock = [item("a", "A", 5, 199), item("b", "B", 5, 1050)];
        let priced = price_order(&[line("a", 3), line("b", 2)], &stock).unwrap();

        let sum: Money = priced.lines.iter().map(|l| l.subtotal).sum();
        assert_eq!(priced.total, sum);
        for l in &priced.lines {
            assert_eq!(l.subtotal, l.unit_price * l.quantity);
        }
        assert_eq!(priced.lines[1].line_no, 1);
    }

    #[test]
    fn test_insufficient_stock_reports_available_and_requested() {
        let stock = [item("w", "Widget", 10, 250)];
        let err = price_order(&[line("w", 11)], &stock).unwrap_err();

        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ref item,
                ..
            } => {
                assert_eq!(available, 10);
                assert_eq!(requested, 11);
                assert_eq!(item, "Widget");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_first_violation_in_request_order_is_reported() {
        let stock = [item("a", "A", 1, 100), item("b", "B", 1, 100)];
        let err = price_order(&[line("a", 1), line("missing", 1), line("b", 5)], &stock)
            .unwrap_err();
        assert!(matches!(err, CoreError::ItemNotFound(ref id) if id == "missing"));

        let err = price_order(&[line("b", 5), line("missing", 1)], &stock).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { ref item_id, .. } if item_id == "b"));
    }

    #[test]
    fn test_repeated_item_accumulates_demand() {
        let stock = [item("w", "Widget", 5, 100)];
        let err = price_order(&[line("w", 3), line("w", 3)], &stock).unwrap_err();

        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 2, requested: 3, .. }
        ));
        assert!(price_order(&[line("w", 3), line("w", 2)], &stock).is_ok());
    }

    #[test]
    fn test_empty_and_non_positive_requests_are_validation_errors() {
        let stock = [item("w", "Widget", 5, 100)];
        assert!(matches!(price_order(&[], &stock), Err(CoreError::Validation(_))));
        assert!(matches!(
            price_order(&[line("w", 0)], &stock),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        let stock = [item("w", "Widget", i64::MAX, i64::MAX / 2)];
        assert!(matches!(
            price_order(&[line("w", 3)], &stock),
            Err(CoreError::Validation(_))
        ));
    }
}
