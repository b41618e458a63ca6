//! # Domain Types
//!
//! Core domain types used throughout Shopfloor.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InventoryItem  │   │      Order      │   │    OrderLine    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  order_id (FK)  │       │
//! │  │  name (unique)  │◄──┤  account_id     │──►│  item_id (FK)   │       │
//! │  │  quantity ≥ 0   │   │  total_cents    │   │  unit_price ❄   │       │
//! │  │  price_cents>0  │   │  status         │   │  subtotal       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Account     │   │      Role       │   │   OrderStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  email (unique) │   │  Admin          │   │  Pending        │       │
//! │  │  password_hash  │   │  Customer       │   │  Processing     │       │
//! │  │  role, active   │   └─────────────────┘   │  Shipped  ...   │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ❄ = snapshot taken when the order is created, never updated           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    self, validate_description, validate_email, validate_item_name, validate_page,
    validate_password, validate_person_name, validate_price_cents, validate_stock_quantity,
    ValidationResult,
};

// =============================================================================
// Inventory Item
// =============================================================================

/// A catalog entry with stock on hand and a unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique across the catalog.
    pub name: String,

    pub description: Option<String>,

    /// Units in stock. Never negative.
    pub quantity: i64,

    /// Current unit price in cents. Always positive.
    pub price_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether at least one unit is on hand.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Input for creating an inventory item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewInventoryItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: i64,
    pub price_cents: i64,
}

impl NewInventoryItem {
    /// Validates every field and returns the item with its name trimmed.
    pub fn validated(mut self) -> ValidationResult<Self> {
        self.name = validate_item_name(&self.name)?;
        validate_description(self.description.as_deref())?;
        validate_stock_quantity(self.quantity)?;
        validate_price_cents(self.price_cents)?;
        Ok(self)
    }
}

/// Partial update for an inventory item. Only `Some` fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub price_cents: Option<i64>,
}

impl InventoryItemPatch {
    /// Validates the supplied fields and trims the name if present.
    pub fn validated(mut self) -> ValidationResult<Self> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(validate_item_name(name)?);
        }
        validate_description(self.description.as_deref())?;
        if let Some(quantity) = self.quantity {
            validate_stock_quantity(quantity)?;
        }
        if let Some(price_cents) = self.price_cents {
            validate_price_cents(price_cents)?;
        }
        Ok(self)
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.quantity.is_none()
            && self.price_cents.is_none()
    }
}

/// Aggregate figures for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryStats {
    pub total_items: i64,
    pub items_in_stock: i64,
    pub items_out_of_stock: i64,
    /// Units on hand across all items.
    pub total_units: i64,
    /// Σ quantity × price_cents.
    pub inventory_value_cents: i64,
    pub total_accounts: i64,
    pub total_orders: i64,
}

// =============================================================================
// Roles & Capabilities
// =============================================================================

/// Account role. A closed set: every authorization decision goes through
/// [`Role::can`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

/// Operations that are gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create, update and delete inventory items.
    ManageInventory,
    /// See every account's orders, not just one's own.
    ViewAllOrders,
    /// Change an order's status.
    ManageOrders,
    /// List accounts.
    ListAccounts,
}

impl Role {
    /// Checks whether this role grants `capability`.
    pub fn can(self, capability: Capability) -> bool {
        match self {
            Role::Admin => true,
            Role::Customer => match capability {
                Capability::ManageInventory
                | Capability::ViewAllOrders
                | Capability::ManageOrders
                | Capability::ListAccounts => false,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Account
// =============================================================================

/// A registered user.
///
/// `password_hash` is read from storage but never serialized.
#[derive(Debug, Clone, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Account {
    pub id: String,
    /// Stored lowercased.
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub last_access_at: Option<DateTime<Utc>>,
}

/// Input for creating an account. `password` is plaintext and is hashed
/// by the account store before it is persisted.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub role: Role,
}

impl NewAccount {
    /// Validates the fields and normalizes email (lowercase) and names (trim).
    pub fn validated(mut self) -> ValidationResult<Self> {
        self.email = validate_email(&self.email)?;
        validate_password(&self.password)?;
        self.first_name = validate_person_name("first_name", &self.first_name, true)?;
        self.last_name = match self.last_name.as_deref() {
            Some(last) => {
                let last = validate_person_name("last_name", last, false)?;
                (!last.is_empty()).then_some(last)
            }
            None => None,
        };
        Ok(self)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the wire name of a status. Anything outside the fixed set is a
/// [`ValidationError::NotAllowed`].
impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL
                    .iter()
                    .map(|status| status.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order header as stored.
///
/// `total_cents` is fixed at creation. Only `status` and `updated_at`
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub account_id: String,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One line of an order, joined with the item's current name for display.
///
/// `unit_price_cents` is the price captured when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLineView {
    pub line_no: i64,
    pub item_id: String,
    /// `None` only if the item row has since disappeared.
    pub item_name: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// The full read-side projection of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderView {
    pub id: String,
    pub account_id: String,
    pub account_email: String,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
}

impl OrderView {
    /// Assembles a view from a stored header and its lines.
    pub fn new(order: Order, account_email: String, lines: Vec<OrderLineView>) -> Self {
        OrderView {
            id: order.id,
            account_id: order.account_id,
            account_email,
            total_cents: order.total_cents,
            status: order.status,
            shipping_address: order.shipping_address,
            notes: order.notes,
            created_at: order.created_at,
            updated_at: order.updated_at,
            lines,
        }
    }
}

/// One requested line of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineRequest {
    pub item_id: String,
    pub quantity: i64,
}

/// A request to place an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderRequest {
    pub items: Vec<OrderLineRequest>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderRequest {
    /// Shape checks that need no stock lookup: at least one line, every
    /// quantity positive, free-text fields within bounds.
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_order_lines(&self.items)?;
        validation::validate_free_text("shipping_address", self.shipping_address.as_deref(), 500)?;
        validation::validate_free_text("notes", self.notes.as_deref(), 1000)?;
        Ok(())
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Offset/limit window for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    /// Builds a page from optional query parameters, applying defaults
    /// (offset 0, limit 100) and rejecting out-of-range values.
    pub fn new(offset: Option<i64>, limit: Option<i64>) -> ValidationResult<Self> {
        let (offset, limit) = validate_page(offset, limit)?;
        Ok(Page { offset, limit })
    }
}

impl Default for Page {
    fn default() -> Self {
        Page {
            offset: 0,
            limit: crate::DEFAULT_PAGE_LIMIT,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_capabilities() {
        assert!(Role::Admin.can(Capability::ManageInventory));
        assert!(Role::Admin.can(Capability::ViewAllOrders));
        assert!(!Role::Customer.can(Capability::ManageInventory));
        assert!(!Role::Customer.can(Capability::ManageOrders));
        assert_eq!(Role::default(), Role::Customer);
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(" cancelled ".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);

        let err = "lost".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { ref field, .. } if field == "status"));
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_wire_names_match_serde() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_new_item_is_trimmed_and_validated() {
        let item = NewInventoryItem {
            name: "  Widget ".to_string(),
            description: None,
            quantity: 10,
            price_cents: 250,
        }
        .validated()
        .unwrap();
        assert_eq!(item.name, "Widget");

        let bad_price = NewInventoryItem {
            name: "Widget".to_string(),
            description: None,
            quantity: 10,
            price_cents: 0,
        };
        assert!(bad_price.validated().is_err());

        let bad_quantity = NewInventoryItem {
            name: "Widget".to_string(),
            description: None,
            quantity: -1,
            price_cents: 250,
        };
        assert!(bad_quantity.validated().is_err());
    }

    #[test]
    fn test_patch_only_checks_supplied_fields() {
        assert!(InventoryItemPatch::default().is_empty());

        let patch = InventoryItemPatch {
            quantity: Some(0),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert!(patch.validated().is_ok());

        let patch = InventoryItemPatch {
            price_cents: Some(-5),
            ..Default::default()
        };
        assert!(patch.validated().is_err());
    }

    #[test]
    fn test_new_account_normalizes_email() {
        let account = NewAccount {
            email: " Ana@Example.COM ".to_string(),
            password: "secret1".to_string(),
            first_name: "Ana".to_string(),
            last_name: Some("  ".to_string()),
            role: Role::Customer,
        }
        .validated()
        .unwrap();
        assert_eq!(account.email, "ana@example.com");
        assert_eq!(account.last_name, None);
    }

    #[test]
    fn test_account_serialization_hides_password_hash() {
        let account = Account {
            id: "a-1".to_string(),
            email: "ana@example.com".to_string(),
            first_name: "Ana".to_string(),
            last_name: None,
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Customer,
            active: true,
            created_at: Utc::now(),
            last_access_at: None,
        };
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"customer\""));
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(Page::new(None, None).unwrap(), Page::default());
        assert_eq!(Page::new(Some(20), Some(5)).unwrap(), Page { offset: 20, limit: 5 });
    }
}
