//! # Validation Module
//!
//! Input validation rules for Shopfloor.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum)                                        │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Field ranges, lengths, formats                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0), CHECK (price_cents > 0)                    │
//! │  ├── UNIQUE (name), UNIQUE (email)                                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopfloor_core::validation::{validate_item_name, validate_price_cents};
//!
//! assert_eq!(validate_item_name("  Widget ").unwrap(), "Widget");
//! assert!(validate_price_cents(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::OrderLineRequest;
use crate::{DEFAULT_PAGE_LIMIT, MAX_ORDER_LINES, MAX_PAGE_LIMIT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Item names are at most this many characters.
pub const MAX_ITEM_NAME_LEN: usize = 100;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an inventory item name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters
///
/// ## Example
/// ```rust
/// use shopfloor_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Widget").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// assert!(validate_item_name(&"A".repeat(101)).is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_ITEM_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates an optional item description (at most 1000 characters).
pub fn validate_description(description: Option<&str>) -> ValidationResult<()> {
    validate_free_text("description", description, 1000)
}

/// Validates an optional free-text field against a maximum length.
pub fn validate_free_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(text) if text.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a search query.
///
/// ## Returns
/// `None` for a blank query, otherwise the trimmed term.
pub fn validate_search_query(query: &str) -> ValidationResult<Option<String>> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok((!query.is_empty()).then(|| query.to_string()))
}

/// Validates an email address and returns it trimmed and lowercased.
///
/// ## Rules
/// - 3 to 254 characters
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
///
/// ## Example
/// ```rust
/// use shopfloor_core::validation::validate_email;
///
/// assert_eq!(validate_email("Ana@Example.com").unwrap(), "ana@example.com");
/// assert!(validate_email("no-at-symbol").is_err());
/// assert!(validate_email("ana@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("must contain an @ symbol"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must have exactly one @ with a local part"));
    }

    if domain.starts_with('.') || domain.ends_with('.') || !domain.contains('.') {
        return Err(invalid("domain must contain a dot"));
    }

    Ok(email)
}

/// Validates a plaintext password before hashing.
///
/// ## Rules
/// - At least 6 characters
/// - At most 128 characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    let len = password.chars().count();

    if len < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    if len > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
        });
    }

    Ok(())
}

/// Validates a person's name (at most 100 characters) and returns it trimmed.
///
/// When `required` is false an empty string is allowed.
pub fn validate_person_name(field: &str, value: &str, required: bool) -> ValidationResult<String> {
    let value = value.trim();

    if required && value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 100,
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock level (must be ≥ 0; zero is "out of stock").
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a quantity requested on an order line.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /api/orders { items: [{ item_id, quantity: 0 }] }                │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_order_quantity(0) ← THIS FUNCTION                            │
/// │       │                                                                 │
/// │       ├── qty <= 0? → 400 "quantity must be positive"                  │
/// │       │                                                                 │
/// │       └── OK → stock check inside the order transaction                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_order_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price in cents.
///
/// ## Example
/// ```rust
/// use shopfloor_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(250).is_ok());   // $2.50
/// assert!(validate_price_cents(0).is_err());    // free items are not sold
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price_cents".to_string(),
        });
    }

    Ok(())
}

/// Applies defaults to optional pagination parameters and checks ranges.
///
/// ## Rules
/// - `offset` defaults to 0 and must not be negative
/// - `limit` defaults to 100 and must be within 1..=1000
pub fn validate_page(offset: Option<i64>, limit: Option<i64>) -> ValidationResult<(i64, i64)> {
    let offset = offset.unwrap_or(0);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);

    if offset < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "offset".to_string(),
        });
    }

    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_LIMIT,
        });
    }

    Ok((offset, limit))
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the lines of an order request before any stock lookup.
///
/// ## Rules
/// - At least one line
/// - At most [`MAX_ORDER_LINES`] lines
/// - Every line names an item and asks for a positive quantity
pub fn validate_order_lines(lines: &[OrderLineRequest]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if lines.len() > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }

    for line in lines {
        if line.item_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "item_id".to_string(),
            });
        }
        validate_order_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(item_id: &str, quantity: i64) -> OrderLineRequest {
        OrderLineRequest {
            item_id: item_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_validate_item_name() {
        assert_eq!(validate_item_name("Widget").unwrap(), "Widget");
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"A".repeat(100)).is_ok());
        assert!(validate_item_name(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user.name+tag@domain.co.uk").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("user name@domain.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("admin123").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_quantities_and_price() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
        assert!(validate_order_quantity(1).is_ok());
        assert!(validate_order_quantity(0).is_err());
        assert!(validate_price_cents(1).is_ok());
        assert!(validate_price_cents(0).is_err());
    }

    #[test]
    fn test_validate_page() {
        assert_eq!(validate_page(None, None).unwrap(), (0, 100));
        assert_eq!(validate_page(Some(10), Some(1000)).unwrap(), (10, 1000));
        assert!(validate_page(Some(-1), None).is_err());
        assert!(validate_page(None, Some(0)).is_err());
        assert!(validate_page(None, Some(1001)).is_err());
    }

    #[test]
    fn test_validate_order_lines() {
        assert!(validate_order_lines(&[line("a", 1)]).is_ok());
        assert!(matches!(
            validate_order_lines(&[]),
            Err(ValidationError::Required { ref field }) if field == "items"
        ));
        assert!(validate_order_lines(&[line("a", 1), line("b", 0)]).is_err());
        assert!(validate_order_lines(&[line(" ", 1)]).is_err());

        let too_many: Vec<_> = (0..=MAX_ORDER_LINES).map(|i| line(&i.to_string(), 1)).collect();
        assert!(validate_order_lines(&too_many).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  ").unwrap(), None);
        assert_eq!(validate_search_query(" wid ").unwrap().as_deref(), Some("wid"));
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }
}
