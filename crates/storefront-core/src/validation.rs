//! # Validation Module
//!
//! Input validation utilities for the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum)                                        │
//! │  ├── Type validation (JSON / form deserialization)                     │
//! │  └── Malformed bodies rejected before any handler runs                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rule validation (lengths, ranges, formats)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE constraints (email, username)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Text validators return the trimmed value so callers persist exactly
//! what was checked.
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_email, validate_quantity};
//!
//! assert_eq!(validate_email(" a@example.com ").unwrap(), "a@example.com");
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{
    MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS, MAX_PRICE_CENTS, MAX_STOCK, MIN_SHIPPING_ADDRESS_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_EMAIL_LEN: usize = 254;
const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_PASSWORD_LEN: usize = 100;
const MAX_PRODUCT_NAME_LEN: usize = 200;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn invalid_email(reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Identity Validators
// =============================================================================

/// Validates an email address and returns it trimmed.
///
/// ## Rules
/// - At most 254 characters
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot and no empty labels
/// - No whitespace
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_email;
///
/// assert!(validate_email("test@example.com").is_ok());
/// assert!(validate_email("not-an-email").is_err());
/// assert!(validate_email("a@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(required("email"));
    }

    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    if email.chars().any(char::is_whitespace) {
        return Err(invalid_email("must not contain whitespace"));
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err(invalid_email("missing @")),
    };

    if domain.contains('@') {
        return Err(invalid_email("more than one @"));
    }

    if local.is_empty() {
        return Err(invalid_email("empty local part"));
    }

    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return Err(invalid_email("invalid domain"));
    }

    Ok(email.to_string())
}

/// Validates a username (3-50 characters after trimming).
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(required("username"));
    }

    let len = username.chars().count();
    if len < MIN_USERNAME_LEN {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: MIN_USERNAME_LEN,
        });
    }
    if len > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LEN,
        });
    }

    Ok(username.to_string())
}

/// Validates a plaintext password (6-100 characters).
///
/// Not trimmed: whitespace is part of the secret.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    let len = password.chars().count();

    if len == 0 {
        return Err(required("password"));
    }
    if len < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    if len > MAX_PASSWORD_LEN {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: MAX_PASSWORD_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product name (1-200 characters after trimming).
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_product_name;
///
/// assert_eq!(validate_product_name("  Mug ").unwrap(), "Mug");
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(required("name"));
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a product price (> 0, at most MAX_PRICE_CENTS).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 1,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock level (0..=MAX_STOCK).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK).contains(&stock) {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }
    Ok(())
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the number of lines in an order request.
pub fn validate_order_size(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(required("items"));
    }

    if count > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    Ok(())
}

/// Validates a shipping address (at least 10 characters after trimming).
pub fn validate_shipping_address(address: &str) -> ValidationResult<String> {
    let address = address.trim();

    if address.is_empty() {
        return Err(required("shipping_address"));
    }

    if address.chars().count() < MIN_SHIPPING_ADDRESS_LEN {
        return Err(ValidationError::TooShort {
            field: "shipping_address".to_string(),
            min: MIN_SHIPPING_ADDRESS_LEN,
        });
    }

    Ok(address.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
