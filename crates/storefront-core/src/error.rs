//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - Database failures (+ CoreError inside a tx)    │
//! │                                                                         │
//! │  storefront-api errors                                                 │
//! │  └── ApiError         - What the HTTP client sees (status + JSON)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant maps to exactly one HTTP status at the API boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not exist in the catalog.
    #[error("Product {0} not found")]
    ProductNotFound(i64),

    /// Not enough stock to satisfy a requested quantity.
    ///
    /// ## When This Occurs
    /// ```text
    /// POST /api/orders/ { product 7, qty 200 }
    ///      │
    ///      ▼
    /// Check stock: available=100
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, available: 100, requested: 200 }
    ///      │
    ///      ▼
    /// 400, whole order aborted, no stock touched
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// Order id does not exist.
    #[error("Order {0} not found")]
    OrderNotFound(i64),

    /// Order exists but belongs to someone else.
    #[error("Not authorized to access order {order_id}")]
    OrderForbidden { order_id: i64 },

    /// Status change not allowed by the order lifecycle.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStateTransition {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Completed orders are final and cannot be cancelled.
    #[error("Cannot cancel completed order {0}")]
    CannotCancelCompleted(i64),

    /// Cancel requested on an order that is already cancelled.
    #[error("Order {0} is already cancelled")]
    AlreadyCancelled(i64),

    /// Registration with an email that is already in use.
    #[error("Email already registered")]
    EmailTaken(String),

    /// Registration with a username that is already in use.
    #[error("Username already taken")]
    UsernameTaken(String),

    /// Login failed. Deliberately does not say whether the user exists.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any persistence access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 7,
            available: 100,
            requested: 200,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: available 100, requested 200"
        );

        let err = CoreError::InvalidStateTransition {
            order_id: 3,
            from: OrderStatus::Completed,
            to: OrderStatus::Processing,
        };
        assert_eq!(
            err.to_string(),
            "Order 3 cannot move from completed to processing"
        );
    }

    #[test]
    fn test_conflict_messages_do_not_echo_value() {
        let err = CoreError::EmailTaken("a@example.com".to_string());
        assert_eq!(err.to_string(), "Email already registered");

        let err = CoreError::UsernameTaken("alice".to_string());
        assert_eq!(err.to_string(), "Username already taken");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        };
        assert_eq!(err.to_string(), "username must be at least 3 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
