//! # storefront-core: Pure Business Logic for the Storefront
//!
//! This crate is the **heart** of the storefront backend. It contains the
//! domain types and every business rule as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-api (axum)                          │   │
//! │  │   /api/auth/*   /api/products/*   /api/orders/*                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   order   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  pricing  │  │   rules   │  │   │
//! │  │   │   Order   │  │           │  │  status   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-db (Database Layer)                  │   │
//! │  │        SQLite queries, migrations, order transactions           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Order, drafts and patches)
//! - [`money`] - Money type with integer arithmetic
//! - [`order`] - Order pricing, ownership and the status state machine
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(2999); // $29.99
//! let line = price.checked_mul(2).unwrap();
//! assert_eq!(line.cents(), 5998);
//! ```

pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items accepted in a single order request.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Catches fat-fingered quantities before they reach the stock check.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;

/// Largest accepted unit price, in cents ($10,000,000.00).
///
/// Together with [`MAX_ITEM_QUANTITY`] and [`MAX_ORDER_ITEMS`] this keeps
/// every order total far inside `i64` cents.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Largest stock level a product may be given.
///
/// Leaves headroom for restocks from cancelled orders.
pub const MAX_STOCK: i64 = 1_000_000_000_000;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Minimum length of a shipping address.
pub const MIN_SHIPPING_ADDRESS_LEN: usize = 10;
