//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Order       │   │    Product      │       │
//! │  │  ─────────────  │ 1 │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  user_id (FK)   │   │  id             │       │
//! │  │  email (uniq)   │ * │  status         │   │  name           │       │
//! │  │  username (uniq)│   │  total_cents    │   │  price_cents    │       │
//! │  │  password_hash  │   │  items ─────────┼─┐ │  stock          │       │
//! │  └─────────────────┘   └─────────────────┘ │ └─────────────────┘       │
//! │                                            │          ▲                 │
//! │                        ┌───────────────────▼──┐       │ copied at      │
//! │                        │   OrderLineItem      │───────┘ order time     │
//! │                        │  (frozen snapshot)   │   (no live reference)  │
//! │                        └──────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Drafts and Patches
//! Inputs are modelled explicitly: a `*Draft` for creation and a `*Patch`
//! listing every optional field for partial updates. Patches are merged
//! through a fixed field list in `apply`, never by reflection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation;
use crate::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

// =============================================================================
// User
// =============================================================================

/// A registered customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,

    /// Unique, validated email address.
    pub email: String,

    /// Unique login name (3-50 characters).
    pub username: String,

    /// Opaque password digest. Never leaves the server.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub full_name: Option<String>,

    /// Inactive users cannot log in.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

/// Registration input, already validated by [`NewUser::validate`].
///
/// The password is hashed by the caller; only the digest reaches storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
}

impl NewUser {
    /// Trims and validates registration fields.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.email = validation::validate_email(&self.email)?;
        self.username = validation::validate_username(&self.username)?;
        self.full_name = self
            .full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(self)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,

    /// Display name (1-200 characters).
    pub name: String,

    pub description: Option<String>,

    /// Price in cents, always > 0.
    pub price_cents: i64,

    /// Units on hand, never negative.
    pub stock: i64,

    pub category: Option<String>,

    pub image_url: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation, stock changes included.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if `quantity` units can be taken from stock.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl ProductDraft {
    /// Validates the draft and returns it with the name trimmed.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = validation::validate_product_name(&self.name)?;
        validation::validate_price(self.price)?;
        validation::validate_stock(self.stock)?;
        Ok(self)
    }
}

/// Partial product update.
///
/// `None` means "leave unchanged". Optional text columns cannot be
/// cleared through a patch.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl ProductPatch {
    /// Validates only the fields that are present.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if let Some(name) = &self.name {
            self.name = Some(validation::validate_product_name(name)?);
        }
        if let Some(price) = self.price {
            validation::validate_price(price)?;
        }
        if let Some(stock) = self.stock {
            validation::validate_stock(stock)?;
        }
        Ok(self)
    }

    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
    }

    /// Merges the present fields into `product`.
    ///
    /// Timestamps are left to the caller, which owns the clock.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = Some(description);
        }
        if let Some(price) = self.price {
            product.price_cents = price.cents();
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = self.category {
            product.category = Some(category);
        }
        if let Some(image_url) = self.image_url {
            product.image_url = Some(image_url);
        }
    }
}

/// Catalog listing filter.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
}

// =============================================================================
// Pagination
// =============================================================================

/// Offset pagination shared by product and order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: i64,
    pub limit: i64,
}

impl Pagination {
    /// Builds pagination from optional query values.
    ///
    /// Negative `skip` becomes 0; `limit` is clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Self {
        Pagination {
            skip: skip.unwrap_or(0).max(0),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::new(None, None)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle state of an order.
///
/// ```text
///   pending ──► processing ──► completed (terminal)
///      │             │
///      └─────┬───────┘
///            ▼
///        cancelled (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, stock reserved.
    Pending,
    /// Being fulfilled.
    Processing,
    /// Delivered. Final.
    Completed,
    /// Cancelled, stock restored. Final.
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Wire/database name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled orders accept no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
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

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// A line item frozen at order time.
///
/// Copies product name and price so later catalog edits or deletion do
/// not change order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: i64,
    /// Product name at time of order.
    pub name: String,
    pub quantity: i64,
    /// Catalog unit price at time of order. Used for the total.
    pub unit_price_cents: i64,
    /// Unit price the client displayed. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_price_cents: Option<i64>,
}

impl OrderLineItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns unit price × quantity, `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price().checked_mul(self.quantity)
    }
}

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Owner. Immutable after creation.
    pub user_id: i64,
    /// Sum of line totals at creation time.
    pub total_cents: i64,
    pub status: OrderStatus,
    pub shipping_address: String,
    /// Immutable after creation.
    pub items: Vec<OrderLineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One requested line in an order request.
#[derive(Debug, Clone)]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub quantity: i64,
    /// Price shown to the client. Never trusted for totals.
    pub quoted_price: Option<Money>,
}

/// Input for placing an order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: String,
}

impl OrderDraft {
    /// Validates the draft and returns it with the address trimmed.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        validation::validate_order_size(self.items.len())?;
        for item in &self.items {
            validation::validate_quantity(item.quantity)?;
        }
        self.shipping_address = validation::validate_shipping_address(&self.shipping_address)?;
        Ok(self)
    }
}

/// Partial order update.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub shipping_address: Option<String>,
}

impl OrderPatch {
    /// Validates only the fields that are present.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if let Some(address) = &self.shipping_address {
            self.shipping_address = Some(validation::validate_shipping_address(address)?);
        }
        Ok(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
