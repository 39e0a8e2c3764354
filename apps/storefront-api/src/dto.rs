//! # Wire Types
//!
//! Request and response bodies of the HTTP API.
//!
//! ## Money on the Wire
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Client JSON            Boundary              Domain                    │
//! │  "price": 29.99   ──►  Money::from_decimal ──► Money(2999)             │
//! │  "price": 29.99   ◄──  Money::as_decimal   ◄── price_cents: 2999       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here derives `TS`; `cargo test` regenerates the frontend's
//! TypeScript types under `bindings/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ApiError;
use storefront_core::{
    Money, NewUser, Order, OrderDraft, OrderItemRequest, OrderLineItem, OrderPatch, OrderStatus,
    Pagination, Product, ProductDraft, ProductFilter, ProductPatch, User,
};

fn money_from_wire(field: &str, amount: f64) -> Result<Money, ApiError> {
    Money::from_decimal(amount)
        .ok_or_else(|| ApiError::validation(format!("{} must be a finite number", field)))
}

// =============================================================================
// Auth
// =============================================================================

/// `POST /api/auth/register` body.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl UserCreate {
    /// Splits the body into the account fields and the plaintext password.
    pub fn into_parts(self) -> (NewUser, String) {
        let user = NewUser {
            email: self.email,
            username: self.username,
            full_name: self.full_name,
        };
        (user, self.password)
    }
}

/// A user as returned by the API. Never includes the password digest.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// `POST /api/auth/login` form body.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Issued access token.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: String,
}

impl TokenResponse {
    /// Wraps a freshly issued token.
    pub fn bearer(access_token: String) -> Self {
        TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// `POST /api/products/` body.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductCreate {
    /// Converts and validates into a catalog draft.
    pub fn into_draft(self) -> Result<ProductDraft, ApiError> {
        let draft = ProductDraft {
            name: self.name,
            description: self.description,
            price: money_from_wire("price", self.price)?,
            stock: self.stock,
            category: self.category,
            image_url: self.image_url,
        };
        Ok(draft.validate()?)
    }
}

/// `PUT /api/products/{id}` body. Omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductUpdate {
    /// Converts and validates into a catalog patch.
    pub fn into_patch(self) -> Result<ProductPatch, ApiError> {
        let price = match self.price {
            Some(amount) => Some(money_from_wire("price", amount)?),
            None => None,
        };

        let patch = ProductPatch {
            name: self.name,
            description: self.description,
            price,
            stock: self.stock,
            category: self.category,
            image_url: self.image_url,
        };
        Ok(patch.validate()?)
    }
}

/// A catalog product as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub category: Option<String>,
    pub image_url: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        ProductResponse {
            price: product.price().as_decimal(),
            id: product.id,
            name: product.name,
            description: product.description,
            stock: product.stock,
            category: product.category,
            image_url: product.image_url,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// `GET /api/products/` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
}

impl ProductListQuery {
    /// Splits into the catalog filter and page window.
    pub fn into_parts(self) -> (ProductFilter, Pagination) {
        let filter = ProductFilter {
            category: self.category,
        };
        (filter, Pagination::new(self.skip, self.limit))
    }
}

/// `skip`/`limit` query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl From<PageQuery> for Pagination {
    fn from(query: PageQuery) -> Self {
        Pagination::new(query.skip, query.limit)
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One requested line. `price` and `name` are what the client displayed;
/// they are informational only.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct OrderItemIn {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /api/orders/` body.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct OrderCreate {
    pub items: Vec<OrderItemIn>,
    pub shipping_address: String,
}

impl OrderCreate {
    /// Converts and validates into an order draft.
    pub fn into_draft(self) -> Result<OrderDraft, ApiError> {
        let mut items = Vec::with_capacity(self.items.len());
        for item in self.items {
            let quoted_price = match item.price {
                Some(amount) => Some(money_from_wire("price", amount)?),
                None => None,
            };
            items.push(OrderItemRequest {
                product_id: item.product_id,
                quantity: item.quantity,
                quoted_price,
            });
        }

        let draft = OrderDraft {
            items,
            shipping_address: self.shipping_address,
        };
        Ok(draft.validate()?)
    }
}

/// `PUT /api/orders/{id}` body.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct OrderUpdate {
    /// One of `pending`, `processing`, `completed`, `cancelled`
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
}

impl OrderUpdate {
    /// Parses the status name and validates into an order patch.
    pub fn into_patch(self) -> Result<OrderPatch, ApiError> {
        let status = match self.status {
            Some(name) => Some(name.trim().parse::<OrderStatus>()?),
            None => None,
        };

        let patch = OrderPatch {
            status,
            shipping_address: self.shipping_address,
        };
        Ok(patch.validate()?)
    }
}

/// A snapshot line item as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItemOut {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    /// Catalog unit price at order time
    pub price: f64,
    /// Unit price the client displayed, if it sent one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_price: Option<f64>,
}

impl From<OrderLineItem> for OrderItemOut {
    fn from(line: OrderLineItem) -> Self {
        OrderItemOut {
            price: line.unit_price().as_decimal(),
            quoted_price: line
                .quoted_price_cents
                .map(|c| Money::from_cents(c).as_decimal()),
            product_id: line.product_id,
            name: line.name,
            quantity: line.quantity,
        }
    }
}

/// An order as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: f64,
    pub status: String,
    pub shipping_address: String,
    pub items: Vec<OrderItemOut>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            total_amount: order.total().as_decimal(),
            status: order.status.to_string(),
            id: order.id,
            user_id: order.user_id,
            shipping_address: order.shipping_address,
            items: order.items.into_iter().map(OrderItemOut::from).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

// =============================================================================
// Misc
// =============================================================================

/// `GET /` body.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub docs: String,
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HealthResponse {
    /// Always `"healthy"` when the process answers
    pub status: String,
    /// Whether the database answered `SELECT 1`
    pub database: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_product_create_converts_price() {
        let body: ProductCreate = serde_json::from_str(
            r#"{"name": "Test Product", "price": 29.99, "stock": 100, "category": "Electronics"}"#,
        )
        .unwrap();
        let draft = body.into_draft().unwrap();
        assert_eq!(draft.price.cents(), 2999);
        assert_eq!(draft.stock, 100);
        assert!(draft.description.is_none());
    }

    #[test]
    fn test_product_create_defaults_stock_to_zero() {
        let body: ProductCreate =
            serde_json::from_str(r#"{"name": "Mug", "price": 5}"#).unwrap();
        assert_eq!(body.into_draft().unwrap().stock, 0);
    }

    #[test]
    fn test_product_create_rejects_bad_input() {
        let body: ProductCreate =
            serde_json::from_str(r#"{"name": "Mug", "price": 0}"#).unwrap();
        assert_eq!(body.into_draft().unwrap_err().code, ErrorCode::ValidationError);

        let body: ProductCreate =
            serde_json::from_str(r#"{"name": "", "price": 1.5}"#).unwrap();
        assert_eq!(body.into_draft().unwrap_err().code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_order_update_parses_status() {
        let patch = OrderUpdate {
            status: Some("processing".to_string()),
            shipping_address: None,
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.status, Some(OrderStatus::Processing));

        let err = OrderUpdate {
            status: Some("shipped".to_string()),
            shipping_address: None,
        }
        .into_patch()
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_order_response_uses_decimals() {
        let now = Utc::now();
        let order = Order {
            id: 1,
            user_id: 2,
            total_cents: 5998,
            status: OrderStatus::Pending,
            shipping_address: "123 Test Street".to_string(),
            items: vec![OrderLineItem {
                product_id: 3,
                name: "Test Product".to_string(),
                quantity: 2,
                unit_price_cents: 2999,
                quoted_price_cents: Some(2500),
            }],
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(OrderResponse::from(order)).unwrap();
        assert_eq!(json["total_amount"], 59.98);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["items"][0]["price"], 29.99);
        assert_eq!(json["items"][0]["quoted_price"], 25.0);
    }
}
