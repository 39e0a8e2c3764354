//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET    /                       root            public                  │
//! │  GET    /health                 health          public                  │
//! │                                                                         │
//! │  POST   /api/auth/register      auth::register  public                  │
//! │  POST   /api/auth/login         auth::login     public (form body)      │
//! │  GET    /api/auth/me            auth::me        bearer                  │
//! │                                                                         │
//! │  GET    /api/products/          products::list  public                  │
//! │  POST   /api/products/          products::create       bearer           │
//! │  GET    /api/products/{id}      products::get   public                  │
//! │  PUT    /api/products/{id}      products::update       bearer           │
//! │  DELETE /api/products/{id}      products::delete       bearer           │
//! │                                                                         │
//! │  GET    /api/orders/            orders::list    bearer, own orders      │
//! │  POST   /api/orders/            orders::create  bearer                  │
//! │  GET    /api/orders/{id}        orders::get     bearer, owner only      │
//! │  PUT    /api/orders/{id}        orders::update  bearer, owner only      │
//! │  DELETE /api/orders/{id}        orders::cancel  bearer, owner only      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Collection routes answer with and without the trailing slash.

pub mod auth;
pub mod orders;
pub mod products;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use crate::dto::{HealthResponse, RootResponse};
use crate::AppState;

/// Builds the application router over shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        // Catalog
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/products/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        // Orders
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route(
            "/api/orders/",
            get(orders::list_orders).post(orders::create_order),
        )
        .route(
            "/api/orders/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::cancel_order),
        )
        .with_state(state)
}

/// `GET /`
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("Welcome to {}", state.config.app_name),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/docs".to_string(),
    })
}

/// `GET /health`
///
/// Always 200 while the process is serving; `database` reports whether
/// the store answered.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        database: state.db.health_check().await,
    })
}
