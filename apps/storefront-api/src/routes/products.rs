//! Catalog endpoints.
//!
//! Reads are public. Writes need any authenticated user; there is no
//! role model.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use tracing::info;

use crate::auth::AuthUser;
use crate::dto::{ProductCreate, ProductListQuery, ProductResponse, ProductUpdate};
use crate::error::ApiError;
use crate::AppState;
use storefront_core::CoreError;

/// `GET /api/products/?skip=&limit=&category=`
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let (filter, page) = query.into_parts();
    let products = state.db.products().list(&filter, page).await?;

    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// `GET /api/products/{id}`
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or(CoreError::ProductNotFound(id))?;

    Ok(Json(product.into()))
}

/// `POST /api/products/`
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(body): Json<ProductCreate>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let draft = body.into_draft()?;
    let product = state.db.products().create(draft).await?;

    info!(product_id = product.id, user_id = user.id, "Product created");
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `PUT /api/products/{id}`
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<ProductUpdate>,
) -> Result<Json<ProductResponse>, ApiError> {
    let patch = body.into_patch()?;
    let product = state.db.products().update(id, patch).await?;

    info!(product_id = id, user_id = user.id, "Product updated");
    Ok(Json(product.into()))
}

/// `DELETE /api/products/{id}`
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.products().delete(id).await?;

    info!(product_id = id, user_id = user.id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
