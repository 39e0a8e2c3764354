//! Order endpoints. All of them act on the caller's own orders.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::dto::{OrderCreate, OrderResponse, OrderUpdate, PageQuery};
use crate::error::ApiError;
use crate::AppState;

/// `POST /api/orders/`
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(body): Json<OrderCreate>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let draft = body.into_draft()?;
    let order = state.db.orders().create_order(user.id, draft).await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// `GET /api/orders/?skip=&limit=`
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.db.orders().list_orders(user.id, page.into()).await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// `GET /api/orders/{id}`
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.db.orders().get_order(user.id, id).await?;

    Ok(Json(order.into()))
}

/// `PUT /api/orders/{id}`
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<OrderUpdate>,
) -> Result<Json<OrderResponse>, ApiError> {
    let patch = body.into_patch()?;
    let order = state.db.orders().update_order(user.id, id, patch).await?;

    Ok(Json(order.into()))
}

/// `DELETE /api/orders/{id}`
///
/// Cancels the order and puts its quantities back in stock.
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.orders().cancel_order(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
