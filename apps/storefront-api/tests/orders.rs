//! Order endpoints: pricing, stock, ownership and lifecycle.

mod common;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use common::{create_product, setup, signed_in, stock_of};
use storefront_api::auth::AuthUser;
use storefront_api::dto::{OrderCreate, OrderItemIn, OrderResponse, OrderUpdate, PageQuery};
use storefront_api::routes::{orders, products};
use storefront_api::{ApiError, AppState, ErrorCode};

const ADDRESS: &str = "123 Test Street, Test City";

fn item(product_id: i64, quantity: i64) -> OrderItemIn {
    OrderItemIn {
        product_id,
        quantity,
        price: None,
        name: None,
    }
}

async fn place(
    state: &Arc<AppState>,
    caller: &AuthUser,
    items: Vec<OrderItemIn>,
) -> Result<OrderResponse, ApiError> {
    let (status, Json(order)) = orders::create_order(
        State(state.clone()),
        caller.clone(),
        Json(OrderCreate {
            items,
            shipping_address: ADDRESS.to_string(),
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(order)
}

async fn set_status(
    state: &Arc<AppState>,
    caller: &AuthUser,
    order_id: i64,
    status: &str,
) -> Result<OrderResponse, ApiError> {
    let Json(order) = orders::update_order(
        State(state.clone()),
        caller.clone(),
        Path(order_id),
        Json(OrderUpdate {
            status: Some(status.to_string()),
            shipping_address: None,
        }),
    )
    .await?;
    Ok(order)
}

#[tokio::test]
async fn test_order_total_uses_catalog_price() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let product = create_product(&state, &caller, "Test Product", 29.99, 100).await;

    let order = place(
        &state,
        &caller,
        vec![OrderItemIn {
            product_id: product.id,
            quantity: 2,
            price: Some(0.01),
            name: Some("Bargain".to_string()),
        }],
    )
    .await
    .unwrap();

    assert_eq!(order.total_amount, 59.98);
    assert_eq!(order.status, "pending");
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].name, "Test Product");
    assert_eq!(order.items[0].price, 29.99);
    assert_eq!(order.items[0].quoted_price, Some(0.01));
    assert_eq!(stock_of(&state, product.id).await, 98);
}

#[tokio::test]
async fn test_insufficient_stock_changes_nothing() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let product = create_product(&state, &caller, "Test Product", 29.99, 100).await;

    let err = place(&state, &caller, vec![item(product.id, 200)])
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert!(err.detail.starts_with("Insufficient stock"));
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    assert_eq!(stock_of(&state, product.id).await, 100);

    let Json(listed) = orders::list_orders(State(state.clone()), caller, Query(PageQuery::default()))
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_missing_product_rolls_back_whole_order() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let product = create_product(&state, &caller, "Test Product", 29.99, 100).await;

    let err = place(&state, &caller, vec![item(product.id, 5), item(9999, 1)])
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(stock_of(&state, product.id).await, 100);
}

#[tokio::test]
async fn test_duplicate_lines_count_against_combined_stock() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let product = create_product(&state, &caller, "Test Product", 10.0, 5).await;

    let err = place(&state, &caller, vec![item(product.id, 3), item(product.id, 3)])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert_eq!(stock_of(&state, product.id).await, 5);
}

#[tokio::test]
async fn test_malformed_order_is_rejected() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let product = create_product(&state, &caller, "Test Product", 10.0, 5).await;

    let empty = place(&state, &caller, vec![]).await.unwrap_err();
    assert_eq!(empty.code, ErrorCode::ValidationError);

    let zero = place(&state, &caller, vec![item(product.id, 0)])
        .await
        .unwrap_err();
    assert_eq!(zero.code, ErrorCode::ValidationError);

    let err = orders::create_order(
        State(state.clone()),
        caller,
        Json(OrderCreate {
            items: vec![item(product.id, 1)],
            shipping_address: "short".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stock_of(&state, product.id).await, 5);
}

#[tokio::test]
async fn test_cancel_restores_stock() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let product = create_product(&state, &caller, "Test Product", 29.99, 100).await;

    let order = place(&state, &caller, vec![item(product.id, 2)]).await.unwrap();
    assert_eq!(stock_of(&state, product.id).await, 98);

    let status = orders::cancel_order(State(state.clone()), caller.clone(), Path(order.id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let Json(cancelled) = orders::get_order(State(state.clone()), caller.clone(), Path(order.id))
        .await
        .unwrap();
    assert_eq!(cancelled.status, "cancelled");
    assert_eq!(stock_of(&state, product.id).await, 100);

    let again = orders::cancel_order(State(state.clone()), caller, Path(order.id))
        .await
        .unwrap_err();
    assert_eq!(again.code, ErrorCode::AlreadyCancelled);
    assert_eq!(stock_of(&state, product.id).await, 100);
}

#[tokio::test]
async fn test_cancel_skips_deleted_products() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let kept = create_product(&state, &caller, "Kept", 10.0, 10).await;
    let gone = create_product(&state, &caller, "Gone", 10.0, 10).await;

    let order = place(&state, &caller, vec![item(kept.id, 4), item(gone.id, 4)])
        .await
        .unwrap();
    products::delete_product(State(state.clone()), caller.clone(), Path(gone.id))
        .await
        .unwrap();

    orders::cancel_order(State(state.clone()), caller, Path(order.id))
        .await
        .unwrap();
    assert_eq!(stock_of(&state, kept.id).await, 10);
}

#[tokio::test]
async fn test_completed_order_cannot_be_cancelled() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let product = create_product(&state, &caller, "Test Product", 29.99, 100).await;
    let order = place(&state, &caller, vec![item(product.id, 2)]).await.unwrap();

    let completed = set_status(&state, &caller, order.id, "completed").await.unwrap();
    assert_eq!(completed.status, "completed");

    let err = orders::cancel_order(State(state.clone()), caller.clone(), Path(order.id))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CannotCancelCompleted);
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let Json(current) = orders::get_order(State(state.clone()), caller.clone(), Path(order.id))
        .await
        .unwrap();
    assert_eq!(current.status, "completed");
    assert_eq!(stock_of(&state, product.id).await, 98);

    let err = set_status(&state, &caller, order.id, "processing").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStateTransition);
}

#[tokio::test]
async fn test_update_lifecycle_and_address() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let product = create_product(&state, &caller, "Test Product", 10.0, 10).await;
    let order = place(&state, &caller, vec![item(product.id, 3)]).await.unwrap();

    let processing = set_status(&state, &caller, order.id, "processing").await.unwrap();
    assert_eq!(processing.status, "processing");

    let back = set_status(&state, &caller, order.id, "pending").await.unwrap_err();
    assert_eq!(back.code, ErrorCode::InvalidStateTransition);

    let unknown = set_status(&state, &caller, order.id, "shipped").await.unwrap_err();
    assert_eq!(unknown.code, ErrorCode::ValidationError);

    let Json(moved) = orders::update_order(
        State(state.clone()),
        caller.clone(),
        Path(order.id),
        Json(OrderUpdate {
            status: None,
            shipping_address: Some("456 Other Avenue, Elsewhere".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(moved.shipping_address, "456 Other Avenue, Elsewhere");
    assert_eq!(moved.status, "processing");

    let cancelled = set_status(&state, &caller, order.id, "cancelled").await.unwrap();
    assert_eq!(cancelled.status, "cancelled");
    assert_eq!(stock_of(&state, product.id).await, 10);

    let err = set_status(&state, &caller, order.id, "pending").await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_orders_are_isolated_between_users() {
    let state = setup().await;
    let alice = signed_in(&state, "alice").await;
    let bob = signed_in(&state, "bob").await;
    let product = create_product(&state, &alice, "Test Product", 10.0, 10).await;
    let order = place(&state, &alice, vec![item(product.id, 1)]).await.unwrap();

    let err = orders::get_order(State(state.clone()), bob.clone(), Path(order.id))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
    assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);

    let err = set_status(&state, &bob, order.id, "completed").await.unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let err = orders::cancel_order(State(state.clone()), bob.clone(), Path(order.id))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(stock_of(&state, product.id).await, 9);

    let Json(bobs) = orders::list_orders(State(state.clone()), bob.clone(), Query(PageQuery::default()))
        .await
        .unwrap();
    assert!(bobs.is_empty());

    let Json(alices) = orders::list_orders(State(state.clone()), alice, Query(PageQuery::default()))
        .await
        .unwrap();
    assert_eq!(alices.len(), 1);

    let err = orders::get_order(State(state.clone()), bob, Path(9999))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_orders_newest_first() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let product = create_product(&state, &caller, "Test Product", 10.0, 10).await;

    let first = place(&state, &caller, vec![item(product.id, 1)]).await.unwrap();
    let second = place(&state, &caller, vec![item(product.id, 1)]).await.unwrap();

    let Json(listed) = orders::list_orders(State(state.clone()), caller, Query(PageQuery::default()))
        .await
        .unwrap();
    let ids: Vec<i64> = listed.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_create_order_runs_on_spawned_task() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let product = create_product(&state, &caller, "Test Product", 10.0, 10).await;

    let task_state = state.clone();
    let order = tokio::spawn(async move {
        place(&task_state, &caller, vec![item(product.id, 2)]).await
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(order.total_amount, 20.0);
    assert_eq!(stock_of(&state, product.id).await, 8);
}

#[tokio::test]
async fn test_order_for_priciest_product_stays_in_range() {
    let state = setup().await;
    let caller = signed_in(&state, "testuser").await;
    let product = create_product(&state, &caller, "Yacht", 10_000_000.0, 20_000).await;

    let order = place(
        &state,
        &caller,
        vec![item(product.id, 10_000), item(product.id, 10_000)],
    )
    .await
    .unwrap();

    assert_eq!(order.total_amount, 200_000_000_000.0);
    assert_eq!(stock_of(&state, product.id).await, 0);
}
