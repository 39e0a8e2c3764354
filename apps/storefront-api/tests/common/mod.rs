//! Shared fixtures for the handler tests.

#![allow(dead_code)]

use axum::extract::State;
use axum::{Form, Json};
use std::sync::Arc;

use storefront_api::auth::AuthUser;
use storefront_api::dto::{LoginForm, ProductCreate, ProductResponse, UserCreate};
use storefront_api::routes::{auth, products};
use storefront_api::{AppConfig, AppState};
use storefront_db::{Database, DbConfig};

pub const PASSWORD: &str = "testpass123";

/// Fresh state over an in-memory database.
pub async fn setup() -> Arc<AppState> {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let config = AppConfig {
        secret_key: "test-secret".to_string(),
        ..Default::default()
    };
    Arc::new(AppState::new(db, config))
}

pub fn user_create(email: &str, username: &str) -> UserCreate {
    UserCreate {
        email: email.to_string(),
        username: username.to_string(),
        password: PASSWORD.to_string(),
        full_name: Some("Test User".to_string()),
    }
}

/// Logs in and returns the access token.
pub async fn login(state: &Arc<AppState>, username: &str) -> String {
    let Json(token) = auth::login(
        State(state.clone()),
        Form(LoginForm {
            username: username.to_string(),
            password: PASSWORD.to_string(),
        }),
    )
    .await
    .unwrap();
    token.access_token
}

/// Registers `username`, logs in, and resolves the token like the
/// extractor does.
pub async fn signed_in(state: &Arc<AppState>, username: &str) -> AuthUser {
    auth::register(
        State(state.clone()),
        Json(user_create(&format!("{username}@example.com"), username)),
    )
    .await
    .unwrap();

    let token = login(state, username).await;
    AuthUser(state.current_user(&token).await.unwrap())
}

/// Creates a catalog product through the handler.
pub async fn create_product(
    state: &Arc<AppState>,
    caller: &AuthUser,
    name: &str,
    price: f64,
    stock: i64,
) -> ProductResponse {
    let (_, Json(product)) = products::create_product(
        State(state.clone()),
        caller.clone(),
        Json(ProductCreate {
            name: name.to_string(),
            description: Some("A product for testing".to_string()),
            price,
            stock,
            category: Some("Electronics".to_string()),
            image_url: None,
        }),
    )
    .await
    .unwrap();
    product
}

/// Current stock straight from the catalog.
pub async fn stock_of(state: &Arc<AppState>, product_id: i64) -> i64 {
    state
        .db
        .products()
        .get_by_id(product_id)
        .await
        .unwrap()
        .unwrap()
        .stock
}
