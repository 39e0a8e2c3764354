//! Registration, login and the current-user endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Form, Json};
use std::sync::Arc;
use tracing::info;

use crate::auth::AuthUser;
use crate::dto::{LoginForm, TokenResponse, UserCreate, UserResponse};
use crate::error::ApiError;
use crate::services::identity::IdentityService;
use crate::AppState;

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let (user, password) = body.into_parts();
    let created = IdentityService::new(&state.db)
        .register(user, &password)
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// `POST /api/auth/login`
///
/// Takes an urlencoded `username`/`password` form.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = IdentityService::new(&state.db)
        .authenticate(&form.username, &form.password)
        .await?;

    let token = state.jwt.issue_token(&user)?;
    info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse::bearer(token)))
}

/// `GET /api/auth/me`
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}
