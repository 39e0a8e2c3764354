//! Credential service: password hashing and bearer tokens.
//!
//! ```text
//! register ──► hash_password() ──► users.password_hash
//! login    ──► verify_password() ──► JwtManager::issue_token()
//!              (both on the blocking pool; unknown users are checked
//!               against DUMMY_DIGEST so every failed login costs the same)
//! request  ──► Authorization: Bearer <jwt> ──► AuthUser extractor
//!                                              ├── verify_token()
//!                                              └── load user, must be active
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;
use storefront_core::User;

// =============================================================================
// Passwords
// =============================================================================

/// Hashes a password with Argon2id and a random salt (PHC string).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// Verifies a password against its stored digest.
///
/// An unparseable digest never matches.
pub fn verify_password(password: &str, digest: &str) -> bool {
    let parsed_hash = match PasswordHash::new(digest) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Digest of no real password, with the same Argon2 parameters as
/// [`hash_password`].
pub const DUMMY_DIGEST: &str = "$argon2id$v=19$m=19456,t=2,p=1$974tpFvZFj8mBTa2LqeviA$YxIAGsrGOhMTDCBR4w+DeDUYjHvThWiXxjLSGtSAmZk";

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, ApiError> {
    task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(format!("Password hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking pool.
///
/// With no digest the password is checked against [`DUMMY_DIGEST`] and
/// the result is always `false`, at the cost of a real check.
pub async fn verify_password_blocking(
    password: String,
    digest: Option<String>,
) -> Result<bool, ApiError> {
    task::spawn_blocking(move || match digest {
        Some(digest) => verify_password(&password, &digest),
        None => {
            verify_password(&password, DUMMY_DIGEST);
            false
        }
    })
    .await
    .map_err(|e| ApiError::internal(format!("Password check task failed: {e}")))
}

// =============================================================================
// Tokens
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// User id
    pub uid: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    lifetime: Duration,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, algorithm: Algorithm, lifetime_minutes: i64) -> Self {
        JwtManager {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            lifetime: Duration::minutes(lifetime_minutes),
        }
    }

    /// Token lifetime in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    /// Issue an access token for `user`.
    pub fn issue_token(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + self.lifetime;

        let claims = Claims {
            sub: user.username.clone(),
            uid: user.id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {e}")))
    }

    /// Validate signature and expiry, then decode the claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(self.algorithm);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                ApiError::unauthenticated()
            })
    }
}

/// Extract bearer token from an authorization header value.
///
/// The scheme is matched case-insensitively.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.trim().split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

// =============================================================================
// Authenticated Caller
// =============================================================================

/// The authenticated caller, resolved from the bearer token.
///
/// Adding this as a handler argument makes the route require a valid,
/// unexpired token for an existing, active user; anything else is a 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AppState {
    /// Resolves a bearer token to its user.
    pub async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let claims = self.jwt.verify_token(token)?;

        let user = self
            .db
            .users()
            .get_by_id(claims.uid)
            .await?
            .filter(|u| u.username == claims.sub)
            .ok_or_else(|| {
                warn!(uid = claims.uid, "Token for unknown user");
                ApiError::unauthenticated()
            })?;

        if !user.is_active {
            warn!(user_id = user.id, "Token for inactive user");
            return Err(ApiError::unauthenticated());
        }

        Ok(user)
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(ApiError::unauthenticated)?;

        state.current_user(token).await.map(AuthUser)
    }
}
