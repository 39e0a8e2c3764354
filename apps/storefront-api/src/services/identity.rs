//! Identity service: registration and login.
//!
//! Handles duplicate checks and password hashing on top of the user
//! repository.

use tracing::{info, warn};

use crate::auth::{hash_password_blocking, verify_password_blocking};
use crate::error::ApiError;
use storefront_core::validation::validate_password;
use storefront_core::{CoreError, NewUser, User};
use storefront_db::Database;

/// Registration and authentication over the user store.
pub struct IdentityService<'a> {
    db: &'a Database,
}

impl<'a> IdentityService<'a> {
    /// Create a new identity service.
    pub fn new(db: &'a Database) -> Self {
        IdentityService { db }
    }

    /// Registers a new user.
    ///
    /// Email is checked before username, so a request colliding on both
    /// reports `EmailTaken`. The password is hashed before it reaches
    /// storage.
    pub async fn register(&self, user: NewUser, password: &str) -> Result<User, ApiError> {
        let user = user.validate()?;
        validate_password(password)?;

        let users = self.db.users();

        if users.get_by_email(&user.email).await?.is_some() {
            return Err(CoreError::EmailTaken(user.email).into());
        }
        if users.get_by_username(&user.username).await?.is_some() {
            return Err(CoreError::UsernameTaken(user.username).into());
        }

        let digest = hash_password_blocking(password.to_string()).await?;
        let created = users.insert(&user, &digest).await?;

        info!(user_id = created.id, username = %created.username, "User registered");
        Ok(created)
    }

    /// Checks a username/password pair.
    ///
    /// Unknown user, wrong password and inactive account all fail with
    /// the same `InvalidCredentials` error, and an unknown user still pays
    /// for a full password check.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let user = self.db.users().get_by_username(username).await?;
        let digest = user.as_ref().map(|u| u.password_hash.clone());
        let matched = verify_password_blocking(password.to_string(), digest).await?;

        let Some(user) = user else {
            warn!(username = %username, "Login for unknown user");
            return Err(CoreError::InvalidCredentials.into());
        };

        if !matched {
            warn!(username = %username, "Login with wrong password");
            return Err(CoreError::InvalidCredentials.into());
        }

        if !user.is_active {
            warn!(username = %username, "Login for inactive user");
            return Err(CoreError::InvalidCredentials.into());
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use storefront_db::DbConfig;

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            full_name: None,
        }
    }

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let db = setup().await;
        let identity = IdentityService::new(&db);

        let user = identity
            .register(new_user(" test@example.com ", "testuser"), "testpass123")
            .await
            .unwrap();
        assert_eq!(user.email, "test@example.com");
        assert_ne!(user.password_hash, "testpass123");

        let authed = identity.authenticate("testuser", "testpass123").await.unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[tokio::test]
    async fn test_register_conflicts() {
        let db = setup().await;
        let identity = IdentityService::new(&db);
        identity
            .register(new_user("test@example.com", "testuser"), "testpass123")
            .await
            .unwrap();

        let err = identity
            .register(new_user("test@example.com", "another"), "testpass123")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailTaken);

        let err = identity
            .register(new_user("other@example.com", "testuser"), "testpass123")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UsernameTaken);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let db = setup().await;
        let identity = IdentityService::new(&db);

        let err = identity
            .register(new_user("not-an-email", "testuser"), "testpass123")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = identity
            .register(new_user("test@example.com", "ab"), "testpass123")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = identity
            .register(new_user("test@example.com", "testuser"), "short")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_authenticate_fails_uniformly() {
        let db = setup().await;
        let identity = IdentityService::new(&db);
        let user = identity
            .register(new_user("test@example.com", "testuser"), "testpass123")
            .await
            .unwrap();

        let wrong_password = identity.authenticate("testuser", "wrong").await.unwrap_err();
        let unknown_user = identity.authenticate("ghost", "testpass123").await.unwrap_err();
        assert_eq!(wrong_password.code, ErrorCode::InvalidCredentials);
        assert_eq!(unknown_user.code, ErrorCode::InvalidCredentials);
        assert_eq!(wrong_password.detail, unknown_user.detail);

        db.users().set_active(user.id, false).await.unwrap();
        let inactive = identity.authenticate("testuser", "testpass123").await.unwrap_err();
        assert_eq!(inactive.code, ErrorCode::InvalidCredentials);
    }
}
