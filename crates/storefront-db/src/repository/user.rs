//! # User Repository
//!
//! Persistence for customer accounts.
//!
//! Email and username are unique. Callers check for duplicates first to
//! give a precise error, but the UNIQUE indexes are the source of truth:
//! a racing insert that slips past the check is still rejected and mapped
//! to the same `EmailTaken` / `UsernameTaken` error.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{CoreError, NewUser, User};

const USER_COLUMNS: &str = "id, email, username, password_hash, full_name, is_active, created_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new active user with an already-hashed password.
    ///
    /// ## Returns
    /// * `Ok(User)` - Inserted user with generated id
    /// * `Err(DbError::Domain(EmailTaken | UsernameTaken))` - Duplicate
    pub async fn insert(&self, user: &NewUser, password_hash: &str) -> DbResult<User> {
        debug!(username = %user.username, "Inserting user");

        let sql = format!(
            "INSERT INTO users (email, username, password_hash, full_name, is_active, created_at) \
             VALUES (?1, ?2, ?3, ?4, 1, ?5) \
             RETURNING {USER_COLUMNS}"
        );

        let result = sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.username)
            .bind(password_hash)
            .bind(&user.full_name)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(user) => Ok(user),
            Err(err) => Err(map_unique_violation(DbError::from(err), user)),
        }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets a user by exact username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets a user by exact email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Activates or deactivates an account.
    pub async fn set_active(&self, id: i64, is_active: bool) -> DbResult<()> {
        debug!(id, is_active, "Setting user active flag");

        let result = sqlx::query("UPDATE users SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }
}

/// Turns `UNIQUE constraint failed: users.<column>` into the domain error.
fn map_unique_violation(err: DbError, user: &NewUser) -> DbError {
    match err.unique_column() {
        Some("users.email") => CoreError::EmailTaken(user.email.clone()).into(),
        Some("users.username") => CoreError::UsernameTaken(user.username.clone()).into(),
        _ => err,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
