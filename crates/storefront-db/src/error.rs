//! Errors raised by the storage layer.
//!
//! ```text
//! sqlx::Error ──────────────┐
//! MigrateError ─────────────┼──► DbError ──► ApiError (storefront-api)
//! CoreError raised mid-tx ──┘     (Domain)
//! ```
//!
//! SQLite reports constraint failures only as message text; the
//! conversion below recognises the UNIQUE and FOREIGN KEY forms.

use storefront_core::CoreError;
use thiserror::Error;

/// Storage failure, or a business rule that failed inside a transaction.
#[derive(Debug, Error)]
pub enum DbError {
    /// A row addressed by id is absent (update/delete on a missing row).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected a write. `column` is `table.column`, e.g.
    /// two registrations racing for one email give `users.email`.
    #[error("Duplicate value for {column}")]
    UniqueViolation { column: String },

    /// A write referenced a missing parent row (order for a deleted user).
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Rule violation detected mid-transaction: missing product, short
    /// stock, foreign order, bad status move. The transaction has been
    /// rolled back by the time the caller sees this.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// The store could not be opened, or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement for a reason other than a constraint.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// `NotFound` for `entity` with id `id`.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// `table.column` of a unique violation.
    pub fn unique_column(&self) -> Option<&str> {
        match self {
            DbError::UniqueViolation { column } => Some(column),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "?"),
            sqlx::Error::Database(db_err) => constraint_error(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

/// Classifies a SQLite error message.
///
/// `UNIQUE constraint failed: users.email` and `FOREIGN KEY constraint
/// failed` are the two shapes we act on.
fn constraint_error(message: &str) -> DbError {
    if let Some(column) = message.strip_prefix("UNIQUE constraint failed: ") {
        DbError::UniqueViolation {
            column: column.to_string(),
        }
    } else if message.starts_with("FOREIGN KEY constraint failed") {
        DbError::ForeignKeyViolation {
            message: message.to_string(),
        }
    } else {
        DbError::QueryFailed(message.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result alias used across the repositories.
pub type DbResult<T> = Result<T, DbError>;
