//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Handler -> Result<T, ApiError>                                        │
//! │         │                                                               │
//! │         ├── ValidationError ──────────────┐                             │
//! │         ├── CoreError (business rule) ────┤                             │
//! │         ├── DbError (incl. CoreError) ────┼──► ApiError ──► response    │
//! │         └── token / credential failure ───┘     status + JSON body      │
//! │                                                                         │
//! │  HTTP/1.1 400 Bad Request                                               │
//! │  {"code": "INSUFFICIENT_STOCK",                                         │
//! │   "detail": "Insufficient stock for product 7: available 100, ..."}     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures are logged with their cause and rendered with a
//! generic message.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use storefront_core::{CoreError, ValidationError};
use storefront_db::DbError;
use ts_rs::TS;

/// Error returned from every handler.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "detail": "Product 42 not found"
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub detail: String,
}

/// Error codes for API responses.
///
/// ## Usage in Frontend
/// ```typescript
/// if (err.code === 'INSUFFICIENT_STOCK') {
///   showCartWarning(err.detail);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Registration email in use (400)
    EmailTaken,

    /// Registration username in use (400)
    UsernameTaken,

    /// Wrong username or password (401)
    InvalidCredentials,

    /// Missing, malformed or expired token (401)
    Unauthenticated,

    /// Authenticated but not allowed (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Not enough stock for an order (400)
    InsufficientStock,

    /// Order status change not allowed (400)
    InvalidStateTransition,

    /// Cancel requested on a completed order (400)
    CannotCancelCompleted,

    /// Cancel requested on a cancelled order (400)
    AlreadyCancelled,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::EmailTaken
            | ErrorCode::UsernameTaken
            | ErrorCode::InsufficientStock
            | ErrorCode::InvalidStateTransition
            | ErrorCode::CannotCancelCompleted
            | ErrorCode::AlreadyCancelled => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidCredentials | ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        ApiError {
            code,
            detail: detail.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(detail: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, detail)
    }

    /// Creates a validation error.
    pub fn validation(detail: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, detail)
    }

    /// Creates an unauthenticated error.
    pub fn unauthenticated() -> Self {
        ApiError::new(ErrorCode::Unauthenticated, "Could not validate credentials")
    }

    /// Logs `cause` and creates a generic internal error.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        tracing::error!(%cause, "Internal error");
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.detail)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let challenge = status == StatusCode::UNAUTHORIZED;

        let mut response = (status, Json(self)).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Validation(inner) => return ApiError::validation(inner.to_string()),
            CoreError::ProductNotFound(_) | CoreError::OrderNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::OrderForbidden { .. } => ErrorCode::Forbidden,
            CoreError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            CoreError::CannotCancelCompleted(_) => ErrorCode::CannotCancelCompleted,
            CoreError::AlreadyCancelled(_) => ErrorCode::AlreadyCancelled,
            CoreError::EmailTaken(_) => ErrorCode::EmailTaken,
            CoreError::UsernameTaken(_) => ErrorCode::UsernameTaken,
            CoreError::InvalidCredentials => ErrorCode::InvalidCredentials,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { entity, id } => {
                ApiError::not_found(format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { column } => {
                ApiError::validation(format!("{} already exists", column))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database busy")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_status_mapping() {
        let cases = [
            (CoreError::ProductNotFound(1), StatusCode::NOT_FOUND),
            (CoreError::OrderNotFound(1), StatusCode::NOT_FOUND),
            (CoreError::OrderForbidden { order_id: 1 }, StatusCode::FORBIDDEN),
            (CoreError::EmailTaken("a@b.io".into()), StatusCode::BAD_REQUEST),
            (CoreError::UsernameTaken("abc".into()), StatusCode::BAD_REQUEST),
            (CoreError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (CoreError::CannotCancelCompleted(1), StatusCode::BAD_REQUEST),
            (CoreError::AlreadyCancelled(1), StatusCode::BAD_REQUEST),
            (
                CoreError::InsufficientStock {
                    product_id: 1,
                    available: 0,
                    requested: 1,
                },
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_validation_detail_is_unwrapped() {
        let err: ApiError = CoreError::Validation(ValidationError::Required {
            field: "name".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.detail, "name is required");
    }

    #[test]
    fn test_db_internal_errors_are_generic() {
        let err: ApiError = DbError::QueryFailed("near \"SELEC\": syntax error".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.detail.contains("SELEC"));
    }

    #[test]
    fn test_internal_errors_hide_cause() {
        let err = ApiError::internal("Failed to hash password: invalid salt length");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.detail, "Internal server error");
    }

    #[test]
    fn test_json_shape() {
        let err: ApiError = CoreError::InsufficientStock {
            product_id: 7,
            available: 100,
            requested: 200,
        }
        .into();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INSUFFICIENT_STOCK");
        assert!(json["detail"]
            .as_str()
            .unwrap()
            .starts_with("Insufficient stock"));
    }

    #[test]
    fn test_unauthorized_response_has_challenge() {
        let response = ApiError::unauthenticated().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let response = ApiError::not_found("nope").into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
