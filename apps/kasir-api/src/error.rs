//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kasir                                  │
//! │                                                                         │
//! │  Repository ── DbError ──┐                                             │
//! │                          ├──► ServiceError ──► ApiError ──► envelope   │
//! │  Domain rule ─ CoreError ┘                        │                    │
//! │                                                   ▼                    │
//! │                                      HTTP status + error block         │
//! │                                                                         │
//! │  {                                                                      │
//! │    "id": "...",                                                         │
//! │    "error": {                                                           │
//! │      "code": 404,                                                       │
//! │      "message": "Product not found: 1hT7...",                           │
//! │      "errors": [{ "reason": "notFound", "message": "..." }]             │
//! │    }                                                                    │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backend failures are logged with their detail and answered with a
//! generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use kasir_core::id;
use kasir_core::response::{ApiResponse, ErrorItem, ErrorReason};
use kasir_core::{CoreError, ValidationError};
use kasir_db::DbError;

use crate::services::ServiceError;

/// Error returned from every handler.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes and their HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// A required field or item is missing (400)
    MissingField,

    /// A query or path parameter is unusable (400)
    InvalidParameter,

    /// Stale version on update (409)
    Conflict,

    /// Unique key already taken (409)
    AlreadyExists,

    /// Insufficient stock (400)
    InsufficientStock,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError
            | ErrorCode::MissingField
            | ErrorCode::InvalidParameter
            | ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict | ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Reason attached to the envelope's error item.
    pub fn reason(&self) -> ErrorReason {
        match self {
            ErrorCode::NotFound => ErrorReason::NotFound,
            ErrorCode::ValidationError | ErrorCode::Conflict | ErrorCode::InsufficientStock => {
                ErrorReason::InvalidValue
            }
            ErrorCode::MissingField => ErrorReason::Required,
            ErrorCode::InvalidParameter => ErrorReason::InvalidParameter,
            ErrorCode::AlreadyExists => ErrorReason::AlreadyExists,
            ErrorCode::DatabaseError | ErrorCode::Internal => ErrorReason::BackendError,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Stored ids travel as hyphenated UUIDs; clients only know the short form.
fn external_id(raw: &str) -> String {
    Uuid::parse_str(raw)
        .map(id::encode)
        .unwrap_or_else(|_| raw.to_string())
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &external_id(&id)),
            DbError::VersionConflict { entity, id, expected } => ApiError::new(
                ErrorCode::Conflict,
                format!(
                    "{} {} was modified by another request (expected version {})",
                    entity,
                    external_id(&id),
                    expected
                ),
            ),
            DbError::StockUnavailable { product } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!("insufficient stock for product: {}", product),
            ),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::AlreadyExists,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
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
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::CorruptRow(e) => {
                tracing::error!("Corrupt row: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            // An id that cannot be decoded names nothing that exists
            CoreError::InvalidId { .. } => ApiError::new(ErrorCode::NotFound, message),
            CoreError::EmptyTransaction => ApiError::new(ErrorCode::MissingField, message),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, message)
            }
            CoreError::InvalidRange { .. } | CoreError::UnknownPeriod(_) => {
                ApiError::new(ErrorCode::InvalidParameter, message)
            }
            CoreError::PriceOverflow(_) => ApiError::validation(message),
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let code = match err {
            ValidationError::Required { .. } => ErrorCode::MissingField,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidParameter,
            ValidationError::TooLong { .. }
            | ValidationError::MustBePositive { .. }
            | ValidationError::MustNotBeNegative { .. } => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(e) => e.into(),
            ServiceError::Db(e) => e.into(),
        }
    }
}

/// Malformed or mistyped request bodies.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiResponse::error_with_items(
            status.as_u16(),
            vec![ErrorItem::new(self.message).with_reason(self.code.reason())],
        );
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
