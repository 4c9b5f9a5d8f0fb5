//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kasir-db errors (separate crate)                                      │
//! │  └── DbError          - Persistence failures, not found, conflicts     │
//! │                                                                         │
//! │  HTTP API errors (in app)                                              │
//! │  └── ApiError         - What clients see (inside the envelope)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                           DbError ──┴→ ApiError → envelope + status    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::id::DecodeError;

// =============================================================================
// Core Error
// =============================================================================

/// Business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An external identifier could not be decoded.
    ///
    /// ## When This Occurs
    /// - Client sends a garbled or truncated id in a path or payload
    /// - Client sends an id with characters outside `0-9a-zA-Z`
    #[error("{entity} not found: {id}")]
    InvalidId {
        entity: String,
        id: String,
        #[source]
        source: DecodeError,
    },

    /// A transaction was submitted without any line items.
    #[error("transaction must have at least one item")]
    EmptyTransaction,

    /// Requested quantity exceeds the product's current stock.
    ///
    /// ## User Workflow
    /// ```text
    /// POST /api/transactions  { items: [{ product_id, quantity: 5 }] }
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Kopi Susu" }
    ///      │
    ///      ▼
    /// 400: "insufficient stock for product: Kopi Susu"
    /// ```
    #[error("insufficient stock for product: {product}")]
    InsufficientStock { product: String },

    /// A report window whose start is after its end.
    #[error("startDate cannot be after endDate")]
    InvalidRange { start: String, end: String },

    /// A named report period that is not recognised.
    #[error("unknown report period: {0}")]
    UnknownPeriod(String),

    /// Price arithmetic left the i64 range.
    #[error("price overflow while computing {0}")]
    PriceOverflow(String),

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Wraps a codec failure for the given entity kind.
    pub fn invalid_id(entity: impl Into<String>, id: impl Into<String>, source: DecodeError) -> Self {
        CoreError::InvalidId {
            entity: entity.into(),
            id: id.into(),
            source,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid boolean, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Kopi Susu".to_string(),
        };
        assert_eq!(err.to_string(), "insufficient stock for product: Kopi Susu");

        let err = CoreError::InvalidRange {
            start: "2024-01-02".to_string(),
            end: "2024-01-01".to_string(),
        };
        assert_eq!(err.to_string(), "startDate cannot be after endDate");

        assert_eq!(
            CoreError::EmptyTransaction.to_string(),
            "transaction must have at least one item"
        );
    }

    #[test]
    fn test_invalid_id_reads_as_not_found() {
        let err = CoreError::invalid_id("Product", "bad-id", DecodeError::InvalidCharacter('-'));
        assert_eq!(err.to_string(), "Product not found: bad-id");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "name is required");
    }
}
