//! # Validation Module
//!
//! Input validation utilities.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler                                                 │
//! │  └── Type validation (JSON deserialization, query parsing)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service                                                      │
//! │  └── THIS MODULE: required names, non-negative stock and price         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── CHECK (stock >= 0)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted category or product name.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Kopi  ").unwrap(), "Kopi");
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Rejects negative prices and stock counts.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a line-item quantity (must be at least 1).
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Query Parameters
// =============================================================================

/// Parses the `active` listing filter.
///
/// Accepts the usual boolean spellings: `1 t T TRUE true True` and
/// `0 f F FALSE false False`. An absent or empty value means no filter.
///
/// ## Example
/// ```rust
/// use kasir_core::validation::parse_active_filter;
///
/// assert_eq!(parse_active_filter(Some("1")).unwrap(), Some(true));
/// assert_eq!(parse_active_filter(Some("False")).unwrap(), Some(false));
/// assert_eq!(parse_active_filter(None).unwrap(), None);
/// assert!(parse_active_filter(Some("invalid")).is_err());
/// ```
pub fn parse_active_filter(raw: Option<&str>) -> ValidationResult<Option<bool>> {
    match raw {
        None | Some("") => Ok(None),
        Some("1" | "t" | "T" | "TRUE" | "true" | "True") => Ok(Some(true)),
        Some("0" | "f" | "F" | "FALSE" | "false" | "False") => Ok(Some(false)),
        Some(other) => Err(ValidationError::InvalidFormat {
            field: "active".to_string(),
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "Es Teh").unwrap(), "Es Teh");
        assert!(matches!(
            validate_name("name", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_name("name", &"x".repeat(201)),
            Err(ValidationError::TooLong { max: 200, .. })
        ));
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("stocks", 0).is_ok());
        assert!(validate_non_negative("stocks", 10).is_ok());
        assert!(validate_non_negative("price", -1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_parse_active_filter_spellings() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_active_filter(Some(raw)).unwrap(), Some(true), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_active_filter(Some(raw)).unwrap(), Some(false), "{raw}");
        }
        assert_eq!(parse_active_filter(Some("")).unwrap(), None);
    }

    #[test]
    fn test_parse_active_filter_rejects_garbage() {
        for raw in ["yes", "tRUE", "2", "invalid"] {
            let err = parse_active_filter(Some(raw)).unwrap_err();
            assert_eq!(err.field(), "active");
        }
    }
}
