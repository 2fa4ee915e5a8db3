//! # Error Types
//!
//! Domain-specific error types for printhire-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  printhire-core errors (this file)                                     │
//! │  ├── CoreError        - Rejected transitions, bad challans             │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  printhire-db errors (separate crate)                                  │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → CLI (anyhow)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::inventory::UnitStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The unit cannot be rented because it is not in a store.
    ///
    /// ## When This Occurs
    /// - The unit is already out on another rental
    /// - The unit was scrapped on an earlier return
    /// - Two rentals raced for the same unit and this one lost
    #[error("Printer unit {unit_id} is not available for rent (currently {status})")]
    UnitNotAvailable { unit_id: i64, status: UnitStatus },

    /// The unit cannot be returned because it is not on rent.
    #[error("Printer unit {unit_id} is not on rent (currently {status})")]
    UnitNotRented { unit_id: i64, status: UnitStatus },

    /// The unit is on rent, but at a different address than the return's.
    #[error("Printer unit {unit_id} is rented to address {rented_to}, not {returned_from}")]
    UnitNotAtAddress {
        unit_id: i64,
        rented_to: i64,
        returned_from: i64,
    },

    /// Stored columns contradict the unit's status.
    ///
    /// ## When This Occurs
    /// Only on rows written outside this code base; the schema CHECK
    /// constraint rejects them on insert.
    #[error("Printer unit {unit_id} has inconsistent state: {reason}")]
    InvalidUnitState { unit_id: i64, reason: String },

    /// A challan number could not be parsed.
    #[error("Invalid challan number '{value}': {reason}")]
    InvalidChallan { value: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The same value appears twice where it must be unique.
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnitNotAvailable {
            unit_id: 42,
            status: UnitStatus::Rented,
        };
        assert_eq!(
            err.to_string(),
            "Printer unit 42 is not available for rent (currently RENTED)"
        );

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "name must be at most 200 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "address".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
