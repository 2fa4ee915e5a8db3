//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError / CoreError (printhire-core)                          │
//! │       │  rejected input or illegal unit transition                     │
//! │       ▼                                                                 │
//! │  DbError::Core ◄──────────┐                                            │
//! │                           │                                             │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │  constraint names parsed from the message                      │
//! │       ▼                   │                                             │
//! │  DbError (this module) ───┘                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  anyhow::Error (cli) ← printed to the operator                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use printhire_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    /// - A guarded UPDATE matched nothing
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate model, store, vendor or customer name
    /// - Same address twice for one customer
    /// - Serial number already used by another unit
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a store, vendor or model that doesn't exist
    /// - Deleting a store that still holds units
    /// - Deleting a customer address with units on rent
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// The input or the requested transition was rejected by the domain rules.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - CHECK constraint on the unit state columns
    /// - A trigger refused to change a challan number
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether this is a rejected unit transition (rent or return).
    pub fn is_transition_error(&self) -> bool {
        matches!(
            self,
            DbError::Core(CoreError::UnitNotAvailable { .. })
                | DbError::Core(CoreError::UnitNotRented { .. })
                | DbError::Core(CoreError::UnitNotAtAddress { .. })
                | DbError::Core(CoreError::InvalidUnitState { .. })
        )
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>[, <table>.<column>]"
                // "FOREIGN KEY constraint failed"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use printhire_core::UnitStatus;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_validation_wraps_into_core() {
        let err: DbError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert!(!err.is_transition_error());
    }

    #[test]
    fn test_transition_errors_are_flagged() {
        let err = DbError::from(CoreError::UnitNotAvailable {
            unit_id: 4,
            status: UnitStatus::Scrapped,
        });
        assert!(err.is_transition_error());
        assert_eq!(
            err.to_string(),
            "Printer unit 4 is not available for rent (currently SCRAPPED)"
        );

        let err = DbError::from(CoreError::UnitNotAtAddress {
            unit_id: 4,
            rented_to: 1,
            returned_from: 2,
        });
        assert!(err.is_transition_error());
    }
}
