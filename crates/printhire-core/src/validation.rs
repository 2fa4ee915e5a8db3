//! # Validation Module
//!
//! Input rules checked before anything is written.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE                                                  │
//! │  ├── Lengths match the column limits                                   │
//! │  ├── Quantities are positive and bounded                               │
//! │  └── No duplicate lines within one document                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Inventory state machine (inventory.rs)                       │
//! │  └── Unit must be INSTORE to rent, RENTED to return                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE names, challans, serial numbers                            │
//! │  ├── CHECK on the unit state triple                                    │
//! │  └── Foreign keys (protect / cascade)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use crate::error::ValidationError;
use crate::types::{
    MAX_PAGE_NO, NewCustomerAddress, NewPurchase, NewRental, NewRentalReturn, NewStore, NewVendor,
};
use crate::{MAX_CHALLAN_YEAR, MAX_PURCHASE_QUANTITY, MIN_CHALLAN_YEAR};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Column limits from the schema.
pub const MAX_MODEL_NAME_LEN: usize = 300;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_ADDRESS_LEN: usize = 500;
pub const MAX_MOBILE_LEN: usize = 20;
pub const MAX_SERIAL_LEN: usize = 200;
pub const MAX_ORDER_NO_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field and returns it trimmed.
///
/// ## Example
/// ```rust
/// use printhire_core::validation::validate_required;
///
/// assert_eq!(validate_required("name", "  Main Store ", 200).unwrap(), "Main Store");
/// assert!(validate_required("name", "   ", 200).is_err());
/// ```
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates an optional text field; blank becomes `None`.
pub fn validate_optional(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => validate_required(field, v, max).map(Some),
    }
}

/// Validates a mobile number: digits, spaces, `+` and `-` only.
pub fn validate_mobile(value: &str) -> ValidationResult<String> {
    let value = validate_required("mobile", value, MAX_MOBILE_LEN)?;

    if !value
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
    {
        return Err(ValidationError::InvalidFormat {
            field: "mobile".to_string(),
            reason: "must contain only digits, spaces, '+' and '-'".to_string(),
        });
    }

    Ok(value)
}

/// Validates a serial number.
pub fn validate_serial_number(value: &str) -> ValidationResult<String> {
    validate_required("serial_number", value, MAX_SERIAL_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of a purchase line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_PURCHASE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_PURCHASE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_PURCHASE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a 1-based page number.
///
/// Pages past [`MAX_PAGE_NO`] would overflow the SQL offset.
pub fn validate_page_no(page_no: i64) -> ValidationResult<()> {
    if page_no < 1 {
        return Err(ValidationError::MustBePositive {
            field: "page_no".to_string(),
        });
    }

    if page_no > MAX_PAGE_NO {
        return Err(ValidationError::OutOfRange {
            field: "page_no".to_string(),
            min: 1,
            max: MAX_PAGE_NO,
        });
    }

    Ok(())
}

/// Validates the date a challan is numbered by.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use printhire_core::validation::validate_challan_date;
///
/// assert!(validate_challan_date("date", NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()).is_ok());
/// assert!(validate_challan_date("date", NaiveDate::from_ymd_opt(2125, 4, 1).unwrap()).is_err());
/// ```
pub fn validate_challan_date(field: &str, date: NaiveDate) -> ValidationResult<()> {
    if !(MIN_CHALLAN_YEAR..=MAX_CHALLAN_YEAR).contains(&date.year()) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: MIN_CHALLAN_YEAR.into(),
            max: MAX_CHALLAN_YEAR.into(),
        });
    }

    Ok(())
}

fn ensure_unique<I>(field: &str, values: I) -> ValidationResult<()>
where
    I: IntoIterator<Item = i64>,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(ValidationError::Duplicate {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Input Normalization
// =============================================================================

impl NewStore {
    /// Trimmed and checked copy.
    pub fn validated(&self) -> ValidationResult<NewStore> {
        Ok(NewStore {
            name: validate_required("name", &self.name, MAX_NAME_LEN)?,
            address: validate_required("address", &self.address, MAX_ADDRESS_LEN)?,
        })
    }
}

impl NewVendor {
    /// Trimmed and checked copy.
    pub fn validated(&self) -> ValidationResult<NewVendor> {
        Ok(NewVendor {
            name: validate_required("name", &self.name, MAX_NAME_LEN)?,
            address: validate_required("address", &self.address, MAX_ADDRESS_LEN)?,
            mobile: validate_mobile(&self.mobile)?,
        })
    }
}

impl NewCustomerAddress {
    /// Trimmed and checked copy.
    pub fn validated(&self) -> ValidationResult<NewCustomerAddress> {
        let mobile = match self.mobile.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(m) => Some(validate_mobile(m)?),
        };
        Ok(NewCustomerAddress {
            customer_id: self.customer_id,
            address: validate_required("address", &self.address, MAX_ADDRESS_LEN)?,
            mobile,
        })
    }
}

impl NewPurchase {
    /// Checks every line; a model may appear only once per purchase.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_challan_date("date", self.date)?;
        for item in &self.items {
            validate_quantity(item.quantity)?;
        }
        ensure_unique("printer_model_id", self.items.iter().map(|i| i.printer_model_id))
    }
}

impl NewRental {
    /// Trimmed and checked copy; a unit may appear only once.
    pub fn validated(&self) -> ValidationResult<NewRental> {
        validate_challan_date("challan_date", self.challan_date)?;
        ensure_unique("printer_unit_id", self.printer_unit_ids.iter().copied())?;
        Ok(NewRental {
            order_no: validate_optional("order_no", self.order_no.as_deref(), MAX_ORDER_NO_LEN)?,
            ..self.clone()
        })
    }
}

impl NewRentalReturn {
    /// Trimmed and checked copy; a unit may appear only once.
    pub fn validated(&self) -> ValidationResult<NewRentalReturn> {
        validate_challan_date("challan_date", self.challan_date)?;
        ensure_unique("printer_unit_id", self.units.iter().map(|u| u.printer_unit_id))?;
        Ok(NewRentalReturn {
            order_no: validate_optional("order_no", self.order_no.as_deref(), MAX_ORDER_NO_LEN)?,
            ..self.clone()
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
