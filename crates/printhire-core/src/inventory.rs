//! # Inventory State Machine
//!
//! Every printer unit is in exactly one of three places.
//!
//! ## States and Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Printer Unit Lifecycle                            │
//! │                                                                         │
//! │   PurchaseItem created (× quantity)                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────┐   RentalUnit created    ┌──────────┐                    │
//! │   │ INSTORE  │ ──────────────────────► │  RENTED  │                    │
//! │   │ store ✓  │                         │ store ✗  │                    │
//! │   │ addr  ✗  │ ◄────────────────────── │ addr  ✓  │                    │
//! │   └──────────┘  ReturnUnit (kept)      └────┬─────┘                    │
//! │                                             │ ReturnUnit (scrapped)    │
//! │                                             ▼                          │
//! │                                        ┌──────────┐                    │
//! │                                        │ SCRAPPED │  terminal          │
//! │                                        │ store ✗  │                    │
//! │                                        │ addr  ✗  │                    │
//! │                                        └──────────┘                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The database keeps three columns (status, store_id, customer_address_id).
//! [`UnitLocation`] is the only place those columns are derived from, so the
//! triple can never disagree with itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::PrinterUnit;

// =============================================================================
// Unit Status
// =============================================================================

/// The stored status column of a printer unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum UnitStatus {
    /// Sitting in one of our stores.
    InStore,
    /// Installed at a customer address.
    Rented,
    /// Written off on return.
    Scrapped,
}

impl UnitStatus {
    /// All statuses in display order.
    pub const ALL: [UnitStatus; 3] = [UnitStatus::InStore, UnitStatus::Rented, UnitStatus::Scrapped];

    /// Value stored in the database and sent over the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::InStore => "INSTORE",
            UnitStatus::Rented => "RENTED",
            UnitStatus::Scrapped => "SCRAPPED",
        }
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            UnitStatus::InStore => "In-store",
            UnitStatus::Rented => "Rented",
            UnitStatus::Scrapped => "Scrapped",
        }
    }
}

impl Default for UnitStatus {
    fn default() -> Self {
        UnitStatus::InStore
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitStatus {
    type Err = String;

    /// Accepts the stored value as well as the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instore" | "in-store" | "in_store" => Ok(UnitStatus::InStore),
            "rented" => Ok(UnitStatus::Rented),
            "scrapped" => Ok(UnitStatus::Scrapped),
            other => Err(format!("unknown unit status: {}", other)),
        }
    }
}

// =============================================================================
// Unit Location
// =============================================================================

/// Where a unit is, carrying exactly the foreign key its state allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
#[ts(export)]
pub enum UnitLocation {
    InStore { store_id: i64 },
    Rented { customer_address_id: i64 },
    Scrapped,
}

impl UnitLocation {
    /// Rebuilds a location from stored columns.
    ///
    /// Returns `None` when the columns violate the state invariant, e.g. a
    /// RENTED row that still points at a store.
    pub fn from_columns(
        status: UnitStatus,
        store_id: Option<i64>,
        customer_address_id: Option<i64>,
    ) -> Option<Self> {
        match (status, store_id, customer_address_id) {
            (UnitStatus::InStore, Some(store_id), None) => Some(UnitLocation::InStore { store_id }),
            (UnitStatus::Rented, None, Some(customer_address_id)) => {
                Some(UnitLocation::Rented { customer_address_id })
            }
            (UnitStatus::Scrapped, None, None) => Some(UnitLocation::Scrapped),
            _ => None,
        }
    }

    /// Status column for this location.
    pub const fn status(&self) -> UnitStatus {
        match self {
            UnitLocation::InStore { .. } => UnitStatus::InStore,
            UnitLocation::Rented { .. } => UnitStatus::Rented,
            UnitLocation::Scrapped => UnitStatus::Scrapped,
        }
    }

    /// Store column for this location.
    pub const fn store_id(&self) -> Option<i64> {
        match self {
            UnitLocation::InStore { store_id } => Some(*store_id),
            _ => None,
        }
    }

    /// Customer address column for this location.
    pub const fn customer_address_id(&self) -> Option<i64> {
        match self {
            UnitLocation::Rented { customer_address_id } => Some(*customer_address_id),
            _ => None,
        }
    }

    /// Error for a move to this location that found the unit in `current`.
    ///
    /// Moving out on rent needs INSTORE; every other move is a return.
    pub fn rejection(&self, unit_id: i64, current: UnitStatus) -> CoreError {
        match self {
            UnitLocation::Rented { .. } => CoreError::UnitNotAvailable { unit_id, status: current },
            _ => CoreError::UnitNotRented { unit_id, status: current },
        }
    }
}

// =============================================================================
// Transitions
// =============================================================================

impl PrinterUnit {
    /// Current location, validated against the state invariant.
    pub fn location(&self) -> CoreResult<UnitLocation> {
        UnitLocation::from_columns(self.status, self.store_id, self.customer_address_id).ok_or_else(
            || CoreError::InvalidUnitState {
                unit_id: self.id,
                reason: format!(
                    "status {} with store {:?} and customer address {:?}",
                    self.status, self.store_id, self.customer_address_id
                ),
            },
        )
    }

    /// Location after renting this unit to `customer_address_id`.
    ///
    /// ## Rules
    /// - Only an INSTORE unit can be rented
    /// - The store is cleared, the customer address set
    pub fn rent_to(&self, customer_address_id: i64) -> CoreResult<UnitLocation> {
        match self.location()? {
            UnitLocation::InStore { .. } => Ok(UnitLocation::Rented { customer_address_id }),
            other => Err(CoreError::UnitNotAvailable {
                unit_id: self.id,
                status: other.status(),
            }),
        }
    }

    /// Location after this unit comes back from `customer_address_id` on a
    /// rental return.
    ///
    /// ## Rules
    /// - Only a RENTED unit can be returned
    /// - It must come back from the address it was rented to
    /// - `scrapped` → SCRAPPED with no store and no address
    /// - otherwise → INSTORE at `store_id`
    pub fn return_to(
        &self,
        customer_address_id: i64,
        store_id: i64,
        scrapped: bool,
    ) -> CoreResult<UnitLocation> {
        match self.location()? {
            UnitLocation::Rented { customer_address_id: rented_to }
                if rented_to != customer_address_id =>
            {
                Err(CoreError::UnitNotAtAddress {
                    unit_id: self.id,
                    rented_to,
                    returned_from: customer_address_id,
                })
            }
            UnitLocation::Rented { .. } if scrapped => Ok(UnitLocation::Scrapped),
            UnitLocation::Rented { .. } => Ok(UnitLocation::InStore { store_id }),
            other => Err(CoreError::UnitNotRented {
                unit_id: self.id,
                status: other.status(),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(status: UnitStatus, store_id: Option<i64>, customer_address_id: Option<i64>) -> PrinterUnit {
        PrinterUnit {
            id: 1,
            serial_number: None,
            printer_model_id: 1,
            status,
            purchase_item_id: None,
            store_id,
            customer_address_id,
        }
    }

    #[test]
    fn test_location_round_trips_columns() {
        for location in [
            UnitLocation::InStore { store_id: 3 },
            UnitLocation::Rented { customer_address_id: 9 },
            UnitLocation::Scrapped,
        ] {
            let rebuilt = UnitLocation::from_columns(
                location.status(),
                location.store_id(),
                location.customer_address_id(),
            );
            assert_eq!(rebuilt, Some(location));
        }
    }

    #[test]
    fn test_inconsistent_columns_rejected() {
        assert!(UnitLocation::from_columns(UnitStatus::InStore, None, None).is_none());
        assert!(UnitLocation::from_columns(UnitStatus::Rented, Some(1), Some(2)).is_none());
        assert!(UnitLocation::from_columns(UnitStatus::Scrapped, Some(1), None).is_none());

        let err = unit(UnitStatus::Rented, Some(1), None).location().unwrap_err();
        assert!(matches!(err, CoreError::InvalidUnitState { unit_id: 1, .. }));
    }

    #[test]
    fn test_rent_in_store_unit() {
        let next = unit(UnitStatus::InStore, Some(2), None).rent_to(7).unwrap();
        assert_eq!(next, UnitLocation::Rented { customer_address_id: 7 });
        assert_eq!(next.store_id(), None);
    }

    #[test]
    fn test_rent_requires_in_store() {
        let err = unit(UnitStatus::Rented, None, Some(7)).rent_to(8).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnitNotAvailable { status: UnitStatus::Rented, .. }
        ));

        let err = unit(UnitStatus::Scrapped, None, None).rent_to(8).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnitNotAvailable { status: UnitStatus::Scrapped, .. }
        ));
    }

    #[test]
    fn test_return_to_store_or_scrap() {
        let rented = unit(UnitStatus::Rented, None, Some(7));

        assert_eq!(
            rented.return_to(7, 4, false).unwrap(),
            UnitLocation::InStore { store_id: 4 }
        );
        assert_eq!(rented.return_to(7, 4, true).unwrap(), UnitLocation::Scrapped);
    }

    #[test]
    fn test_return_from_other_address_rejected() {
        let err = unit(UnitStatus::Rented, None, Some(7))
            .return_to(8, 4, false)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnitNotAtAddress { rented_to: 7, returned_from: 8, .. }
        ));

        let err = unit(UnitStatus::Rented, None, Some(7))
            .return_to(8, 4, true)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnitNotAtAddress { .. }));
    }

    #[test]
    fn test_rejection_follows_direction() {
        let to_customer = UnitLocation::Rented { customer_address_id: 7 };
        assert!(matches!(
            to_customer.rejection(1, UnitStatus::Rented),
            CoreError::UnitNotAvailable { unit_id: 1, status: UnitStatus::Rented }
        ));

        for to in [UnitLocation::InStore { store_id: 2 }, UnitLocation::Scrapped] {
            assert!(matches!(
                to.rejection(1, UnitStatus::InStore),
                CoreError::UnitNotRented { unit_id: 1, status: UnitStatus::InStore }
            ));
        }
    }

    #[test]
    fn test_return_requires_rented() {
        let err = unit(UnitStatus::InStore, Some(2), None)
            .return_to(7, 4, false)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnitNotRented { status: UnitStatus::InStore, .. }
        ));
    }

    #[test]
    fn test_status_parsing_and_wire_format() {
        assert_eq!("INSTORE".parse::<UnitStatus>().unwrap(), UnitStatus::InStore);
        assert_eq!("in-store".parse::<UnitStatus>().unwrap(), UnitStatus::InStore);
        assert_eq!("Rented".parse::<UnitStatus>().unwrap(), UnitStatus::Rented);
        assert!("lost".parse::<UnitStatus>().is_err());

        let json = serde_json::to_string(&UnitStatus::InStore).unwrap();
        assert_eq!(json, "\"INSTORE\"");

        let json = serde_json::to_string(&UnitLocation::Rented { customer_address_id: 5 }).unwrap();
        assert_eq!(json, r#"{"status":"RENTED","customer_address_id":5}"#);
    }
}
