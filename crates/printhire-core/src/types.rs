//! # Domain Types
//!
//! Entities stored by Printhire, plus the inputs used to create them.
//!
//! ## Entity Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Vendor ──┐                                   Customer                  │
//! │           ▼                                      │ 1..n                 │
//! │       Purchase ──► PurchaseItem ──► PrinterUnit ◄┼── CustomerAddress    │
//! │           ▲          (model, qty)   (× qty)      │        ▲            │
//! │  Store ───┘                            ▲         │        │            │
//! │    │                                   │         │        │            │
//! │    ├──────────► Rental ──► RentalUnit ─┤  ───────┴── Rental.address    │
//! │    │                                   │                               │
//! │    └──────► RentalReturn ──► RentalReturnUnit (scrapped?)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are SQLite row ids; insertion order is id order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::inventory::UnitStatus;
use crate::PAGE_SIZE;

// =============================================================================
// Master Data
// =============================================================================

/// A printer model, e.g. "HP LaserJet M1005".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PrinterModel {
    pub id: i64,
    pub name: String,
}

/// One of our own premises holding stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub address: String,
}

/// Input for creating or updating a store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStore {
    pub name: String,
    pub address: String,
}

/// A supplier of printers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub mobile: String,
}

/// Input for creating or updating a vendor.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewVendor {
    pub name: String,
    pub address: String,
    pub mobile: String,
}

/// A renting customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
}

/// An installation site of a customer. Rented units point here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CustomerAddress {
    pub id: i64,
    pub customer_id: i64,
    pub address: String,
    pub mobile: Option<String>,
}

/// Input for adding an address to a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomerAddress {
    pub customer_id: i64,
    pub address: String,
    pub mobile: Option<String>,
}

// =============================================================================
// Printer Unit
// =============================================================================

/// A single physical printer.
///
/// `status`, `store_id` and `customer_address_id` always agree; see
/// [`crate::inventory::UnitLocation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PrinterUnit {
    pub id: i64,
    pub serial_number: Option<String>,
    pub printer_model_id: i64,
    pub status: UnitStatus,
    /// Purchase line the unit came from; cleared if that line is deleted.
    pub purchase_item_id: Option<i64>,
    pub store_id: Option<i64>,
    pub customer_address_id: Option<i64>,
}

/// A unit joined with the names needed to show where it is.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PrinterUnitView {
    pub id: i64,
    pub serial_number: Option<String>,
    pub printer_model_id: i64,
    pub printer_model_name: String,
    pub status: UnitStatus,
    pub store_name: Option<String>,
    pub store_address: Option<String>,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
}

impl PrinterUnitView {
    /// `(location, address)` for display: the store for an in-store unit,
    /// the customer for a rented one, dashes otherwise.
    pub fn location_label(&self) -> (&str, &str) {
        const NONE: &str = "—";
        match self.status {
            UnitStatus::InStore => (
                self.store_name.as_deref().unwrap_or(NONE),
                self.store_address.as_deref().unwrap_or(NONE),
            ),
            UnitStatus::Rented => (
                self.customer_name.as_deref().unwrap_or(NONE),
                self.customer_address.as_deref().unwrap_or(NONE),
            ),
            UnitStatus::Scrapped => (NONE, NONE),
        }
    }
}

/// Filter for the unit listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitFilter {
    pub status: Option<UnitStatus>,
    /// Case-insensitive substring of the serial number.
    pub serial_contains: Option<String>,
}

// =============================================================================
// Purchase
// =============================================================================

/// Printers bought from a vendor into a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: i64,
    pub challan_no: String,
    pub vendor_id: i64,
    pub store_id: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

/// One model line of a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseItem {
    pub id: i64,
    pub purchase_id: i64,
    pub printer_model_id: i64,
    pub quantity: i64,
}

/// Input line for a purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchaseItem {
    pub printer_model_id: i64,
    pub quantity: i64,
}

/// Input for recording a purchase together with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchase {
    pub vendor_id: i64,
    pub store_id: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub items: Vec<NewPurchaseItem>,
}

/// Purchase listing row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseSummary {
    pub id: i64,
    pub challan_no: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub vendor_name: String,
    pub store_name: String,
    /// Units still linked to this purchase's lines.
    pub printer_count: i64,
}

// =============================================================================
// Rental
// =============================================================================

/// Units sent from a store to a customer address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Rental {
    pub id: i64,
    pub challan_no: String,
    #[ts(as = "String")]
    pub challan_date: NaiveDate,
    pub order_no: Option<String>,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    pub store_id: i64,
    pub customer_address_id: i64,
}

/// Link between a rental and one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RentalUnit {
    pub id: i64,
    pub rental_id: i64,
    pub printer_unit_id: i64,
}

/// Input for recording a rental and the units on it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewRental {
    #[ts(as = "String")]
    pub challan_date: NaiveDate,
    pub order_no: Option<String>,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    pub store_id: i64,
    pub customer_address_id: i64,
    pub printer_unit_ids: Vec<i64>,
}

// =============================================================================
// Rental Return
// =============================================================================

/// Units coming back from a customer address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RentalReturn {
    pub id: i64,
    pub challan_no: String,
    #[ts(as = "String")]
    pub challan_date: NaiveDate,
    pub order_no: Option<String>,
    #[ts(as = "Option<String>")]
    pub order_date: Option<NaiveDate>,
    pub customer_address_id: i64,
    pub store_id: i64,
}

/// Link between a return and one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RentalReturnUnit {
    pub id: i64,
    pub rental_return_id: i64,
    pub printer_unit_id: i64,
    pub scrapped: bool,
}

/// One unit on a return input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReturnLine {
    pub printer_unit_id: i64,
    #[serde(default)]
    pub scrapped: bool,
}

/// Input for recording a rental return.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewRentalReturn {
    #[ts(as = "String")]
    pub challan_date: NaiveDate,
    pub order_no: Option<String>,
    #[ts(as = "Option<String>")]
    pub order_date: Option<NaiveDate>,
    pub customer_address_id: i64,
    pub store_id: i64,
    pub units: Vec<ReturnLine>,
}

/// Rental or return listing row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ChallanSummary {
    pub id: i64,
    pub challan_no: String,
    #[ts(as = "String")]
    pub challan_date: NaiveDate,
    pub order_no: Option<String>,
    pub store_name: String,
    pub customer_name: String,
    pub customer_address: String,
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a listing. Pages are numbered from 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_no: i64,
    pub total: i64,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` rows.
    pub fn page_count(&self) -> i64 {
        (self.total + PAGE_SIZE - 1) / PAGE_SIZE
    }

    /// 1-based row number of the `index`-th item on this page.
    pub fn serial_no(&self, index: usize) -> i64 {
        page_offset(self.page_no).saturating_add(index as i64 + 1)
    }

    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.page_no < self.page_count()
    }
}

/// Highest page number whose offset still fits in an `i64`.
pub const MAX_PAGE_NO: i64 = i64::MAX / PAGE_SIZE;

/// SQL `OFFSET` for a 1-based page number, clamped to `1..=MAX_PAGE_NO`.
pub fn page_offset(page_no: i64) -> i64 {
    (page_no.clamp(1, MAX_PAGE_NO) - 1) * PAGE_SIZE
}
