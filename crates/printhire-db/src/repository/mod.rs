//! # Repository Module
//!
//! Database repository implementations for Printhire.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Touches Which Tables                             │
//! │                                                                         │
//! │  Master data        printer_model / store / vendor / customer          │
//! │  ───────────        plain CRUD, pages of PAGE_SIZE ordered by id,      │
//! │                     "all" lists ordered by name                        │
//! │                                                                         │
//! │  Documents          purchase / rental / rental_return                  │
//! │  ─────────          one transaction per create:                        │
//! │                       1. next_challan()       (takes the write lock)   │
//! │                       2. INSERT header        (challan from party)     │
//! │                       3. INSERT lines                                  │
//! │                       4. create or move units (printer_unit helpers)   │
//! │                       5. COMMIT               (or nothing at all)      │
//! │                                                                         │
//! │  Units              printer_unit                                       │
//! │  ─────              listing, serials, report rows, and the guarded     │
//! │                     UPDATE every transition goes through               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PrinterModelRepository`](printer_model::PrinterModelRepository)
//! - [`StoreRepository`](store::StoreRepository)
//! - [`VendorRepository`](vendor::VendorRepository)
//! - [`CustomerRepository`](customer::CustomerRepository) - customers and addresses
//! - [`PurchaseRepository`](purchase::PurchaseRepository)
//! - [`RentalRepository`](rental::RentalRepository)
//! - [`RentalReturnRepository`](rental_return::RentalReturnRepository)
//! - [`PrinterUnitRepository`](printer_unit::PrinterUnitRepository)

pub mod customer;
pub mod printer_model;
pub mod printer_unit;
pub mod purchase;
pub mod rental;
pub mod rental_return;
pub mod store;
pub mod vendor;

use crate::error::DbError;

/// Maps a UNIQUE failure to a duplicate error naming the offending value.
pub(crate) fn unique_as<'a>(field: &'a str, value: &'a str) -> impl FnOnce(sqlx::Error) -> DbError + 'a {
    move |err| match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate(field, value),
        other => other,
    }
}
