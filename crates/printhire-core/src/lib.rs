//! # printhire-core: Pure Domain Logic for Printhire
//!
//! Everything that decides *what* happens to a printer unit or a challan
//! number lives here, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Printhire Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    printhire-cli                                │   │
//! │  │    purchase add ─► rent ─► return ─► report                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ printhire-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ inventory │  │  challan  │  │  report   │  │   │
//! │  │   │ Purchase  │  │ UnitStatus│  │ APS/007/  │  │ by status │  │   │
//! │  │   │ Rental    │  │ Location  │  │  25-26    │  │ in store  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 printhire-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, challan sequences            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (PrinterUnit, Purchase, Rental, ...) and inputs
//! - [`inventory`] - Unit state machine (In-store / Rented / Scrapped)
//! - [`challan`] - Document number formatting and parsing
//! - [`validation`] - Input rules
//! - [`report`] - Inventory aggregation for the stock pages
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use printhire_core::challan::Challan;
//!
//! let challan = Challan::for_year("Acme Print Supplies", 7, 2025);
//! assert_eq!(challan.to_string(), "APS/007/25-26");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod challan;
pub mod error;
pub mod inventory;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use challan::{Challan, DocumentKind};
pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::{UnitLocation, UnitStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Rows per page for every paginated listing.
pub const PAGE_SIZE: i64 = 10;

/// Maximum number of units a single purchase line may create.
///
/// ## Business Reason
/// Each unit is a physical row; a typo of 10000 instead of 10 would flood
/// the inventory with phantom printers.
pub const MAX_PURCHASE_QUANTITY: i64 = 999;

/// Document dates must fall in one century; the challan keeps only the last
/// two digits of the year.
pub const MIN_CHALLAN_YEAR: i32 = 2000;
pub const MAX_CHALLAN_YEAR: i32 = 2099;
