//! # printhire-db: Database Layer for Printhire
//!
//! This crate provides database access for Printhire. It uses SQLite for
//! storage with sqlx for async operations, and is where printer units
//! actually change state.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Printhire Data Flow                              │
//! │                                                                         │
//! │  CLI command (printhire rent ...)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   printhire-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │   Database    │   │  Repositories  │   │  Migrations   │   │   │
//! │  │   │   (pool.rs)   │   │                │   │  (embedded)   │   │   │
//! │  │   │               │   │ PurchaseRepo   │   │               │   │   │
//! │  │   │ SqlitePool    │◄──│ RentalRepo     │   │ 001_initial   │   │   │
//! │  │   │ WAL + busy    │   │ ReturnRepo     │   │ 002_challan   │   │   │
//! │  │   │ timeout       │   │ UnitRepo ...   │   │               │   │   │
//! │  │   └───────────────┘   └───────┬────────┘   └───────────────┘   │   │
//! │  │                               │                                 │   │
//! │  │                      ┌────────▼────────┐                        │   │
//! │  │                      │  sequence.rs    │ per-year challan       │   │
//! │  │                      │  next_challan() │ counters               │   │
//! │  │                      └─────────────────┘                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`sequence`] - Challan sequence allocation
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use printhire_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("printhire.db")).await?;
//!
//! let rental = db.rentals().create(&new_rental).await?;
//! println!("{}", rental.challan_no); // ZC/003/25-26
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sequence;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::customer::CustomerRepository;
pub use repository::printer_model::PrinterModelRepository;
pub use repository::printer_unit::PrinterUnitRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::rental::RentalRepository;
pub use repository::rental_return::RentalReturnRepository;
pub use repository::store::StoreRepository;
pub use repository::vendor::VendorRepository;
