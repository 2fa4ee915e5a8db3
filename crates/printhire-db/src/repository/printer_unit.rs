//! # Printer Unit Repository
//!
//! Listing and serial numbers for physical printers, the rows behind the
//! stock reports, and the guarded writes every unit transition goes through.
//!
//! ## Transition Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fetch_unit(id)                    row as stored                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  unit.rent_to(addr)                decided by printhire-core           │
//! │  unit.return_to(addr, store, scr)  (UnitNotAvailable / UnitNotRented)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE printer_units                                                  │
//! │     SET status, store_id, customer_address_id   ← all from UnitLocation│
//! │   WHERE id = ? AND status, address = <as read>                         │
//! │       │                                                                 │
//! │       └── 0 rows → transition error for the status it has now,         │
//! │                    caller's transaction rolls back                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use printhire_core::report::{self, InStoreGroup, OnRentGroup, StatusCount, UnitReportRow};
use printhire_core::types::page_offset;
use printhire_core::validation::{validate_page_no, validate_serial_number};
use printhire_core::{
    Page, PrinterUnit, PrinterUnitView, UnitFilter, UnitLocation, UnitStatus, PAGE_SIZE,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use super::unique_as;
use crate::error::{DbError, DbResult};

const UNIT_COLUMNS: &str = r#"
    SELECT id, serial_number, printer_model_id, status,
           purchase_item_id, store_id, customer_address_id
    FROM printer_units
"#;

const UNIT_VIEW: &str = r#"
    SELECT u.id,
           u.serial_number,
           u.printer_model_id,
           m.name     AS printer_model_name,
           u.status,
           s.name     AS store_name,
           s.address  AS store_address,
           c.name     AS customer_name,
           ca.address AS customer_address
    FROM printer_units u
    JOIN printer_models m ON m.id = u.printer_model_id
    LEFT JOIN stores s ON s.id = u.store_id
    LEFT JOIN customer_addresses ca ON ca.id = u.customer_address_id
    LEFT JOIN customers c ON c.id = ca.customer_id
"#;

const UNIT_FILTER: &str = r#"
    WHERE (?1 IS NULL OR u.status = ?1)
      AND (?2 IS NULL OR instr(lower(u.serial_number), lower(?2)) > 0)
"#;

/// Repository for printer unit database operations.
#[derive(Debug, Clone)]
pub struct PrinterUnitRepository {
    pool: SqlitePool,
}

impl PrinterUnitRepository {
    /// Creates a new PrinterUnitRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PrinterUnitRepository { pool }
    }

    /// Adds a unit by hand, outside any purchase. It starts INSTORE.
    pub async fn create(
        &self,
        printer_model_id: i64,
        store_id: i64,
        serial_number: Option<&str>,
    ) -> DbResult<PrinterUnit> {
        let serial_number = serial_number.map(validate_serial_number).transpose()?;
        let location = UnitLocation::InStore { store_id };
        debug!(printer_model_id, store_id, "Creating printer unit");

        let unit = sqlx::query_as::<_, PrinterUnit>(
            r#"
            INSERT INTO printer_units
                (serial_number, printer_model_id, status, store_id, customer_address_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, serial_number, printer_model_id, status,
                      purchase_item_id, store_id, customer_address_id
            "#,
        )
        .bind(&serial_number)
        .bind(printer_model_id)
        .bind(location.status())
        .bind(location.store_id())
        .bind(location.customer_address_id())
        .fetch_one(&self.pool)
        .await
        .map_err(unique_as("serial_number", serial_number.as_deref().unwrap_or_default()))?;

        Ok(unit)
    }

    /// Sets or replaces a unit's serial number. Serials are unique.
    pub async fn assign_serial(&self, unit_id: i64, serial: &str) -> DbResult<PrinterUnit> {
        let serial = validate_serial_number(serial)?;
        debug!(unit_id, serial = %serial, "Assigning serial number");

        sqlx::query_as::<_, PrinterUnit>(
            r#"
            UPDATE printer_units SET serial_number = ?2
            WHERE id = ?1
            RETURNING id, serial_number, printer_model_id, status,
                      purchase_item_id, store_id, customer_address_id
            "#,
        )
        .bind(unit_id)
        .bind(&serial)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_as("serial_number", &serial))?
        .ok_or_else(|| DbError::not_found("PrinterUnit", unit_id))
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<PrinterUnit>> {
        let unit = sqlx::query_as::<_, PrinterUnit>(&format!("{} WHERE id = ?1", UNIT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(unit)
    }

    /// A unit with its model name and current location.
    pub async fn get_view(&self, id: i64) -> DbResult<Option<PrinterUnitView>> {
        let unit = sqlx::query_as::<_, PrinterUnitView>(&format!("{} WHERE u.id = ?1", UNIT_VIEW))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(unit)
    }

    /// One page of units, optionally filtered by status and serial substring.
    pub async fn list(&self, filter: &UnitFilter, page_no: i64) -> DbResult<Page<PrinterUnitView>> {
        validate_page_no(page_no)?;

        let serial = filter
            .serial_contains
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM printer_units u {}",
            UNIT_FILTER
        ))
        .bind(filter.status)
        .bind(serial)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, PrinterUnitView>(&format!(
            "{} {} ORDER BY u.id LIMIT ?3 OFFSET ?4",
            UNIT_VIEW, UNIT_FILTER
        ))
        .bind(filter.status)
        .bind(serial)
        .bind(PAGE_SIZE)
        .bind(page_offset(page_no))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, page_no, total })
    }

    /// INSTORE units at a store, i.e. what a rental from it can pick.
    pub async fn available_in_store(&self, store_id: i64) -> DbResult<Vec<PrinterUnitView>> {
        let units = sqlx::query_as::<_, PrinterUnitView>(&format!(
            "{} WHERE u.status = 'INSTORE' AND u.store_id = ?1 ORDER BY m.name, u.id",
            UNIT_VIEW
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(units)
    }

    /// RENTED units at a customer address, i.e. what a return can pick.
    pub async fn rented_at(&self, customer_address_id: i64) -> DbResult<Vec<PrinterUnitView>> {
        let units = sqlx::query_as::<_, PrinterUnitView>(&format!(
            "{} WHERE u.status = 'RENTED' AND u.customer_address_id = ?1 ORDER BY m.name, u.id",
            UNIT_VIEW
        ))
        .bind(customer_address_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(units)
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Every unit with model and location names, for the stock reports.
    pub async fn status_rows(&self) -> DbResult<Vec<UnitReportRow>> {
        let rows = sqlx::query_as::<_, UnitReportRow>(
            r#"
            SELECT m.name     AS printer_model,
                   u.status,
                   s.name     AS store_name,
                   s.address  AS store_address,
                   c.name     AS customer_name,
                   ca.address AS customer_address
            FROM printer_units u
            JOIN printer_models m ON m.id = u.printer_model_id
            LEFT JOIN stores s ON s.id = u.store_id
            LEFT JOIN customer_addresses ca ON ca.id = u.customer_address_id
            LEFT JOIN customers c ON c.id = ca.customer_id
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn status_summary(&self) -> DbResult<Vec<StatusCount>> {
        Ok(report::status_summary(&self.status_rows().await?))
    }

    pub async fn in_store_summary(&self) -> DbResult<Vec<InStoreGroup>> {
        Ok(report::in_store_summary(&self.status_rows().await?))
    }

    pub async fn on_rent_summary(&self) -> DbResult<Vec<OnRentGroup>> {
        Ok(report::on_rent_summary(&self.status_rows().await?))
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Loads a unit on the caller's connection.
pub(crate) async fn fetch_unit(conn: &mut SqliteConnection, unit_id: i64) -> DbResult<PrinterUnit> {
    sqlx::query_as::<_, PrinterUnit>(&format!("{} WHERE id = ?1", UNIT_COLUMNS))
        .bind(unit_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("PrinterUnit", unit_id))
}

/// Creates `quantity` INSTORE units for a purchase line.
pub(crate) async fn insert_batch(
    conn: &mut SqliteConnection,
    printer_model_id: i64,
    store_id: i64,
    purchase_item_id: i64,
    quantity: i64,
) -> DbResult<()> {
    let location = UnitLocation::InStore { store_id };

    for _ in 0..quantity {
        sqlx::query(
            r#"
            INSERT INTO printer_units
                (printer_model_id, status, purchase_item_id, store_id, customer_address_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(printer_model_id)
        .bind(location.status())
        .bind(purchase_item_id)
        .bind(location.store_id())
        .bind(location.customer_address_id())
        .execute(&mut *conn)
        .await?;
    }

    debug!(purchase_item_id, printer_model_id, store_id, quantity, "Created printer units");
    Ok(())
}

/// Moves an INSTORE unit to a customer address.
pub(crate) async fn rent_unit(
    conn: &mut SqliteConnection,
    unit_id: i64,
    customer_address_id: i64,
) -> DbResult<()> {
    let unit = fetch_unit(conn, unit_id).await?;
    let to = unit.rent_to(customer_address_id).map_err(|err| {
        warn!(unit_id, error = %err, "Rejected rental of printer unit");
        err
    })?;
    relocate(conn, &unit, to).await
}

/// Brings a unit rented to `customer_address_id` back to `store_id`, or
/// scraps it.
pub(crate) async fn return_unit(
    conn: &mut SqliteConnection,
    unit_id: i64,
    customer_address_id: i64,
    store_id: i64,
    scrapped: bool,
) -> DbResult<()> {
    let unit = fetch_unit(conn, unit_id).await?;
    let to = unit.return_to(customer_address_id, store_id, scrapped).map_err(|err| {
        warn!(unit_id, error = %err, "Rejected return of printer unit");
        err
    })?;
    relocate(conn, &unit, to).await
}

async fn relocate(conn: &mut SqliteConnection, unit: &PrinterUnit, to: UnitLocation) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE printer_units
        SET status = ?2, store_id = ?3, customer_address_id = ?4
        WHERE id = ?1 AND status = ?5 AND customer_address_id IS ?6
        "#,
    )
    .bind(unit.id)
    .bind(to.status())
    .bind(to.store_id())
    .bind(to.customer_address_id())
    .bind(unit.status)
    .bind(unit.customer_address_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // Moved since it was read: report what it is now.
        let current: Option<UnitStatus> =
            sqlx::query_scalar("SELECT status FROM printer_units WHERE id = ?1")
                .bind(unit.id)
                .fetch_optional(&mut *conn)
                .await?;

        let current = current.ok_or_else(|| DbError::not_found("PrinterUnit", unit.id))?;
        warn!(unit_id = unit.id, read_as = %unit.status, now = %current, "Printer unit moved concurrently");
        return Err(to.rejection(unit.id, current).into());
    }

    debug!(unit_id = unit.id, from = %unit.status, to = %to.status(), "Moved printer unit");
    Ok(())
}

/// Status of a unit as currently stored; test helper shared by the
/// document repositories.
#[cfg(test)]
pub(crate) async fn status_of(pool: &SqlitePool, unit_id: i64) -> UnitStatus {
    sqlx::query_scalar::<_, UnitStatus>("SELECT status FROM printer_units WHERE id = ?1")
        .bind(unit_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

// =============================================================================
// Unit Tests
// =============================================================================
