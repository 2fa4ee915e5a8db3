//! # Rental Repository
//!
//! Database operations for rentals and rental units.
//!
//! ## Rental Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(NewRental { challan_date, store, address, units })              │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   ├── next_challan(rental, challan_date.year)  → 3                     │
//! │   ├── customer of address "Zenith Corp"        → "ZC/003/25-26"        │
//! │   ├── INSERT rentals                                                   │
//! │   └── for each unit                                                    │
//! │        ├── INSTORE ──► RENTED @ address   (else UnitNotAvailable)      │
//! │        └── INSERT rental_units                                         │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  One unit that is not in store aborts the whole rental.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Datelike;
use printhire_core::report::{group_challan_lines, ChallanGroup, ChallanLine};
use printhire_core::types::page_offset;
use printhire_core::validation::validate_page_no;
use printhire_core::{Challan, ChallanSummary, DocumentKind, NewRental, Page, Rental, RentalUnit, PAGE_SIZE};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::printer_unit::rent_unit;
use crate::error::{DbError, DbResult};
use crate::sequence::next_challan;

const RENTAL_COLUMNS: &str = r#"
    SELECT id, challan_no, challan_date, order_no, order_date, store_id, customer_address_id
    FROM rentals
"#;

/// Repository for rental database operations.
#[derive(Debug, Clone)]
pub struct RentalRepository {
    pool: SqlitePool,
}

impl RentalRepository {
    /// Creates a new RentalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RentalRepository { pool }
    }

    /// Records a rental and moves every listed unit out to the customer.
    pub async fn create(&self, input: &NewRental) -> DbResult<Rental> {
        let input = input.validated()?;
        let year = input.challan_date.year();

        let mut tx = self.pool.begin().await?;

        let seq = next_challan(&mut tx, DocumentKind::Rental, year).await?;

        let customer_name = customer_name_of(&mut tx, input.customer_address_id).await?;
        let challan_no = Challan::for_year(&customer_name, seq, year).to_string();
        debug!(
            challan_no = %challan_no,
            customer_address_id = input.customer_address_id,
            units = input.printer_unit_ids.len(),
            "Creating rental"
        );

        let rental = sqlx::query_as::<_, Rental>(
            r#"
            INSERT INTO rentals
                (challan_no, challan_date, order_no, order_date, store_id, customer_address_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, challan_no, challan_date, order_no, order_date, store_id, customer_address_id
            "#,
        )
        .bind(&challan_no)
        .bind(input.challan_date)
        .bind(&input.order_no)
        .bind(input.order_date)
        .bind(input.store_id)
        .bind(input.customer_address_id)
        .fetch_one(&mut *tx)
        .await?;

        for &unit_id in &input.printer_unit_ids {
            rent_unit(&mut tx, unit_id, rental.customer_address_id).await?;
            link_unit(&mut tx, rental.id, unit_id).await?;
        }

        tx.commit().await?;

        Ok(rental)
    }

    /// Puts one more unit on an existing rental.
    pub async fn add_unit(&self, rental_id: i64, printer_unit_id: i64) -> DbResult<RentalUnit> {
        let mut tx = self.pool.begin().await?;

        // Link first: the transaction takes the write lock before reading.
        let link = link_unit(&mut tx, rental_id, printer_unit_id).await?;

        let customer_address_id: i64 =
            sqlx::query_scalar("SELECT customer_address_id FROM rentals WHERE id = ?1")
                .bind(rental_id)
                .fetch_one(&mut *tx)
                .await?;

        rent_unit(&mut tx, printer_unit_id, customer_address_id).await?;

        tx.commit().await?;

        Ok(link)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(&format!("{} WHERE id = ?1", RENTAL_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental)
    }

    pub async fn get_by_challan(&self, challan_no: &str) -> DbResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(&format!("{} WHERE challan_no = ?1", RENTAL_COLUMNS))
            .bind(challan_no)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental)
    }

    /// Unit links of a rental in entry order.
    pub async fn units(&self, rental_id: i64) -> DbResult<Vec<RentalUnit>> {
        let units = sqlx::query_as::<_, RentalUnit>(
            "SELECT id, rental_id, printer_unit_id FROM rental_units WHERE rental_id = ?1 ORDER BY id",
        )
        .bind(rental_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(units)
    }

    /// Units of a rental grouped by model, as printed on the challan.
    pub async fn grouped_units(&self, rental_id: i64) -> DbResult<Vec<ChallanGroup>> {
        let lines = sqlx::query_as::<_, ChallanLine>(
            r#"
            SELECT m.name AS printer_model,
                   u.id   AS printer_unit_id,
                   u.serial_number,
                   0      AS scrapped
            FROM rental_units ru
            JOIN printer_units u ON u.id = ru.printer_unit_id
            JOIN printer_models m ON m.id = u.printer_model_id
            WHERE ru.rental_id = ?1
            ORDER BY ru.id
            "#,
        )
        .bind(rental_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_challan_lines(lines))
    }

    /// One page of rentals, newest challan date first.
    pub async fn list(&self, page_no: i64) -> DbResult<Page<ChallanSummary>> {
        validate_page_no(page_no)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, ChallanSummary>(
            r#"
            SELECT r.id,
                   r.challan_no,
                   r.challan_date,
                   r.order_no,
                   s.name     AS store_name,
                   c.name     AS customer_name,
                   ca.address AS customer_address
            FROM rentals r
            JOIN stores s ON s.id = r.store_id
            JOIN customer_addresses ca ON ca.id = r.customer_address_id
            JOIN customers c ON c.id = ca.customer_id
            ORDER BY r.challan_date DESC, r.id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page_no))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, page_no, total })
    }

    /// Deletes a rental record. Its units stay where they are.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting rental");

        let result = sqlx::query("DELETE FROM rentals WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Rental", id));
        }

        Ok(())
    }
}

/// Name of the customer owning an address; supplies the challan initials.
pub(crate) async fn customer_name_of(
    conn: &mut SqliteConnection,
    customer_address_id: i64,
) -> DbResult<String> {
    sqlx::query_scalar(
        r#"
        SELECT c.name
        FROM customer_addresses ca
        JOIN customers c ON c.id = ca.customer_id
        WHERE ca.id = ?1
        "#,
    )
    .bind(customer_address_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("CustomerAddress", customer_address_id))
}

/// Inserts the rental/unit link; no row is written when the rental is missing.
async fn link_unit(conn: &mut SqliteConnection, rental_id: i64, printer_unit_id: i64) -> DbResult<RentalUnit> {
    sqlx::query_as::<_, RentalUnit>(
        r#"
        INSERT INTO rental_units (rental_id, printer_unit_id)
        SELECT id, ?2 FROM rentals WHERE id = ?1
        RETURNING id, rental_id, printer_unit_id
        "#,
    )
    .bind(rental_id)
    .bind(printer_unit_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|err| match DbError::from(err) {
        DbError::ForeignKeyViolation { .. } => DbError::not_found("PrinterUnit", printer_unit_id),
        other => other,
    })?
    .ok_or_else(|| DbError::not_found("Rental", rental_id))
}

// =============================================================================
// Unit Tests
// =============================================================================
