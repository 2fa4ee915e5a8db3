//! # Rental Return Repository
//!
//! Database operations for rental returns.
//!
//! ```text
//! create(NewRentalReturn { challan_date, address, store, units })
//!
//! BEGIN
//!  ├── next_challan(rental_return, challan_date.year)
//!  ├── customer of address                → "ZC/001/25-26"
//!  ├── INSERT rental_returns
//!  └── for each (unit, scrapped)
//!       ├── RENTED ──► INSTORE @ store     (scrapped = false)
//!       │   RENTED ──► SCRAPPED            (scrapped = true)
//!       │   rented to another address      → UnitNotAtAddress, rollback
//!       │   anything else                  → UnitNotRented, rollback
//!       └── INSERT rental_return_units
//! COMMIT
//! ```

use chrono::Datelike;
use printhire_core::report::{group_challan_lines, ChallanGroup, ChallanLine};
use printhire_core::types::page_offset;
use printhire_core::validation::validate_page_no;
use printhire_core::{
    Challan, ChallanSummary, DocumentKind, NewRentalReturn, Page, RentalReturn, RentalReturnUnit,
    PAGE_SIZE,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::printer_unit::return_unit;
use super::rental::customer_name_of;
use crate::error::{DbError, DbResult};
use crate::sequence::next_challan;

const RETURN_COLUMNS: &str = r#"
    SELECT id, challan_no, challan_date, order_no, order_date, customer_address_id, store_id
    FROM rental_returns
"#;

/// Repository for rental return database operations.
#[derive(Debug, Clone)]
pub struct RentalReturnRepository {
    pool: SqlitePool,
}

impl RentalReturnRepository {
    /// Creates a new RentalReturnRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RentalReturnRepository { pool }
    }

    /// Records a return; each unit goes back to the return's store or is scrapped.
    pub async fn create(&self, input: &NewRentalReturn) -> DbResult<RentalReturn> {
        let input = input.validated()?;
        let year = input.challan_date.year();

        let mut tx = self.pool.begin().await?;

        let seq = next_challan(&mut tx, DocumentKind::RentalReturn, year).await?;

        let customer_name = customer_name_of(&mut tx, input.customer_address_id).await?;
        let challan_no = Challan::for_year(&customer_name, seq, year).to_string();
        debug!(
            challan_no = %challan_no,
            store_id = input.store_id,
            units = input.units.len(),
            "Creating rental return"
        );

        let rental_return = sqlx::query_as::<_, RentalReturn>(
            r#"
            INSERT INTO rental_returns
                (challan_no, challan_date, order_no, order_date, customer_address_id, store_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, challan_no, challan_date, order_no, order_date, customer_address_id, store_id
            "#,
        )
        .bind(&challan_no)
        .bind(input.challan_date)
        .bind(&input.order_no)
        .bind(input.order_date)
        .bind(input.customer_address_id)
        .bind(input.store_id)
        .fetch_one(&mut *tx)
        .await?;

        for line in &input.units {
            return_unit(
                &mut tx,
                line.printer_unit_id,
                rental_return.customer_address_id,
                rental_return.store_id,
                line.scrapped,
            )
            .await?;
            link_unit(&mut tx, rental_return.id, line.printer_unit_id, line.scrapped).await?;
        }

        tx.commit().await?;

        Ok(rental_return)
    }

    /// Adds one more unit to an existing return.
    pub async fn add_unit(
        &self,
        rental_return_id: i64,
        printer_unit_id: i64,
        scrapped: bool,
    ) -> DbResult<RentalReturnUnit> {
        let mut tx = self.pool.begin().await?;

        // Link first so the write lock is held before the unit is read.
        let link = link_unit(&mut tx, rental_return_id, printer_unit_id, scrapped).await?;

        let (customer_address_id, store_id): (i64, i64) = sqlx::query_as(
            "SELECT customer_address_id, store_id FROM rental_returns WHERE id = ?1",
        )
        .bind(rental_return_id)
        .fetch_one(&mut *tx)
        .await?;

        return_unit(&mut tx, printer_unit_id, customer_address_id, store_id, scrapped).await?;

        tx.commit().await?;

        Ok(link)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<RentalReturn>> {
        let rental_return = sqlx::query_as::<_, RentalReturn>(&format!("{} WHERE id = ?1", RETURN_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental_return)
    }

    pub async fn get_by_challan(&self, challan_no: &str) -> DbResult<Option<RentalReturn>> {
        let rental_return =
            sqlx::query_as::<_, RentalReturn>(&format!("{} WHERE challan_no = ?1", RETURN_COLUMNS))
                .bind(challan_no)
                .fetch_optional(&self.pool)
                .await?;

        Ok(rental_return)
    }

    pub async fn units(&self, rental_return_id: i64) -> DbResult<Vec<RentalReturnUnit>> {
        let units = sqlx::query_as::<_, RentalReturnUnit>(
            r#"
            SELECT id, rental_return_id, printer_unit_id, scrapped
            FROM rental_return_units
            WHERE rental_return_id = ?1
            ORDER BY id
            "#,
        )
        .bind(rental_return_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(units)
    }

    /// Units of a return grouped by model, with their scrapped flags.
    pub async fn grouped_units(&self, rental_return_id: i64) -> DbResult<Vec<ChallanGroup>> {
        let lines = sqlx::query_as::<_, ChallanLine>(
            r#"
            SELECT m.name AS printer_model,
                   u.id   AS printer_unit_id,
                   u.serial_number,
                   rru.scrapped
            FROM rental_return_units rru
            JOIN printer_units u ON u.id = rru.printer_unit_id
            JOIN printer_models m ON m.id = u.printer_model_id
            WHERE rru.rental_return_id = ?1
            ORDER BY rru.id
            "#,
        )
        .bind(rental_return_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_challan_lines(lines))
    }

    /// One page of returns, newest challan date first.
    pub async fn list(&self, page_no: i64) -> DbResult<Page<ChallanSummary>> {
        validate_page_no(page_no)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rental_returns")
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
            FROM rental_returns r
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

    /// Deletes a return record. Its units stay where they are.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting rental return");

        let result = sqlx::query("DELETE FROM rental_returns WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RentalReturn", id));
        }

        Ok(())
    }
}

async fn link_unit(
    conn: &mut SqliteConnection,
    rental_return_id: i64,
    printer_unit_id: i64,
    scrapped: bool,
) -> DbResult<RentalReturnUnit> {
    sqlx::query_as::<_, RentalReturnUnit>(
        r#"
        INSERT INTO rental_return_units (rental_return_id, printer_unit_id, scrapped)
        SELECT id, ?2, ?3 FROM rental_returns WHERE id = ?1
        RETURNING id, rental_return_id, printer_unit_id, scrapped
        "#,
    )
    .bind(rental_return_id)
    .bind(printer_unit_id)
    .bind(scrapped)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|err| match DbError::from(err) {
        DbError::ForeignKeyViolation { .. } => DbError::not_found("PrinterUnit", printer_unit_id),
        other => other,
    })?
    .ok_or_else(|| DbError::not_found("RentalReturn", rental_return_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{date, setup, Fixture};
    use crate::repository::printer_unit::status_of;
    use printhire_core::{CoreError, NewRental, ReturnLine, UnitLocation, UnitStatus};

    /// Rents `n` fresh LaserJets to the Zenith plot address.
    async fn rented(fx: &Fixture, n: usize) -> Vec<i64> {
        let mut ids = Vec::new();
        for _ in 0..n {
            let unit = fx
                .db
                .printer_units()
                .create(fx.laserjet, fx.main_store, None)
                .await
                .unwrap();
            ids.push(unit.id);
        }
        fx.db
            .rentals()
            .create(&NewRental {
                challan_date: date(2025, 5, 1),
                order_no: None,
                order_date: date(2025, 5, 1),
                store_id: fx.main_store,
                customer_address_id: fx.zenith_plot,
                printer_unit_ids: ids.clone(),
            })
            .await
            .unwrap();
        ids
    }

    fn ret(fx: &Fixture, units: &[(i64, bool)]) -> NewRentalReturn {
        NewRentalReturn {
            challan_date: date(2025, 11, 20),
            order_no: None,
            order_date: None,
            customer_address_id: fx.zenith_plot,
            store_id: fx.branch_store,
            units: units
                .iter()
                .map(|&(printer_unit_id, scrapped)| ReturnLine {
                    printer_unit_id,
                    scrapped,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_return_to_store_and_scrap() {
        let fx = setup().await;
        let units = rented(&fx, 2).await;
        let repo = fx.db.rental_returns();

        let created = repo
            .create(&ret(&fx, &[(units[0], false), (units[1], true)]))
            .await
            .unwrap();
        assert_eq!(created.challan_no, "ZC/001/25-26");
        assert_eq!(created.order_date, None);

        let back = fx.db.printer_units().get_by_id(units[0]).await.unwrap().unwrap();
        assert_eq!(back.location().unwrap(), UnitLocation::InStore { store_id: fx.branch_store });

        let scrapped = fx.db.printer_units().get_by_id(units[1]).await.unwrap().unwrap();
        assert_eq!(scrapped.location().unwrap(), UnitLocation::Scrapped);
        assert_eq!((scrapped.store_id, scrapped.customer_address_id), (None, None));

        let links = repo.units(created.id).await.unwrap();
        assert_eq!(links.iter().map(|l| l.scrapped).collect::<Vec<_>>(), vec![false, true]);

        let groups = repo.grouped_units(created.id).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].quantity(), 2);
        assert_eq!(groups[0].scrapped, vec![false, true]);
    }

    #[tokio::test]
    async fn test_return_sequence_is_separate_from_rentals() {
        let fx = setup().await;
        let units = rented(&fx, 2).await;
        let repo = fx.db.rental_returns();

        let a = repo.create(&ret(&fx, &[(units[0], false)])).await.unwrap();
        let b = repo.create(&ret(&fx, &[(units[1], false)])).await.unwrap();

        // The rental in `rented` took ZC/001 in the rental sequence.
        assert_eq!(a.challan_no, "ZC/001/25-26");
        assert_eq!(b.challan_no, "ZC/002/25-26");
        assert_eq!(repo.get_by_challan("ZC/002/25-26").await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn test_unit_must_be_rented() {
        let fx = setup().await;
        let units = rented(&fx, 1).await;
        let in_store = fx
            .db
            .printer_units()
            .create(fx.deskjet, fx.main_store, None)
            .await
            .unwrap();
        let repo = fx.db.rental_returns();

        let err = repo
            .create(&ret(&fx, &[(units[0], false), (in_store.id, false)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::UnitNotRented { status: UnitStatus::InStore, .. })
        ));

        // Rolled back: the first unit is still out on rent.
        assert_eq!(status_of(fx.db.pool(), units[0]).await, UnitStatus::Rented);
        assert_eq!(repo.list(1).await.unwrap().total, 0);

        // A scrapped unit can never come back.
        repo.create(&ret(&fx, &[(units[0], true)])).await.unwrap();
        let err = repo.create(&ret(&fx, &[(units[0], false)])).await.unwrap_err();
        assert!(err.is_transition_error());
        assert_eq!(status_of(fx.db.pool(), units[0]).await, UnitStatus::Scrapped);
    }

    #[tokio::test]
    async fn test_unit_must_come_back_from_its_address() {
        let fx = setup().await;
        let units = rented(&fx, 1).await;
        let repo = fx.db.rental_returns();

        let err = repo
            .create(&NewRentalReturn {
                customer_address_id: fx.zenith_annexe,
                ..ret(&fx, &[(units[0], false)])
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::UnitNotAtAddress { rented_to, returned_from, .. })
                if rented_to == fx.zenith_plot && returned_from == fx.zenith_annexe
        ));
        assert!(err.is_transition_error());
        assert_eq!(status_of(fx.db.pool(), units[0]).await, UnitStatus::Rented);
        assert_eq!(repo.list(1).await.unwrap().total, 0);

        // Same through add_unit on a return booked against the other address.
        let other = rented(&fx, 1).await;
        let created = repo
            .create(&NewRentalReturn {
                customer_address_id: fx.zenith_annexe,
                ..ret(&fx, &[])
            })
            .await
            .unwrap();
        let err = repo.add_unit(created.id, other[0], false).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::UnitNotAtAddress { .. })));
        assert_eq!(status_of(fx.db.pool(), other[0]).await, UnitStatus::Rented);
        assert!(repo.units(created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_unit() {
        let fx = setup().await;
        let units = rented(&fx, 2).await;
        let repo = fx.db.rental_returns();

        let created = repo.create(&ret(&fx, &[(units[0], false)])).await.unwrap();
        let link = repo.add_unit(created.id, units[1], true).await.unwrap();
        assert!(link.scrapped);
        assert_eq!(status_of(fx.db.pool(), units[1]).await, UnitStatus::Scrapped);

        let err = repo.add_unit(created.id, units[0], false).await.unwrap_err();
        assert!(err.is_transition_error());
        assert_eq!(repo.units(created.id).await.unwrap().len(), 2);

        assert!(matches!(
            repo.add_unit(999, units[0], false).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let fx = setup().await;
        let units = rented(&fx, 1).await;
        let repo = fx.db.rental_returns();

        let created = repo
            .create(&NewRentalReturn {
                order_no: Some("RET-1".to_string()),
                order_date: Some(date(2025, 11, 19)),
                ..ret(&fx, &[(units[0], false)])
            })
            .await
            .unwrap();

        let page = repo.list(1).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].challan_no, created.challan_no);
        assert_eq!(page.items[0].order_no.as_deref(), Some("RET-1"));
        assert_eq!(page.items[0].store_name, "Branch");

        repo.delete(created.id).await.unwrap();
        assert!(repo.units(created.id).await.unwrap().is_empty());
        // The unit stays where the return put it.
        assert_eq!(status_of(fx.db.pool(), units[0]).await, UnitStatus::InStore);
        assert!(matches!(repo.delete(created.id).await, Err(DbError::NotFound { .. })));
    }
}
