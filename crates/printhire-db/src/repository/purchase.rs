//! # Purchase Repository
//!
//! Database operations for purchases and purchase items.
//!
//! ## Purchase Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(NewPurchase { vendor, store, date, items })                     │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   ├── next_challan(purchase, date.year)        → 7                     │
//! │   ├── vendor name "Acme Print Supplies"        → "APS/007/25-26"       │
//! │   ├── INSERT purchases                                                 │
//! │   └── for each item                                                    │
//! │        ├── INSERT purchase_items (model, qty)                          │
//! │        └── INSERT printer_units × qty          INSTORE @ store         │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any failure (unknown vendor, model, store) rolls back everything,     │
//! │  including the sequence bump.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Datelike;
use printhire_core::types::page_offset;
use printhire_core::validation::{validate_page_no, validate_quantity};
use printhire_core::{
    Challan, DocumentKind, NewPurchase, Page, PrinterUnit, Purchase, PurchaseItem, PurchaseSummary,
    PAGE_SIZE,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::printer_unit::insert_batch;
use crate::error::{DbError, DbResult};
use crate::sequence::next_challan;

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Records a purchase, its lines and one INSTORE unit per purchased printer.
    ///
    /// ## Returns
    /// The stored header with its generated challan number.
    pub async fn create(&self, input: &NewPurchase) -> DbResult<Purchase> {
        input.validate()?;
        let year = input.date.year();

        let mut tx = self.pool.begin().await?;

        let seq = next_challan(&mut tx, DocumentKind::Purchase, year).await?;

        let vendor_name: String = sqlx::query_scalar("SELECT name FROM vendors WHERE id = ?1")
            .bind(input.vendor_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Vendor", input.vendor_id))?;

        let challan_no = Challan::for_year(&vendor_name, seq, year).to_string();
        debug!(challan_no = %challan_no, vendor_id = input.vendor_id, "Creating purchase");

        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (challan_no, vendor_id, store_id, date)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, challan_no, vendor_id, store_id, date
            "#,
        )
        .bind(&challan_no)
        .bind(input.vendor_id)
        .bind(input.store_id)
        .bind(input.date)
        .fetch_one(&mut *tx)
        .await?;

        for item in &input.items {
            let line = insert_item(&mut tx, purchase.id, item.printer_model_id, item.quantity).await?;
            insert_batch(&mut tx, line.printer_model_id, purchase.store_id, line.id, line.quantity).await?;
        }

        tx.commit().await?;

        Ok(purchase)
    }

    /// Adds a model line to an existing purchase, creating its units at the
    /// purchase's store.
    pub async fn add_item(
        &self,
        purchase_id: i64,
        printer_model_id: i64,
        quantity: i64,
    ) -> DbResult<PurchaseItem> {
        validate_quantity(quantity)?;

        let mut tx = self.pool.begin().await?;

        // The line is the first write, so the transaction holds the write
        // lock before it reads the purchase.
        let line = insert_item(&mut tx, purchase_id, printer_model_id, quantity).await?;

        let store_id: i64 = sqlx::query_scalar("SELECT store_id FROM purchases WHERE id = ?1")
            .bind(purchase_id)
            .fetch_one(&mut *tx)
            .await?;

        insert_batch(&mut tx, printer_model_id, store_id, line.id, quantity).await?;

        tx.commit().await?;

        Ok(line)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(
            "SELECT id, challan_no, vendor_id, store_id, date FROM purchases WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    pub async fn get_by_challan(&self, challan_no: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(
            "SELECT id, challan_no, vendor_id, store_id, date FROM purchases WHERE challan_no = ?1",
        )
        .bind(challan_no)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Lines of a purchase in entry order.
    pub async fn items(&self, purchase_id: i64) -> DbResult<Vec<PurchaseItem>> {
        let items = sqlx::query_as::<_, PurchaseItem>(
            r#"
            SELECT id, purchase_id, printer_model_id, quantity
            FROM purchase_items
            WHERE purchase_id = ?1
            ORDER BY id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Units that came in on a purchase, wherever they are now.
    pub async fn units(&self, purchase_id: i64) -> DbResult<Vec<PrinterUnit>> {
        let units = sqlx::query_as::<_, PrinterUnit>(
            r#"
            SELECT u.id, u.serial_number, u.printer_model_id, u.status,
                   u.purchase_item_id, u.store_id, u.customer_address_id
            FROM printer_units u
            JOIN purchase_items pi ON pi.id = u.purchase_item_id
            WHERE pi.purchase_id = ?1
            ORDER BY u.id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(units)
    }

    /// One page of purchases, newest date first.
    pub async fn list(&self, page_no: i64) -> DbResult<Page<PurchaseSummary>> {
        validate_page_no(page_no)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, PurchaseSummary>(
            r#"
            SELECT p.id,
                   p.challan_no,
                   p.date,
                   v.name      AS vendor_name,
                   s.name      AS store_name,
                   COUNT(u.id) AS printer_count
            FROM purchases p
            JOIN vendors v ON v.id = p.vendor_id
            JOIN stores s ON s.id = p.store_id
            LEFT JOIN purchase_items pi ON pi.purchase_id = p.id
            LEFT JOIN printer_units u ON u.purchase_item_id = pi.id
            GROUP BY p.id
            ORDER BY p.date DESC, p.id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page_no))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, page_no, total })
    }

    /// Deletes a purchase and its lines. Its units stay, unlinked.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting purchase");

        let result = sqlx::query("DELETE FROM purchases WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", id));
        }

        Ok(())
    }
}

/// Inserts one purchase line; no row is written when the purchase is missing.
async fn insert_item(
    conn: &mut SqliteConnection,
    purchase_id: i64,
    printer_model_id: i64,
    quantity: i64,
) -> DbResult<PurchaseItem> {
    let model_id = printer_model_id.to_string();

    let line = sqlx::query_as::<_, PurchaseItem>(
        r#"
        INSERT INTO purchase_items (purchase_id, printer_model_id, quantity)
        SELECT id, ?2, ?3 FROM purchases WHERE id = ?1
        RETURNING id, purchase_id, printer_model_id, quantity
        "#,
    )
    .bind(purchase_id)
    .bind(printer_model_id)
    .bind(quantity)
    .fetch_optional(&mut *conn)
    .await
    .map_err(super::unique_as("printer_model_id", &model_id))?
    .ok_or_else(|| DbError::not_found("Purchase", purchase_id))?;

    debug!(purchase_id, printer_model_id, quantity, "Added purchase item");
    Ok(line)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{date, setup};
    use printhire_core::{NewPurchaseItem, UnitLocation, UnitStatus};

    fn purchase(fx: &crate::repository::fixtures::Fixture, on: chrono::NaiveDate, items: &[(i64, i64)]) -> NewPurchase {
        NewPurchase {
            vendor_id: fx.vendor,
            store_id: fx.main_store,
            date: on,
            items: items
                .iter()
                .map(|&(printer_model_id, quantity)| NewPurchaseItem {
                    printer_model_id,
                    quantity,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_generates_challan_and_units() {
        let fx = setup().await;
        let repo = fx.db.purchases();

        let created = repo
            .create(&purchase(&fx, date(2025, 4, 1), &[(fx.laserjet, 3), (fx.deskjet, 2)]))
            .await
            .unwrap();
        assert_eq!(created.challan_no, "APS/001/25-26");

        let items = repo.items(created.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 3);

        let units = repo.units(created.id).await.unwrap();
        assert_eq!(units.len(), 5);
        for unit in &units {
            assert_eq!(unit.status, UnitStatus::InStore);
            assert_eq!(unit.location().unwrap(), UnitLocation::InStore { store_id: fx.main_store });
            assert!(unit.serial_number.is_none());
        }
        assert_eq!(
            units.iter().filter(|u| u.purchase_item_id == Some(items[0].id)).count(),
            3
        );
    }

    #[tokio::test]
    async fn test_challan_sequence_per_year() {
        let fx = setup().await;
        let repo = fx.db.purchases();

        let a = repo.create(&purchase(&fx, date(2025, 1, 5), &[(fx.laserjet, 1)])).await.unwrap();
        let b = repo.create(&purchase(&fx, date(2025, 12, 31), &[(fx.laserjet, 1)])).await.unwrap();
        let c = repo.create(&purchase(&fx, date(2026, 1, 1), &[(fx.laserjet, 1)])).await.unwrap();

        assert_eq!(a.challan_no, "APS/001/25-26");
        assert_eq!(b.challan_no, "APS/002/25-26");
        assert_eq!(c.challan_no, "APS/001/26-27");
        assert_eq!(repo.get_by_challan("APS/002/25-26").await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn test_date_outside_challan_century_rejected() {
        let fx = setup().await;
        let repo = fx.db.purchases();

        repo.create(&purchase(&fx, date(2025, 4, 1), &[(fx.laserjet, 1)])).await.unwrap();

        // Would otherwise also print as APS/001/25-26.
        let err = repo
            .create(&purchase(&fx, date(2125, 4, 1), &[(fx.laserjet, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(printhire_core::CoreError::Validation(
                printhire_core::ValidationError::OutOfRange { .. }
            ))
        ));

        assert!(repo.create(&purchase(&fx, date(1999, 12, 31), &[(fx.laserjet, 1)])).await.is_err());
        assert_eq!(repo.list(1).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_nothing_behind() {
        let fx = setup().await;
        let repo = fx.db.purchases();

        let err = repo
            .create(&purchase(&fx, date(2025, 4, 1), &[(fx.laserjet, 2), (9999, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        assert_eq!(repo.list(1).await.unwrap().total, 0);
        let units: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM printer_units")
            .fetch_one(fx.db.pool())
            .await
            .unwrap();
        assert_eq!(units, 0);

        // The sequence bump was rolled back too.
        let ok = repo.create(&purchase(&fx, date(2025, 4, 2), &[(fx.laserjet, 1)])).await.unwrap();
        assert_eq!(ok.challan_no, "APS/001/25-26");
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_writing() {
        let fx = setup().await;
        let repo = fx.db.purchases();

        let err = repo
            .create(&purchase(&fx, date(2025, 4, 1), &[(fx.laserjet, 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(_)));

        let err = repo
            .create(&purchase(&fx, date(2025, 4, 1), &[(fx.laserjet, 1), (fx.laserjet, 2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(_)));

        let err = repo
            .create(&NewPurchase {
                vendor_id: 777,
                ..purchase(&fx, date(2025, 4, 1), &[(fx.laserjet, 1)])
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_item_creates_units_at_purchase_store() {
        let fx = setup().await;
        let repo = fx.db.purchases();

        let created = repo
            .create(&NewPurchase {
                store_id: fx.branch_store,
                ..purchase(&fx, date(2025, 4, 1), &[(fx.laserjet, 1)])
            })
            .await
            .unwrap();

        let line = repo.add_item(created.id, fx.deskjet, 4).await.unwrap();
        assert_eq!(line.quantity, 4);

        let units = repo.units(created.id).await.unwrap();
        assert_eq!(units.len(), 5);
        assert!(units.iter().all(|u| u.store_id == Some(fx.branch_store)));

        let err = repo.add_item(created.id, fx.deskjet, 1).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let err = repo.add_item(4242, fx.deskjet, 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        assert!(repo.add_item(created.id, fx.laserjet, 1000).await.is_err());
        assert_eq!(repo.units(created.id).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_counts() {
        let fx = setup().await;
        let repo = fx.db.purchases();

        repo.create(&purchase(&fx, date(2025, 3, 1), &[(fx.laserjet, 2)])).await.unwrap();
        repo.create(&purchase(&fx, date(2025, 5, 1), &[(fx.laserjet, 1), (fx.deskjet, 6)])).await.unwrap();

        let page = repo.list(1).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].date, date(2025, 5, 1));
        assert_eq!(page.items[0].printer_count, 7);
        assert_eq!(page.items[0].vendor_name, "Acme Print Supplies");
        assert_eq!(page.items[1].printer_count, 2);
        assert_eq!(page.items[1].store_name, "Main Store");
    }

    #[tokio::test]
    async fn test_deleted_purchase_keeps_units_and_number() {
        let fx = setup().await;
        let repo = fx.db.purchases();

        let first = repo.create(&purchase(&fx, date(2025, 4, 1), &[(fx.laserjet, 2)])).await.unwrap();
        let unit_ids: Vec<i64> = repo.units(first.id).await.unwrap().iter().map(|u| u.id).collect();

        repo.delete(first.id).await.unwrap();
        assert!(repo.items(first.id).await.unwrap().is_empty());

        for id in unit_ids {
            let unit = fx.db.printer_units().get_by_id(id).await.unwrap().unwrap();
            assert_eq!(unit.purchase_item_id, None);
            assert_eq!(unit.status, UnitStatus::InStore);
        }

        let next = repo.create(&purchase(&fx, date(2025, 4, 2), &[(fx.laserjet, 1)])).await.unwrap();
        assert_eq!(next.challan_no, "APS/002/25-26");
    }

    #[tokio::test]
    async fn test_challan_cannot_be_rewritten() {
        let fx = setup().await;
        let created = fx
            .db
            .purchases()
            .create(&purchase(&fx, date(2025, 4, 1), &[(fx.laserjet, 1)]))
            .await
            .unwrap();

        let err = sqlx::query("UPDATE purchases SET challan_no = 'X/001/25-26' WHERE id = ?1")
            .bind(created.id)
            .execute(fx.db.pool())
            .await
            .map_err(DbError::from)
            .unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(ref msg) if msg.contains("immutable")));
    }
}
