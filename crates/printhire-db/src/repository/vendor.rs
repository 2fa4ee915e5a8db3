//! # Vendor Repository
//!
//! The vendor's name supplies the initials of every purchase challan.

use printhire_core::types::page_offset;
use printhire_core::validation::validate_page_no;
use printhire_core::{NewVendor, Page, Vendor, PAGE_SIZE};
use sqlx::SqlitePool;
use tracing::debug;

use super::unique_as;
use crate::error::{DbError, DbResult};

/// Repository for vendor database operations.
#[derive(Debug, Clone)]
pub struct VendorRepository {
    pool: SqlitePool,
}

impl VendorRepository {
    /// Creates a new VendorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VendorRepository { pool }
    }

    pub async fn create(&self, input: &NewVendor) -> DbResult<Vendor> {
        let input = input.validated()?;
        debug!(name = %input.name, "Creating vendor");

        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (name, address, mobile)
            VALUES (?1, ?2, ?3)
            RETURNING id, name, address, mobile
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.mobile)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_as("name", &input.name))?;

        Ok(vendor)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(
            "SELECT id, name, address, mobile FROM vendors WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vendor)
    }

    /// Updates a vendor. Existing purchase challans keep the old initials.
    pub async fn update(&self, id: i64, input: &NewVendor) -> DbResult<Vendor> {
        let input = input.validated()?;
        debug!(id, name = %input.name, "Updating vendor");

        sqlx::query_as::<_, Vendor>(
            r#"
            UPDATE vendors SET name = ?2, address = ?3, mobile = ?4
            WHERE id = ?1
            RETURNING id, name, address, mobile
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.mobile)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_as("name", &input.name))?
        .ok_or_else(|| DbError::not_found("Vendor", id))
    }

    /// Deletes a vendor with no purchases.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting vendor");

        let result = sqlx::query("DELETE FROM vendors WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vendor", id));
        }

        Ok(())
    }

    pub async fn list(&self, page_no: i64) -> DbResult<Page<Vendor>> {
        validate_page_no(page_no)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vendors")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Vendor>(
            "SELECT id, name, address, mobile FROM vendors ORDER BY id LIMIT ?1 OFFSET ?2",
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page_no))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, page_no, total })
    }

    pub async fn list_all(&self) -> DbResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(
            "SELECT id, name, address, mobile FROM vendors ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(vendors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{date, setup};
    use crate::{Database, DbConfig};
    use printhire_core::{NewPurchase, NewPurchaseItem};

    #[tokio::test]
    async fn test_vendor_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.vendors();

        let input = NewVendor {
            name: "Bharat Traders".to_string(),
            address: "Old Market".to_string(),
            mobile: "98200 11223".to_string(),
        };
        let vendor = repo.create(&input).await.unwrap();
        assert_eq!(repo.get_by_id(vendor.id).await.unwrap(), Some(vendor.clone()));

        let err = repo.create(&input).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let updated = repo
            .update(
                vendor.id,
                &NewVendor {
                    mobile: "98200 99999".to_string(),
                    ..input.clone()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.mobile, "98200 99999");

        assert_eq!(repo.list_all().await.unwrap().len(), 1);
        repo.delete(vendor.id).await.unwrap();
        assert_eq!(repo.list(1).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_invalid_mobile_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .vendors()
            .create(&NewVendor {
                name: "Bad Number".to_string(),
                address: "Somewhere".to_string(),
                mobile: "call reception".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
    }

    #[tokio::test]
    async fn test_vendor_with_purchase_cannot_be_deleted() {
        let fx = setup().await;
        fx.db
            .purchases()
            .create(&NewPurchase {
                vendor_id: fx.vendor,
                store_id: fx.main_store,
                date: date(2025, 4, 2),
                items: vec![NewPurchaseItem {
                    printer_model_id: fx.laserjet,
                    quantity: 1,
                }],
            })
            .await
            .unwrap();

        let err = fx.db.vendors().delete(fx.vendor).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(fx.db.vendors().get_by_id(fx.vendor).await.unwrap().is_some());
    }
}
