//! # Store Repository
//!
//! Stores hold INSTORE units. A store cannot be deleted while any unit sits
//! in it or any document names it.

use printhire_core::types::page_offset;
use printhire_core::validation::validate_page_no;
use printhire_core::{NewStore, Page, Store, PAGE_SIZE};
use sqlx::SqlitePool;
use tracing::debug;

use super::unique_as;
use crate::error::{DbError, DbResult};

/// Repository for store database operations.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    /// Creates a new StoreRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    pub async fn create(&self, input: &NewStore) -> DbResult<Store> {
        let input = input.validated()?;
        debug!(name = %input.name, "Creating store");

        let store = sqlx::query_as::<_, Store>(
            "INSERT INTO stores (name, address) VALUES (?1, ?2) RETURNING id, name, address",
        )
        .bind(&input.name)
        .bind(&input.address)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_as("name", &input.name))?;

        Ok(store)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>("SELECT id, name, address FROM stores WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(store)
    }

    pub async fn update(&self, id: i64, input: &NewStore) -> DbResult<Store> {
        let input = input.validated()?;
        debug!(id, name = %input.name, "Updating store");

        sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores SET name = ?2, address = ?3
            WHERE id = ?1
            RETURNING id, name, address
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_as("name", &input.name))?
        .ok_or_else(|| DbError::not_found("Store", id))
    }

    /// Deletes an empty store.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting store");

        let result = sqlx::query("DELETE FROM stores WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", id));
        }

        Ok(())
    }

    pub async fn list(&self, page_no: i64) -> DbResult<Page<Store>> {
        validate_page_no(page_no)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Store>(
            "SELECT id, name, address FROM stores ORDER BY id LIMIT ?1 OFFSET ?2",
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page_no))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, page_no, total })
    }

    pub async fn list_all(&self) -> DbResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>("SELECT id, name, address FROM stores ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(stores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::setup;
    use crate::{Database, DbConfig};

    fn store(name: &str) -> NewStore {
        NewStore {
            name: name.to_string(),
            address: format!("{} address", name),
        }
    }

    #[tokio::test]
    async fn test_store_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stores();

        let created = repo.create(&store("North")).await.unwrap();
        assert_eq!(created.address, "North address");

        let updated = repo
            .update(
                created.id,
                &NewStore {
                    name: "North".to_string(),
                    address: "New premises".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.address, "New premises");

        let page = repo.list(1).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items, vec![updated]);

        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.stores().create(&store("   ")).await.unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
    }

    #[tokio::test]
    async fn test_list_all_by_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stores();

        repo.create(&store("West")).await.unwrap();
        repo.create(&store("East")).await.unwrap();

        let names: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["East", "West"]);
    }

    #[tokio::test]
    async fn test_store_holding_units_cannot_be_deleted() {
        let fx = setup().await;
        fx.db.printer_units().create(fx.laserjet, fx.branch_store, None).await.unwrap();

        let err = fx.db.stores().delete(fx.branch_store).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(fx.db.stores().get_by_id(fx.branch_store).await.unwrap().is_some());
    }
}
