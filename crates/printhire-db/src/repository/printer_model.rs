//! # Printer Model Repository

use printhire_core::types::page_offset;
use printhire_core::validation::{validate_page_no, validate_required, MAX_MODEL_NAME_LEN};
use printhire_core::{Page, PrinterModel, PAGE_SIZE};
use sqlx::SqlitePool;
use tracing::debug;

use super::unique_as;
use crate::error::{DbError, DbResult};

/// Repository for printer model database operations.
#[derive(Debug, Clone)]
pub struct PrinterModelRepository {
    pool: SqlitePool,
}

impl PrinterModelRepository {
    /// Creates a new PrinterModelRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PrinterModelRepository { pool }
    }

    /// Creates a model; names are unique.
    pub async fn create(&self, name: &str) -> DbResult<PrinterModel> {
        let name = validate_required("name", name, MAX_MODEL_NAME_LEN)?;
        debug!(name = %name, "Creating printer model");

        let model = sqlx::query_as::<_, PrinterModel>(
            "INSERT INTO printer_models (name) VALUES (?1) RETURNING id, name",
        )
        .bind(&name)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_as("name", &name))?;

        Ok(model)
    }

    /// Gets a model by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<PrinterModel>> {
        let model = sqlx::query_as::<_, PrinterModel>("SELECT id, name FROM printer_models WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(model)
    }

    /// Renames a model.
    pub async fn update(&self, id: i64, name: &str) -> DbResult<PrinterModel> {
        let name = validate_required("name", name, MAX_MODEL_NAME_LEN)?;
        debug!(id, name = %name, "Renaming printer model");

        sqlx::query_as::<_, PrinterModel>(
            "UPDATE printer_models SET name = ?2 WHERE id = ?1 RETURNING id, name",
        )
        .bind(id)
        .bind(&name)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_as("name", &name))?
        .ok_or_else(|| DbError::not_found("PrinterModel", id))
    }

    /// Deletes a model. Fails while any unit or purchase line uses it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting printer model");

        let result = sqlx::query("DELETE FROM printer_models WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PrinterModel", id));
        }

        Ok(())
    }

    /// One page of models in insertion order.
    pub async fn list(&self, page_no: i64) -> DbResult<Page<PrinterModel>> {
        validate_page_no(page_no)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM printer_models")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, PrinterModel>(
            "SELECT id, name FROM printer_models ORDER BY id LIMIT ?1 OFFSET ?2",
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page_no))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, page_no, total })
    }

    /// Every model, by name. Feeds pickers.
    pub async fn list_all(&self) -> DbResult<Vec<PrinterModel>> {
        let models = sqlx::query_as::<_, PrinterModel>("SELECT id, name FROM printer_models ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(models)
    }
}
