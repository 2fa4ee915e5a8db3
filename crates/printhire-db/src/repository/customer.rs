//! # Customer Repository
//!
//! Customers and their installation addresses.
//!
//! ```text
//! Customer "Zenith Corp"            (name → rental/return challan initials)
//!   ├── CustomerAddress "Plot 4"    ◄── RENTED units point here
//!   └── CustomerAddress "Annexe"
//! ```
//!
//! Deleting a customer removes its addresses, which SQLite refuses while any
//! rental, return or rented unit still references one of them.

use printhire_core::types::page_offset;
use printhire_core::validation::{validate_page_no, validate_required, MAX_NAME_LEN};
use printhire_core::{Customer, CustomerAddress, NewCustomerAddress, Page, PAGE_SIZE};
use sqlx::SqlitePool;
use tracing::debug;

use super::unique_as;
use crate::error::{DbError, DbResult};

/// Repository for customers and customer addresses.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub async fn create(&self, name: &str) -> DbResult<Customer> {
        let name = validate_required("name", name, MAX_NAME_LEN)?;
        debug!(name = %name, "Creating customer");

        let customer = sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (name) VALUES (?1) RETURNING id, name",
        )
        .bind(&name)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_as("name", &name))?;

        Ok(customer)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT id, name FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Renames a customer. Existing challans keep the old initials.
    pub async fn update(&self, id: i64, name: &str) -> DbResult<Customer> {
        let name = validate_required("name", name, MAX_NAME_LEN)?;
        debug!(id, name = %name, "Renaming customer");

        sqlx::query_as::<_, Customer>("UPDATE customers SET name = ?2 WHERE id = ?1 RETURNING id, name")
            .bind(id)
            .bind(&name)
            .fetch_optional(&self.pool)
            .await
            .map_err(unique_as("name", &name))?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer together with its unused addresses.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    pub async fn list(&self, page_no: i64) -> DbResult<Page<Customer>> {
        validate_page_no(page_no)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Customer>(
            "SELECT id, name FROM customers ORDER BY id LIMIT ?1 OFFSET ?2",
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page_no))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, page_no, total })
    }

    pub async fn list_all(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>("SELECT id, name FROM customers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Adds an address; one customer cannot list the same address twice.
    pub async fn add_address(&self, input: &NewCustomerAddress) -> DbResult<CustomerAddress> {
        let input = input.validated()?;
        debug!(customer_id = input.customer_id, "Adding customer address");

        let address = sqlx::query_as::<_, CustomerAddress>(
            r#"
            INSERT INTO customer_addresses (customer_id, address, mobile)
            VALUES (?1, ?2, ?3)
            RETURNING id, customer_id, address, mobile
            "#,
        )
        .bind(input.customer_id)
        .bind(&input.address)
        .bind(&input.mobile)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_as("address", &input.address))?;

        Ok(address)
    }

    pub async fn get_address(&self, id: i64) -> DbResult<Option<CustomerAddress>> {
        let address = sqlx::query_as::<_, CustomerAddress>(
            "SELECT id, customer_id, address, mobile FROM customer_addresses WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    /// Changes an address in place; units rented there follow it.
    pub async fn update_address(&self, id: i64, input: &NewCustomerAddress) -> DbResult<CustomerAddress> {
        let input = input.validated()?;
        debug!(id, "Updating customer address");

        sqlx::query_as::<_, CustomerAddress>(
            r#"
            UPDATE customer_addresses SET customer_id = ?2, address = ?3, mobile = ?4
            WHERE id = ?1
            RETURNING id, customer_id, address, mobile
            "#,
        )
        .bind(id)
        .bind(input.customer_id)
        .bind(&input.address)
        .bind(&input.mobile)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_as("address", &input.address))?
        .ok_or_else(|| DbError::not_found("CustomerAddress", id))
    }

    /// Deletes an address nothing refers to.
    pub async fn delete_address(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting customer address");

        let result = sqlx::query("DELETE FROM customer_addresses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomerAddress", id));
        }

        Ok(())
    }

    /// Addresses of one customer, by address.
    pub async fn addresses(&self, customer_id: i64) -> DbResult<Vec<CustomerAddress>> {
        let addresses = sqlx::query_as::<_, CustomerAddress>(
            r#"
            SELECT id, customer_id, address, mobile
            FROM customer_addresses
            WHERE customer_id = ?1
            ORDER BY address
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{date, setup};
    use crate::{Database, DbConfig};
    use printhire_core::NewRental;

    fn address(customer_id: i64, address: &str) -> NewCustomerAddress {
        NewCustomerAddress {
            customer_id,
            address: address.to_string(),
            mobile: None,
        }
    }

    #[tokio::test]
    async fn test_addresses_belong_to_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let zenith = repo.create("Zenith Corp").await.unwrap();
        let other = repo.create("Other Ltd").await.unwrap();

        repo.add_address(&address(zenith.id, "Plot 4")).await.unwrap();
        repo.add_address(&address(zenith.id, "Annexe")).await.unwrap();
        repo.add_address(&address(other.id, "Plot 4")).await.unwrap();

        let err = repo.add_address(&address(zenith.id, "Plot 4")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let listed: Vec<String> = repo
            .addresses(zenith.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.address)
            .collect();
        assert_eq!(listed, vec!["Annexe", "Plot 4"]);
    }

    #[tokio::test]
    async fn test_address_requires_existing_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.customers().add_address(&address(42, "Nowhere")).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_deleting_customer_cascades_to_addresses() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let customer = repo.create("Short Lived").await.unwrap();
        let addr = repo.add_address(&address(customer.id, "Kiosk 2")).await.unwrap();

        repo.delete(customer.id).await.unwrap();
        assert!(repo.get_address(addr.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_customer_with_rented_unit_cannot_be_deleted() {
        let fx = setup().await;
        let unit = fx.db.printer_units().create(fx.laserjet, fx.main_store, None).await.unwrap();
        fx.db
            .rentals()
            .create(&NewRental {
                challan_date: date(2025, 7, 1),
                order_no: None,
                order_date: date(2025, 7, 1),
                store_id: fx.main_store,
                customer_address_id: fx.zenith_plot,
                printer_unit_ids: vec![unit.id],
            })
            .await
            .unwrap();

        let repo = fx.db.customers();
        let customer_id = repo.get_address(fx.zenith_plot).await.unwrap().unwrap().customer_id;

        let err = repo.delete(customer_id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(repo.get_by_id(customer_id).await.unwrap().is_some());
        assert!(repo.get_address(fx.zenith_plot).await.unwrap().is_some());
        assert!(repo.get_address(fx.zenith_annexe).await.unwrap().is_some());

        let err = repo.delete_address(fx.zenith_plot).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(repo.get_address(fx.zenith_plot).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_address_keeps_blank_mobile_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let customer = repo.create("Mobile Test").await.unwrap();
        let addr = repo.add_address(&address(customer.id, "Desk 1")).await.unwrap();

        let updated = repo
            .update_address(
                addr.id,
                &NewCustomerAddress {
                    customer_id: customer.id,
                    address: "Desk 2".to_string(),
                    mobile: Some("  ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.address, "Desk 2");
        assert_eq!(updated.mobile, None);
    }
}
