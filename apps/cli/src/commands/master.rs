//! Models, stores, vendors and customers.

use clap::{Args, Subcommand};

use printhire_core::{NewCustomerAddress, NewStore, NewVendor};
use printhire_db::Database;

use super::Output;

#[derive(Args, Debug)]
pub struct PageArg {
    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: i64,
}

// =============================================================================
// Printer Models
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum ModelAction {
    Add { name: String },
    Rename { id: i64, name: String },
    Delete { id: i64 },
    List(PageArg),
}

pub async fn model(db: &Database, out: &Output, action: ModelAction) -> anyhow::Result<()> {
    let repo = db.printer_models();
    match action {
        ModelAction::Add { name } => {
            let model = repo.create(&name).await?;
            out.emit(&model, |m| println!("✓ model #{} {}", m.id, m.name))
        }
        ModelAction::Rename { id, name } => {
            let model = repo.update(id, &name).await?;
            out.emit(&model, |m| println!("✓ model #{} renamed to {}", m.id, m.name))
        }
        ModelAction::Delete { id } => {
            repo.delete(id).await?;
            println!("✓ model #{} deleted", id);
            Ok(())
        }
        ModelAction::List(PageArg { page }) => {
            let page = repo.list(page).await?;
            out.page(&page, |n, m| println!("{:>4}. #{:<5} {}", n, m.id, m.name))
        }
    }
}

// =============================================================================
// Stores
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum StoreAction {
    Add { name: String, address: String },
    Update { id: i64, name: String, address: String },
    Delete { id: i64 },
    List(PageArg),
}

pub async fn store(db: &Database, out: &Output, action: StoreAction) -> anyhow::Result<()> {
    let repo = db.stores();
    match action {
        StoreAction::Add { name, address } => {
            let store = repo.create(&NewStore { name, address }).await?;
            out.emit(&store, |s| println!("✓ store #{} {}", s.id, s.name))
        }
        StoreAction::Update { id, name, address } => {
            let store = repo.update(id, &NewStore { name, address }).await?;
            out.emit(&store, |s| println!("✓ store #{} updated", s.id))
        }
        StoreAction::Delete { id } => {
            repo.delete(id).await?;
            println!("✓ store #{} deleted", id);
            Ok(())
        }
        StoreAction::List(PageArg { page }) => {
            let page = repo.list(page).await?;
            out.page(&page, |n, s| {
                println!("{:>4}. #{:<5} {:<24} {}", n, s.id, s.name, s.address)
            })
        }
    }
}

// =============================================================================
// Vendors
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum VendorAction {
    Add {
        name: String,
        address: String,
        mobile: String,
    },
    Update {
        id: i64,
        name: String,
        address: String,
        mobile: String,
    },
    Delete {
        id: i64,
    },
    List(PageArg),
}

pub async fn vendor(db: &Database, out: &Output, action: VendorAction) -> anyhow::Result<()> {
    let repo = db.vendors();
    match action {
        VendorAction::Add { name, address, mobile } => {
            let vendor = repo.create(&NewVendor { name, address, mobile }).await?;
            out.emit(&vendor, |v| println!("✓ vendor #{} {}", v.id, v.name))
        }
        VendorAction::Update { id, name, address, mobile } => {
            let vendor = repo.update(id, &NewVendor { name, address, mobile }).await?;
            out.emit(&vendor, |v| println!("✓ vendor #{} updated", v.id))
        }
        VendorAction::Delete { id } => {
            repo.delete(id).await?;
            println!("✓ vendor #{} deleted", id);
            Ok(())
        }
        VendorAction::List(PageArg { page }) => {
            let page = repo.list(page).await?;
            out.page(&page, |n, v| {
                println!("{:>4}. #{:<5} {:<24} {:<16} {}", n, v.id, v.name, v.mobile, v.address)
            })
        }
    }
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum CustomerAction {
    Add {
        name: String,
    },
    Rename {
        id: i64,
        name: String,
    },
    Delete {
        id: i64,
    },
    List(PageArg),
    /// Add an installation address to a customer.
    AddAddress {
        customer: i64,
        address: String,
        #[arg(long)]
        mobile: Option<String>,
    },
    /// Remove an address. Fails while units are rented there.
    DeleteAddress {
        id: i64,
    },
    /// List a customer's addresses.
    Addresses {
        customer: i64,
    },
}

pub async fn customer(db: &Database, out: &Output, action: CustomerAction) -> anyhow::Result<()> {
    let repo = db.customers();
    match action {
        CustomerAction::Add { name } => {
            let customer = repo.create(&name).await?;
            out.emit(&customer, |c| println!("✓ customer #{} {}", c.id, c.name))
        }
        CustomerAction::Rename { id, name } => {
            let customer = repo.update(id, &name).await?;
            out.emit(&customer, |c| println!("✓ customer #{} renamed to {}", c.id, c.name))
        }
        CustomerAction::Delete { id } => {
            repo.delete(id).await?;
            println!("✓ customer #{} deleted", id);
            Ok(())
        }
        CustomerAction::List(PageArg { page }) => {
            let page = repo.list(page).await?;
            out.page(&page, |n, c| println!("{:>4}. #{:<5} {}", n, c.id, c.name))
        }
        CustomerAction::AddAddress { customer, address, mobile } => {
            let address = repo
                .add_address(&NewCustomerAddress {
                    customer_id: customer,
                    address,
                    mobile,
                })
                .await?;
            out.emit(&address, |a| println!("✓ address #{} {}", a.id, a.address))
        }
        CustomerAction::DeleteAddress { id } => {
            repo.delete_address(id).await?;
            println!("✓ address #{} deleted", id);
            Ok(())
        }
        CustomerAction::Addresses { customer } => {
            let addresses = repo.addresses(customer).await?;
            out.emit(&addresses, |rows| {
                for a in rows {
                    println!(
                        "#{:<5} {:<32} {}",
                        a.id,
                        a.address,
                        a.mobile.as_deref().unwrap_or("—")
                    );
                }
            })
        }
    }
}
