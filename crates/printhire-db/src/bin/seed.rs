//! # Seed Data Generator
//!
//! Populates a database with demo stock for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./printhire_dev.db with 3 purchases per store
//! cargo run -p printhire-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p printhire-db --bin seed -- --purchases 10 --db ./data/printhire.db
//! ```
//!
//! ## Generated Data
//! - Printer models, stores, vendors, customers with addresses
//! - Purchases spread over the vendors, each with a few model lines
//! - One rental per customer address taking units from the first store
//! - One return bringing part of the first rental back, one unit scrapped

use chrono::{Duration, NaiveDate};
use clap::Parser;

use printhire_core::{
    NewCustomerAddress, NewPurchase, NewPurchaseItem, NewRental, NewRentalReturn, NewStore,
    NewVendor, ReturnLine,
};
use printhire_db::{Database, DbConfig};

const MODELS: &[&str] = &[
    "HP LaserJet M1005",
    "HP LaserJet Pro M126nw",
    "Canon imageCLASS MF244dw",
    "Brother HL-L2321D",
    "Epson EcoTank L3250",
];

const STORES: &[(&str, &str)] = &[
    ("Main Store", "12 Mill Road, Andheri East"),
    ("Branch", "4 Station Lane, Thane West"),
];

const VENDORS: &[(&str, &str, &str)] = &[
    ("Acme Print Supplies", "Plot 7, MIDC", "+91 98200 11111"),
    ("Bharat Office Traders", "Lamington Road", "+91 98200 22222"),
];

const CUSTOMERS: &[(&str, &[&str])] = &[
    ("Zenith Corp", &["Plot 4, Sector 9", "Annexe Block"]),
    ("Sunrise Public School", &["Main Campus"]),
    ("Kamath and Sons Logistics", &["Warehouse 2", "Head Office"]),
];

/// Printhire seed data generator.
#[derive(Parser, Debug)]
#[command(name = "seed", version, about = "Populate a database with demo stock")]
struct Args {
    /// Purchases per store.
    #[arg(short, long, default_value_t = 3)]
    purchases: usize,

    /// Database file path.
    #[arg(short, long, default_value = "./printhire_dev.db")]
    db: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Args {
        purchases: purchases_per_store,
        db: db_path,
    } = Args::parse();

    println!("🌱 Printhire Seed Data Generator");
    println!("================================");
    println!("Database:  {}", db_path);
    println!("Purchases: {} per store", purchases_per_store);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.printer_models().list(1).await?.total;
    if existing > 0 {
        println!("⚠ Database already has {} printer models", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Master data
    let mut models = Vec::new();
    for name in MODELS {
        models.push(db.printer_models().create(name).await?.id);
    }

    let mut stores = Vec::new();
    for (name, address) in STORES {
        let store = db
            .stores()
            .create(&NewStore {
                name: name.to_string(),
                address: address.to_string(),
            })
            .await?;
        stores.push(store.id);
    }

    let mut vendors = Vec::new();
    for (name, address, mobile) in VENDORS {
        let vendor = db
            .vendors()
            .create(&NewVendor {
                name: name.to_string(),
                address: address.to_string(),
                mobile: mobile.to_string(),
            })
            .await?;
        vendors.push(vendor.id);
    }

    let mut addresses = Vec::new();
    for (name, sites) in CUSTOMERS {
        let customer = db.customers().create(name).await?;
        for site in sites.iter() {
            let address = db
                .customers()
                .add_address(&NewCustomerAddress {
                    customer_id: customer.id,
                    address: site.to_string(),
                    mobile: None,
                })
                .await?;
            addresses.push(address.id);
        }
    }
    println!(
        "✓ Created {} models, {} stores, {} vendors, {} customer addresses",
        models.len(),
        stores.len(),
        vendors.len(),
        addresses.len()
    );

    // Purchases
    let start = NaiveDate::from_ymd_opt(2025, 4, 1).ok_or("invalid start date")?;
    let mut purchased = 0;
    for (store_idx, store_id) in stores.iter().enumerate() {
        for n in 0..purchases_per_store {
            let seed = store_idx * purchases_per_store + n;
            let items = (0..2)
                .map(|k| NewPurchaseItem {
                    printer_model_id: models[(seed + k * 2) % models.len()],
                    quantity: 2 + ((seed * 3 + k) % 4) as i64,
                })
                .collect();
            let purchase = db
                .purchases()
                .create(&NewPurchase {
                    vendor_id: vendors[seed % vendors.len()],
                    store_id: *store_id,
                    date: start + Duration::days(seed as i64 * 9),
                    items,
                })
                .await?;
            purchased += 1;
            println!("  ✓ purchase {}", purchase.challan_no);
        }
    }

    println!("✓ Recorded {} purchases", purchased);

    // Serial numbers for everything in the first store
    let in_store = db.printer_units().available_in_store(stores[0]).await?;
    for unit in &in_store {
        db.printer_units()
            .assign_serial(unit.id, &format!("SN-{:05}", unit.id))
            .await?;
    }

    // Rentals: two units from the first store to each address while stock lasts
    let mut available = in_store.iter().map(|u| u.id);
    let rent_date = start + Duration::days(60);
    let mut first_rental_units = Vec::new();
    for address_id in &addresses {
        let units: Vec<i64> = available.by_ref().take(2).collect();
        if units.is_empty() {
            break;
        }
        if first_rental_units.is_empty() {
            first_rental_units = units.clone();
        }
        let rental = db
            .rentals()
            .create(&NewRental {
                challan_date: rent_date,
                order_no: Some(format!("PO-{}", address_id)),
                order_date: rent_date - Duration::days(2),
                store_id: stores[0],
                customer_address_id: *address_id,
                printer_unit_ids: units,
            })
            .await?;
        println!("  ✓ rental {}", rental.challan_no);
    }

    // Return: first rental comes back, its second unit scrapped
    if let (Some(&address_id), false) = (addresses.first(), first_rental_units.is_empty()) {
        let units = first_rental_units
            .iter()
            .enumerate()
            .map(|(idx, &printer_unit_id)| ReturnLine {
                printer_unit_id,
                scrapped: idx == 1,
            })
            .collect();
        let rental_return = db
            .rental_returns()
            .create(&NewRentalReturn {
                challan_date: rent_date + Duration::days(30),
                order_no: None,
                order_date: None,
                customer_address_id: address_id,
                store_id: stores[stores.len() - 1],
                units,
            })
            .await?;
        println!("  ✓ return {}", rental_return.challan_no);
    }

    println!();
    println!("Stock by status:");
    for row in db.printer_units().status_summary().await? {
        println!(
            "  {:<28} in-store {:>3}  rented {:>3}  scrapped {:>3}",
            row.printer_model, row.in_store, row.rented, row.scrapped
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_defaults_and_flags() {
        Args::command().debug_assert();

        let args = Args::try_parse_from(["seed"]).unwrap();
        assert_eq!(args.purchases, 3);
        assert_eq!(args.db, "./printhire_dev.db");

        let args = Args::try_parse_from(["seed", "-p", "10", "--db", "/tmp/demo.db"]).unwrap();
        assert_eq!(args.purchases, 10);
        assert_eq!(args.db, "/tmp/demo.db");

        assert!(Args::try_parse_from(["seed", "--purchases", "many"]).is_err());
    }
}
