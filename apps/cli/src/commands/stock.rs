//! Purchases, rentals, returns and the units they move.

use std::collections::HashMap;

use anyhow::bail;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;

use printhire_core::report::ChallanGroup;
use printhire_core::{
    NewPurchase, NewPurchaseItem, NewRental, NewRentalReturn, Purchase,
    PurchaseItem, Rental, RentalReturn, ReturnLine, UnitFilter, UnitStatus,
};
use printhire_db::Database;

use super::master::PageArg;
use super::Output;

// =============================================================================
// Argument Parsers
// =============================================================================

/// `MODEL_ID:QTY`, e.g. `3:5`.
pub fn parse_item(value: &str) -> Result<NewPurchaseItem, String> {
    let (model, qty) = value
        .split_once(':')
        .ok_or_else(|| format!("expected MODEL_ID:QTY, got '{}'", value))?;

    let printer_model_id = model
        .trim()
        .parse()
        .map_err(|_| format!("invalid model id '{}'", model))?;
    let quantity = qty
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity '{}'", qty))?;

    Ok(NewPurchaseItem { printer_model_id, quantity })
}

/// `UNIT_ID` or `UNIT_ID:scrap`.
pub fn parse_return_line(value: &str) -> Result<ReturnLine, String> {
    let (unit, scrapped) = match value.split_once(':') {
        Some((unit, flag)) if flag.eq_ignore_ascii_case("scrap") => (unit, true),
        Some((_, flag)) => return Err(format!("unknown unit flag '{}', expected 'scrap'", flag)),
        None => (value, false),
    };

    let printer_unit_id = unit
        .trim()
        .parse()
        .map_err(|_| format!("invalid unit id '{}'", unit))?;

    Ok(ReturnLine { printer_unit_id, scrapped })
}

// =============================================================================
// Purchases
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum PurchaseAction {
    /// Record a purchase; one unit is created per quantity.
    Record {
        #[arg(long)]
        vendor: i64,
        #[arg(long)]
        store: i64,
        #[arg(long)]
        date: NaiveDate,
        /// MODEL_ID:QTY, repeatable.
        #[arg(long = "item", value_parser = parse_item, required = true)]
        items: Vec<NewPurchaseItem>,
    },
    /// Add a model line to an existing purchase.
    AddItem {
        purchase: i64,
        #[arg(value_parser = parse_item)]
        item: NewPurchaseItem,
    },
    /// Show a purchase by id or challan number.
    Show { purchase: String },
    List(PageArg),
    /// Delete a purchase. Its units stay in stock.
    Delete { id: i64 },
}

#[derive(Serialize)]
struct PurchaseDetail {
    purchase: Purchase,
    items: Vec<PurchaseItem>,
    unit_ids: Vec<i64>,
}

pub async fn purchase(db: &Database, out: &Output, action: PurchaseAction) -> anyhow::Result<()> {
    let repo = db.purchases();
    match action {
        PurchaseAction::Record { vendor, store, date, items } => {
            let purchase = repo
                .create(&NewPurchase {
                    vendor_id: vendor,
                    store_id: store,
                    date,
                    items,
                })
                .await?;
            let units = repo.units(purchase.id).await?;
            out.emit(&purchase, |p| {
                println!("✓ purchase {} recorded, {} units in stock", p.challan_no, units.len())
            })
        }
        PurchaseAction::AddItem { purchase, item } => {
            let item = repo
                .add_item(purchase, item.printer_model_id, item.quantity)
                .await?;
            out.emit(&item, |i| {
                println!("✓ line #{} added, {} units in stock", i.id, i.quantity)
            })
        }
        PurchaseAction::Show { purchase } => {
            let found = match purchase.parse::<i64>() {
                Ok(id) => repo.get_by_id(id).await?,
                Err(_) => repo.get_by_challan(&purchase).await?,
            };
            let Some(purchase) = found else {
                bail!("purchase '{}' not found", purchase);
            };

            let detail = PurchaseDetail {
                items: repo.items(purchase.id).await?,
                unit_ids: repo.units(purchase.id).await?.iter().map(|u| u.id).collect(),
                purchase,
            };
            let models = model_names(db).await?;
            out.emit(&detail, |d| {
                println!("{}  {}", d.purchase.challan_no, d.purchase.date);
                for item in &d.items {
                    println!("  {:<28} x {}", model_name(&models, item.printer_model_id), item.quantity);
                }
                println!("  units: {:?}", d.unit_ids);
            })
        }
        PurchaseAction::List(PageArg { page }) => {
            let page = repo.list(page).await?;
            out.page(&page, |n, p| {
                println!(
                    "{:>4}. {:<16} {}  {:<24} {:<16} {:>3} printers",
                    n, p.challan_no, p.date, p.vendor_name, p.store_name, p.printer_count
                )
            })
        }
        PurchaseAction::Delete { id } => {
            repo.delete(id).await?;
            println!("✓ purchase #{} deleted", id);
            Ok(())
        }
    }
}

// =============================================================================
// Rentals and Returns
// =============================================================================

#[derive(Args, Debug)]
pub struct RentArgs {
    #[arg(long)]
    pub store: i64,
    /// Customer address id the units go to.
    #[arg(long)]
    pub address: i64,
    /// Challan date.
    #[arg(long)]
    pub date: NaiveDate,
    #[arg(long)]
    pub order_no: Option<String>,
    /// Defaults to the challan date.
    #[arg(long)]
    pub order_date: Option<NaiveDate>,
    /// Unit id, repeatable.
    #[arg(long = "unit", required = true)]
    pub units: Vec<i64>,
}

#[derive(Args, Debug)]
pub struct ReturnArgs {
    /// Customer address the units come back from.
    #[arg(long)]
    pub address: i64,
    /// Store receiving the units.
    #[arg(long)]
    pub store: i64,
    #[arg(long)]
    pub date: NaiveDate,
    #[arg(long)]
    pub order_no: Option<String>,
    #[arg(long)]
    pub order_date: Option<NaiveDate>,
    /// UNIT_ID or UNIT_ID:scrap, repeatable.
    #[arg(long = "unit", value_parser = parse_return_line, required = true)]
    pub units: Vec<ReturnLine>,
}

#[derive(Subcommand, Debug)]
pub enum ChallanAction {
    /// Show a challan by id or number with its units grouped by model.
    Show { challan: String },
    List(PageArg),
    Delete { id: i64 },
}

#[derive(Serialize)]
struct ChallanDetail<T> {
    header: T,
    lines: Vec<ChallanGroup>,
}

fn print_groups(groups: &[ChallanGroup]) {
    for group in groups {
        let serials: Vec<String> = group
            .serial_numbers
            .iter()
            .zip(&group.scrapped)
            .map(|(serial, scrapped)| {
                let serial = serial.as_deref().unwrap_or("(no serial)");
                if *scrapped {
                    format!("{} [scrapped]", serial)
                } else {
                    serial.to_string()
                }
            })
            .collect();
        println!("  {:<28} x {:<3} {}", group.printer_model, group.quantity(), serials.join(", "));
    }
}

pub async fn rent(db: &Database, out: &Output, args: RentArgs) -> anyhow::Result<()> {
    let rental = db
        .rentals()
        .create(&NewRental {
            challan_date: args.date,
            order_no: args.order_no,
            order_date: args.order_date.unwrap_or(args.date),
            store_id: args.store,
            customer_address_id: args.address,
            printer_unit_ids: args.units,
        })
        .await?;

    out.emit(&rental, |r| println!("✓ rental {} recorded", r.challan_no))
}

pub async fn give_back(db: &Database, out: &Output, args: ReturnArgs) -> anyhow::Result<()> {
    let rental_return = db
        .rental_returns()
        .create(&NewRentalReturn {
            challan_date: args.date,
            order_no: args.order_no,
            order_date: args.order_date,
            customer_address_id: args.address,
            store_id: args.store,
            units: args.units,
        })
        .await?;

    out.emit(&rental_return, |r| println!("✓ return {} recorded", r.challan_no))
}

pub async fn rental(db: &Database, out: &Output, action: ChallanAction) -> anyhow::Result<()> {
    let repo = db.rentals();
    match action {
        ChallanAction::Show { challan } => {
            let found: Option<Rental> = match challan.parse::<i64>() {
                Ok(id) => repo.get_by_id(id).await?,
                Err(_) => repo.get_by_challan(&challan).await?,
            };
            let Some(header) = found else {
                bail!("rental '{}' not found", challan);
            };
            let detail = ChallanDetail {
                lines: repo.grouped_units(header.id).await?,
                header,
            };
            out.emit(&detail, |d| {
                println!(
                    "{}  {}  order {} of {}",
                    d.header.challan_no,
                    d.header.challan_date,
                    d.header.order_no.as_deref().unwrap_or("—"),
                    d.header.order_date
                );
                print_groups(&d.lines);
            })
        }
        ChallanAction::List(PageArg { page }) => {
            let page = repo.list(page).await?;
            out.page(&page, |n, r| {
                println!(
                    "{:>4}. {:<16} {}  {:<16} → {} ({})",
                    n, r.challan_no, r.challan_date, r.store_name, r.customer_name, r.customer_address
                )
            })
        }
        ChallanAction::Delete { id } => {
            repo.delete(id).await?;
            println!("✓ rental #{} deleted", id);
            Ok(())
        }
    }
}

pub async fn rental_return(db: &Database, out: &Output, action: ChallanAction) -> anyhow::Result<()> {
    let repo = db.rental_returns();
    match action {
        ChallanAction::Show { challan } => {
            let found: Option<RentalReturn> = match challan.parse::<i64>() {
                Ok(id) => repo.get_by_id(id).await?,
                Err(_) => repo.get_by_challan(&challan).await?,
            };
            let Some(header) = found else {
                bail!("return '{}' not found", challan);
            };
            let detail = ChallanDetail {
                lines: repo.grouped_units(header.id).await?,
                header,
            };
            out.emit(&detail, |d| {
                println!("{}  {}", d.header.challan_no, d.header.challan_date);
                print_groups(&d.lines);
            })
        }
        ChallanAction::List(PageArg { page }) => {
            let page = repo.list(page).await?;
            out.page(&page, |n, r| {
                println!(
                    "{:>4}. {:<16} {}  {} ({}) → {}",
                    n, r.challan_no, r.challan_date, r.customer_name, r.customer_address, r.store_name
                )
            })
        }
        ChallanAction::Delete { id } => {
            repo.delete(id).await?;
            println!("✓ return #{} deleted", id);
            Ok(())
        }
    }
}

// =============================================================================
// Units
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum UnitAction {
    /// List units, optionally filtered.
    List {
        #[arg(long)]
        status: Option<UnitStatus>,
        /// Case-insensitive part of the serial number.
        #[arg(long)]
        serial: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: i64,
    },
    Show {
        id: i64,
    },
    /// Add a unit to a store outside of any purchase.
    Add {
        #[arg(long)]
        model: i64,
        #[arg(long)]
        store: i64,
        #[arg(long)]
        serial: Option<String>,
    },
    /// Set or correct a unit's serial number.
    Serial {
        id: i64,
        serial: String,
    },
}

pub async fn unit(db: &Database, out: &Output, action: UnitAction) -> anyhow::Result<()> {
    let repo = db.printer_units();
    match action {
        UnitAction::List { status, serial, page } => {
            let filter = UnitFilter {
                status,
                serial_contains: serial,
            };
            let page = repo.list(&filter, page).await?;
            out.page(&page, |n, u| {
                let (place, address) = u.location_label();
                println!(
                    "{:>4}. #{:<5} {:<14} {:<28} {:<9} {} ({})",
                    n,
                    u.id,
                    u.serial_number.as_deref().unwrap_or("—"),
                    u.printer_model_name,
                    u.status,
                    place,
                    address
                )
            })
        }
        UnitAction::Show { id } => {
            let Some(unit) = repo.get_view(id).await? else {
                bail!("printer unit #{} not found", id);
            };
            out.emit(&unit, |u| {
                let (place, address) = u.location_label();
                println!("#{} {} [{}]", u.id, u.printer_model_name, u.status.label());
                println!("  serial:   {}", u.serial_number.as_deref().unwrap_or("—"));
                println!("  location: {} ({})", place, address);
            })
        }
        UnitAction::Add { model, store, serial } => {
            let unit = repo.create(model, store, serial.as_deref()).await?;
            out.emit(&unit, |u| println!("✓ unit #{} added to store #{}", u.id, store))
        }
        UnitAction::Serial { id, serial } => {
            let unit = repo.assign_serial(id, &serial).await?;
            out.emit(&unit, |u| {
                println!("✓ unit #{} serial set to {}", u.id, u.serial_number.as_deref().unwrap_or(""))
            })
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn model_names(db: &Database) -> anyhow::Result<HashMap<i64, String>> {
    Ok(db
        .printer_models()
        .list_all()
        .await?
        .into_iter()
        .map(|m| (m.id, m.name))
        .collect())
}

fn model_name(models: &HashMap<i64, String>, id: i64) -> &str {
    models.get(&id).map(String::as_str).unwrap_or("(deleted model)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        let item = parse_item("3:5").unwrap();
        assert_eq!(item.printer_model_id, 3);
        assert_eq!(item.quantity, 5);

        assert!(parse_item("3").is_err());
        assert!(parse_item("x:5").is_err());
        assert!(parse_item("3:five").is_err());
    }

    #[test]
    fn test_parse_return_line() {
        let line = parse_return_line("12").unwrap();
        assert_eq!(line.printer_unit_id, 12);
        assert!(!line.scrapped);

        let line = parse_return_line("12:SCRAP").unwrap();
        assert!(line.scrapped);

        assert!(parse_return_line("12:lost").is_err());
        assert!(parse_return_line("twelve").is_err());
    }

    #[test]
    fn test_model_name_fallback() {
        let mut models = HashMap::new();
        models.insert(1, "HP LaserJet M1005".to_string());
        assert_eq!(model_name(&models, 1), "HP LaserJet M1005");
        assert_eq!(model_name(&models, 2), "(deleted model)");
    }
}
