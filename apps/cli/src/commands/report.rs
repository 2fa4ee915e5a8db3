//! Inventory reports.

use clap::Subcommand;

use printhire_db::Database;

use super::Output;

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Unit counts per model and status.
    Status,
    /// In-store stock per model and store.
    InStore,
    /// Rented units per model, customer and address.
    OnRent,
}

pub async fn run(db: &Database, out: &Output, kind: ReportKind) -> anyhow::Result<()> {
    let units = db.printer_units();
    match kind {
        ReportKind::Status => {
            let rows = units.status_summary().await?;
            out.emit(&rows, |rows| {
                println!(
                    "{:<28} {:>8} {:>8} {:>8} {:>8}",
                    "Model", "In-store", "Rented", "Scrapped", "Total"
                );
                for row in rows {
                    println!(
                        "{:<28} {:>8} {:>8} {:>8} {:>8}",
                        row.printer_model, row.in_store, row.rented, row.scrapped, row.total()
                    );
                }
            })
        }
        ReportKind::InStore => {
            let groups = units.in_store_summary().await?;
            out.emit(&groups, |groups| {
                for group in groups {
                    println!("{}", group.printer_model);
                    for store in &group.stores {
                        println!(
                            "  {:<24} {:<32} {:>4}",
                            store.store_name, store.store_address, store.quantity
                        );
                    }
                }
            })
        }
        ReportKind::OnRent => {
            let groups = units.on_rent_summary().await?;
            out.emit(&groups, |groups| {
                for group in groups {
                    println!("{} ({} addresses)", group.printer_model, group.row_span());
                    for customer in &group.customers {
                        println!("  {:<28} {:>4}", customer.customer_name, customer.quantity());
                        for address in &customer.addresses {
                            println!("    {:<26} {:>4}", address.address, address.quantity);
                        }
                    }
                }
            })
        }
    }
}
