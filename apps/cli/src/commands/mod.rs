//! Command handlers.
//!
//! Every handler takes the open [`Database`], an [`Output`] and its parsed
//! arguments, and either prints a table or the same data as JSON.

pub mod master;
pub mod report;
pub mod stock;

use serde::Serialize;

use printhire_core::Page;
use printhire_db::{migrations, Database};

/// Chooses between table and JSON rendering.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Output { json }
    }

    /// Prints `value` as JSON, or hands it to `table` for text output.
    pub fn emit<T: Serialize>(&self, value: &T, table: impl FnOnce(&T)) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            table(value);
        }
        Ok(())
    }

    /// Prints a page of rows with its position footer.
    pub fn page<T: Serialize>(&self, page: &Page<T>, row: impl Fn(i64, &T)) -> anyhow::Result<()> {
        self.emit(page, |page| {
            if page.items.is_empty() {
                println!("(no rows)");
                return;
            }
            for (idx, item) in page.items.iter().enumerate() {
                row(page.serial_no(idx), item);
            }
            println!(
                "-- page {} of {} ({} rows){}",
                page.page_no,
                page.page_count(),
                page.total,
                if page.has_next() { ", --page for more" } else { "" }
            );
        })
    }
}

#[derive(Serialize)]
struct MigrationStatus {
    total: usize,
    applied: usize,
}

pub async fn migrate(db: &Database, out: &Output) -> anyhow::Result<()> {
    db.run_migrations().await?;
    let (total, applied) = migrations::migration_status(db.pool()).await?;

    out.emit(&MigrationStatus { total, applied }, |s| {
        println!("✓ {} of {} migrations applied", s.applied, s.total);
    })
}
