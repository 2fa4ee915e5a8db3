//! # printhire
//!
//! Operator command line for the printer-rental back office.
//!
//! ```text
//! printhire model add "HP LaserJet M1005"
//! printhire purchase record --vendor 1 --store 1 --date 2025-06-01 --item 1:5
//! printhire rent --store 1 --address 3 --date 2025-06-10 --unit 1 --unit 2
//! printhire return --address 3 --store 1 --date 2025-07-01 --unit 1 --unit 2:scrap
//! printhire report on-rent
//! ```
//!
//! Logging goes to stderr through `tracing`; `RUST_LOG` wins over the
//! configured level.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use printhire_db::Database;

use crate::commands::{master, report, stock};
use crate::config::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "printhire", version, about = "Printer rental inventory")]
struct Cli {
    /// Path to config file (default: platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding config and environment.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print results as JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations and show their status.
    Migrate,

    /// Printer models.
    Model {
        #[command(subcommand)]
        action: master::ModelAction,
    },

    /// Stores holding stock.
    Store {
        #[command(subcommand)]
        action: master::StoreAction,
    },

    /// Vendors we buy from.
    Vendor {
        #[command(subcommand)]
        action: master::VendorAction,
    },

    /// Customers and their addresses.
    Customer {
        #[command(subcommand)]
        action: master::CustomerAction,
    },

    /// Purchases from vendors.
    Purchase {
        #[command(subcommand)]
        action: stock::PurchaseAction,
    },

    /// Send units from a store to a customer address.
    Rent(stock::RentArgs),

    /// Bring units back from a customer address.
    Return(stock::ReturnArgs),

    /// Rental challans.
    Rental {
        #[command(subcommand)]
        action: stock::ChallanAction,
    },

    /// Return challans.
    Returns {
        #[command(subcommand)]
        action: stock::ChallanAction,
    },

    /// Individual printer units.
    Unit {
        #[command(subcommand)]
        action: stock::UnitAction,
    },

    /// Inventory reports.
    Report {
        #[command(subcommand)]
        kind: report::ReportKind,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config).context("loading configuration")?;
    if let Some(path) = cli.db {
        config.database.path = path;
    }

    init_logging(&config.logging.level);
    config.prepare_data_dir()?;

    info!(path = %config.database.path.display(), "Opening database");
    let db = Database::new(config.db_config())
        .await
        .with_context(|| format!("opening {}", config.database.path.display()))?;

    let out = commands::Output::new(cli.json);
    let result = match cli.command {
        Commands::Migrate => commands::migrate(&db, &out).await,
        Commands::Model { action } => master::model(&db, &out, action).await,
        Commands::Store { action } => master::store(&db, &out, action).await,
        Commands::Vendor { action } => master::vendor(&db, &out, action).await,
        Commands::Customer { action } => master::customer(&db, &out, action).await,
        Commands::Purchase { action } => stock::purchase(&db, &out, action).await,
        Commands::Rent(args) => stock::rent(&db, &out, args).await,
        Commands::Return(args) => stock::give_back(&db, &out, args).await,
        Commands::Rental { action } => stock::rental(&db, &out, action).await,
        Commands::Returns { action } => stock::rental_return(&db, &out, action).await,
        Commands::Unit { action } => stock::unit(&db, &out, action).await,
        Commands::Report { kind } => report::run(&db, &out, kind).await,
    };

    db.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rent() {
        let cli = Cli::try_parse_from([
            "printhire", "rent", "--store", "1", "--address", "4", "--date", "2025-06-10",
            "--unit", "7", "--unit", "9",
        ])
        .unwrap();

        match cli.command {
            Commands::Rent(args) => {
                assert_eq!(args.store, 1);
                assert_eq!(args.address, 4);
                assert_eq!(args.units, vec![7, 9]);
                assert_eq!(args.order_date, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["printhire", "report", "status", "--json", "--db", "x.db"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
    }

    #[test]
    fn test_rent_requires_units() {
        let result = Cli::try_parse_from([
            "printhire", "rent", "--store", "1", "--address", "4", "--date", "2025-06-10",
        ]);
        assert!(result.is_err());
    }
}
