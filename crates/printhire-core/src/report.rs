//! # Inventory Reports
//!
//! Aggregations behind the stock pages. The database hands over flat rows;
//! grouping happens here so it can be tested without SQLite.
//!
//! ## Reports
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  status_summary    model        │ in-store │ rented │ scrapped         │
//! │                    LaserJet     │    4     │   7    │    1             │
//! │                                                                         │
//! │  in_store_summary  model ─► store (address) ─► qty                     │
//! │                                                                         │
//! │  on_rent_summary   model ─► customer ─► address ─► qty                 │
//! │                                                                         │
//! │  group_challan_lines  model ─► [serial, serial, ...]  (challan print)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every level is sorted by name, then address.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::inventory::UnitStatus;

// =============================================================================
// Input Rows
// =============================================================================

/// One unit with the names of its model and current location.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct UnitReportRow {
    pub printer_model: String,
    pub status: UnitStatus,
    pub store_name: Option<String>,
    pub store_address: Option<String>,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
}

/// One unit printed on a rental or return challan.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ChallanLine {
    pub printer_model: String,
    pub printer_unit_id: i64,
    pub serial_number: Option<String>,
    /// Always false on rental challans.
    pub scrapped: bool,
}

// =============================================================================
// Outputs
// =============================================================================

/// Unit counts per status for one model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusCount {
    pub printer_model: String,
    pub in_store: i64,
    pub rented: i64,
    pub scrapped: i64,
}

impl StatusCount {
    pub fn total(&self) -> i64 {
        self.in_store + self.rented + self.scrapped
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreQuantity {
    pub store_name: String,
    pub store_address: String,
    pub quantity: i64,
}

/// In-store stock of one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InStoreGroup {
    pub printer_model: String,
    pub stores: Vec<StoreQuantity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddressQuantity {
    pub address: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerHolding {
    pub customer_name: String,
    pub addresses: Vec<AddressQuantity>,
}

impl CustomerHolding {
    pub fn quantity(&self) -> i64 {
        self.addresses.iter().map(|a| a.quantity).sum()
    }
}

/// Units of one model out on rent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OnRentGroup {
    pub printer_model: String,
    pub customers: Vec<CustomerHolding>,
}

impl OnRentGroup {
    /// Number of address rows this model spans in a table.
    pub fn row_span(&self) -> usize {
        self.customers.iter().map(|c| c.addresses.len()).sum()
    }
}

/// Units of one model on a challan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChallanGroup {
    pub printer_model: String,
    pub serial_numbers: Vec<Option<String>>,
    pub scrapped: Vec<bool>,
}

impl ChallanGroup {
    pub fn quantity(&self) -> usize {
        self.serial_numbers.len()
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Counts units per model and status.
pub fn status_summary<'a, I>(rows: I) -> Vec<StatusCount>
where
    I: IntoIterator<Item = &'a UnitReportRow>,
{
    let mut by_model: BTreeMap<&str, StatusCount> = BTreeMap::new();

    for row in rows {
        let entry = by_model
            .entry(row.printer_model.as_str())
            .or_insert_with(|| StatusCount {
                printer_model: row.printer_model.clone(),
                ..StatusCount::default()
            });
        match row.status {
            UnitStatus::InStore => entry.in_store += 1,
            UnitStatus::Rented => entry.rented += 1,
            UnitStatus::Scrapped => entry.scrapped += 1,
        }
    }

    by_model.into_values().collect()
}

/// Groups INSTORE units by model, then store.
pub fn in_store_summary<'a, I>(rows: I) -> Vec<InStoreGroup>
where
    I: IntoIterator<Item = &'a UnitReportRow>,
{
    let mut by_model: BTreeMap<&str, BTreeMap<(&str, &str), i64>> = BTreeMap::new();

    for row in rows.into_iter().filter(|r| r.status == UnitStatus::InStore) {
        let (Some(store), Some(address)) = (row.store_name.as_deref(), row.store_address.as_deref())
        else {
            continue;
        };
        *by_model
            .entry(row.printer_model.as_str())
            .or_default()
            .entry((store, address))
            .or_insert(0) += 1;
    }

    by_model
        .into_iter()
        .map(|(model, stores)| InStoreGroup {
            printer_model: model.to_string(),
            stores: stores
                .into_iter()
                .map(|((name, address), quantity)| StoreQuantity {
                    store_name: name.to_string(),
                    store_address: address.to_string(),
                    quantity,
                })
                .collect(),
        })
        .collect()
}

/// Groups RENTED units by model, customer, then address.
pub fn on_rent_summary<'a, I>(rows: I) -> Vec<OnRentGroup>
where
    I: IntoIterator<Item = &'a UnitReportRow>,
{
    let mut by_model: BTreeMap<&str, BTreeMap<&str, BTreeMap<&str, i64>>> = BTreeMap::new();

    for row in rows.into_iter().filter(|r| r.status == UnitStatus::Rented) {
        let (Some(customer), Some(address)) =
            (row.customer_name.as_deref(), row.customer_address.as_deref())
        else {
            continue;
        };
        *by_model
            .entry(row.printer_model.as_str())
            .or_default()
            .entry(customer)
            .or_default()
            .entry(address)
            .or_insert(0) += 1;
    }

    by_model
        .into_iter()
        .map(|(model, customers)| OnRentGroup {
            printer_model: model.to_string(),
            customers: customers
                .into_iter()
                .map(|(customer, addresses)| CustomerHolding {
                    customer_name: customer.to_string(),
                    addresses: addresses
                        .into_iter()
                        .map(|(address, quantity)| AddressQuantity {
                            address: address.to_string(),
                            quantity,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// Groups challan lines by model, keeping line order inside a model.
pub fn group_challan_lines<I>(lines: I) -> Vec<ChallanGroup>
where
    I: IntoIterator<Item = ChallanLine>,
{
    let mut by_model: BTreeMap<String, ChallanGroup> = BTreeMap::new();

    for line in lines {
        let group = by_model
            .entry(line.printer_model.clone())
            .or_insert_with(|| ChallanGroup {
                printer_model: line.printer_model.clone(),
                serial_numbers: Vec::new(),
                scrapped: Vec::new(),
            });
        group.serial_numbers.push(line.serial_number);
        group.scrapped.push(line.scrapped);
    }

    by_model.into_values().collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn in_store(model: &str, store: &str) -> UnitReportRow {
        UnitReportRow {
            printer_model: model.to_string(),
            status: UnitStatus::InStore,
            store_name: Some(store.to_string()),
            store_address: Some(format!("{} road", store)),
            customer_name: None,
            customer_address: None,
        }
    }

    fn rented(model: &str, customer: &str, address: &str) -> UnitReportRow {
        UnitReportRow {
            printer_model: model.to_string(),
            status: UnitStatus::Rented,
            store_name: None,
            store_address: None,
            customer_name: Some(customer.to_string()),
            customer_address: Some(address.to_string()),
        }
    }

    fn scrapped(model: &str) -> UnitReportRow {
        UnitReportRow {
            printer_model: model.to_string(),
            status: UnitStatus::Scrapped,
            store_name: None,
            store_address: None,
            customer_name: None,
            customer_address: None,
        }
    }

    fn sample() -> Vec<UnitReportRow> {
        vec![
            in_store("LaserJet", "North"),
            in_store("LaserJet", "North"),
            in_store("LaserJet", "Central"),
            in_store("DeskJet", "North"),
            rented("LaserJet", "Zenith Corp", "Plot 4"),
            rented("LaserJet", "Zenith Corp", "Plot 4"),
            rented("LaserJet", "Zenith Corp", "Annexe"),
            rented("LaserJet", "Acme", "HQ"),
            scrapped("DeskJet"),
        ]
    }

    #[test]
    fn test_status_summary() {
        let rows = sample();
        let summary = status_summary(&rows);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].printer_model, "DeskJet");
        assert_eq!((summary[0].in_store, summary[0].rented, summary[0].scrapped), (1, 0, 1));
        assert_eq!(summary[1].printer_model, "LaserJet");
        assert_eq!((summary[1].in_store, summary[1].rented, summary[1].scrapped), (3, 4, 0));
        assert_eq!(summary[1].total(), 7);
    }

    #[test]
    fn test_in_store_summary() {
        let rows = sample();
        let summary = in_store_summary(&rows);

        assert_eq!(summary.len(), 2);
        let laserjet = &summary[1];
        assert_eq!(laserjet.printer_model, "LaserJet");
        assert_eq!(
            laserjet.stores,
            vec![
                StoreQuantity {
                    store_name: "Central".to_string(),
                    store_address: "Central road".to_string(),
                    quantity: 1,
                },
                StoreQuantity {
                    store_name: "North".to_string(),
                    store_address: "North road".to_string(),
                    quantity: 2,
                },
            ]
        );
    }

    #[test]
    fn test_on_rent_summary() {
        let rows = sample();
        let summary = on_rent_summary(&rows);

        assert_eq!(summary.len(), 1);
        let group = &summary[0];
        assert_eq!(group.row_span(), 3);
        assert_eq!(group.customers[0].customer_name, "Acme");
        assert_eq!(group.customers[1].customer_name, "Zenith Corp");
        assert_eq!(group.customers[1].quantity(), 3);
        assert_eq!(group.customers[1].addresses[0].address, "Annexe");
        assert_eq!(group.customers[1].addresses[1].quantity, 2);
    }

    #[test]
    fn test_group_challan_lines() {
        let line = |model: &str, id: i64, serial: Option<&str>, scrapped: bool| ChallanLine {
            printer_model: model.to_string(),
            printer_unit_id: id,
            serial_number: serial.map(str::to_string),
            scrapped,
        };
        let groups = group_challan_lines(vec![
            line("LaserJet", 1, Some("L-1"), false),
            line("DeskJet", 2, None, true),
            line("LaserJet", 3, Some("L-3"), true),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].printer_model, "DeskJet");
        assert_eq!(groups[1].quantity(), 2);
        assert_eq!(
            groups[1].serial_numbers,
            vec![Some("L-1".to_string()), Some("L-3".to_string())]
        );
        assert_eq!(groups[1].scrapped, vec![false, true]);
    }
}
