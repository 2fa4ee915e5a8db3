//! # Challan Numbers
//!
//! Purchases, rentals and rental returns each get a human-readable document
//! number when they are created. It is never changed afterwards.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │      APS / 007 / 25-26                                                 │
//! │       │     │     │                                                     │
//! │       │     │     └── year % 100, then (year + 1) % 100                │
//! │       │     └──────── per-kind, per-year sequence (≥ 3 digits)         │
//! │       └────────────── initials of the first four words of the          │
//! │                       vendor (purchase) or customer (rental/return)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sequence itself is allocated by the database layer under a write
//! lock; this module only formats and parses.
//!
//! Only the last two digits of the year are kept, so document dates are
//! limited to [`MIN_CHALLAN_YEAR`](crate::MIN_CHALLAN_YEAR) through
//! [`MAX_CHALLAN_YEAR`](crate::MAX_CHALLAN_YEAR).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;

/// Number of name words that contribute an initial.
const PREFIX_WORDS: usize = 4;

// =============================================================================
// Document Kind
// =============================================================================

/// The three independent challan sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DocumentKind {
    Purchase,
    Rental,
    RentalReturn,
}

impl DocumentKind {
    /// Key used in the sequence table.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Purchase => "purchase",
            DocumentKind::Rental => "rental",
            DocumentKind::RentalReturn => "rental_return",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Initials
// =============================================================================

/// Upper-cased first character of each of the first four words.
///
/// ## Example
/// ```rust
/// use printhire_core::challan::initials;
///
/// assert_eq!(initials("Acme Print Supplies"), "APS");
/// assert_eq!(initials("north   east office solutions pvt ltd"), "NEOS");
/// ```
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .take(PREFIX_WORDS)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

// =============================================================================
// Challan
// =============================================================================

/// A formatted document number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Challan {
    prefix: String,
    seq: u32,
    /// Two-digit year the document was dated in.
    yy: u8,
}

impl Challan {
    /// Builds the challan for the `seq`-th document of `year`, prefixed with
    /// the initials of `party_name`.
    pub fn for_year(party_name: &str, seq: u32, year: i32) -> Self {
        Challan {
            prefix: initials(party_name),
            seq,
            yy: year.rem_euclid(100) as u8,
        }
    }

    /// Initials part.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Sequence number within its year.
    pub const fn sequence(&self) -> u32 {
        self.seq
    }

    /// The `(start, end)` two-digit year pair, e.g. `(25, 26)`.
    pub const fn year_pair(&self) -> (u8, u8) {
        let start = self.yy % 100;
        (start, (start + 1) % 100)
    }

    /// Parses a stored challan.
    ///
    /// Segments are taken from the right so an odd prefix cannot shift the
    /// sequence position.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidChallan {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = value.rsplitn(3, '/');
        let years = parts.next().ok_or_else(|| invalid("missing year segment"))?;
        let seq = parts.next().ok_or_else(|| invalid("missing sequence segment"))?;
        let prefix = parts.next().ok_or_else(|| invalid("missing prefix segment"))?;

        let seq: u32 = seq
            .parse()
            .map_err(|_| invalid("sequence segment is not a number"))?;

        let (start, end) = years
            .split_once('-')
            .ok_or_else(|| invalid("year segment must look like YY-YY"))?;
        if start.len() != 2 || end.len() != 2 {
            return Err(invalid("year segment must look like YY-YY"));
        }
        let start: u8 = start.parse().map_err(|_| invalid("start year is not a number"))?;
        let end: u8 = end.parse().map_err(|_| invalid("end year is not a number"))?;
        if (start + 1) % 100 != end {
            return Err(invalid("end year must follow start year"));
        }

        Ok(Challan {
            prefix: prefix.to_string(),
            seq,
            yy: start,
        })
    }
}

impl fmt::Display for Challan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = self.year_pair();
        write!(f, "{}/{:03}/{:02}-{:02}", self.prefix, self.seq, start, end)
    }
}

impl FromStr for Challan {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Challan::parse(s)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials_take_first_four_words() {
        assert_eq!(initials("Acme"), "A");
        assert_eq!(initials("sharp office automation private limited"), "SOAP");
        assert_eq!(initials("  lead  and trailing  "), "LAT");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn test_format() {
        assert_eq!(Challan::for_year("Acme Print Supplies", 1, 2025).to_string(), "APS/001/25-26");
        assert_eq!(Challan::for_year("Bharat Traders", 42, 2009).to_string(), "BT/042/09-10");
        assert_eq!(Challan::for_year("Zed", 1234, 2030).to_string(), "Z/1234/30-31");
    }

    #[test]
    fn test_century_rollover() {
        let challan = Challan::for_year("Old Vendor", 5, 2099);
        assert_eq!(challan.to_string(), "OV/005/99-00");
        assert_eq!(challan.year_pair(), (99, 0));
    }

    #[test]
    fn test_parse() {
        let challan: Challan = "APS/007/25-26".parse().unwrap();
        assert_eq!(challan.prefix(), "APS");
        assert_eq!(challan.sequence(), 7);
        assert_eq!(challan.year_pair(), (25, 26));
        assert_eq!(challan.to_string(), "APS/007/25-26");

        let odd_prefix = Challan::parse("/X/012/24-25").unwrap();
        assert_eq!(odd_prefix.prefix(), "/X");
        assert_eq!(odd_prefix.sequence(), 12);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Challan::parse("APS-007-25-26").is_err());
        assert!(Challan::parse("APS/seven/25-26").is_err());
        assert!(Challan::parse("APS/007/2526").is_err());
        assert!(Challan::parse("APS/007/25-27").is_err());
    }
}
