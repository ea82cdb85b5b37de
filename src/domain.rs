//! Row shapes flowing between the pipeline stages.
//!
//! Every table written by the pipeline is a flat CSV whose header matches the
//! field names of one of these structs. Optional fields serialize as empty
//! cells.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A non-negative price held in whole cents.
///
/// Displays and serializes with exactly two decimal digits ("6.99").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: u64,
}

impl Price {
    /// Cents are taken from the two-decimal text of `value`, which rounds
    /// the exact binary value half to even ("0.125" -> "0.12"). Values whose
    /// cents do not fit in a `u64` are rejected.
    pub fn from_value(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        // abs folds -0.0 into 0.0
        let text = format!("{:.2}", value.abs());
        let (whole, fraction) = text.split_once('.')?;
        let cents = whole
            .parse::<u64>()
            .ok()?
            .checked_mul(100)?
            .checked_add(fraction.parse::<u64>().ok()?)?;
        Some(Self { cents })
    }

    pub fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    pub fn cents(&self) -> u64 {
        self.cents
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl FromStr for Price {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Price::from_value)
            .ok_or_else(|| format!("invalid price '{}'", trimmed))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Decimal-separator convention of a store export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecimalSeparator {
    #[serde(rename = ",")]
    Comma,
    #[serde(rename = ".")]
    Period,
}

/// One retailer listing as read from a store export. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub store: String,
    pub name: String,
    pub price: String,
    pub brand: Option<String>,
    pub net_quantity: Option<String>,
    pub unit_of_measure: Option<String>,
    pub category: Option<String>,
}

/// A row of `consolidated_items.csv`.
///
/// Field order is the sort order of the consolidated table. Prices compare
/// numerically, so "9.99" sorts before "10.00".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConsolidatedItem {
    pub id: u64,
    pub name: String,
    pub price: Price,
    pub store: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub net_quantity: Option<String>,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// A row of `normalized_items.csv`; `matched_items_v1.csv` shares the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub id: u64,
    pub name: String,
    pub price: Price,
    pub store: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub net_quantity: Option<String>,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, with = "quantity_text")]
    pub standardized_quantity: Option<f64>,
    #[serde(default)]
    pub standardized_unit: String,
}

/// Matched rows keep the normalized schema with `id` rewritten.
pub type MatchedItem = NormalizedItem;

pub const CONSOLIDATED_HEADER: [&str; 8] = [
    "id",
    "name",
    "price",
    "store",
    "brand",
    "net_quantity",
    "unit_of_measure",
    "category",
];

pub const NORMALIZED_HEADER: [&str; 10] = [
    "id",
    "name",
    "price",
    "store",
    "brand",
    "net_quantity",
    "unit_of_measure",
    "category",
    "standardized_quantity",
    "standardized_unit",
];

/// Text form of a standardized quantity, shared by the CSV columns and the
/// match signature so both always agree.
pub mod quantity_text {
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Whole numbers keep one decimal digit ("1000.0"), others use the
    /// shortest round-trip form ("1.5").
    pub fn format(value: f64) -> String {
        if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{:.1}", value)
        } else {
            format!("{}", value)
        }
    }

    pub fn format_opt(value: Option<f64>) -> String {
        value.map(format).unwrap_or_default()
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&format(*v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => text.parse::<f64>().map(Some).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_formats_two_decimals() {
        assert_eq!(Price::from_value(6.99).unwrap().to_string(), "6.99");
        assert_eq!(Price::from_value(1234.5).unwrap().to_string(), "1234.50");
        assert_eq!(Price::from_value(0.0).unwrap().to_string(), "0.00");
        assert!(Price::from_value(-0.01).is_none());
        assert!(Price::from_value(f64::NAN).is_none());
        assert_eq!(Price::from_value(-0.0).unwrap().cents(), 0);
    }

    #[test]
    fn test_price_rounds_exact_binary_value_half_to_even() {
        let fmt = |v: f64| Price::from_value(v).unwrap().to_string();
        assert_eq!(fmt(0.125), "0.12");
        assert_eq!(fmt(1.115), "1.11");
        assert_eq!(fmt(4.015), format!("{:.2}", 4.015));
        assert_eq!(fmt(0.375), "0.38");
    }

    #[test]
    fn test_price_too_large_for_cents_is_rejected() {
        assert!(Price::from_value(99999999999999999999999.0).is_none());
        assert!(Price::from_value(1.0e18).is_none());
        assert_eq!(Price::from_value(1.0e15).unwrap().cents(), 100_000_000_000_000_000);
    }

    #[test]
    fn test_price_parses_from_table_text() {
        let price: Price = "6.99".parse().unwrap();
        assert_eq!(price.cents(), 699);
        assert!("abc".parse::<Price>().is_err());
        assert!("-1.00".parse::<Price>().is_err());
    }

    #[test]
    fn test_quantity_text_format() {
        assert_eq!(quantity_text::format(1000.0), "1000.0");
        assert_eq!(quantity_text::format(1.5), "1.5");
        assert_eq!(quantity_text::format_opt(None), "");
    }
}
