//! Product status and stock history

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::InvalidStatus;

/// Availability status of a product.
///
/// `InStock`/`OutOfStock` are a pure function of the current stock level;
/// `Discontinued` is only ever set explicitly and survives until the next
/// stock movement re-derives the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    InStock,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    /// Derive the status implied by a stock level.
    pub fn from_stock(stock: i32) -> Self {
        if stock > 0 {
            ProductStatus::InStock
        } else {
            ProductStatus::OutOfStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::InStock => "in_stock",
            ProductStatus::OutOfStock => "out_of_stock",
            ProductStatus::Discontinued => "discontinued",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(ProductStatus::InStock),
            "out_of_stock" => Ok(ProductStatus::OutOfStock),
            "discontinued" => Ok(ProductStatus::Discontinued),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for ProductStatus {
    type Error = InvalidStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One stock-addition event in a product's append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub quantity: i32,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_derivation_from_stock() {
        assert_eq!(ProductStatus::from_stock(0), ProductStatus::OutOfStock);
        assert_eq!(ProductStatus::from_stock(1), ProductStatus::InStock);
        assert_eq!(ProductStatus::from_stock(500), ProductStatus::InStock);
    }

    #[test]
    fn status_wire_format_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&ProductStatus::InStock).unwrap(),
            "\"in_stock\""
        );
        assert_eq!(
            "out_of_stock".parse::<ProductStatus>().unwrap(),
            ProductStatus::OutOfStock
        );
        assert!("sold_out".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn stock_entry_round_trips_through_json() {
        let entry = StockEntry {
            quantity: 5,
            date: "2026-01-15T08:30:00Z".parse().unwrap(),
            notes: Some("restock batch 7".to_string()),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: StockEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
