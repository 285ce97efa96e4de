//! Domain models for the Inventory Management System
//!
//! Status enums are stored as plain text; `FromStr`/`TryFrom<String>` cover
//! decoding from the database and `as_str` covers encoding back.

pub mod category;
pub mod dealer;
pub mod ledger;
pub mod product;

pub use category::CategoryStatus;
pub use dealer::DealerStatus;
pub use ledger::{classify_due, LedgerStatus};
pub use product::{ProductStatus, StockEntry};

use thiserror::Error;

/// Error for status values that do not match any known variant.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown status value: {0:?}")]
pub struct InvalidStatus(pub String);
