//! Dealer status

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::InvalidStatus;

/// Lifecycle status of a dealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DealerStatus {
    #[default]
    Active,
    Inactive,
}

impl DealerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealerStatus::Active => "active",
            DealerStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for DealerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealerStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(DealerStatus::Active),
            "inactive" => Ok(DealerStatus::Inactive),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for DealerStatus {
    type Error = InvalidStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
