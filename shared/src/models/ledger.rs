//! Party ledger status and due-date classification

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::InvalidStatus;

/// Payment status of a ledger entry.
///
/// `Paid` is authoritative (set together with `paid_at`). `Overdue` may be
/// stored, but reports also derive it from the due date — see
/// [`classify_due`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LedgerStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl LedgerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStatus::Pending => "pending",
            LedgerStatus::Paid => "paid",
            LedgerStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LedgerStatus::Pending),
            "paid" => Ok(LedgerStatus::Paid),
            "overdue" => Ok(LedgerStatus::Overdue),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for LedgerStatus {
    type Error = InvalidStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Effective status of an entry at a point in time.
///
/// An unpaid entry whose due date has passed counts as overdue regardless of
/// the stored status; paid entries are never reclassified.
pub fn classify_due(
    stored: LedgerStatus,
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> LedgerStatus {
    match stored {
        LedgerStatus::Paid => LedgerStatus::Paid,
        LedgerStatus::Overdue => LedgerStatus::Overdue,
        LedgerStatus::Pending => {
            if due_date < now {
                LedgerStatus::Overdue
            } else {
                LedgerStatus::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn paid_entries_are_never_reclassified() {
        let now = Utc::now();
        let past = now - Duration::days(30);
        assert_eq!(
            classify_due(LedgerStatus::Paid, past, now),
            LedgerStatus::Paid
        );
    }

    #[test]
    fn pending_past_due_becomes_overdue() {
        let now = Utc::now();
        assert_eq!(
            classify_due(LedgerStatus::Pending, now - Duration::hours(1), now),
            LedgerStatus::Overdue
        );
        assert_eq!(
            classify_due(LedgerStatus::Pending, now + Duration::hours(1), now),
            LedgerStatus::Pending
        );
    }

    #[test]
    fn stored_overdue_stays_overdue() {
        let now = Utc::now();
        assert_eq!(
            classify_due(LedgerStatus::Overdue, now + Duration::days(5), now),
            LedgerStatus::Overdue
        );
    }
}
