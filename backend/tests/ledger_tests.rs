//! Party ledger rules tests
//!
//! Covers:
//! - paid_at forcing the stored status to paid
//! - derived overdue classification
//! - dues-summary bucketing by effective status

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use shared::{classify_due, LedgerStatus};

/// The update-path status rule: a supplied paid_at wins over any
/// explicitly supplied status.
fn merged_status(
    existing: LedgerStatus,
    supplied_status: Option<LedgerStatus>,
    supplied_paid_at: Option<DateTime<Utc>>,
) -> LedgerStatus {
    if supplied_paid_at.is_some() {
        LedgerStatus::Paid
    } else {
        supplied_status.unwrap_or(existing)
    }
}

struct Entry {
    amount: Decimal,
    due_date: DateTime<Utc>,
    status: LedgerStatus,
}

/// Dues-summary fold: bucket amounts by effective status.
fn dues_summary(entries: &[Entry], now: DateTime<Utc>) -> (Decimal, Decimal, Decimal) {
    let mut pending = Decimal::ZERO;
    let mut paid = Decimal::ZERO;
    let mut overdue = Decimal::ZERO;
    for entry in entries {
        match classify_due(entry.status, entry.due_date, now) {
            LedgerStatus::Pending => pending += entry.amount,
            LedgerStatus::Paid => paid += entry.amount,
            LedgerStatus::Overdue => overdue += entry.amount,
        }
    }
    (pending, paid, overdue)
}

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn paid_at_forces_status_to_paid() {
        let now = Utc::now();
        assert_eq!(
            merged_status(LedgerStatus::Pending, None, Some(now)),
            LedgerStatus::Paid
        );
        // Even an explicitly supplied status loses to the payment timestamp.
        assert_eq!(
            merged_status(LedgerStatus::Pending, Some(LedgerStatus::Overdue), Some(now)),
            LedgerStatus::Paid
        );
    }

    #[test]
    fn status_merge_without_paid_at() {
        assert_eq!(
            merged_status(LedgerStatus::Pending, Some(LedgerStatus::Overdue), None),
            LedgerStatus::Overdue
        );
        assert_eq!(
            merged_status(LedgerStatus::Pending, None, None),
            LedgerStatus::Pending
        );
    }

    #[test]
    fn past_due_pending_entries_count_as_overdue() {
        let now = Utc::now();
        let entries = [
            Entry {
                amount: dec(100),
                due_date: now + Duration::days(3),
                status: LedgerStatus::Pending,
            },
            Entry {
                amount: dec(250),
                due_date: now - Duration::days(1),
                status: LedgerStatus::Pending,
            },
            Entry {
                amount: dec(400),
                due_date: now - Duration::days(10),
                status: LedgerStatus::Paid,
            },
            Entry {
                amount: dec(50),
                due_date: now + Duration::days(30),
                status: LedgerStatus::Overdue,
            },
        ];

        let (pending, paid, overdue) = dues_summary(&entries, now);
        assert_eq!(pending, dec(100));
        assert_eq!(paid, dec(400));
        // Derived overdue (250) plus stored overdue (50).
        assert_eq!(overdue, dec(300));
    }

    #[test]
    fn buckets_partition_the_total() {
        let now = Utc::now();
        let entries = [
            Entry {
                amount: dec(10),
                due_date: now - Duration::days(2),
                status: LedgerStatus::Pending,
            },
            Entry {
                amount: dec(20),
                due_date: now + Duration::days(2),
                status: LedgerStatus::Pending,
            },
            Entry {
                amount: dec(30),
                due_date: now - Duration::days(2),
                status: LedgerStatus::Paid,
            },
        ];
        let total: Decimal = entries.iter().map(|e| e.amount).sum();
        let (pending, paid, overdue) = dues_summary(&entries, now);
        assert_eq!(pending + paid + overdue, total);
    }

    #[test]
    fn new_entries_default_to_pending_with_no_payment() {
        let status = LedgerStatus::default();
        assert_eq!(status, LedgerStatus::Pending);
    }
}
