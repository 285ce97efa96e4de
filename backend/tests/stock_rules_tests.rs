//! Product stock rules tests
//!
//! Covers the stock arithmetic and status derivation around products:
//! - initial stock seeds history and derives status
//! - stock addition arithmetic and history append
//! - the stock-bound delete guard

use chrono::Utc;
use proptest::prelude::*;
use shared::{ProductStatus, StockEntry};

/// History seeded at creation: one entry for a positive initial stock,
/// nothing otherwise.
fn seed_history(initial_stock: i32, notes: Option<String>) -> Vec<StockEntry> {
    if initial_stock > 0 {
        vec![StockEntry {
            quantity: initial_stock,
            date: Utc::now(),
            notes,
        }]
    } else {
        Vec::new()
    }
}

/// Stock addition as the service applies it.
fn apply_stock_addition(
    stock: i32,
    total_received: i32,
    history: &mut Vec<StockEntry>,
    quantity: i32,
    notes: Option<String>,
) -> (i32, i32, ProductStatus) {
    let new_stock = stock + quantity;
    let new_total = total_received + quantity;
    history.push(StockEntry {
        quantity,
        date: Utc::now(),
        notes,
    });
    (new_stock, new_total, ProductStatus::from_stock(new_stock))
}

/// The delete guard: products holding stock cannot be removed.
fn delete_allowed(stock: i32) -> bool {
    stock == 0
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn zero_initial_stock_is_out_of_stock_with_empty_history() {
        let history = seed_history(0, Some("should not appear".to_string()));
        assert!(history.is_empty());
        assert_eq!(ProductStatus::from_stock(0), ProductStatus::OutOfStock);
    }

    #[test]
    fn positive_initial_stock_is_in_stock_with_one_entry() {
        let history = seed_history(5, Some("first delivery".to_string()));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quantity, 5);
        assert_eq!(ProductStatus::from_stock(5), ProductStatus::InStock);
    }

    #[test]
    fn stock_addition_updates_all_derived_fields() {
        let mut history = seed_history(3, None);
        let (stock, total, status) =
            apply_stock_addition(3, 3, &mut history, 7, Some("restock".to_string()));

        assert_eq!(stock, 10);
        assert_eq!(total, 10);
        assert_eq!(status, ProductStatus::InStock);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].quantity, 7);
    }

    #[test]
    fn zero_quantity_addition_still_records_history() {
        let mut history = seed_history(0, None);
        let (stock, total, status) = apply_stock_addition(0, 0, &mut history, 0, None);

        assert_eq!(stock, 0);
        assert_eq!(total, 0);
        assert_eq!(status, ProductStatus::OutOfStock);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn addition_flips_out_of_stock_to_in_stock() {
        let mut history = Vec::new();
        let (_, _, status) = apply_stock_addition(0, 12, &mut history, 4, None);
        assert_eq!(status, ProductStatus::InStock);
    }

    #[test]
    fn delete_guard_blocks_stocked_products() {
        assert!(!delete_allowed(1));
        assert!(!delete_allowed(250));
        assert!(delete_allowed(0));
    }
}

proptest! {
    /// stock S plus quantity Q always yields S+Q / total+Q and exactly one
    /// new history entry; status is in_stock iff the new level is positive.
    #[test]
    fn stock_addition_arithmetic(
        initial in 0i32..10_000,
        quantity in 0i32..10_000,
    ) {
        let mut history = seed_history(initial, None);
        let before = history.len();
        let (stock, total, status) =
            apply_stock_addition(initial, initial, &mut history, quantity, None);

        prop_assert_eq!(stock, initial + quantity);
        prop_assert_eq!(total, initial + quantity);
        prop_assert_eq!(history.len(), before + 1);
        prop_assert_eq!(status == ProductStatus::InStock, stock > 0);
    }

    /// total_stock_received never decreases across a run of additions.
    #[test]
    fn total_received_is_monotonic(quantities in prop::collection::vec(0i32..1_000, 0..20)) {
        let mut history = Vec::new();
        let mut stock = 0;
        let mut total = 0;
        for q in quantities {
            let previous_total = total;
            let (s, t, _) = apply_stock_addition(stock, total, &mut history, q, None);
            stock = s;
            total = t;
            prop_assert!(total >= previous_total);
            prop_assert!(stock >= 0);
        }
    }
}
