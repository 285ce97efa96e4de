//! Identifier generation tests
//!
//! Covers slug normalization, collision probing, and sequential entity
//! codes:
//! - a second slug generated from the same name gets a numeric suffix
//! - dealer/product codes are strictly increasing with no duplicates
//! - unparseable codes fail loudly instead of restarting the sequence

use std::collections::HashSet;

use proptest::prelude::*;
use shared::ident::{
    next_sequential_code, numbered_slug, slugify, CODE_WIDTH, DEALER_CODE_PREFIX,
    PRODUCT_CODE_PREFIX,
};

/// The probing loop as the services run it, with the collection's
/// "is this slug taken" answer backed by a set.
fn probe_slug(taken: &HashSet<String>, name: &str) -> String {
    let base = slugify(name);
    let mut candidate = base.clone();
    let mut n = 1u32;
    while taken.contains(&candidate) {
        candidate = numbered_slug(&base, n);
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn slug_is_url_safe() {
        assert_eq!(slugify("Samsung TV"), "samsung-tv");
        assert_eq!(slugify("A.C. & Refrigeration!"), "a-c-refrigeration");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
    }

    #[test]
    fn second_generation_gets_numeric_suffix() {
        let mut taken = HashSet::new();

        let first = probe_slug(&taken, "Samsung TV");
        assert_eq!(first, "samsung-tv");
        taken.insert(first.clone());

        let second = probe_slug(&taken, "Samsung TV");
        assert_eq!(second, "samsung-tv-1");
        assert_ne!(first, second);
        taken.insert(second);

        let third = probe_slug(&taken, "Samsung TV");
        assert_eq!(third, "samsung-tv-2");
    }

    #[test]
    fn probing_skips_over_occupied_suffixes() {
        let taken: HashSet<String> = ["tv", "tv-1", "tv-2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(probe_slug(&taken, "TV"), "tv-3");
    }

    #[test]
    fn dealer_codes_start_at_one_and_increment() {
        assert_eq!(
            next_sequential_code(DEALER_CODE_PREFIX, CODE_WIDTH, None).unwrap(),
            "DLR001"
        );
        assert_eq!(
            next_sequential_code(DEALER_CODE_PREFIX, CODE_WIDTH, Some("DLR001")).unwrap(),
            "DLR002"
        );
        assert_eq!(
            next_sequential_code(PRODUCT_CODE_PREFIX, CODE_WIDTH, Some("PRD099")).unwrap(),
            "PRD100"
        );
    }

    #[test]
    fn corrupt_highest_code_is_fatal() {
        assert!(next_sequential_code(DEALER_CODE_PREFIX, CODE_WIDTH, Some("DLRabc")).is_err());
        assert!(next_sequential_code(DEALER_CODE_PREFIX, CODE_WIDTH, Some("041")).is_err());
        assert!(next_sequential_code(DEALER_CODE_PREFIX, CODE_WIDTH, Some("")).is_err());
    }
}

proptest! {
    /// Slugs only ever contain lowercase alphanumerics and inner hyphens.
    #[test]
    fn slugs_are_always_url_safe(name in ".{0,64}") {
        let slug = slugify(&name);
        prop_assert!(!slug.is_empty());
        prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
    }

    /// Normalization is idempotent: a slug normalizes to itself.
    #[test]
    fn slugify_is_idempotent(name in ".{0,64}") {
        let once = slugify(&name);
        prop_assert_eq!(slugify(&once), once.clone());
    }

    /// Repeated probing against a growing collection never repeats a slug.
    #[test]
    fn probing_never_duplicates(name in "[a-zA-Z ]{1,20}", count in 1usize..20) {
        let mut taken = HashSet::new();
        for _ in 0..count {
            let slug = probe_slug(&taken, &name);
            prop_assert!(taken.insert(slug));
        }
    }

    /// Code sequences are strictly increasing with no duplicates.
    #[test]
    fn code_sequence_strictly_increases(count in 1usize..50) {
        let mut highest: Option<String> = None;
        let mut numbers = Vec::new();
        for _ in 0..count {
            let code = next_sequential_code(DEALER_CODE_PREFIX, CODE_WIDTH, highest.as_deref()).unwrap();
            let number: u64 = code.strip_prefix(DEALER_CODE_PREFIX).unwrap().parse().unwrap();
            numbers.push(number);
            highest = Some(code);
        }
        prop_assert_eq!(numbers[0], 1);
        prop_assert!(numbers.windows(2).all(|w| w[1] == w[0] + 1));
    }
}
