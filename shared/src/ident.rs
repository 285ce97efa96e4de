//! Identifier generation: URL slugs and sequential entity codes
//!
//! Slugs are derived from human-readable names and made unique by sequential
//! probing against the owning collection (`base`, `base-1`, `base-2`, ...).
//! Codes are short prefixed counters ("DLR001", "PRD042") derived from the
//! highest code already assigned.

use thiserror::Error;

/// Prefix for dealer codes.
pub const DEALER_CODE_PREFIX: &str = "DLR";

/// Prefix for product codes.
pub const PRODUCT_CODE_PREFIX: &str = "PRD";

/// Zero-padded width of the numeric suffix in entity codes.
pub const CODE_WIDTH: usize = 3;

/// Fallback slug base for names that normalize to nothing.
const EMPTY_SLUG_FALLBACK: &str = "item";

/// Error raised when an existing code cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("existing code {0:?} does not start with prefix {1:?}")]
    WrongPrefix(String, String),

    #[error("existing code {0:?} has a non-numeric suffix")]
    BadSuffix(String),
}

/// Normalize a free-text name into a URL-safe slug base.
///
/// Lowercases, keeps ASCII alphanumerics, and collapses every other run of
/// characters into a single hyphen. Leading and trailing separators are
/// dropped. A name with no usable characters falls back to `"item"` so the
/// result is always a valid lookup key.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        slug.push_str(EMPTY_SLUG_FALLBACK);
    }
    slug
}

/// The nth collision-probe candidate for a slug base (n starts at 1).
pub fn numbered_slug(base: &str, n: u32) -> String {
    format!("{base}-{n}")
}

/// Compute the next sequential code for a collection.
///
/// `highest` is the lexicographically greatest existing code, or `None` for
/// an empty collection (which starts the sequence at 1). The numeric suffix
/// of the highest code is parsed and incremented; a suffix that does not
/// parse is an error for the whole operation, never a silent restart of the
/// sequence.
pub fn next_sequential_code(
    prefix: &str,
    width: usize,
    highest: Option<&str>,
) -> Result<String, CodeError> {
    let next = match highest {
        None => 1,
        Some(code) => {
            let suffix = code
                .strip_prefix(prefix)
                .ok_or_else(|| CodeError::WrongPrefix(code.to_string(), prefix.to_string()))?;
            let number: u64 = suffix
                .parse()
                .map_err(|_| CodeError::BadSuffix(code.to_string()))?;
            number + 1
        }
    };
    Ok(format!("{prefix}{next:0width$}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Samsung TV"), "samsung-tv");
        assert_eq!(slugify("  ACME   Traders Ltd. "), "acme-traders-ltd");
        assert_eq!(slugify("Electronics"), "electronics");
    }

    #[test]
    fn slugify_collapses_separator_runs() {
        assert_eq!(slugify("a -- b__c"), "a-b-c");
        assert_eq!(slugify("40\" Smart TV (HDR)"), "40-smart-tv-hdr");
    }

    #[test]
    fn slugify_empty_name_falls_back() {
        assert_eq!(slugify(""), "item");
        assert_eq!(slugify("!!!"), "item");
    }

    #[test]
    fn numbered_slug_appends_counter() {
        assert_eq!(numbered_slug("samsung-tv", 1), "samsung-tv-1");
        assert_eq!(numbered_slug("samsung-tv", 12), "samsung-tv-12");
    }

    #[test]
    fn first_code_starts_at_one() {
        assert_eq!(
            next_sequential_code(DEALER_CODE_PREFIX, CODE_WIDTH, None),
            Ok("DLR001".to_string())
        );
    }

    #[test]
    fn code_increments_highest() {
        assert_eq!(
            next_sequential_code(DEALER_CODE_PREFIX, CODE_WIDTH, Some("DLR041")),
            Ok("DLR042".to_string())
        );
        assert_eq!(
            next_sequential_code(PRODUCT_CODE_PREFIX, CODE_WIDTH, Some("PRD009")),
            Ok("PRD010".to_string())
        );
    }

    #[test]
    fn code_grows_past_padding() {
        assert_eq!(
            next_sequential_code(PRODUCT_CODE_PREFIX, CODE_WIDTH, Some("PRD999")),
            Ok("PRD1000".to_string())
        );
    }

    #[test]
    fn unparseable_code_fails_loudly() {
        assert_eq!(
            next_sequential_code(DEALER_CODE_PREFIX, CODE_WIDTH, Some("DLRX41")),
            Err(CodeError::BadSuffix("DLRX41".to_string()))
        );
        assert_eq!(
            next_sequential_code(DEALER_CODE_PREFIX, CODE_WIDTH, Some("PRD001")),
            Err(CodeError::WrongPrefix(
                "PRD001".to_string(),
                "DLR".to_string()
            ))
        );
    }
}
