//! Compiled regex patterns for text classification.
//!
//! All patterns are compiled once at startup using `LazyLock` for efficiency.
//! They drive the coarse text-pattern class of structure signatures and the
//! content heuristics used by field semantic scoring.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Content Pattern Detection
// =============================================================================

/// Matches currency-like text: a symbol next to digits, or a trailing
/// three-letter currency code.
pub static CURRENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([$€£¥₹]\s*\d[\d.,]*|\d[\d.,]*\s*[$€£¥₹]|\d[\d.,]*\s?(usd|eur|gbp|jpy|aud|cad)\b)")
        .expect("CURRENCY regex")
});

/// Matches email addresses.
pub static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("EMAIL regex")
});

/// Matches phone-number-like digit runs with common separators.
///
/// Requires at least 7 digits overall so prices and years don't trigger it.
pub static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\(?\d{2,4}\)?[\s.\-]?\d{3}[\s.\-]?\d{3,4}([\s.\-]?\d{2,4})?")
        .expect("PHONE regex")
});

/// Matches date patterns in various formats.
pub static DATE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4}|\w+\s+\d{1,2},?\s+\d{4})",
    )
    .expect("DATE_TEXT regex")
});

/// Matches text that is entirely numeric (with grouping punctuation).
pub static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\d\s.,%+\-]+$").expect("NUMERIC regex")
});

/// Matches short capitalized word runs, typical of names and titles.
pub static PROPER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Z][a-zA-Z'\-]*\s+){0,4}[A-Z][a-zA-Z'\-]*\.?$").expect("PROPER_NAME regex")
});

// =============================================================================
// Text Cleaning
// =============================================================================

/// Matches multiple whitespace characters for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex")
});

// =============================================================================
// Class Token Filtering
// =============================================================================

/// Class tokens too common to identify anything on their own.
///
/// Dynamic field discovery skips these when proposing a selector from an
/// element's "most distinctive" class.
pub const GENERIC_CLASS_TOKENS: &[&str] = &[
    "container", "wrapper", "wrap", "inner", "outer", "row", "col", "column",
    "grid", "flex", "block", "box", "content", "main", "section", "item",
    "left", "right", "center", "top", "bottom", "active", "visible", "hidden",
    "first", "last", "odd", "even", "clearfix", "small", "large", "medium",
];

/// Returns true if a class token is too generic to be a distinctive selector.
#[must_use]
pub fn is_generic_class(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    GENERIC_CLASS_TOKENS.contains(&lower.as_str())
        // Utility-class prefixes (bootstrap/tailwind style spacing helpers)
        || lower.len() <= 2
        || lower.chars().all(|c| c.is_ascii_digit() || c == '-')
}

/// Collapse internal whitespace and trim, for sample text storage.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    WHITESPACE_NORMALIZE.replace_all(text.trim(), " ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_matches_common_formats() {
        assert!(CURRENCY.is_match("$19.99"));
        assert!(CURRENCY.is_match("1 299 €"));
        assert!(CURRENCY.is_match("12.50 USD"));
        assert!(!CURRENCY.is_match("just text"));
        assert!(!CURRENCY.is_match("2024-01-15"));
    }

    #[test]
    fn email_matches_addresses_only() {
        assert!(EMAIL.is_match("contact@example.com"));
        assert!(EMAIL.is_match("mail me at first.last@sub.domain.org today"));
        assert!(!EMAIL.is_match("no at sign here"));
    }

    #[test]
    fn phone_requires_enough_digits() {
        assert!(PHONE.is_match("+1 (555) 123-4567"));
        assert!(PHONE.is_match("0221 555 7788"));
        assert!(!PHONE.is_match("room 42"));
    }

    #[test]
    fn date_text_matches_iso_and_prose_dates() {
        assert!(DATE_TEXT.is_match("2024-01-15"));
        assert!(DATE_TEXT.is_match("Published January 5, 2024"));
        assert!(!DATE_TEXT.is_match("no date"));
    }

    #[test]
    fn numeric_matches_whole_numeric_strings() {
        assert!(NUMERIC.is_match("1,234.56"));
        assert!(NUMERIC.is_match("42"));
        assert!(!NUMERIC.is_match("42 items"));
    }

    #[test]
    fn proper_name_matches_capitalized_runs() {
        assert!(PROPER_NAME.is_match("Jane Smith"));
        assert!(PROPER_NAME.is_match("Acme Corp."));
        assert!(!PROPER_NAME.is_match("lowercase words here"));
    }

    #[test]
    fn generic_class_tokens_are_filtered() {
        assert!(is_generic_class("container"));
        assert!(is_generic_class("row"));
        assert!(is_generic_class("px"));
        assert!(!is_generic_class("product-title"));
        assert!(!is_generic_class("price"));
    }

    #[test]
    fn normalize_text_collapses_whitespace() {
        assert_eq!(normalize_text("  hello \n  world  "), "hello world");
    }
}
