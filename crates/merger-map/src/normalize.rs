//! Canonical comparison keys for column labels.

use std::fmt;

/// Normalizes a column label for alias matching.
///
/// Every whitespace character is deleted (including newlines, carriage returns
/// and full-width spaces), and the rest is lowercased. Symbols such as `+` are
/// kept verbatim. The result is only used for comparison.
pub fn normalize_text(raw: &str) -> String {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    compact.to_lowercase()
}

/// Normalizes an optional label; an absent label is the empty key.
pub fn normalize_optional(raw: Option<&str>) -> String {
    raw.map(normalize_text).unwrap_or_default()
}

/// A normalized label, as produced by [`normalize_text`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn new(raw: &str) -> Self {
        Self(normalize_text(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters, not bytes.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_whitespace_and_lowercases() {
        assert_eq!(normalize_text("  A b\n"), normalize_text("ab"));
        assert_eq!(normalize_text("Sales\r\n Qty"), "salesqty");
        assert_eq!(normalize_text("Unit\tPrice"), "unitprice");
    }

    #[test]
    fn keeps_symbols() {
        assert_eq!(
            normalize_text("最终销售金额(销售金额+优惠券金额)"),
            "最终销售金额(销售金额+优惠券金额)"
        );
    }

    #[test]
    fn removes_full_width_space() {
        assert_eq!(normalize_text("商品\u{3000}名称"), "商品名称");
    }

    #[test]
    fn absent_label_is_empty_key() {
        assert_eq!(normalize_optional(None), "");
        assert_eq!(normalize_optional(Some(" UPC ")), "upc");
    }

    #[test]
    fn key_length_counts_chars() {
        assert_eq!(NormalizedKey::new("数量").char_len(), 2);
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "\\PC{0,24}") {
            let once = normalize_text(&raw);
            prop_assert_eq!(normalize_text(&once), once);
        }

        #[test]
        fn normalized_has_no_whitespace(raw in "[ \\t\\r\\na-zA-Z0-9+]{0,24}") {
            let key = normalize_text(&raw);
            prop_assert!(!key.chars().any(char::is_whitespace));
            prop_assert_eq!(key.clone(), key.to_lowercase());
        }
    }
}
