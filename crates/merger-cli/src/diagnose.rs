//! Raw column label diagnostics.
//!
//! Look-alike characters (full-width letters, `含` vs `合`, non-breaking
//! spaces) make labels miss the registry. Printing each code point makes
//! them visible.

use merger_map::{ColumnResolver, NormalizedKey};

/// Labels longer than this are printed without a code-point breakdown.
pub const MAX_BREAKDOWN_CHARS: usize = 20;

/// `c(U+XXXX)` for each character, or `None` for long labels.
pub fn char_breakdown(label: &str) -> Option<String> {
    if label.chars().count() > MAX_BREAKDOWN_CHARS {
        return None;
    }
    let parts: Vec<String> = label
        .chars()
        .map(|c| {
            let shown = if c.is_control() || c.is_whitespace() {
                c.escape_unicode().to_string()
            } else {
                c.to_string()
            };
            format!("{shown}(U+{:04X})", u32::from(c))
        })
        .collect();
    Some(parts.join(" "))
}

/// Renders the labels of one sheet: position, label, code points, the
/// comparison key, and how the label resolves.
pub fn render_sheet(
    file: &str,
    sheet: &str,
    labels: &[String],
    resolver: &ColumnResolver,
    fuzzy: bool,
) -> String {
    let resolution = resolver.resolve(labels, fuzzy);
    let mut lines = vec![format!("{file} / {sheet} ({} columns)", labels.len())];
    for (idx, (label, column)) in labels.iter().zip(&resolution.columns).enumerate() {
        lines.push(format!("  {}. {label}", idx + 1));
        if let Some(breakdown) = char_breakdown(label) {
            lines.push(format!("     chars: {breakdown}"));
        }
        lines.push(format!("     key: {}", NormalizedKey::new(label)));
        lines.push(format!("     -> {} ({})", column.resolved, column.kind));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
