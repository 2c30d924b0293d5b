//! Common patterns for order description parsing.

use lazy_static::lazy_static;
use regex::Regex;

/// Marker line that starts the remark block (matched case-insensitively).
pub const ORDER_REMARK_MARKER: &str = "ORDER REMARK";

lazy_static! {
    // Delivery remark: rest of the line after "REMARK DELIVERY:"
    pub static ref REMARK_DELIVERY: Regex = Regex::new(
        r"(?i)REMARK DELIVERY\s*:\s*(.*)"
    ).unwrap();

    // Trailing parenthesized tag, e.g. "ABC-100 (F)"
    pub static ref TRAILING_PAREN_GROUP: Regex = Regex::new(
        r"\s*\([^)]*\)$"
    ).unwrap();
}

/// Split on any line break recognized in free text.
pub fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}'
    )
}
