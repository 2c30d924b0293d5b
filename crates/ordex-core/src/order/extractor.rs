//! Detail and remark extraction from order descriptions.
//!
//! A description is a list of `label: value` lines, optionally followed by
//! an `ORDER REMARK` marker line and up to six remark lines:
//!
//! ```text
//! Detail Description 1: Door
//! Detail Description 2: Panel (F)
//! ORDER REMARK
//! first remark
//! second remark
//! ```

use tracing::trace;

use super::patterns::{is_line_break, ORDER_REMARK_MARKER};
use crate::models::order::{DetailPair, ExtractedDetails, DETAIL_SLOTS, REMARK_SLOTS};

/// Parses descriptions into fixed-shape [`ExtractedDetails`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailExtractor;

impl DetailExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract details and remarks. Missing text yields an all-empty record.
    pub fn extract(&self, text: Option<&str>) -> ExtractedDetails {
        let mut extracted = ExtractedDetails::empty();
        let Some(text) = text else {
            return extracted;
        };

        let mut detail_idx = 0;
        let mut remark_idx = 0;
        let mut remark_mode = false;
        let mut dropped = 0usize;

        let lines = text
            .split(is_line_break)
            .map(str::trim)
            .filter(|line| !line.is_empty());

        for line in lines {
            if remark_mode {
                if remark_idx < REMARK_SLOTS {
                    let remark = match line.split_once(':') {
                        Some((_, rest)) => rest.trim(),
                        None => line,
                    };
                    extracted.remarks[remark_idx] = remark.to_string();
                    remark_idx += 1;
                } else {
                    dropped += 1;
                }
                continue;
            }

            if is_remark_marker(line) {
                remark_mode = true;
                continue;
            }

            if let Some((label, value)) = line.split_once(':') {
                if detail_idx < DETAIL_SLOTS {
                    extracted.details[detail_idx] = DetailPair::new(label.trim(), value.trim());
                    detail_idx += 1;
                } else {
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            trace!("Dropped {} lines beyond the detail/remark slots", dropped);
        }

        extracted
    }
}

fn is_remark_marker(line: &str) -> bool {
    line.to_uppercase().starts_with(ORDER_REMARK_MARKER)
}

/// Extract details and remarks from a description.
pub fn extract_details(text: Option<&str>) -> ExtractedDetails {
    DetailExtractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_text_is_all_empty() {
        let extracted = extract_details(None);
        assert!(extracted.is_empty());
        assert_eq!(extracted.to_fields(), vec![String::new(); 26]);
    }

    #[test]
    fn test_blank_text_is_all_empty() {
        assert!(extract_details(Some("  \n\r\n ")).is_empty());
    }

    #[test]
    fn test_details_and_remarks_in_order() {
        let text = "Detail Description 1: Door\n\
                    Detail Description 2: Panel (F)\n\
                    ORDER REMARK\n\
                    first remark\n\
                    second remark\n";
        let extracted = extract_details(Some(text));

        assert_eq!(
            extracted.details[0],
            DetailPair::new("Detail Description 1", "Door")
        );
        assert_eq!(
            extracted.details[1],
            DetailPair::new("Detail Description 2", "Panel (F)")
        );
        assert!(extracted.details[2..].iter().all(|d| d == &DetailPair::default()));
        assert_eq!(extracted.remarks[0], "first remark");
        assert_eq!(extracted.remarks[1], "second remark");
        assert!(extracted.remarks[2..].iter().all(String::is_empty));
    }

    #[test]
    fn test_splits_on_first_colon_only() {
        let extracted = extract_details(Some("Time: 10:30 sharp"));
        assert_eq!(extracted.details[0], DetailPair::new("Time", "10:30 sharp"));
    }

    #[test]
    fn test_lines_without_colon_are_ignored() {
        let extracted = extract_details(Some("just a note\nColour: Red"));
        assert_eq!(extracted.details[0], DetailPair::new("Colour", "Red"));
        assert_eq!(extracted.details[1], DetailPair::default());
    }

    #[test]
    fn test_only_first_ten_details_are_kept() {
        let text: String = (1..=13).map(|i| format!("Label {i}: value {i}\n")).collect();
        let extracted = extract_details(Some(&text));

        for (i, pair) in extracted.details.iter().enumerate() {
            assert_eq!(pair.value, format!("value {}", i + 1));
        }
    }

    #[test]
    fn test_remark_values_after_colon_and_overflow_dropped() {
        let text = "order remark: header\n\
                    Note: leave at gate\n\
                    r2\nr3\nr4\nr5\nr6\nr7\n";
        let extracted = extract_details(Some(text));

        assert_eq!(
            extracted.remarks,
            ["leave at gate", "r2", "r3", "r4", "r5", "r6"].map(String::from)
        );
        assert!(extracted.details.iter().all(|d| d == &DetailPair::default()));
    }

    #[test]
    fn test_second_marker_is_a_remark() {
        let text = "ORDER REMARK\nalpha\nORDER REMARK\nbeta";
        let extracted = extract_details(Some(text));
        assert_eq!(extracted.remarks[..3], ["alpha", "ORDER REMARK", "beta"]);
    }

    #[test]
    fn test_details_after_marker_become_remarks() {
        let text = "A: 1\nORDER REMARK\nB: 2";
        let extracted = extract_details(Some(text));
        assert_eq!(extracted.details[0], DetailPair::new("A", "1"));
        assert_eq!(extracted.details[1], DetailPair::default());
        assert_eq!(extracted.remarks[0], "2");
    }

    #[test]
    fn test_crlf_line_endings() {
        let extracted = extract_details(Some("A: 1\r\nB: 2\r\n"));
        assert_eq!(extracted.details[1], DetailPair::new("B", "2"));
    }
}
