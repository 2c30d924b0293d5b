//! Delivery remark extraction.

use super::patterns::REMARK_DELIVERY;
use super::{ExtractionMatch, FieldExtractor};

/// Finds `REMARK DELIVERY: ...` anywhere in a description.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryRemarkExtractor;

impl DeliveryRemarkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for DeliveryRemarkExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        REMARK_DELIVERY
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let value = caps.get(1)?.as_str().trim().to_string();
                Some(
                    ExtractionMatch::new(value, full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }
}

/// Delivery remark of a description, empty if absent.
pub fn extract_remark_delivery(text: Option<&str>) -> String {
    text.and_then(|t| DeliveryRemarkExtractor::new().extract(t))
        .map(|m| m.value)
        .unwrap_or_default()
}
