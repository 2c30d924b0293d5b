//! Rule-based order classification.

use crate::models::order::{OrderRecord, OrderType};

/// Part tags in "Detail Description 2" values, checked in this order.
const PART_TAG_RULES: [(&str, OrderType); 3] = [
    ("(F)", OrderType::FIXED_PART),
    ("(R)", OrderType::REMOVABLE_PART),
    ("(I)", OrderType::INNER_PART),
];

/// Item code prefixes, checked after the part tags.
const ITEM_CODE_RULES: [(char, OrderType); 2] = [
    ('U', OrderType::CUSTOMADE),
    ('Y', OrderType::WARRANTY_SERVICE),
];

/// Derives the (ORDER, TYPE) pair of a record. First matching rule wins:
///
/// 1. a part tag in any "Detail Description 2" value, columns in order;
/// 2. the first letter of the item code;
/// 3. `NEW ORDER / STANDARD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderClassifier;

impl OrderClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, record: &OrderRecord) -> OrderType {
        for value in &record.detail_description_2 {
            if let Some(order_type) = part_tag(value) {
                return order_type;
            }
        }

        item_code_rule(&record.item_code).unwrap_or(OrderType::STANDARD)
    }
}

fn part_tag(value: &str) -> Option<OrderType> {
    PART_TAG_RULES
        .iter()
        .find(|(tag, _)| value.contains(tag))
        .map(|&(_, order_type)| order_type)
}

fn item_code_rule(item_code: &str) -> Option<OrderType> {
    let first = item_code.trim().chars().next()?.to_uppercase().next()?;
    ITEM_CODE_RULES
        .iter()
        .find(|(prefix, _)| *prefix == first)
        .map(|&(_, order_type)| order_type)
}

/// Classify a record.
pub fn classify(record: &OrderRecord) -> OrderType {
    OrderClassifier::new().classify(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(desc2: &[&str], item_code: &str) -> OrderRecord {
        OrderRecord {
            item_code: item_code.to_string(),
            detail_description_2: desc2.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_part_tags() {
        assert_eq!(classify(&record(&["Panel (F)"], "")), OrderType::FIXED_PART);
        assert_eq!(classify(&record(&["Cover (R)"], "")), OrderType::REMOVABLE_PART);
        assert_eq!(classify(&record(&["Lining (I)"], "")), OrderType::INNER_PART);
    }

    #[test]
    fn test_part_tag_beats_item_code() {
        assert_eq!(classify(&record(&["Panel (F)"], "Y55")), OrderType::FIXED_PART);
        assert_eq!(classify(&record(&["Panel (F)"], "U123")), OrderType::FIXED_PART);
    }

    #[test]
    fn test_tag_order_within_a_column() {
        assert_eq!(classify(&record(&["A (R) B (F)"], "")), OrderType::FIXED_PART);
        assert_eq!(classify(&record(&["A (I) B (R)"], "")), OrderType::REMOVABLE_PART);
    }

    #[test]
    fn test_columns_checked_in_order() {
        assert_eq!(
            classify(&record(&["", "X (I)", "Y (F)"], "")),
            OrderType::INNER_PART
        );
    }

    #[test]
    fn test_item_code_rules() {
        assert_eq!(classify(&record(&[""], "U123")), OrderType::CUSTOMADE);
        assert_eq!(classify(&record(&[], " u9")), OrderType::CUSTOMADE);
        assert_eq!(classify(&record(&[], "Y55")), OrderType::WARRANTY_SERVICE);
        assert_eq!(classify(&record(&[], "A100")), OrderType::STANDARD);
    }

    #[test]
    fn test_defaults_to_standard() {
        assert_eq!(classify(&record(&[], "")), OrderType::STANDARD);
        assert_eq!(classify(&record(&["Panel"], "   ")), OrderType::STANDARD);
    }
}
