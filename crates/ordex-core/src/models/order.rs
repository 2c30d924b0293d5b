//! Order record models: extracted details, order classification, and
//! reference matches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of detail (label, value) slots in every extracted record.
pub const DETAIL_SLOTS: usize = 10;

/// Number of remark slots in every extracted record.
pub const REMARK_SLOTS: usize = 6;

/// Total scalar fields produced by detail extraction (10 pairs + 6 remarks).
pub const EXTRACTED_FIELDS: usize = DETAIL_SLOTS * 2 + REMARK_SLOTS;

/// A `label: value` line taken from a description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailPair {
    /// Text left of the first colon.
    pub label: String,
    /// Text right of the first colon (the "FAB" column).
    pub value: String,
}

impl DetailPair {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Fixed-shape result of detail/remark extraction.
///
/// Always holds exactly [`DETAIL_SLOTS`] detail pairs and [`REMARK_SLOTS`]
/// remarks; unused slots are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDetails {
    /// Detail pairs in order of first appearance.
    pub details: [DetailPair; DETAIL_SLOTS],
    /// Remark lines following the remark marker, in order.
    pub remarks: [String; REMARK_SLOTS],
}

impl ExtractedDetails {
    /// An all-empty record.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.details
            .iter()
            .all(|d| d.label.is_empty() && d.value.is_empty())
            && self.remarks.iter().all(String::is_empty)
    }

    /// Flatten to the 26 output fields: interleaved (label, value) pairs
    /// followed by the remarks.
    pub fn to_fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(EXTRACTED_FIELDS);
        for pair in &self.details {
            fields.push(pair.label.clone());
            fields.push(pair.value.clone());
        }
        fields.extend(self.remarks.iter().cloned());
        fields
    }

    /// Values of the detail pairs whose trimmed label equals `label`, in slot order.
    pub fn values_labelled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let label = label.trim();
        self.details
            .iter()
            .filter(move |pair| !label.is_empty() && pair.label.trim() == label)
            .map(|pair| pair.value.as_str())
    }

    /// Column names matching [`ExtractedDetails::to_fields`].
    pub fn column_names() -> Vec<String> {
        let mut names = Vec::with_capacity(EXTRACTED_FIELDS);
        for i in 1..=DETAIL_SLOTS {
            names.push(format!("DETAIL {i}"));
            names.push(format!("FAB {i}"));
        }
        names.extend((1..=REMARK_SLOTS).map(|i| format!("REMARK ORDER {i}")));
        names
    }
}

/// Top-level order kind (the `ORDER` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    #[serde(rename = "NEW ORDER")]
    NewOrder,
    #[serde(rename = "WARRANTY")]
    Warranty,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewOrder => "NEW ORDER",
            Self::Warranty => "WARRANTY",
        }
    }
}

/// Part kind (the `TYPE` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartKind {
    #[serde(rename = "FIXED PART")]
    FixedPart,
    #[serde(rename = "REMOVABLE PART")]
    RemovablePart,
    #[serde(rename = "INNER PART")]
    InnerPart,
    #[serde(rename = "CUSTOMADE")]
    Customade,
    #[serde(rename = "SERVICE")]
    Service,
    #[serde(rename = "STANDARD")]
    Standard,
}

impl PartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedPart => "FIXED PART",
            Self::RemovablePart => "REMOVABLE PART",
            Self::InnerPart => "INNER PART",
            Self::Customade => "CUSTOMADE",
            Self::Service => "SERVICE",
            Self::Standard => "STANDARD",
        }
    }
}

/// Classification of an order.
///
/// Only the pairs exposed as associated constants can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OrderType {
    order: OrderKind,
    part: PartKind,
}

impl OrderType {
    pub const FIXED_PART: Self = Self::new(OrderKind::NewOrder, PartKind::FixedPart);
    pub const REMOVABLE_PART: Self = Self::new(OrderKind::NewOrder, PartKind::RemovablePart);
    pub const INNER_PART: Self = Self::new(OrderKind::NewOrder, PartKind::InnerPart);
    pub const CUSTOMADE: Self = Self::new(OrderKind::NewOrder, PartKind::Customade);
    pub const WARRANTY_SERVICE: Self = Self::new(OrderKind::Warranty, PartKind::Service);
    pub const STANDARD: Self = Self::new(OrderKind::NewOrder, PartKind::Standard);

    const fn new(order: OrderKind, part: PartKind) -> Self {
        Self { order, part }
    }

    pub fn order(&self) -> OrderKind {
        self.order
    }

    pub fn part(&self) -> PartKind {
        self.part
    }
}

impl Default for OrderType {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.order.as_str(), self.part.as_str())
    }
}

/// The fields of one input row that the order rules look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderRecord {
    /// Record key; blank or missing rows are dropped from final output.
    pub pi: Option<String>,
    /// Plain-text description (after markup normalization).
    pub description: Option<String>,
    /// Item code, empty when absent.
    pub item_code: String,
    /// Values of every "Detail Description 2" column, in column order.
    pub detail_description_2: Vec<String>,
}

impl OrderRecord {
    /// Whether the record has a usable key.
    pub fn has_key(&self) -> bool {
        self.pi.as_deref().is_some_and(|pi| !pi.trim().is_empty())
    }

    /// First non-blank "Detail Description 2" value, or empty.
    pub fn primary_detail_description_2(&self) -> &str {
        self.detail_description_2
            .iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

/// A reference row chosen for a record by the enrichment matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMatch {
    /// Full item code of the matched reference row (`ITEM_CODE_2`).
    pub item_code: String,
    /// Model of the matched reference row (`MODEL`).
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_details_have_fixed_shape() {
        let details = ExtractedDetails::empty();
        assert!(details.is_empty());
        assert_eq!(details.to_fields().len(), EXTRACTED_FIELDS);
        assert!(details.to_fields().iter().all(String::is_empty));
    }

    #[test]
    fn test_column_names_interleave_detail_and_fab() {
        let names = ExtractedDetails::column_names();
        assert_eq!(names.len(), 26);
        assert_eq!(&names[..4], ["DETAIL 1", "FAB 1", "DETAIL 2", "FAB 2"]);
        assert_eq!(names[19], "FAB 10");
        assert_eq!(names[20], "REMARK ORDER 1");
        assert_eq!(names[25], "REMARK ORDER 6");
    }

    #[test]
    fn test_values_labelled() {
        let mut details = ExtractedDetails::empty();
        details.details[0] = DetailPair::new("Detail Description 1", "Door");
        details.details[1] = DetailPair::new(" Detail Description 2 ", "Panel (F)");
        details.details[2] = DetailPair::new("Detail Description 2", "Frame");

        let values: Vec<&str> = details.values_labelled("Detail Description 2").collect();
        assert_eq!(values, ["Panel (F)", "Frame"]);
        assert_eq!(details.values_labelled("").count(), 0);
    }

    #[test]
    fn test_order_type_strings() {
        assert_eq!(OrderType::WARRANTY_SERVICE.order().as_str(), "WARRANTY");
        assert_eq!(OrderType::CUSTOMADE.part().as_str(), "CUSTOMADE");
        assert_eq!(OrderType::default(), OrderType::STANDARD);
        assert_eq!(OrderType::FIXED_PART.to_string(), "NEW ORDER / FIXED PART");
    }

    #[test]
    fn test_record_key_and_primary_description() {
        let record = OrderRecord {
            pi: Some("  ".to_string()),
            detail_description_2: vec!["".to_string(), " ABC-1 (F) ".to_string()],
            ..Default::default()
        };
        assert!(!record.has_key());
        assert_eq!(record.primary_detail_description_2(), "ABC-1 (F)");
    }
}
