//! Prefix matching of order records against the reference table.

use tracing::debug;

use super::{ReferenceEntry, ReferenceTable};
use crate::models::order::{OrderRecord, ReferenceMatch};
use crate::order::patterns::TRAILING_PAREN_GROUP;

/// Strip a trailing parenthesized tag: `"ABC-100 (F)"` becomes `"ABC-100"`.
pub fn clean_description(description: &str) -> String {
    TRAILING_PAREN_GROUP
        .replace(description.trim(), "")
        .trim()
        .to_string()
}

/// Finds the reference row for a record by item-code prefix.
///
/// A reference row matches when its item code starts with the lookup string.
/// The lookup string is the record's item code; records without a match fall
/// back to their cleaned "Detail Description 2". When several rows match, the
/// earliest row of the reference table wins, so results never depend on
/// whether records are matched one at a time or in a batch.
pub struct ReferenceMatcher<'a> {
    table: &'a ReferenceTable,
    /// Entry indices sorted by item code, ties in table order.
    sorted: Vec<usize>,
}

impl<'a> ReferenceMatcher<'a> {
    /// Build the prefix index over a reference table.
    pub fn new(table: &'a ReferenceTable) -> Self {
        let entries = table.entries();
        let mut sorted: Vec<usize> = (0..entries.len()).collect();
        sorted.sort_by(|&a, &b| entries[a].item_code.cmp(&entries[b].item_code).then(a.cmp(&b)));
        Self { table, sorted }
    }

    /// Earliest entry whose item code starts with `prefix`.
    ///
    /// Blank prefixes never match.
    pub fn find_prefix(&self, prefix: &str) -> Option<&'a ReferenceEntry> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return None;
        }

        let entries = self.table.entries();
        // Every code starting with `prefix` sorts at or after it, contiguously.
        let start = self
            .sorted
            .partition_point(|&i| entries[i].item_code.as_str() < prefix);

        self.sorted[start..]
            .iter()
            .copied()
            .take_while(|&i| entries[i].item_code.starts_with(prefix))
            .min()
            .map(|i| &entries[i])
    }

    /// Match by item code only.
    pub fn match_primary(&self, record: &OrderRecord) -> Option<ReferenceMatch> {
        self.find_prefix(&record.item_code).map(to_match)
    }

    /// Match by cleaned "Detail Description 2" only.
    pub fn match_fallback(&self, record: &OrderRecord) -> Option<ReferenceMatch> {
        let cleaned = clean_description(record.primary_detail_description_2());
        self.find_prefix(&cleaned).map(to_match)
    }

    /// Match one record: item code first, cleaned description second.
    pub fn match_record(&self, record: &OrderRecord) -> Option<ReferenceMatch> {
        self.match_primary(record)
            .or_else(|| self.match_fallback(record))
    }

    /// Match every record; the result has one slot per record.
    pub fn match_all(&self, records: &[OrderRecord]) -> Vec<Option<ReferenceMatch>> {
        let mut matches: Vec<Option<ReferenceMatch>> =
            records.iter().map(|r| self.match_primary(r)).collect();
        let primary = matches.iter().filter(|m| m.is_some()).count();

        for (slot, record) in matches.iter_mut().zip(records) {
            if slot.is_none() {
                *slot = self.match_fallback(record);
            }
        }
        let total = matches.iter().filter(|m| m.is_some()).count();

        debug!(
            "Matched {} of {} records ({} by item code, {} by description)",
            total,
            records.len(),
            primary,
            total - primary
        );

        matches
    }
}

fn to_match(entry: &ReferenceEntry) -> ReferenceMatch {
    ReferenceMatch {
        item_code: entry.item_code.clone(),
        model: entry.model.clone(),
    }
}
