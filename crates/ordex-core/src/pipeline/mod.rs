//! Merge & shape pipeline: runs normalization, extraction, classification,
//! and enrichment over one or two order tables.

mod layout;

pub use layout::{parse_timestamp, ExportFormat, ExportLayout};

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{Result, TableError};
use crate::markup::{MarkupNormalizer, RtfStripper};
use crate::models::config::ColumnConfig;
use crate::models::order::{ExtractedDetails, OrderRecord, ReferenceMatch, EXTRACTED_FIELDS};
use crate::order::{extract_remark_delivery, DetailExtractor, OrderClassifier};
use crate::reference::{ReferenceMatcher, ReferenceTable};
use crate::table::{outer_join, Cell, Table};

/// Classification column names.
pub const ORDER_COLUMN: &str = "ORDER";
pub const TYPE_COLUMN: &str = "TYPE";

/// Enrichment column names (two-file mode).
pub const MATCHED_ITEM_CODE_COLUMN: &str = "ITEM_CODE_2";
pub const MODEL_COLUMN: &str = "MODEL";
pub const REMARK_DELIVERY_COLUMN: &str = "REMARK DELIVERY";

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Combined table: input columns followed by the derived columns.
    pub table: Table,
    /// Non-fatal problems encountered during the run.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Orchestrates the per-row stages over whole tables.
pub struct OrderPipeline {
    columns: ColumnConfig,
    normalizer: Box<dyn MarkupNormalizer>,
    extractor: DetailExtractor,
    classifier: OrderClassifier,
}

impl OrderPipeline {
    /// Create a pipeline reading the given input columns.
    pub fn new(columns: ColumnConfig) -> Self {
        Self {
            columns,
            normalizer: Box::new(RtfStripper::new()),
            extractor: DetailExtractor::new(),
            classifier: OrderClassifier::new(),
        }
    }

    /// Replace the markup normalizer.
    pub fn with_normalizer(mut self, normalizer: impl MarkupNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    /// Run over one or two input tables.
    ///
    /// The reference table is only consulted in two-file mode; an empty
    /// table leaves `ITEM_CODE_2` and `MODEL` unset.
    pub fn process(&self, inputs: Vec<Table>, reference: &ReferenceTable) -> Result<PipelineResult> {
        let mut inputs = inputs.into_iter();
        match (inputs.next(), inputs.next(), inputs.next()) {
            (Some(single), None, None) => self.process_single(single),
            (Some(left), Some(right), None) => self.process_pair(left, right, reference),
            (None, _, _) => Err(TableError::InputCount(0).into()),
            _ => Err(TableError::InputCount(3 + inputs.count()).into()),
        }
    }

    /// Single-file mode: extraction and classification only.
    pub fn process_single(&self, table: Table) -> Result<PipelineResult> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let mut table = self.prepare(table)?;
        info!("Processing {} rows from a single table", table.len());

        let (records, details) = self.order_rows(&table);
        self.append_derived(&mut table, &records, details);
        self.drop_unkeyed(&mut table, &mut warnings);

        Ok(PipelineResult {
            table,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Two-file mode: outer join on the key, then extraction,
    /// classification, reference enrichment, and the delivery remark.
    pub fn process_pair(
        &self,
        left: Table,
        right: Table,
        reference: &ReferenceTable,
    ) -> Result<PipelineResult> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let left = self.prepare(left)?;
        let right = self.prepare(right)?;
        let (s1, s2) = &self.columns.merge_suffixes;
        let mut table = outer_join(&left, &right, &self.columns.key, (s1.as_str(), s2.as_str()))?;
        info!(
            "Merged {} + {} rows into {} rows",
            left.len(),
            right.len(),
            table.len()
        );

        let (records, details) = self.order_rows(&table);
        self.append_derived(&mut table, &records, details);

        if reference.is_empty() {
            warn!("Reference table is empty, MODEL will be left blank");
            warnings.push("Reference table is empty; no models were matched".to_string());
        }
        let matches = ReferenceMatcher::new(reference).match_all(&records);
        self.append_matches(&mut table, matches);

        let delivery: Vec<Cell> = records
            .iter()
            .map(|r| Some(extract_remark_delivery(r.description.as_deref())))
            .collect();
        table.set_column(REMARK_DELIVERY_COLUMN, delivery);

        self.drop_unkeyed(&mut table, &mut warnings);

        Ok(PipelineResult {
            table,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Normalize the key header and convert markup descriptions to plain text.
    pub fn prepare(&self, mut table: Table) -> Result<Table> {
        let key = &self.columns.key;
        let aliases: Vec<String> = self
            .columns
            .key_aliases
            .iter()
            .map(|a| a.trim().to_lowercase())
            .collect();

        table.rename_columns(|header| {
            aliases
                .contains(&header.trim().to_lowercase())
                .then(|| key.clone())
        });

        if !table.has_column(key) {
            return Err(TableError::MissingColumn(key.clone()).into());
        }

        let normalizer = &self.normalizer;
        let mut converted = 0usize;
        table.map_column(&self.columns.description, |cell| {
            cell.map(|text| {
                if normalizer.is_markup(&text) {
                    converted += 1;
                    normalizer.to_plain_text(&text)
                } else {
                    text
                }
            })
        });
        if converted > 0 {
            debug!("Converted {} markup descriptions to plain text", converted);
        }

        Ok(table)
    }

    /// Build the per-row inputs of the order rules.
    ///
    /// "Detail Description 2" candidates are the matching input columns in
    /// header order, followed by the same-labelled values extracted from the
    /// description.
    pub fn order_records(&self, table: &Table) -> Vec<OrderRecord> {
        self.order_rows(table).0
    }

    fn order_rows(&self, table: &Table) -> (Vec<OrderRecord>, Vec<ExtractedDetails>) {
        let suffixes = [
            self.columns.merge_suffixes.0.as_str(),
            self.columns.merge_suffixes.1.as_str(),
        ];
        let key_col = table.column_index(&self.columns.key);
        let description_cols = table.resolve_columns(&self.columns.description, &suffixes);
        let item_code_cols = table.resolve_columns(&self.columns.item_code, &suffixes);
        let desc2_label = self.columns.detail_description_2.as_str();
        let desc2_cols = table.columns_containing(desc2_label);

        if description_cols.is_empty() {
            debug!("No '{}' column, descriptions treated as empty", self.columns.description);
        }

        (0..table.len())
            .map(|row| {
                let description = table.coalesce(row, &description_cols).map(str::to_string);
                let details = self.extractor.extract(description.as_deref());

                let detail_description_2 = desc2_cols
                    .iter()
                    .map(|&col| table.cell_at(row, col).unwrap_or(""))
                    .chain(details.values_labelled(desc2_label))
                    .map(str::to_string)
                    .collect();

                let record = OrderRecord {
                    pi: key_col
                        .and_then(|col| table.cell_at(row, col))
                        .map(str::to_string),
                    description,
                    item_code: table
                        .coalesce(row, &item_code_cols)
                        .unwrap_or("")
                        .to_string(),
                    detail_description_2,
                };
                (record, details)
            })
            .unzip()
    }

    fn append_derived(&self, table: &mut Table, records: &[OrderRecord], details: Vec<ExtractedDetails>) {
        let mut extracted: Vec<Vec<Cell>> = vec![Vec::with_capacity(records.len()); EXTRACTED_FIELDS];
        let mut orders = Vec::with_capacity(records.len());
        let mut types = Vec::with_capacity(records.len());

        for (record, details) in records.iter().zip(details) {
            for (column, value) in extracted.iter_mut().zip(details.to_fields()) {
                column.push(Some(value));
            }

            let order_type = self.classifier.classify(record);
            orders.push(Some(order_type.order().as_str().to_string()));
            types.push(Some(order_type.part().as_str().to_string()));
        }

        for (name, values) in ExtractedDetails::column_names().iter().zip(extracted) {
            table.set_column(name, values);
        }
        table.set_column(ORDER_COLUMN, orders);
        table.set_column(TYPE_COLUMN, types);
    }

    fn append_matches(&self, table: &mut Table, matches: Vec<Option<ReferenceMatch>>) {
        let (codes, models): (Vec<Cell>, Vec<Cell>) = matches
            .into_iter()
            .map(|m| match m {
                Some(m) => (Some(m.item_code), Some(m.model)),
                None => (None, None),
            })
            .unzip();
        table.set_column(MATCHED_ITEM_CODE_COLUMN, codes);
        table.set_column(MODEL_COLUMN, models);
    }

    fn drop_unkeyed(&self, table: &mut Table, warnings: &mut Vec<String>) {
        let Some(key_col) = table.column_index(&self.columns.key) else {
            return;
        };
        let before = table.len();
        table.retain_rows(|row| {
            row[key_col]
                .as_deref()
                .is_some_and(|pi| !pi.trim().is_empty())
        });

        let dropped = before - table.len();
        if dropped > 0 {
            warn!("Dropped {} rows without a {}", dropped, self.columns.key);
            warnings.push(format!("Dropped {dropped} rows without a {}", self.columns.key));
        }
    }
}

impl Default for OrderPipeline {
    fn default() -> Self {
        Self::new(ColumnConfig::default())
    }
}
