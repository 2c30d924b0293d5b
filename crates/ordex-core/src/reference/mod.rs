//! Reference table of (item code, model) pairs used to enrich orders.

mod cache;
mod matcher;

pub use cache::{CacheEntry, ReferenceCache};
pub use matcher::{clean_description, ReferenceMatcher};

use std::io::Read;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReferenceError;

/// Result type for reference operations.
pub type Result<T> = std::result::Result<T, ReferenceError>;

/// One reference row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Full item code, trimmed.
    pub item_code: String,
    /// Model name, trimmed.
    pub model: String,
}

impl ReferenceEntry {
    pub fn new(item_code: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            item_code: item_code.into().trim().to_string(),
            model: model.into().trim().to_string(),
        }
    }
}

/// Read-only reference table, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceTable {
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a reference table from CSV.
    ///
    /// Headers are compared trimmed and lowercased; `item_code_column` and
    /// `model_column` should be given in lowercase.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        item_code_column: &str,
        model_column: &str,
    ) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let find = |name: &str| {
            let name = name.trim().to_lowercase();
            headers
                .iter()
                .position(|h| *h == name)
                .ok_or(ReferenceError::MissingColumn(name))
        };
        let item_col = find(item_code_column)?;
        let model_col = find(model_column)?;

        let mut entries = Vec::new();
        for record in rdr.records() {
            let record = record?;
            entries.push(ReferenceEntry::new(
                record.get(item_col).unwrap_or(""),
                record.get(model_col).unwrap_or(""),
            ));
        }

        debug!("Loaded reference table with {} entries", entries.len());

        Ok(Self { entries })
    }
}

/// Something that can produce a reference table.
pub trait ReferenceSource {
    /// Load the full reference table.
    fn load(&self) -> Result<ReferenceTable>;

    /// Human-readable description of the source.
    fn describe(&self) -> String;
}

/// Reference table stored in a local CSV file.
#[derive(Debug, Clone)]
pub struct CsvReferenceSource {
    path: PathBuf,
    item_code_column: String,
    model_column: String,
}

impl CsvReferenceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            item_code_column: "item code".to_string(),
            model_column: "model".to_string(),
        }
    }

    /// Set the item code and model headers.
    pub fn with_columns(mut self, item_code: impl Into<String>, model: impl Into<String>) -> Self {
        self.item_code_column = item_code.into();
        self.model_column = model.into();
        self
    }
}

impl ReferenceSource for CsvReferenceSource {
    fn load(&self) -> Result<ReferenceTable> {
        let file = std::fs::File::open(&self.path)
            .map_err(|e| ReferenceError::Fetch(format!("{}: {}", self.path.display(), e)))?;
        ReferenceTable::from_csv_reader(file, &self.item_code_column, &self.model_column)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
