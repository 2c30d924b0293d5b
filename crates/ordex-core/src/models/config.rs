//! Configuration structures for the order export pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the ordex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdexConfig {
    /// Input column names.
    pub columns: ColumnConfig,

    /// Reference table source and caching.
    pub reference: ReferenceConfig,

    /// Output column layout.
    pub export: ExportConfig,
}

/// Names of the input columns the pipeline reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Name of the join/record key column.
    pub key: String,

    /// Header spellings renamed to the key column (compared trimmed, lowercase).
    pub key_aliases: Vec<String>,

    /// Free-text description column.
    pub description: String,

    /// Item code column.
    pub item_code: String,

    /// Header text identifying "Detail Description 2" columns.
    pub detail_description_2: String,

    /// Suffixes for colliding column names in two-file mode.
    pub merge_suffixes: (String, String),
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            key: "PI".to_string(),
            key_aliases: vec!["doc no".to_string(), "doc. no.".to_string()],
            description: "Further Description".to_string(),
            item_code: "Item Code".to_string(),
            detail_description_2: "Detail Description 2".to_string(),
            merge_suffixes: ("_File1".to_string(), "_File2".to_string()),
        }
    }
}

/// Reference table configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Local CSV path or http(s) URL (e.g. a Google Sheet CSV export link).
    pub source: Option<String>,

    /// Item code header (lowercase).
    pub item_code_column: String,

    /// Model header (lowercase).
    pub model_column: String,

    /// Seconds before a cached reference table is fetched again.
    pub cache_ttl_secs: u64,

    /// Keep a cached copy of the reference table between runs.
    pub cache_enabled: bool,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            source: None,
            item_code_column: "item code".to_string(),
            model_column: "model".to_string(),
            cache_ttl_secs: 3000,
            cache_enabled: true,
        }
    }
}

/// A column rename applied at export time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
}

impl ColumnRename {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Export layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default output columns, in order. Columns absent from a run are skipped.
    pub columns: Vec<String>,

    /// Renames applied after selection.
    pub renames: Vec<ColumnRename>,

    /// Column (after renaming) holding a timestamp to reformat.
    pub timestamp_column: Option<String>,

    /// chrono format string for the timestamp column.
    pub timestamp_format: String,

    /// Insert a blank column after the timestamp in clipboard output.
    pub spacer_after_timestamp: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let mut columns: Vec<String> = [
            "Doc Date",
            "PI",
            "Your Ref.",
            "Debtor Name_File1",
            "ORDER",
            "TYPE",
            "MODEL",
            "Qty",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        columns.extend(crate::models::order::ExtractedDetails::column_names());
        columns.push("REMARK DELIVERY".to_string());

        Self {
            columns,
            renames: vec![
                ColumnRename::new("Doc Date", "TIMESTAMP"),
                ColumnRename::new("PI", "PI NUMBER"),
                ColumnRename::new("Your Ref.", "PO NUMBER"),
                ColumnRename::new("Debtor Name_File1", "CUSTOMERS"),
                ColumnRename::new("Qty", "QTY"),
            ],
            timestamp_column: Some("TIMESTAMP".to_string()),
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            spacer_after_timestamp: true,
        }
    }
}

impl OrdexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Reference cache lifetime.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.reference.cache_ttl_secs.min(i64::MAX as u64) as i64)
    }
}
