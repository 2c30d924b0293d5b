//! Output column selection, renaming, and rendering.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::config::{ColumnRename, ExportConfig};
use crate::table::Table;

const DATETIME_INPUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_INPUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Rendered output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated with a header row.
    Csv,
    /// Tab-separated rows without a header, for pasting into a spreadsheet.
    ClipboardTsv,
    /// `{"headers": [...], "rows": [[...]]}`.
    Json,
}

/// Chooses, orders, and renames the exported columns.
#[derive(Debug, Clone)]
pub struct ExportLayout {
    columns: Vec<String>,
    explicit: bool,
    renames: Vec<ColumnRename>,
    timestamp_column: Option<String>,
    timestamp_format: String,
    spacer_after_timestamp: bool,
}

impl ExportLayout {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            explicit: false,
            renames: config.renames.clone(),
            timestamp_column: config.timestamp_column.clone(),
            timestamp_format: config.timestamp_format.clone(),
            spacer_after_timestamp: config.spacer_after_timestamp,
        }
    }

    /// Use exactly these columns, in this order. Unknown names are an error
    /// when the layout is applied.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self.explicit = true;
        self
    }

    /// Columns the layout would select from `table`.
    ///
    /// Default layouts skip columns the table lacks.
    pub fn selected_columns(&self, table: &Table) -> Vec<String> {
        if self.explicit {
            return self.columns.clone();
        }
        self.columns
            .iter()
            .filter(|c| table.has_column(c))
            .cloned()
            .collect()
    }

    /// Select, rename, and reformat timestamps.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        let mut shaped = table.select(&self.selected_columns(table))?;

        shaped.rename_columns(|header| {
            self.renames
                .iter()
                .find(|r| r.from == header)
                .map(|r| r.to.clone())
        });

        if let Some(column) = &self.timestamp_column {
            self.format_timestamps(&mut shaped, column);
        }

        debug!("Export layout selected {} columns", shaped.headers().len());
        Ok(shaped)
    }

    fn format_timestamps(&self, table: &mut Table, column: &str) {
        let mut unparsed = 0usize;
        table.map_column(column, |cell| {
            let value = cell?;
            match parse_timestamp(&value).and_then(|ts| format_timestamp(ts, &self.timestamp_format)) {
                Some(formatted) => Some(formatted),
                None => {
                    unparsed += 1;
                    Some(value)
                }
            }
        });

        if unparsed > 0 {
            warn!("{} values in '{}' were not recognized as timestamps", unparsed, column);
        }
    }

    /// Render an already shaped table.
    pub fn render(&self, table: &Table, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => render_delimited(table, b',', true),
            ExportFormat::ClipboardTsv => {
                let mut table = table.clone();
                if self.spacer_after_timestamp {
                    if let Some(idx) = self
                        .timestamp_column
                        .as_deref()
                        .and_then(|c| table.column_index(c))
                    {
                        table.insert_column(idx + 1, " ", Some(String::new()));
                    }
                }
                render_delimited(&table, b'\t', false)
            }
            ExportFormat::Json => Ok(serde_json::to_string_pretty(table)?),
        }
    }
}

fn render_delimited(table: &Table, delimiter: u8, include_header: bool) -> Result<String> {
    let mut out = Vec::new();
    table.write_delimited(&mut out, delimiter, include_header)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Parse the date/time spellings commonly found in spreadsheet exports.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_INPUTS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        .or_else(|| {
            DATE_INPUTS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn format_timestamp(ts: NaiveDateTime, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", ts.format(format)).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OrdexError, TableError};
    use pretty_assertions::assert_eq;

    fn table() -> Table {
        let csv = "Doc Date,PI,Qty,Extra,ORDER\n\
                   2024-01-15,P001,2,x,NEW ORDER\n\
                   01/16/2024 08:30,P002,1,y,WARRANTY\n\
                   someday,P003,1,z,NEW ORDER\n";
        Table::from_csv_reader(csv.as_bytes()).unwrap()
    }

    fn config() -> ExportConfig {
        ExportConfig {
            columns: vec![
                "Doc Date".to_string(),
                "PI".to_string(),
                "MODEL".to_string(),
                "ORDER".to_string(),
                "Qty".to_string(),
            ],
            ..ExportConfig::default()
        }
    }

    #[test]
    fn test_default_layout_skips_absent_and_renames() {
        let layout = ExportLayout::from_config(&config());
        let shaped = layout.apply(&table()).unwrap();

        assert_eq!(shaped.headers(), ["TIMESTAMP", "PI NUMBER", "ORDER", "QTY"]);
        assert_eq!(shaped.cell(0, "TIMESTAMP"), Some("2024-01-15 00:00:00"));
        assert_eq!(shaped.cell(1, "TIMESTAMP"), Some("2024-01-16 08:30:00"));
        assert_eq!(shaped.cell(2, "TIMESTAMP"), Some("someday"));
    }

    #[test]
    fn test_explicit_columns() {
        let layout = ExportLayout::from_config(&config())
            .with_columns(vec!["Extra".to_string(), "PI".to_string()]);
        let shaped = layout.apply(&table()).unwrap();
        assert_eq!(shaped.headers(), ["Extra", "PI NUMBER"]);

        let layout = ExportLayout::from_config(&config()).with_columns(vec!["MODEL".to_string()]);
        assert!(matches!(
            layout.apply(&table()),
            Err(OrdexError::Table(TableError::UnknownColumn(_)))
        ));
    }

    #[test]
    fn test_clipboard_tsv_has_spacer_and_no_header() {
        let layout = ExportLayout::from_config(&config());
        let shaped = layout.apply(&table()).unwrap();
        let tsv = layout.render(&shaped, ExportFormat::ClipboardTsv).unwrap();

        let first = tsv.lines().next().unwrap();
        assert_eq!(first, "2024-01-15 00:00:00\t\tP001\tNEW ORDER\t2");
        assert_eq!(tsv.lines().count(), 3);
    }

    #[test]
    fn test_csv_has_header() {
        let layout = ExportLayout::from_config(&config());
        let shaped = layout.apply(&table()).unwrap();
        let csv = layout.render(&shaped, ExportFormat::Csv).unwrap();
        assert!(csv.starts_with("TIMESTAMP,PI NUMBER,ORDER,QTY\n"));
    }

    #[test]
    fn test_json_output() {
        let layout = ExportLayout::from_config(&config());
        let shaped = layout.apply(&table()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&layout.render(&shaped, ExportFormat::Json).unwrap()).unwrap();
        assert_eq!(json["headers"][1], "PI NUMBER");
        assert_eq!(json["rows"][0][1], "P001");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2024-01-15T10:20:30").is_some());
        assert!(parse_timestamp("15.01.2024").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }
}
