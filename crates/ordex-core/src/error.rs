//! Error types for the ordex-core library.

use thiserror::Error;

/// Main error type for the ordex library.
#[derive(Error, Debug)]
pub enum OrdexError {
    /// Tabular input error.
    #[error("table error: {0}")]
    Table(#[from] TableError),

    /// Reference table error.
    #[error("reference error: {0}")]
    Reference(#[from] ReferenceError),

    /// CSV reading or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to tabular order data.
#[derive(Error, Debug)]
pub enum TableError {
    /// A required column is absent.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// A selected output column does not exist in the table.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Export layout selected no columns.
    #[error("no output columns selected")]
    NoColumnsSelected,

    /// Only one or two input tables are supported.
    #[error("expected 1 or 2 input tables, got {0}")]
    InputCount(usize),

    /// Failed to read or write delimited text.
    #[error("failed to parse table: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors related to the external reference table.
#[derive(Error, Debug)]
pub enum ReferenceError {
    /// The reference data lacks a required column.
    #[error("reference table has no '{0}' column")]
    MissingColumn(String),

    /// The reference data could not be read.
    #[error("failed to read reference table: {0}")]
    Parse(String),

    /// The reference source could not be reached.
    #[error("failed to fetch reference table: {0}")]
    Fetch(String),
}

impl From<csv::Error> for ReferenceError {
    fn from(err: csv::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type for the ordex library.
pub type Result<T> = std::result::Result<T, OrdexError>;
