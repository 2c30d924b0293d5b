//! In-memory tabular order data.
//!
//! A [`Table`] is a header row plus rows of nullable string cells. Empty
//! cells read from CSV are stored as `None`, matching how spreadsheet
//! exports represent missing values.

mod merge;

pub use merge::outer_join;

use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::TableError;

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// A single nullable cell.
pub type Cell = Option<String>;

/// Header row plus data rows; every row has exactly one cell per header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Read a table from CSV with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut table = Table::new(headers);

        for record in rdr.records() {
            let record = record?;
            table.push_row(record.iter().map(|field| {
                if field.is_empty() {
                    None
                } else {
                    Some(field.to_string())
                }
            }));
        }

        debug!(
            "Read table with {} columns and {} rows",
            table.headers.len(),
            table.rows.len()
        );

        Ok(table)
    }

    /// Read a table from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(csv::Error::from)?;
        Self::from_csv_reader(file)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padding with nulls or truncating to the header width.
    pub fn push_row<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut row: Vec<Cell> = cells.into_iter().take(self.headers.len()).collect();
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    /// Index of the column with exactly this header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Value of a cell by row index and column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Value of a cell by row and column index.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Resolve a logical column that may have been split by a merge.
    ///
    /// Returns the exact header if present, otherwise every `<name><suffix>`
    /// header that exists, in suffix order.
    pub fn resolve_columns(&self, name: &str, suffixes: &[&str]) -> Vec<usize> {
        if let Some(idx) = self.column_index(name) {
            return vec![idx];
        }
        suffixes
            .iter()
            .filter_map(|suffix| self.column_index(&format!("{name}{suffix}")))
            .collect()
    }

    /// First non-blank value among the given columns for a row.
    pub fn coalesce(&self, row: usize, columns: &[usize]) -> Option<&str> {
        columns
            .iter()
            .filter_map(|&col| self.cell_at(row, col))
            .find(|value| !value.trim().is_empty())
    }

    /// Indices of all columns whose header contains `needle`, in header order.
    pub fn columns_containing(&self, needle: &str) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.contains(needle))
            .map(|(i, _)| i)
            .collect()
    }

    /// Rename every header for which `rename` returns a new name.
    pub fn rename_columns<F>(&mut self, mut rename: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        for header in &mut self.headers {
            if let Some(new_name) = rename(header) {
                *header = new_name;
            }
        }
    }

    /// Replace a column's values, or append the column if it does not exist.
    ///
    /// `values` must have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(col) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[col] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                let mut values = values.into_iter();
                for row in &mut self.rows {
                    row.push(values.next().flatten());
                }
            }
        }
    }

    /// Apply a function to every cell of one column.
    pub fn map_column<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(Cell) -> Cell,
    {
        if let Some(col) = self.column_index(name) {
            for row in &mut self.rows {
                let value = row[col].take();
                row[col] = f(value);
            }
        }
    }

    /// Insert a column at a position, filled with one value.
    pub fn insert_column(&mut self, at: usize, name: &str, fill: Cell) {
        let at = at.min(self.headers.len());
        self.headers.insert(at, name.to_string());
        for row in &mut self.rows {
            row.insert(at, fill.clone());
        }
    }

    /// Keep only the rows for which the predicate holds.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Cell]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Project the table onto the named columns, in the given order.
    pub fn select(&self, columns: &[String]) -> Result<Table> {
        if columns.is_empty() {
            return Err(TableError::NoColumnsSelected);
        }

        let indices = columns
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| TableError::UnknownColumn(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut table = Table::new(columns.iter().cloned());
        for row in &self.rows {
            table.push_row(indices.iter().map(|&i| row[i].clone()));
        }
        Ok(table)
    }

    /// Write the table as delimited text.
    pub fn write_delimited<W: Write>(
        &self,
        writer: W,
        delimiter: u8,
        include_header: bool,
    ) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        if include_header {
            wtr.write_record(&self.headers)?;
        }
        for row in &self.rows {
            wtr.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }

        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
