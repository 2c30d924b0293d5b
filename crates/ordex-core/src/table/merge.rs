//! Outer join of two order tables on a shared key column.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::{Cell, Result, Table};
use crate::error::TableError;

#[derive(Default)]
struct KeyRows {
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Full outer join of `left` and `right` on `key`.
///
/// Output headers are the left headers (key kept in place) followed by the
/// right headers without the key. Non-key headers present on both sides get
/// the left/right suffix. Keyed rows come out in ascending key order; a key
/// present several times on both sides yields every left/right combination.
/// Rows whose key is blank never match anything and are appended last.
pub fn outer_join(left: &Table, right: &Table, key: &str, suffixes: (&str, &str)) -> Result<Table> {
    let left_key = left
        .column_index(key)
        .ok_or_else(|| TableError::MissingColumn(key.to_string()))?;
    let right_key = right
        .column_index(key)
        .ok_or_else(|| TableError::MissingColumn(key.to_string()))?;

    let right_names: HashSet<&str> = right.headers().iter().map(String::as_str).collect();
    let left_names: HashSet<&str> = left.headers().iter().map(String::as_str).collect();

    let mut headers: Vec<String> = left
        .headers()
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i != left_key && right_names.contains(h.as_str()) {
                format!("{h}{}", suffixes.0)
            } else {
                h.clone()
            }
        })
        .collect();
    let right_columns: Vec<usize> = (0..right.headers().len())
        .filter(|&i| i != right_key)
        .collect();
    headers.extend(right_columns.iter().map(|&i| {
        let h = &right.headers()[i];
        if left_names.contains(h.as_str()) {
            format!("{h}{}", suffixes.1)
        } else {
            h.clone()
        }
    }));

    let mut keyed: BTreeMap<&str, KeyRows> = BTreeMap::new();
    let mut unkeyed_left = Vec::new();
    let mut unkeyed_right = Vec::new();

    for i in 0..left.len() {
        match left.cell_at(i, left_key).filter(|k| !k.trim().is_empty()) {
            Some(k) => keyed.entry(k).or_default().left.push(i),
            None => unkeyed_left.push(i),
        }
    }
    for i in 0..right.len() {
        match right.cell_at(i, right_key).filter(|k| !k.trim().is_empty()) {
            Some(k) => keyed.entry(k).or_default().right.push(i),
            None => unkeyed_right.push(i),
        }
    }

    let left_width = left.headers().len();
    let mut joined = Table::new(headers);

    let left_cells = |row: Option<usize>| -> Vec<Cell> {
        match row {
            Some(i) => left.rows()[i].clone(),
            None => vec![None; left_width],
        }
    };
    let right_cells = |row: Option<usize>| -> Vec<Cell> {
        match row {
            Some(i) => right_columns
                .iter()
                .map(|&c| right.rows()[i][c].clone())
                .collect(),
            None => vec![None; right_columns.len()],
        }
    };

    for (key_value, rows) in &keyed {
        let lefts: Vec<Option<usize>> = if rows.left.is_empty() {
            vec![None]
        } else {
            rows.left.iter().copied().map(Some).collect()
        };
        let rights: Vec<Option<usize>> = if rows.right.is_empty() {
            vec![None]
        } else {
            rows.right.iter().copied().map(Some).collect()
        };

        for &l in &lefts {
            for &r in &rights {
                let mut cells = left_cells(l);
                cells[left_key] = Some((*key_value).to_string());
                cells.extend(right_cells(r));
                joined.push_row(cells);
            }
        }
    }

    for &i in &unkeyed_left {
        let mut cells = left_cells(Some(i));
        cells.extend(right_cells(None));
        joined.push_row(cells);
    }
    for &i in &unkeyed_right {
        let mut cells = left_cells(None);
        cells[left_key] = right.rows()[i][right_key].clone();
        cells.extend(right_cells(Some(i)));
        joined.push_row(cells);
    }

    debug!(
        "Joined {} + {} rows on '{}' into {} rows ({} keys)",
        left.len(),
        right.len(),
        key,
        joined.len(),
        keyed.len()
    );

    Ok(joined)
}
