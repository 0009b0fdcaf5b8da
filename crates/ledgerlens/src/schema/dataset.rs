//! Typed, row-major dataset.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::types::Value;
use crate::error::{LedgerError, Result};
use crate::inference::dates;
use crate::input::DataTable;

/// An ordered sequence of rows sharing one header.
///
/// Every row has exactly one value per header column; constructors enforce
/// this, so accessors can index without bounds surprises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Create a dataset, validating header uniqueness and row widths.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();

        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(LedgerError::DuplicateColumn(header.clone()));
            }
        }

        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(LedgerError::Config(format!(
                "row {} has {} values but the header has {} columns",
                idx,
                row.len(),
                headers.len()
            )));
        }

        Ok(Self { headers, rows })
    }

    /// Type a raw table.
    ///
    /// Cells are typed individually (null, number, text); afterwards each
    /// column whose non-null values are all date-like text is promoted to
    /// dates. A column with no non-null values is never promoted.
    pub fn from_table(table: &DataTable) -> Self {
        let width = table.column_count();
        let mut rows: Vec<Vec<Value>> = table
            .rows
            .iter()
            .map(|raw| {
                (0..width)
                    .map(|col| Value::from_raw(raw.get(col).map(String::as_str).unwrap_or("")))
                    .collect()
            })
            .collect();

        for col in 0..width {
            let mut parsed = Vec::with_capacity(rows.len());
            let mut all_dates = true;
            for row in &rows {
                match &row[col] {
                    Value::Null => parsed.push(None),
                    Value::Text(s) => match dates::parse_date(s) {
                        Some(d) => parsed.push(Some(d)),
                        None => {
                            all_dates = false;
                            break;
                        }
                    },
                    _ => {
                        all_dates = false;
                        break;
                    }
                }
            }

            if !all_dates || parsed.iter().all(Option::is_none) {
                continue;
            }

            for (row, date) in rows.iter_mut().zip(parsed) {
                if let Some(d) = date {
                    row[col] = Value::Date(d);
                }
            }
        }

        Self {
            headers: table.headers.clone(),
            rows,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All values of a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// A single cell.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// A single cell by column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.get(row, col)
    }

    /// Keep the rows for which `keep` returns true, preserving order.
    pub fn filter_rows(&self, mut keep: impl FnMut(&[Value]) -> bool) -> Dataset {
        Dataset {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row))
                .cloned()
                .collect(),
        }
    }

    /// Return a copy with one more column appended.
    ///
    /// `values` must have one entry per row; replacing an existing column of
    /// the same name keeps its position.
    pub fn with_column(&self, name: &str, values: Vec<Value>) -> Result<Dataset> {
        if values.len() != self.rows.len() {
            return Err(LedgerError::Config(format!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        let mut out = self.clone();
        match out.column_index(name) {
            Some(idx) => {
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                out.headers.push(name.to_string());
                for (row, value) in out.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(out)
    }
}
