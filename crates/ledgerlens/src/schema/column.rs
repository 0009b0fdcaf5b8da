//! Per-column profile.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::{ColumnKind, DataType, Value};

/// What inference learned about one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name.
    pub name: String,
    /// Zero-based position in the dataset.
    pub position: usize,
    /// How the column is offered for filtering.
    pub kind: ColumnKind,
    /// Underlying storage type, independent of cardinality.
    pub data_type: DataType,
    /// Total number of values (including nulls).
    pub count: usize,
    /// Number of null/missing values.
    pub null_count: usize,
    /// Number of distinct non-null values.
    pub distinct_count: usize,
    /// Sorted distinct non-null values (categorical columns only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Value>>,
    /// Frequency of each category, in category order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_counts: Option<IndexMap<String, usize>>,
    /// Smallest and largest value of a numeric column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_range: Option<(f64, f64)>,
    /// Earliest and latest value of a date column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl ColumnProfile {
    /// Create an empty profile for a column.
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
            kind: ColumnKind::Text,
            data_type: DataType::Empty,
            count: 0,
            null_count: 0,
            distinct_count: 0,
            categories: None,
            value_counts: None,
            numeric_range: None,
            date_range: None,
        }
    }

    pub fn is_categorical(&self) -> bool {
        self.kind == ColumnKind::Categorical
    }

    /// Get the null percentage.
    pub fn null_percentage(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.null_count as f64 / self.count as f64) * 100.0
        }
    }
}
