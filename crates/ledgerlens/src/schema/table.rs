//! Table-level profile.

use serde::{Deserialize, Serialize};

use super::column::ColumnProfile;
use super::types::DataType;

/// Profiles for every column of a dataset, in header order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProfile {
    pub columns: Vec<ColumnProfile>,
    /// Threshold the categorical split was computed with.
    pub categorical_threshold: usize,
}

impl TableProfile {
    pub fn new(columns: Vec<ColumnProfile>, categorical_threshold: usize) -> Self {
        Self {
            columns,
            categorical_threshold,
        }
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns offered as discrete selectors.
    pub fn categorical_columns(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns.iter().filter(|c| c.is_categorical())
    }

    /// Columns whose values are dates, whatever their cardinality.
    pub fn date_columns(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns
            .iter()
            .filter(|c| c.data_type == DataType::Date)
    }

    /// Columns whose values are all numbers, whatever their cardinality.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns
            .iter()
            .filter(|c| c.data_type == DataType::Numeric)
    }
}
