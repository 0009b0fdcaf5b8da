//! Conventional column names for order/receipt pairs.

use serde::{Deserialize, Serialize};

use crate::schema::Dataset;

/// Names of the four reconciliation columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConventions {
    pub order_date: String,
    pub receipt_date: String,
    pub ordered_qty: String,
    pub received_qty: String,
}

impl Default for ColumnConventions {
    fn default() -> Self {
        Self {
            order_date: "lpo_date".to_string(),
            receipt_date: "grn_date".to_string(),
            ordered_qty: "ordered_qty".to_string(),
            received_qty: "received_qty".to_string(),
        }
    }
}

/// Column indices found in a particular dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedColumns {
    pub order_date: Option<usize>,
    pub receipt_date: Option<usize>,
    pub ordered_qty: Option<usize>,
    pub received_qty: Option<usize>,
}

impl ResolvedColumns {
    /// Both date columns, when present.
    pub fn dates(&self) -> Option<(usize, usize)> {
        self.order_date.zip(self.receipt_date)
    }

    /// Both quantity columns, when present.
    pub fn quantities(&self) -> Option<(usize, usize)> {
        self.ordered_qty.zip(self.received_qty)
    }
}

impl ColumnConventions {
    /// Locate the conventional columns in a dataset.
    pub fn resolve(&self, dataset: &Dataset) -> ResolvedColumns {
        ResolvedColumns {
            order_date: find_column(dataset.headers(), &self.order_date),
            receipt_date: find_column(dataset.headers(), &self.receipt_date),
            ordered_qty: find_column(dataset.headers(), &self.ordered_qty),
            received_qty: find_column(dataset.headers(), &self.received_qty),
        }
    }
}

/// Exact match first, then a loose match ignoring case, spaces,
/// underscores and hyphens.
pub fn find_column(headers: &[String], name: &str) -> Option<usize> {
    if let Some(idx) = headers.iter().position(|h| h == name) {
        return Some(idx);
    }
    let wanted = normalize(name);
    headers.iter().position(|h| normalize(h) == wanted)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}
