//! Per-row reconciliation flags.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a receipt dated before its order is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePolicy {
    /// Receipt before order is a data error, flagged late.
    #[default]
    Strict,
    /// Receipt before order is an early delivery and counts as valid.
    Lenient,
}

/// Date reconciliation status of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStatus {
    OnTime,
    Late,
    Early,
    /// Either date is missing or unparseable.
    NotApplicable,
}

impl DateStatus {
    /// Classify a receipt date against its order date.
    pub fn classify(order: chrono::NaiveDate, receipt: chrono::NaiveDate, policy: DatePolicy) -> Self {
        if receipt >= order {
            DateStatus::OnTime
        } else {
            match policy {
                DatePolicy::Strict => DateStatus::Late,
                DatePolicy::Lenient => DateStatus::Early,
            }
        }
    }

    /// Whether the row counts toward the valid tally.
    pub fn is_valid(&self) -> bool {
        matches!(self, DateStatus::OnTime | DateStatus::Early)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateStatus::OnTime => "on_time",
            DateStatus::Late => "late",
            DateStatus::Early => "early",
            DateStatus::NotApplicable => "not_applicable",
        }
    }
}

impl fmt::Display for DateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Quantity reconciliation status of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QtyStatus {
    Match,
    OverReceived,
    UnderReceived,
    NotApplicable,
}

impl QtyStatus {
    pub fn classify(ordered: f64, received: f64) -> Self {
        match received.partial_cmp(&ordered) {
            Some(Ordering::Greater) => QtyStatus::OverReceived,
            Some(Ordering::Less) => QtyStatus::UnderReceived,
            Some(Ordering::Equal) => QtyStatus::Match,
            None => QtyStatus::NotApplicable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QtyStatus::Match => "match",
            QtyStatus::OverReceived => "over_received",
            QtyStatus::UnderReceived => "under_received",
            QtyStatus::NotApplicable => "not_applicable",
        }
    }
}

impl fmt::Display for QtyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Both flags for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowReconciliation {
    pub date_status: DateStatus,
    pub qty_status: QtyStatus,
}
