//! Date and quantity reconciliation over order/receipt column pairs.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::conventions::{ColumnConventions, ResolvedColumns, find_column};
use super::status::{DatePolicy, DateStatus, QtyStatus, RowReconciliation};
use crate::error::{FilterError, Result};
use crate::filter::{to_date, to_number};
use crate::schema::{Dataset, Value};

/// Column name for the appended date flag.
pub const DATE_STATUS_COLUMN: &str = "date_status";
/// Column name for the appended quantity flag.
pub const QTY_STATUS_COLUMN: &str = "qty_status";

/// Tallies over rows with both dates present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateSummary {
    pub compared: usize,
    /// On-time rows, plus early rows under the lenient policy.
    pub valid: usize,
    pub late: usize,
    pub early: usize,
}

impl DateSummary {
    fn record(&mut self, status: DateStatus) {
        if status == DateStatus::NotApplicable {
            return;
        }
        self.compared += 1;
        if status.is_valid() {
            self.valid += 1;
        }
        match status {
            DateStatus::Late => self.late += 1,
            DateStatus::Early => self.early += 1,
            _ => {}
        }
    }

    /// Share of compared rows that are valid, as a percentage.
    pub fn valid_percentage(&self) -> Option<f64> {
        (self.compared > 0).then(|| self.valid as f64 * 100.0 / self.compared as f64)
    }
}

/// Tallies over rows with both quantities present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QtySummary {
    pub compared: usize,
    pub matched: usize,
    pub over_received: usize,
    pub under_received: usize,
}

impl QtySummary {
    fn record(&mut self, status: QtyStatus) {
        match status {
            QtyStatus::Match => self.matched += 1,
            QtyStatus::OverReceived => self.over_received += 1,
            QtyStatus::UnderReceived => self.under_received += 1,
            QtyStatus::NotApplicable => return,
        }
        self.compared += 1;
    }

    pub fn mismatched(&self) -> usize {
        self.over_received + self.under_received
    }
}

/// Aggregate reconciliation for a dataset.
///
/// A summary is `None` when its column pair is absent, which is different
/// from a pair that is present but never comparable (all zeros).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationSummary {
    pub total_rows: usize,
    pub policy: DatePolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantities: Option<QtySummary>,
}

/// Summary for one value of a grouping column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub value: Value,
    pub summary: ReconciliationSummary,
}

/// Reconciliation summaries grouped by a column's values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub column: String,
    pub groups: Vec<GroupSummary>,
}

/// Computes reconciliation flags and summaries.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationAnalyzer {
    conventions: ColumnConventions,
    policy: DatePolicy,
}

impl ReconciliationAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conventions(mut self, conventions: ColumnConventions) -> Self {
        self.conventions = conventions;
        self
    }

    pub fn with_policy(mut self, policy: DatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DatePolicy {
        self.policy
    }

    pub fn conventions(&self) -> &ColumnConventions {
        &self.conventions
    }

    /// Flag every row of the dataset.
    pub fn analyze_rows(&self, dataset: &Dataset) -> Vec<RowReconciliation> {
        let columns = self.conventions.resolve(dataset);
        dataset
            .rows()
            .iter()
            .map(|row| self.reconcile_row(&columns, row))
            .collect()
    }

    /// Aggregate the row flags.
    pub fn analyze(&self, dataset: &Dataset) -> ReconciliationSummary {
        let columns = self.conventions.resolve(dataset);
        let summary = self.summarize(&columns, dataset.rows().iter().map(Vec::as_slice));

        debug!(
            rows = summary.total_rows,
            dates = summary.dates.is_some(),
            quantities = summary.quantities.is_some(),
            "reconciled dataset"
        );
        summary
    }

    /// Append `date_status` / `qty_status` columns for the pairs present.
    pub fn annotate(&self, dataset: &Dataset) -> Result<Dataset> {
        let columns = self.conventions.resolve(dataset);
        let flags: Vec<RowReconciliation> = dataset
            .rows()
            .iter()
            .map(|row| self.reconcile_row(&columns, row))
            .collect();

        let mut out = dataset.clone();
        if columns.dates().is_some() {
            let values = flags.iter().map(|f| Value::text(f.date_status.label())).collect();
            out = out.with_column(DATE_STATUS_COLUMN, values)?;
        }
        if columns.quantities().is_some() {
            let values = flags.iter().map(|f| Value::text(f.qty_status.label())).collect();
            out = out.with_column(QTY_STATUS_COLUMN, values)?;
        }
        Ok(out)
    }

    /// Summaries per distinct value of `column`, in value order.
    pub fn breakdown(&self, dataset: &Dataset, column: &str) -> Result<Breakdown> {
        let group_col = find_column(dataset.headers(), column)
            .ok_or_else(|| FilterError::UnknownColumn(column.to_string()))?;
        let columns = self.conventions.resolve(dataset);

        let mut groups: BTreeMap<&Value, Vec<&[Value]>> = BTreeMap::new();
        for row in dataset.rows() {
            groups.entry(&row[group_col]).or_default().push(row.as_slice());
        }

        let groups = groups
            .into_iter()
            .map(|(value, rows)| GroupSummary {
                value: value.clone(),
                summary: self.summarize(&columns, rows.into_iter()),
            })
            .collect();

        Ok(Breakdown {
            column: dataset.headers()[group_col].clone(),
            groups,
        })
    }

    fn summarize<'a>(
        &self,
        columns: &ResolvedColumns,
        rows: impl Iterator<Item = &'a [Value]>,
    ) -> ReconciliationSummary {
        let mut summary = ReconciliationSummary {
            policy: self.policy,
            dates: columns.dates().map(|_| DateSummary::default()),
            quantities: columns.quantities().map(|_| QtySummary::default()),
            ..Default::default()
        };

        for row in rows {
            summary.total_rows += 1;
            let flags = self.reconcile_row(columns, row);
            if let Some(dates) = summary.dates.as_mut() {
                dates.record(flags.date_status);
            }
            if let Some(quantities) = summary.quantities.as_mut() {
                quantities.record(flags.qty_status);
            }
        }
        summary
    }

    fn reconcile_row(&self, columns: &ResolvedColumns, row: &[Value]) -> RowReconciliation {
        let date_status = columns
            .dates()
            .and_then(|(order, receipt)| {
                let order = to_date(&row[order]).ok()?;
                let receipt = to_date(&row[receipt]).ok()?;
                Some(DateStatus::classify(order, receipt, self.policy))
            })
            .unwrap_or(DateStatus::NotApplicable);

        let qty_status = columns
            .quantities()
            .and_then(|(ordered, received)| {
                let ordered = to_number(&row[ordered]).ok()?;
                let received = to_number(&row[received]).ok()?;
                Some(QtyStatus::classify(ordered, received))
            })
            .unwrap_or(QtyStatus::NotApplicable);

        RowReconciliation {
            date_status,
            qty_status,
        }
    }
}
