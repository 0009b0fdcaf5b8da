//! Order/receipt reconciliation.
//!
//! Pairs an order date with a receipt date and an ordered quantity with a
//! received quantity, flags every row and tallies the flags.

mod analyzer;
mod conventions;
mod status;

pub use analyzer::{
    Breakdown, DATE_STATUS_COLUMN, DateSummary, GroupSummary, QTY_STATUS_COLUMN, QtySummary,
    ReconciliationAnalyzer, ReconciliationSummary,
};
pub use conventions::{ColumnConventions, ResolvedColumns, find_column};
pub use status::{DatePolicy, DateStatus, QtyStatus, RowReconciliation};
