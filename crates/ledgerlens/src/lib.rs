//! LedgerLens: filtering and reconciliation for purchase-order ledgers.
//!
//! LedgerLens loads a workbook sheet or delimited export of order (LPO) and
//! goods-receipt (GRN) records, infers which columns are categorical, numeric or dates, applies
//! ad-hoc filters, and reconciles order against receipt dates and
//! quantities.
//!
//! # Core Principles
//!
//! - **Typed, never defaulted**: values that fail coercion are skipped with a reason, not zeroed
//! - **All-or-nothing filters**: an invalid condition rejects the whole filter set
//! - **Non-destructive**: the loaded dataset is never modified; filtering yields a new view
//!
//! # Example
//!
//! ```no_run
//! use ledgerlens::{FilterCondition, FilterSet, Session};
//!
//! let mut session = Session::open("orders.csv").unwrap();
//! let filters = FilterSet::new()
//!     .with("supplier=Acme".parse::<FilterCondition>().unwrap())
//!     .with("ordered_qty > 100".parse::<FilterCondition>().unwrap());
//!
//! let report = session.apply(filters).unwrap();
//! println!("Matched: {}", report.stats().matched_rows);
//! println!("Late receipts: {:?}", report.reconciliation.dates.map(|d| d.late));
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod inference;
pub mod input;
pub mod reconciliation;
pub mod schema;

mod session;

pub use config::LedgerConfig;
pub use error::{CoercionError, FilterError, LedgerError, Result};
pub use export::ExportFormat;
pub use filter::{
    ComparisonOp, FilterCondition, FilterExecutor, FilterOutcome, FilterSet, FilterStats, Operand,
    Selection,
};
pub use inference::Profiler;
pub use input::{DataTable, Parser, SourceMetadata};
pub use reconciliation::{
    ColumnConventions, DatePolicy, DateStatus, QtyStatus, ReconciliationAnalyzer,
    ReconciliationSummary,
};
pub use schema::{ColumnKind, ColumnProfile, DataType, Dataset, TableProfile, Value};
pub use session::{CachedSource, DatasetCache, FilterReport, RefreshReport, Session};
