//! Error types for the LedgerLens library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for loading, configuration and export.
///
/// Every variant that can be produced while reading a source is a load
/// failure: no partially parsed data is ever handed back alongside it.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading a spreadsheet workbook.
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Error writing a spreadsheet workbook.
    #[error("Workbook export error: {0}")]
    WorkbookExport(#[from] rust_xlsxwriter::XlsxError),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Two header cells trim to the same column name.
    #[error("Duplicate column name '{0}' in header")]
    DuplicateColumn(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A filter could not be built.
    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// A filter set could not be turned into a predicate.
///
/// Raised once for the whole application; the dataset is left unfiltered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A condition references a column that is not in the dataset.
    #[error("Column '{0}' not found")]
    UnknownColumn(String),

    /// Operator text outside the supported set.
    #[error("Unsupported operator '{0}' (expected one of >, <, ==, >=, <=, !=)")]
    UnsupportedOperator(String),

    /// A date-range bound is after the other.
    #[error("Invalid date range for '{column}': start {start} is after end {end}")]
    InvalidDateRange {
        column: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// A date literal could not be parsed.
    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    /// Condition text that does not follow any known shape.
    #[error("Malformed condition '{0}'")]
    MalformedCondition(String),
}

/// A single cell could not be coerced to the type a comparison needs.
///
/// Row-scoped and non-fatal: the row is excluded from the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("value is missing")]
    Missing,
    #[error("value is not numeric")]
    NotNumeric,
    #[error("value is not a date")]
    NotDate,
}

/// Result type alias for LedgerLens operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
