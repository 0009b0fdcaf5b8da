//! Core value and type definitions.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::input::DataTable;

/// A single typed cell.
///
/// Ordering across variants is `Null < Number < Date < Text`, which keeps
/// category option lists stable when a column mixes types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    /// Type a raw cell: nulls, then numbers, everything else stays text.
    ///
    /// Numeric-looking codes whose number form would not reproduce the
    /// cell (`000452`, `5E3`, twenty-digit references) stay text.
    ///
    /// Dates are not recognised here; a whole column is promoted to dates
    /// only when every non-null value parses (see [`crate::Dataset::from_table`]).
    pub fn from_raw(raw: &str) -> Self {
        if DataTable::is_null_value(raw) {
            return Value::Null;
        }
        let trimmed = raw.trim();
        match parse_number(trimmed) {
            Some(n) if !is_code_like(trimmed) => Value::Number(n),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    /// Build a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The data type of this single value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Empty,
            Value::Number(_) => DataType::Numeric,
            Value::Date(_) => DataType::Date,
            Value::Text(_) => DataType::Text,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Number(_) => 1,
            Value::Date(_) => 2,
            Value::Text(_) => 3,
        }
    }
}

/// Parse a trimmed string as a finite number.
///
/// Words such as `inf` or `nan` that `f64::from_str` accepts are rejected:
/// a number must contain at least one digit.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Digits beyond this no longer round-trip through an `f64`.
const MAX_EXACT_DIGITS: usize = 15;

/// Leading zeros, exponent notation or too many digits to keep exactly.
fn is_code_like(s: &str) -> bool {
    let unsigned = s.trim_start_matches(['+', '-']);
    let bytes = unsigned.as_bytes();
    let leading_zero = bytes.len() > 1 && bytes[0] == b'0' && bytes[1].is_ascii_digit();
    let exponent = unsigned.contains(['e', 'E']);
    let digits = bytes.iter().filter(|b| b.is_ascii_digit()).count();
    leading_zero || exponent || digits > MAX_EXACT_DIGITS
}

/// Render a number the way a spreadsheet shows it: whole numbers without a
/// trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Number(a), Value::Number(b)) => {
                a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b))
            }
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            // 0.0 and -0.0 compare equal, so they must hash alike
            Value::Number(n) => {
                let n = if *n == 0.0 { 0.0 } else { *n };
                n.to_bits().hash(state);
            }
            Value::Date(d) => d.hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Underlying storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Every non-null value is a number.
    Numeric,
    /// Every non-null value is (or parses as) a date.
    Date,
    /// Anything else, including mixed columns.
    Text,
    /// No non-null values at all.
    #[default]
    Empty,
}

/// How a column is offered for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Few enough distinct values to be a discrete selector.
    Categorical,
    Numeric,
    Date,
    /// Opaque text.
    Text,
}
