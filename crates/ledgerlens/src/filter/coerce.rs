//! Two-stage coercion for comparisons.
//!
//! Stage one classifies the user's literal once, when the predicate is
//! built. Stage two coerces each row's cell to the literal's type at
//! evaluation time, yielding either the typed value or a [`CoercionError`]
//! that excludes the row.

use std::borrow::Cow;

use chrono::NaiveDate;

use crate::error::CoercionError;
use crate::inference::dates;
use crate::schema::{Value, parse_number};

/// A comparison literal after stage-one classification.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Blank input: the comparison is disabled.
    Blank,
    Number(f64),
    Text(String),
}

impl Literal {
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Literal::Blank;
        }
        match parse_number(trimmed) {
            Some(n) => Literal::Number(n),
            None => Literal::Text(trimmed.to_string()),
        }
    }
}

/// Coerce a cell to a number: numbers pass, numeric text parses.
pub fn to_number(value: &Value) -> Result<f64, CoercionError> {
    match value {
        Value::Null => Err(CoercionError::Missing),
        Value::Number(n) => Ok(*n),
        Value::Text(s) => parse_number(s).ok_or(CoercionError::NotNumeric),
        Value::Date(_) => Err(CoercionError::NotNumeric),
    }
}

/// Coerce a cell to its display text. Nulls are missing, not empty.
pub fn to_text(value: &Value) -> Result<Cow<'_, str>, CoercionError> {
    match value {
        Value::Null => Err(CoercionError::Missing),
        Value::Text(s) => Ok(Cow::Borrowed(s.as_str())),
        other => Ok(Cow::Owned(other.to_string())),
    }
}

/// Coerce a cell to a calendar date.
pub fn to_date(value: &Value) -> Result<NaiveDate, CoercionError> {
    match value {
        Value::Null => Err(CoercionError::Missing),
        other => dates::value_as_date(other).ok_or(CoercionError::NotDate),
    }
}
