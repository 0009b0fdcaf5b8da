//! Filter conditions and their textual form.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::inference::dates;
use crate::schema::Value;

/// `column <op> rhs`, where `op` is any run of comparison characters so
/// that unsupported spellings are reported rather than misparsed.
static CONDITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<col>[^<>=!]+?)\s*(?P<op>[<>=!]+)\s*(?P<rhs>.*?)\s*$")
        .expect("condition pattern is valid")
});

/// Comparison operators.
///
/// Closed set: each variant maps to exactly one ordering test, so no
/// operator text is ever interpreted at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "!=")]
    Ne,
}

impl ComparisonOp {
    pub const ALL: [ComparisonOp; 6] = [
        ComparisonOp::Gt,
        ComparisonOp::Lt,
        ComparisonOp::Eq,
        ComparisonOp::Ge,
        ComparisonOp::Le,
        ComparisonOp::Ne,
    ];

    /// Whether `left <op> right` holds given `left.cmp(right)`.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Gt => ordering == Ordering::Greater,
            ComparisonOp::Lt => ordering == Ordering::Less,
            ComparisonOp::Eq => ordering == Ordering::Equal,
            ComparisonOp::Ge => ordering != Ordering::Less,
            ComparisonOp::Le => ordering != Ordering::Greater,
            ComparisonOp::Ne => ordering != Ordering::Equal,
        }
    }

    /// Compare two partially ordered values; incomparable pairs never hold.
    pub fn compare<T: PartialOrd + ?Sized>(self, left: &T, right: &T) -> bool {
        left.partial_cmp(right)
            .is_some_and(|ordering| self.holds(ordering))
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Gt => ">",
            ComparisonOp::Lt => "<",
            ComparisonOp::Eq => "==",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Le => "<=",
            ComparisonOp::Ne => "!=",
        }
    }
}

impl FromStr for ComparisonOp {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComparisonOp::ALL
            .into_iter()
            .find(|op| op.symbol() == s.trim())
            .ok_or_else(|| FilterError::UnsupportedOperator(s.trim().to_string()))
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Value picked for a categorical filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// No constraint on this column.
    All,
    Value(Value),
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// User-typed text; numeric if it parses as a number.
    Literal(String),
    /// Another column of the same row.
    Column(String),
}

/// One user-specified condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterCondition {
    Equality {
        column: String,
        selection: Selection,
    },
    Comparison {
        column: String,
        op: ComparisonOp,
        rhs: Operand,
    },
    DateRange {
        column: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// Stage a condition is applied in; stages run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    Categorical,
    Comparison,
    DateRange,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStage::Categorical => f.write_str("categorical"),
            FilterStage::Comparison => f.write_str("comparison"),
            FilterStage::DateRange => f.write_str("date range"),
        }
    }
}

impl FilterCondition {
    /// Equality against a concrete value.
    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterCondition::Equality {
            column: column.into(),
            selection: Selection::Value(value.into()),
        }
    }

    /// The "All" selection for a column.
    pub fn all(column: impl Into<String>) -> Self {
        FilterCondition::Equality {
            column: column.into(),
            selection: Selection::All,
        }
    }

    /// Comparison against a literal.
    pub fn compare(column: impl Into<String>, op: ComparisonOp, literal: impl Into<String>) -> Self {
        FilterCondition::Comparison {
            column: column.into(),
            op,
            rhs: Operand::Literal(literal.into()),
        }
    }

    /// Comparison against another column.
    pub fn compare_columns(
        column: impl Into<String>,
        op: ComparisonOp,
        other: impl Into<String>,
    ) -> Self {
        FilterCondition::Comparison {
            column: column.into(),
            op,
            rhs: Operand::Column(other.into()),
        }
    }

    /// Inclusive date range.
    pub fn date_range(column: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        FilterCondition::DateRange {
            column: column.into(),
            start,
            end,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            FilterCondition::Equality { column, .. }
            | FilterCondition::Comparison { column, .. }
            | FilterCondition::DateRange { column, .. } => column,
        }
    }

    pub fn stage(&self) -> FilterStage {
        match self {
            FilterCondition::Equality { .. } => FilterStage::Categorical,
            FilterCondition::Comparison { .. } => FilterStage::Comparison,
            FilterCondition::DateRange { .. } => FilterStage::DateRange,
        }
    }
}

impl FromStr for FilterCondition {
    type Err = FilterError;

    /// Parse `col=value`, `col=start..end`, `col <op> literal` or
    /// `col <op> @other_col`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = CONDITION
            .captures(s)
            .ok_or_else(|| FilterError::MalformedCondition(s.to_string()))?;
        let column = caps["col"].trim().to_string();
        let op = &caps["op"];
        let rhs = caps["rhs"].to_string();

        if op == "=" {
            if let Some((start, end)) = rhs.split_once("..") {
                let start = parse_bound(start)?;
                let end = parse_bound(end)?;
                return Ok(FilterCondition::date_range(column, start, end));
            }
            if rhs.eq_ignore_ascii_case("all") {
                return Ok(FilterCondition::all(column));
            }
            return Ok(FilterCondition::equals(column, rhs));
        }

        let op: ComparisonOp = op.parse()?;
        let rhs = match rhs.strip_prefix('@') {
            Some(other) if !other.trim().is_empty() => Operand::Column(other.trim().to_string()),
            _ => Operand::Literal(rhs),
        };

        Ok(FilterCondition::Comparison { column, op, rhs })
    }
}

fn parse_bound(text: &str) -> Result<NaiveDate, FilterError> {
    dates::parse_date(text).ok_or_else(|| FilterError::InvalidDate(text.trim().to_string()))
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterCondition::Equality {
                column,
                selection: Selection::All,
            } => write!(f, "{}=All", column),
            FilterCondition::Equality {
                column,
                selection: Selection::Value(v),
            } => write!(f, "{}={}", column, v),
            FilterCondition::Comparison {
                column,
                op,
                rhs: Operand::Literal(lit),
            } => write!(f, "{} {} {}", column, op, lit),
            FilterCondition::Comparison {
                column,
                op,
                rhs: Operand::Column(other),
            } => write!(f, "{} {} @{}", column, op, other),
            FilterCondition::DateRange { column, start, end } => {
                write!(f, "{}={}..{}", column, start, end)
            }
        }
    }
}

/// Conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition (builder style).
    pub fn with(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: FilterCondition) {
        self.conditions.push(condition);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Conditions in application order: grouped by stage, stable within a
    /// stage.
    pub fn ordered(&self) -> Vec<&FilterCondition> {
        let mut ordered: Vec<&FilterCondition> = self.conditions.iter().collect();
        ordered.sort_by_key(|c| c.stage());
        ordered
    }
}

impl FromIterator<FilterCondition> for FilterSet {
    fn from_iter<I: IntoIterator<Item = FilterCondition>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}
