//! Compile a [`FilterSet`] into an executable row predicate.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::coerce::{self, Literal};
use super::condition::{ComparisonOp, FilterCondition, FilterSet, FilterStage, Operand, Selection};
use crate::error::{CoercionError, FilterError};
use crate::inference::dates;
use crate::schema::{Dataset, Value, parse_number};

/// Outcome of evaluating a predicate against one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Reject,
    /// The row could not be coerced for a comparison and is excluded.
    Skip(CoercionError),
}

/// A condition with its column resolved to an index.
#[derive(Debug, Clone)]
enum Check {
    Always,
    Equals {
        col: usize,
        target: Value,
        as_number: Option<f64>,
        as_date: Option<NaiveDate>,
    },
    Numeric {
        col: usize,
        op: ComparisonOp,
        rhs: f64,
    },
    Lexical {
        col: usize,
        op: ComparisonOp,
        rhs: String,
    },
    Columns {
        left: usize,
        op: ComparisonOp,
        right: usize,
    },
    Between {
        col: usize,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl Check {
    fn evaluate(&self, row: &[Value]) -> Verdict {
        let keep = |b: bool| if b { Verdict::Keep } else { Verdict::Reject };

        match self {
            Check::Always => Verdict::Keep,
            Check::Equals {
                col,
                target,
                as_number,
                as_date,
            } => {
                let cell = &row[*col];
                let hit = match cell {
                    Value::Number(n) => as_number.is_some_and(|t| t == *n) || cell == target,
                    Value::Date(d) => as_date.is_some_and(|t| t == *d) || cell == target,
                    _ => cell == target,
                };
                keep(hit)
            }
            Check::Numeric { col, op, rhs } => match coerce::to_number(&row[*col]) {
                Ok(n) => keep(op.compare(&n, rhs)),
                Err(e) => Verdict::Skip(e),
            },
            Check::Lexical { col, op, rhs } => match coerce::to_text(&row[*col]) {
                Ok(text) => keep(op.compare(&*text, rhs.as_str())),
                Err(e) => Verdict::Skip(e),
            },
            Check::Columns { left, op, right } => {
                let (a, b) = (&row[*left], &row[*right]);
                let comparable = match (a, b) {
                    (Value::Number(_), Value::Number(_))
                    | (Value::Date(_), Value::Date(_))
                    | (Value::Text(_), Value::Text(_)) => true,
                    _ => false,
                };
                keep(comparable && op.compare(a, b))
            }
            Check::Between { col, start, end } => match coerce::to_date(&row[*col]) {
                Ok(d) => keep(*start <= d && d <= *end),
                Err(e) => Verdict::Skip(e),
            },
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledCondition {
    stage: FilterStage,
    check: Check,
}

/// Conjunction of compiled conditions, in stage order.
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    conditions: Vec<CompiledCondition>,
}

impl Predicate {
    /// Evaluate the conditions in order; the first non-keep verdict wins.
    pub fn evaluate(&self, row: &[Value]) -> Verdict {
        for condition in &self.conditions {
            match condition.check.evaluate(row) {
                Verdict::Keep => continue,
                other => return other,
            }
        }
        Verdict::Keep
    }

    pub fn matches(&self, row: &[Value]) -> bool {
        self.evaluate(row) == Verdict::Keep
    }

    /// Number of compiled conditions, including always-true ones.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// True when every condition is always-true.
    pub fn is_trivial(&self) -> bool {
        self.conditions
            .iter()
            .all(|c| matches!(c.check, Check::Always))
    }

    /// Number of conditions compiled for a stage.
    pub fn stage_len(&self, stage: FilterStage) -> usize {
        self.conditions.iter().filter(|c| c.stage == stage).count()
    }
}

/// Resolves conditions against a dataset's columns.
pub struct PredicateBuilder<'a> {
    dataset: &'a Dataset,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Compile every condition, stage by stage.
    ///
    /// Fails on the first invalid condition; nothing is partially built.
    pub fn build(&self, filters: &FilterSet) -> Result<Predicate, FilterError> {
        let mut conditions = Vec::with_capacity(filters.len());

        for condition in filters.ordered() {
            let stage = condition.stage();
            let check = self.compile(condition).inspect_err(|e| {
                warn!(%stage, condition = %condition, error = %e, "filter stage aborted");
            })?;
            conditions.push(CompiledCondition { stage, check });
        }

        debug!(conditions = conditions.len(), "compiled filter predicate");
        Ok(Predicate { conditions })
    }

    fn resolve(&self, column: &str) -> Result<usize, FilterError> {
        self.dataset
            .column_index(column)
            .ok_or_else(|| FilterError::UnknownColumn(column.to_string()))
    }

    fn compile(&self, condition: &FilterCondition) -> Result<Check, FilterError> {
        match condition {
            FilterCondition::Equality { column, selection } => {
                let col = self.resolve(column)?;
                match selection {
                    Selection::All => Ok(Check::Always),
                    Selection::Value(target) => Ok(equality(col, target)),
                }
            }
            FilterCondition::Comparison { column, op, rhs } => {
                let col = self.resolve(column)?;
                match rhs {
                    Operand::Column(other) => Ok(Check::Columns {
                        left: col,
                        op: *op,
                        right: self.resolve(other)?,
                    }),
                    Operand::Literal(raw) => Ok(match Literal::classify(raw) {
                        Literal::Blank => Check::Always,
                        Literal::Number(rhs) => Check::Numeric { col, op: *op, rhs },
                        Literal::Text(rhs) => Check::Lexical { col, op: *op, rhs },
                    }),
                }
            }
            FilterCondition::DateRange { column, start, end } => {
                let col = self.resolve(column)?;
                if start > end {
                    return Err(FilterError::InvalidDateRange {
                        column: column.clone(),
                        start: *start,
                        end: *end,
                    });
                }
                Ok(Check::Between {
                    col,
                    start: *start,
                    end: *end,
                })
            }
        }
    }
}

/// Text targets are aligned to numbers and dates when they parse.
fn equality(col: usize, target: &Value) -> Check {
    let (as_number, as_date) = match target {
        Value::Text(s) => (parse_number(s), dates::parse_date(s)),
        _ => (None, None),
    };
    Check::Equals {
        col,
        target: target.clone(),
        as_number,
        as_date,
    }
}
