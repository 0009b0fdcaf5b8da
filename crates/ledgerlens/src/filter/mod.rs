//! Filter conditions, predicate compilation and execution.
//!
//! Conditions are grouped into stages (categorical equality, comparison,
//! date range) and combined with logical AND.

mod coerce;
mod condition;
mod executor;
mod predicate;

pub use coerce::{Literal, to_date, to_number, to_text};
pub use condition::{ComparisonOp, FilterCondition, FilterSet, FilterStage, Operand, Selection};
pub use executor::{FilterExecutor, FilterOutcome, FilterStats};
pub use predicate::{Predicate, PredicateBuilder, Verdict};
