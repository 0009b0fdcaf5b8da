//! Apply a filter set to a dataset.

use serde::Serialize;
use tracing::{debug, info};

use super::condition::FilterSet;
use super::predicate::{PredicateBuilder, Verdict};
use crate::error::FilterError;
use crate::schema::Dataset;

/// Row counts for one application of a filter set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub total_rows: usize,
    pub matched_rows: usize,
    pub excluded_rows: usize,
    /// Excluded rows whose value could not be coerced for a comparison.
    pub coercion_skips: usize,
}

impl FilterStats {
    /// Share of all rows that matched, as a percentage.
    pub fn matched_percentage(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        self.matched_rows as f64 * 100.0 / self.total_rows as f64
    }
}

/// Result of applying a filter set.
///
/// An empty result is a distinct outcome rather than an error or an empty
/// dataset the caller has to notice.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Matched { dataset: Dataset, stats: FilterStats },
    NoRowsMatched { stats: FilterStats },
}

impl FilterOutcome {
    pub fn stats(&self) -> &FilterStats {
        match self {
            FilterOutcome::Matched { stats, .. } | FilterOutcome::NoRowsMatched { stats } => stats,
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            FilterOutcome::Matched { dataset, .. } => Some(dataset),
            FilterOutcome::NoRowsMatched { .. } => None,
        }
    }

    pub fn into_dataset(self) -> Option<Dataset> {
        match self {
            FilterOutcome::Matched { dataset, .. } => Some(dataset),
            FilterOutcome::NoRowsMatched { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FilterOutcome::NoRowsMatched { .. })
    }

    /// Short status label used by the CLI and HTTP responses.
    pub fn status(&self) -> &'static str {
        match self {
            FilterOutcome::Matched { .. } => "matched",
            FilterOutcome::NoRowsMatched { .. } => "no_rows_matched",
        }
    }
}

/// Stateless filter runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterExecutor;

impl FilterExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Filter `dataset` by the conjunction of `filters`.
    ///
    /// The predicate is fully built before any row is touched, so a build
    /// error leaves nothing half-applied.
    pub fn apply(&self, dataset: &Dataset, filters: &FilterSet) -> Result<FilterOutcome, FilterError> {
        let predicate = PredicateBuilder::new(dataset).build(filters)?;

        let mut stats = FilterStats {
            total_rows: dataset.row_count(),
            ..FilterStats::default()
        };

        let filtered = dataset.filter_rows(|row| match predicate.evaluate(row) {
            Verdict::Keep => true,
            Verdict::Reject => false,
            Verdict::Skip(_) => {
                stats.coercion_skips += 1;
                false
            }
        });

        stats.matched_rows = filtered.row_count();
        stats.excluded_rows = stats.total_rows - stats.matched_rows;

        debug!(
            total = stats.total_rows,
            matched = stats.matched_rows,
            skipped = stats.coercion_skips,
            "filter applied"
        );

        if filtered.is_empty() {
            info!(conditions = filters.len(), "no rows matched filters");
            return Ok(FilterOutcome::NoRowsMatched { stats });
        }

        Ok(FilterOutcome::Matched {
            dataset: filtered,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ComparisonOp, FilterCondition};
    use crate::schema::Value;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn orders() -> Dataset {
        Dataset::new(
            vec!["supplier".into(), "ordered_qty".into(), "lpo_date".into()],
            vec![
                vec!["Acme".into(), 150.0.into(), ymd(2024, 1, 1).into()],
                vec!["Acme".into(), 50.0.into(), ymd(2024, 1, 15).into()],
                vec!["Globex".into(), 200.0.into(), ymd(2024, 1, 31).into()],
                vec!["Acme".into(), 120.0.into(), ymd(2024, 2, 1).into()],
                vec!["Initech".into(), Value::Null, Value::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_categorical_then_comparison() {
        let filters = FilterSet::new()
            .with(FilterCondition::compare("ordered_qty", ComparisonOp::Gt, "100"))
            .with(FilterCondition::equals("supplier", "Acme"));

        let outcome = FilterExecutor::new().apply(&orders(), &filters).unwrap();
        let ds = outcome.dataset().unwrap();

        assert_eq!(ds.row_count(), 2);
        assert!(ds.column_values(0).all(|v| v == &Value::text("Acme")));
        assert!(ds.column_values(1).all(|v| v.as_number().unwrap() > 100.0));
        assert_eq!(
            *outcome.stats(),
            FilterStats {
                total_rows: 5,
                matched_rows: 2,
                excluded_rows: 3,
                coercion_skips: 0,
            }
        );
        assert_eq!(outcome.stats().matched_percentage(), 40.0);
    }

    #[test]
    fn test_text_literal_against_numeric_column() {
        // "abc" is not numeric, so numbers compare by their display text
        let filters =
            FilterSet::new().with(FilterCondition::compare("ordered_qty", ComparisonOp::Lt, "abc"));
        let outcome = FilterExecutor::new().apply(&orders(), &filters).unwrap();

        assert_eq!(outcome.stats().matched_rows, 4);
        assert_eq!(outcome.stats().coercion_skips, 1);
    }

    #[test]
    fn test_no_rows_matched_is_distinct() {
        let filters = FilterSet::new().with(FilterCondition::equals("supplier", "Umbrella"));
        let outcome = FilterExecutor::new().apply(&orders(), &filters).unwrap();

        assert!(outcome.is_empty());
        assert_eq!(outcome.status(), "no_rows_matched");
        assert_eq!(outcome.stats().excluded_rows, 5);
        assert!(outcome.dataset().is_none());
    }

    #[test]
    fn test_date_range_inclusive() {
        let filters = FilterSet::new().with(FilterCondition::date_range(
            "lpo_date",
            ymd(2024, 1, 1),
            ymd(2024, 1, 31),
        ));
        let outcome = FilterExecutor::new().apply(&orders(), &filters).unwrap();

        assert_eq!(outcome.stats().matched_rows, 3);
        assert_eq!(outcome.stats().coercion_skips, 1);
    }

    #[test]
    fn test_all_selection_is_noop() {
        let ds = orders();
        let filters = FilterSet::new().with(FilterCondition::all("supplier"));
        let outcome = FilterExecutor::new().apply(&ds, &filters).unwrap();
        assert_eq!(outcome.dataset(), Some(&ds));
    }

    #[test]
    fn test_reapply_is_idempotent() {
        let filters = FilterSet::new()
            .with(FilterCondition::compare("ordered_qty", ComparisonOp::Ge, "100"))
            .with(FilterCondition::date_range("lpo_date", ymd(2024, 1, 1), ymd(2024, 3, 1)));

        let executor = FilterExecutor::new();
        let once = executor.apply(&orders(), &filters).unwrap().into_dataset().unwrap();
        let twice = executor.apply(&once, &filters).unwrap().into_dataset().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_build_error_applies_nothing() {
        let filters = FilterSet::new()
            .with(FilterCondition::equals("supplier", "Acme"))
            .with(FilterCondition::equals("region", "North"));
        let err = FilterExecutor::new().apply(&orders(), &filters).unwrap_err();
        assert_eq!(err, FilterError::UnknownColumn("region".to_string()));
    }

    #[test]
    fn test_earlier_stage_error_wins_over_declaration_order() {
        // The inverted range is declared first, but categorical conditions
        // build before date ranges
        let filters = FilterSet::new()
            .with(FilterCondition::date_range(
                "lpo_date",
                ymd(2024, 2, 1),
                ymd(2024, 1, 1),
            ))
            .with(FilterCondition::equals("region", "North"));
        let err = FilterExecutor::new().apply(&orders(), &filters).unwrap_err();
        assert_eq!(err, FilterError::UnknownColumn("region".to_string()));
    }
}
