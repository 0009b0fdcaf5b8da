//! Column type and cardinality inference.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::debug;

use super::dates;
use crate::schema::{ColumnKind, ColumnProfile, DataType, Dataset, TableProfile, Value};

/// Default distinct-value threshold below which a column is categorical.
pub const DEFAULT_CATEGORICAL_THRESHOLD: usize = 20;

/// Infers a [`ColumnProfile`] for every column of a dataset.
///
/// Pure: the profile depends only on the dataset and the threshold.
#[derive(Debug, Clone)]
pub struct Profiler {
    /// Distinct non-null count strictly below this makes a column categorical.
    categorical_threshold: usize,
}

impl Profiler {
    /// Create a profiler with the default threshold.
    pub fn new() -> Self {
        Self {
            categorical_threshold: DEFAULT_CATEGORICAL_THRESHOLD,
        }
    }

    /// Create a profiler with a custom categorical threshold.
    pub fn with_threshold(categorical_threshold: usize) -> Self {
        Self {
            categorical_threshold,
        }
    }

    pub fn categorical_threshold(&self) -> usize {
        self.categorical_threshold
    }

    /// Profile every column of the dataset.
    pub fn profile(&self, dataset: &Dataset) -> TableProfile {
        let columns: Vec<ColumnProfile> = (0..dataset.column_count())
            .map(|idx| self.profile_column(dataset, idx))
            .collect();

        debug!(
            columns = columns.len(),
            categorical = columns
                .iter()
                .filter(|c| c.kind == ColumnKind::Categorical)
                .count(),
            "profiled dataset"
        );

        TableProfile::new(columns, self.categorical_threshold)
    }

    /// Profile a single column by index.
    pub fn profile_column(&self, dataset: &Dataset, col_index: usize) -> ColumnProfile {
        let name = dataset.headers()[col_index].clone();
        let mut profile = ColumnProfile::new(name, col_index);

        // BTreeMap keeps the distinct values sorted via Value's Ord
        let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
        for value in dataset.column_values(col_index) {
            profile.count += 1;
            if value.is_null() {
                profile.null_count += 1;
            } else {
                *counts.entry(value).or_insert(0) += 1;
            }
        }
        profile.distinct_count = counts.len();

        profile.data_type = self.infer_data_type(counts.keys().copied());

        match profile.data_type {
            DataType::Numeric => {
                let numbers = counts.keys().filter_map(|v| v.as_number());
                profile.numeric_range = min_max(numbers);
            }
            DataType::Date => {
                let dates = counts.keys().filter_map(|v| dates::value_as_date(v));
                profile.date_range = min_max(dates);
            }
            DataType::Text | DataType::Empty => {}
        }

        profile.kind = if profile.distinct_count > 0
            && profile.distinct_count < self.categorical_threshold
        {
            ColumnKind::Categorical
        } else {
            match profile.data_type {
                DataType::Numeric => ColumnKind::Numeric,
                DataType::Date => ColumnKind::Date,
                DataType::Text | DataType::Empty => ColumnKind::Text,
            }
        };

        if profile.kind == ColumnKind::Categorical {
            profile.categories = Some(counts.keys().map(|v| (*v).clone()).collect());
            let value_counts: IndexMap<String, usize> = counts
                .iter()
                .map(|(value, count)| (value.to_string(), *count))
                .collect();
            profile.value_counts = Some(value_counts);
        }

        profile
    }

    /// Decide the storage type from the distinct non-null values.
    fn infer_data_type<'a>(&self, mut values: impl Iterator<Item = &'a Value> + Clone) -> DataType {
        let Some(first) = values.clone().next() else {
            return DataType::Empty;
        };

        if values.clone().all(|v| matches!(v, Value::Number(_))) {
            return DataType::Numeric;
        }

        // Text that parses counts as a date; one failure disqualifies the column
        if values.all(|v| dates::value_as_date(v).is_some()) {
            return DataType::Date;
        }

        debug!(sample = %first, "column kept as text");
        DataType::Text
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

fn min_max<T: PartialOrd + Copy>(values: impl Iterator<Item = T>) -> Option<(T, T)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((
            if v < lo { v } else { lo },
            if v > hi { v } else { hi },
        )),
    })
}
