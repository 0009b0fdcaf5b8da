//! Inference of column semantics from loaded data.

pub mod dates;
mod profiler;

pub use profiler::{DEFAULT_CATEGORICAL_THRESHOLD, Profiler};
