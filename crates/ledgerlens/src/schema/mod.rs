//! Typed dataset and inferred column profiles.

mod column;
mod dataset;
mod table;
mod types;

pub use column::ColumnProfile;
pub use dataset::Dataset;
pub use table::TableProfile;
pub use types::{ColumnKind, DataType, Value, format_number, parse_number};
