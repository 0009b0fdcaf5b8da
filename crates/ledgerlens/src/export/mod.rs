//! Export of filtered datasets.

mod preview;
mod writer;

pub use preview::{COLUMN_PADDING, column_widths, render_table};
pub use writer::{ExportFormat, save, to_bytes, write_dataset};
