//! Input parsing and data source handling.

mod parser;
mod source;
mod workbook;

pub use parser::{Parser, ParserConfig, file_label, source_hash};
pub use source::{DataTable, SourceMetadata};
pub use workbook::{WORKBOOK_EXTENSIONS, workbook_extension};
