//! First-sheet reader for spreadsheet workbooks.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::schema::format_number;

/// Extensions read as workbooks rather than delimited text.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// The workbook extension of `name`, lowercased, if it has one.
pub fn workbook_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| WORKBOOK_EXTENSIONS.contains(&e.as_str()))
}

/// Every row of the first sheet as cell text, header row included.
///
/// Cells render the way they would in a delimited export: whole numbers
/// without `.0`, date cells as `YYYY-MM-DD`, error cells empty.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LedgerError::EmptyData("Workbook has no sheets".to_string()))?;

    let range = workbook.worksheet_range(&sheet)?;
    debug!(%sheet, rows = range.height(), columns = range.width(), "read workbook sheet");

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::DateTime(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}
