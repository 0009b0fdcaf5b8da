//! Serialize datasets to delimited text, JSON records or a workbook.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::preview::column_widths;
use crate::error::{LedgerError, Result};
use crate::schema::{Dataset, Value};

/// Name of the single sheet in workbook exports.
const SHEET_NAME: &str = "Filtered";

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    /// Array of records keyed by column name.
    Json,
    /// Single-sheet workbook with columns sized to their content.
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Tsv => "text/tab-separated-values; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    fn delimiter(&self) -> Option<u8> {
        match self {
            ExportFormat::Csv => Some(b','),
            ExportFormat::Tsv => Some(b'\t'),
            ExportFormat::Json | ExportFormat::Xlsx => None,
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" | "tab" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(LedgerError::UnsupportedFormat(format!(
                "export format '{}' (expected csv, tsv, json or xlsx)",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Write a dataset to any writer, preserving column order.
///
/// Dates render as `YYYY-MM-DD`; nulls are empty cells (JSON `null`).
pub fn write_dataset<W: Write>(dataset: &Dataset, format: ExportFormat, writer: W) -> Result<()> {
    match (format, format.delimiter()) {
        (_, Some(delimiter)) => write_delimited(dataset, delimiter, writer),
        (ExportFormat::Xlsx, None) => write_workbook(dataset, writer),
        (_, None) => write_json(dataset, writer),
    }
}

/// Serialize a dataset into memory.
pub fn to_bytes(dataset: &Dataset, format: ExportFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_dataset(dataset, format, &mut buf)?;
    Ok(buf)
}

/// Write a dataset to a file, creating parent directories as needed.
///
/// # Example
///
/// ```no_run
/// # use ledgerlens::{Dataset, export::{ExportFormat, save}};
/// # fn example(filtered: &Dataset) -> ledgerlens::Result<()> {
/// save(filtered, ExportFormat::Csv, "filtered_data.csv")?;
/// # Ok(())
/// # }
/// ```
pub fn save(dataset: &Dataset, format: ExportFormat, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let io_err = |source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let file = File::create(path).map_err(io_err)?;
    write_dataset(dataset, format, BufWriter::new(file))?;

    info!(path = %path.display(), rows = dataset.row_count(), %format, "exported dataset");
    Ok(())
}

fn write_delimited<W: Write>(dataset: &Dataset, delimiter: u8, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    wtr.write_record(dataset.headers())?;
    for row in dataset.rows() {
        wtr.write_record(row.iter().map(Value::to_string))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn write_json<W: Write>(dataset: &Dataset, mut writer: W) -> Result<()> {
    let records: Vec<IndexMap<&str, &Value>> = dataset
        .rows()
        .iter()
        .map(|row| {
            dataset
                .headers()
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect()
        })
        .collect();

    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer
        .flush()
        .map_err(|e| LedgerError::Json(serde_json::Error::io(e)))?;
    Ok(())
}

/// Header row in bold, numbers as numbers, everything else as text.
///
/// Each column is as wide as its widest rendered cell plus padding, the
/// same widths the text preview uses.
fn write_workbook<W: Write>(dataset: &Dataset, mut writer: W) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, (name, width)) in dataset
            .headers()
            .iter()
            .zip(column_widths(dataset))
            .enumerate()
        {
            let col = col as u16;
            sheet.write_string_with_format(0, col, name.as_str(), &header)?;
            sheet.set_column_width(col, width as f64)?;
        }

        for (row_idx, row) in dataset.rows().iter().enumerate() {
            let row_num = row_idx as u32 + 1;
            for (col, value) in row.iter().enumerate() {
                let col = col as u16;
                match value {
                    Value::Null => {}
                    Value::Number(n) => {
                        sheet.write_number(row_num, col, *n)?;
                    }
                    other => {
                        sheet.write_string(row_num, col, other.to_string().as_str())?;
                    }
                }
            }
        }
    }

    let buf = workbook.save_to_buffer()?;
    writer
        .write_all(&buf)
        .and_then(|_| writer.flush())
        .map_err(|e| LedgerError::WorkbookExport(XlsxError::IoError(e)))?;
    Ok(())
}
