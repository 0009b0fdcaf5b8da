//! Tabular source parser: delimited text with delimiter detection, or the
//! first sheet of a workbook.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::source::{DataTable, SourceMetadata};
use super::workbook::{read_first_sheet, workbook_extension};
use crate::error::{LedgerError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<char>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: char,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: '"',
        }
    }
}

/// Parses delimited text and workbook sheets into a [`DataTable`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();
        let contents = Self::read_source(path)?;

        let (table, mut metadata) = self.parse_bytes(&file_label(path), &contents)?;
        metadata.path = Some(path.to_path_buf());
        Ok((table, metadata))
    }

    /// Read a source file's raw bytes.
    pub fn read_source(path: &Path) -> Result<Vec<u8>> {
        let mut file = File::open(path).map_err(|e| LedgerError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| LedgerError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(contents)
    }

    /// Parse an in-memory byte stream, labelled `name` in the metadata.
    ///
    /// A workbook extension on `name` selects the workbook reader; anything
    /// else is read as delimited text.
    pub fn parse_bytes(&self, name: &str, bytes: &[u8]) -> Result<(DataTable, SourceMetadata)> {
        let hash = source_hash(bytes);

        let (table, format) = match workbook_extension(name) {
            Some(extension) => {
                let mut rows = read_first_sheet(bytes)?.into_iter();
                let headers = rows
                    .next()
                    .ok_or_else(|| LedgerError::EmptyData("No columns found".to_string()))?;
                (self.build_table(headers, rows.map(Ok))?, extension)
            }
            None => self.read_delimited(bytes)?,
        };

        let metadata = SourceMetadata::new(
            name,
            None,
            hash,
            bytes.len() as u64,
            format,
            table.row_count(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    fn read_delimited(&self, bytes: &[u8]) -> Result<(DataTable, String)> {
        let delimiter = match self.config.delimiter {
            Some(d) if d.is_ascii() => d as u8,
            Some(d) => {
                return Err(LedgerError::Config(format!(
                    "delimiter must be a single ASCII character, got '{}'",
                    d
                )));
            }
            None => detect_delimiter(bytes)?,
        };
        if !self.config.quote.is_ascii() {
            return Err(LedgerError::Config(format!(
                "quote must be a single ASCII character, got '{}'",
                self.config.quote
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote as u8)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let records = reader.records().map(|r| {
            r.map(|record| record.iter().map(String::from).collect())
                .map_err(LedgerError::from)
        });
        let table = self.build_table(headers, records)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        };
        Ok((table, format.to_string()))
    }

    /// Trim and check the header, then normalise rows to its width.
    fn build_table(
        &self,
        headers: Vec<String>,
        records: impl Iterator<Item = Result<Vec<String>>>,
    ) -> Result<DataTable> {
        let headers: Vec<String> = headers
            .iter()
            .map(|s| s.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(LedgerError::EmptyData("No columns found".to_string()));
        }

        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(LedgerError::DuplicateColumn(header.clone()));
            }
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();

        for (row_idx, record) in records.enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let mut row = record?;
            // Ragged rows are normalised to the header width
            row.resize(expected_cols, String::new());
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(LedgerError::EmptyData("No data rows found".to_string()));
        }

        Ok(DataTable::new(headers, rows))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// File name used to label a source in its metadata.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compute the `sha256:<hex>` identity of a source.
pub fn source_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(LedgerError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Tab gets a slight bonus as it's rare inside values
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
