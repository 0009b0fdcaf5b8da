//! Configuration loaded from a JSON file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::inference::DEFAULT_CATEGORICAL_THRESHOLD;
use crate::input::ParserConfig;
use crate::reconciliation::{ColumnConventions, DatePolicy};

/// Rows shown in the raw data preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 20;
/// Rows shown for a filtered result.
pub const DEFAULT_RESULT_ROWS: usize = 50;

/// Settings for a session. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Distinct-value count below which a column is categorical.
    pub categorical_threshold: usize,
    /// Names of the order/receipt columns.
    pub conventions: ColumnConventions,
    /// Reading of receipts dated before their order.
    pub date_policy: DatePolicy,
    pub preview_rows: usize,
    pub result_rows: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            categorical_threshold: DEFAULT_CATEGORICAL_THRESHOLD,
            conventions: ColumnConventions::default(),
            date_policy: DatePolicy::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            result_rows: DEFAULT_RESULT_ROWS,
        }
    }
}

impl LedgerConfig {
    /// Load a configuration file; missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| LedgerError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: LedgerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.categorical_threshold == 0 {
            return Err(LedgerError::Config(
                "categorical_threshold must be at least 1".to_string(),
            ));
        }
        if let Some(d) = self.parser.delimiter {
            if !d.is_ascii() {
                return Err(LedgerError::Config(format!(
                    "delimiter '{}' must be a single ASCII character",
                    d
                )));
            }
        }
        if !self.parser.quote.is_ascii() {
            return Err(LedgerError::Config(format!(
                "quote '{}' must be a single ASCII character",
                self.parser.quote
            )));
        }
        Ok(())
    }
}
