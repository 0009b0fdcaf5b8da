//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use ledgerlens::{ExportFormat, FilterCondition};
use std::path::PathBuf;

/// LedgerLens: filter and reconcile purchase-order ledgers
#[derive(Parser)]
#[command(name = "ledgerlens")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a JSON configuration file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show inferred column kinds and categorical options
    Profile {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Filter rows and preview or export the result
    Filter {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Condition such as "supplier=Acme", "ordered_qty > 100",
        /// "received_qty < @ordered_qty" or "lpo_date=2024-01-01..2024-03-31"
        #[arg(short = 'w', long = "where", value_name = "CONDITION")]
        conditions: Vec<FilterCondition>,

        /// Write the filtered rows (with reconciliation flags) to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from the output extension, else csv)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Rows to preview (default: from configuration)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Reconcile order and receipt dates and quantities
    Report {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Conditions applied before reconciling
        #[arg(short = 'w', long = "where", value_name = "CONDITION")]
        conditions: Vec<FilterCondition>,

        /// Break the summary down by this column
        #[arg(long, value_name = "COLUMN")]
        by: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the JSON API for a data file
    Serve {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Port for web server
        #[arg(short, long, default_value = "3141")]
        port: u16,
    },
}
