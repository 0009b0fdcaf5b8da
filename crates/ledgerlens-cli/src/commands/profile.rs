//! Profile command - show inferred column kinds.

use std::path::PathBuf;

use colored::Colorize;
use ledgerlens::{ColumnKind, LedgerConfig, Session};

/// Categorical options printed per column before eliding the rest.
const MAX_OPTIONS_SHOWN: usize = 8;

pub fn run(
    file: PathBuf,
    json_output: bool,
    config: &LedgerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open_with_config(&file, config.clone())?;
    let profile = session.profile();

    if json_output {
        let out = serde_json::json!({
            "source": session.source(),
            "profile": profile,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let source = session.source();
    println!(
        "{} {}",
        "Profile for".cyan().bold(),
        source.file.white()
    );
    println!(
        "  {} rows, {} columns ({})",
        source.row_count, source.column_count, source.format
    );
    println!();

    for column in &profile.columns {
        let kind = match column.kind {
            ColumnKind::Categorical => "categorical".green(),
            ColumnKind::Numeric => "numeric".blue(),
            ColumnKind::Date => "date".magenta(),
            ColumnKind::Text => "text".normal(),
        };
        println!(
            "{:<24} {:<12} distinct: {:<6} nulls: {} ({:.1}%)",
            column.name.white().bold(),
            kind,
            column.distinct_count,
            column.null_count,
            column.null_percentage()
        );

        if let Some(categories) = &column.categories {
            let shown: Vec<String> = categories
                .iter()
                .take(MAX_OPTIONS_SHOWN)
                .map(|v| v.to_string())
                .collect();
            let more = categories.len().saturating_sub(MAX_OPTIONS_SHOWN);
            let suffix = if more > 0 {
                format!(", ... (+{})", more)
            } else {
                String::new()
            };
            println!("    options: All, {}{}", shown.join(", "), suffix);
        }
        if let Some((lo, hi)) = column.date_range {
            println!("    range: {} .. {}", lo, hi);
        }
        if let Some((lo, hi)) = column.numeric_range {
            println!(
                "    range: {} .. {}",
                ledgerlens::schema::format_number(lo),
                ledgerlens::schema::format_number(hi)
            );
        }
    }

    let names = |columns: Vec<&str>| {
        if columns.is_empty() {
            "none".dimmed().to_string()
        } else {
            columns.join(", ")
        }
    };
    println!();
    println!(
        "{} {}",
        "Date columns:".cyan(),
        names(profile.date_columns().map(|c| c.name.as_str()).collect())
    );
    println!(
        "{} {}",
        "Numeric columns:".cyan(),
        names(profile.numeric_columns().map(|c| c.name.as_str()).collect())
    );

    Ok(())
}
