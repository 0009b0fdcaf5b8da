//! Filter command - apply conditions, preview or export the result.

use std::path::PathBuf;

use colored::Colorize;
use ledgerlens::export::{self, render_table};
use ledgerlens::{ExportFormat, FilterCondition, FilterSet, LedgerConfig, Session};

pub fn run(
    file: PathBuf,
    conditions: Vec<FilterCondition>,
    output: Option<PathBuf>,
    format: Option<ExportFormat>,
    limit: Option<usize>,
    config: &LedgerConfig,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open_with_config(&file, config.clone())?;
    let filters: FilterSet = conditions.into_iter().collect();

    if verbose {
        for condition in &filters.conditions {
            println!("  {} {}", "where".dimmed(), condition);
        }
    }

    let report = session.apply(filters)?;
    let stats = *report.stats();

    if report.outcome.is_empty() {
        println!("{}", "No rows matched your filters.".yellow().bold());
    } else {
        println!(
            "{} {}/{} rows ({:.1}%)",
            "Matched".green().bold(),
            stats.matched_rows.to_string().white().bold(),
            stats.total_rows,
            stats.matched_percentage()
        );
    }
    if stats.coercion_skips > 0 {
        println!(
            "  {} rows skipped: value not comparable",
            stats.coercion_skips.to_string().yellow()
        );
    }

    match output {
        Some(path) => {
            let format = format
                .or_else(|| ExportFormat::from_path(&path))
                .unwrap_or_default();
            let annotated = session.annotated_view()?;
            export::save(&annotated, format, &path)?;
            println!(
                "Wrote {} rows to {}",
                annotated.row_count(),
                path.display().to_string().cyan()
            );
        }
        None => {
            if let Some(view) = session.view() {
                println!();
                print!("{}", render_table(view, limit.unwrap_or(config.result_rows)));
            }
        }
    }

    Ok(())
}
