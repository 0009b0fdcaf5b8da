//! Report command - reconciliation summary for the filtered rows.

use std::path::PathBuf;

use colored::Colorize;
use ledgerlens::reconciliation::{DateSummary, QtySummary};
use ledgerlens::{FilterCondition, FilterSet, LedgerConfig, ReconciliationSummary, Session};

pub fn run(
    file: PathBuf,
    conditions: Vec<FilterCondition>,
    by: Option<String>,
    json_output: bool,
    config: &LedgerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open_with_config(&file, config.clone())?;
    let filters: FilterSet = conditions.into_iter().collect();
    if !filters.is_empty() {
        session.apply(filters)?;
    }

    let summary = session.reconciliation();
    let breakdown = by.as_deref().map(|column| session.breakdown(column)).transpose()?;

    if json_output {
        let out = serde_json::json!({
            "source": session.source().file,
            "summary": summary,
            "breakdown": breakdown,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Reconciliation for".cyan().bold(),
        session.source().file.white()
    );
    print_summary(&summary, "");

    if let Some(breakdown) = breakdown {
        println!();
        println!("{} {}", "By".yellow().bold(), breakdown.column.yellow().bold());
        for group in &breakdown.groups {
            let label = if group.value.is_null() {
                "(blank)".to_string()
            } else {
                group.value.to_string()
            };
            println!("  {}", label.white().bold());
            print_summary(&group.summary, "    ");
        }
    }

    Ok(())
}

fn print_summary(summary: &ReconciliationSummary, indent: &str) {
    println!("{}Rows: {}", indent, summary.total_rows);
    match &summary.dates {
        Some(dates) => print_dates(dates, indent),
        None => println!("{}Dates: {}", indent, "columns not found".dimmed()),
    }
    match &summary.quantities {
        Some(qty) => print_quantities(qty, indent),
        None => println!("{}Quantities: {}", indent, "columns not found".dimmed()),
    }
}

fn print_dates(dates: &DateSummary, indent: &str) {
    let pct = dates
        .valid_percentage()
        .map(|p| format!(" ({:.1}%)", p))
        .unwrap_or_default();
    println!(
        "{}Dates: {} compared, {} valid{}, {} late, {} early",
        indent,
        dates.compared,
        dates.valid.to_string().green(),
        pct,
        dates.late.to_string().red(),
        dates.early.to_string().blue()
    );
}

fn print_quantities(qty: &QtySummary, indent: &str) {
    println!(
        "{}Quantities: {} compared, {} match, {} over, {} under",
        indent,
        qty.compared,
        qty.matched.to_string().green(),
        qty.over_received.to_string().yellow(),
        qty.under_received.to_string().red()
    );
}
