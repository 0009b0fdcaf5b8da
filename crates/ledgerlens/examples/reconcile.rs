//! Example: Filter a ledger and print its reconciliation summary.
//!
//! Usage:
//!   cargo run --example reconcile -- <file_path> [condition ...]
//!
//! Example:
//!   cargo run --example reconcile -- orders.csv "supplier=Acme" "ordered_qty > 100"

use std::env;
use std::path::Path;

use ledgerlens::export::render_table;
use ledgerlens::{FilterCondition, FilterSet, Session};

fn main() -> ledgerlens::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example reconcile -- <file_path> [condition ...]");
        eprintln!("\nExample:");
        eprintln!("  cargo run --example reconcile -- orders.csv \"supplier=Acme\"");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    let filters = args[2..]
        .iter()
        .map(|s| s.parse::<FilterCondition>())
        .collect::<Result<FilterSet, _>>()?;

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("LedgerLens: {}", path.display());
    println!("{}", separator);

    let mut session = Session::open(path)?;
    for column in session.profile().categorical_columns() {
        println!(
            "{:<20} {} options",
            column.name,
            column.categories.as_ref().map_or(0, Vec::len)
        );
    }
    println!();

    let report = session.apply(filters)?;
    let stats = *report.stats();
    let summary = report.reconciliation.clone();

    println!(
        "Matched {}/{} rows ({:.1}%)",
        stats.matched_rows,
        stats.total_rows,
        stats.matched_percentage()
    );

    if let Some(dates) = summary.dates {
        println!(
            "Dates:      {} compared, {} valid, {} late",
            dates.compared, dates.valid, dates.late
        );
    }
    if let Some(qty) = summary.quantities {
        println!(
            "Quantities: {} compared, {} match, {} over, {} under",
            qty.compared, qty.matched, qty.over_received, qty.under_received
        );
    }

    if let Some(view) = session.view() {
        println!();
        print!("{}", render_table(view, 10));
    }

    Ok(())
}
