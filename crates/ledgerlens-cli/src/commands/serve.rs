//! Serve command - run the JSON API over one session.

use std::path::PathBuf;

use colored::Colorize;
use ledgerlens::{LedgerConfig, Session};

use crate::server::{app, state::AppState};

pub fn run(
    file: PathBuf,
    port: u16,
    config: LedgerConfig,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open_with_config(&file, config)?;
    if verbose {
        println!(
            "Loaded {} rows from {}",
            session.dataset().row_count(),
            file.display()
        );
    }

    let state = AppState::new(session);

    let url = format!("http://localhost:{}", port);
    println!();
    println!(
        "{} {}",
        "Serving".cyan().bold(),
        url.white().bold()
    );
    println!();
    println!("  File: {}", file.display());
    println!("  Refresh: POST {}/api/refresh", url);
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            println!();
            println!("{}", "Shutting down...".yellow());
            std::process::exit(0);
        });

        if let Err(e) = app::run_server(state, port).await {
            eprintln!("Server error: {}", e);
        }
    });

    Ok(())
}
