//! LedgerLens CLI - purchase-order filtering and reconciliation.

mod cli;
mod commands;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use ledgerlens::LedgerConfig;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => match LedgerConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => LedgerConfig::default(),
    };

    let result = match cli.command {
        Commands::Profile { file, json } => commands::profile::run(file, json, &config),

        Commands::Filter {
            file,
            conditions,
            output,
            format,
            limit,
        } => commands::filter::run(file, conditions, output, format, limit, &config, cli.verbose),

        Commands::Report {
            file,
            conditions,
            by,
            json,
        } => commands::report::run(file, conditions, by, json, &config),

        Commands::Serve { file, port } => commands::serve::run(file, port, config, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "ledgerlens=debug,info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
