// Rust guideline compliant 2026-02-06

//! Logmerge CLI Application
//!
//! Merges timestamp-ordered log files into a single chronological stream.

use anyhow::Context;
use clap::Parser;
use logmerge_cli::{exit_code, init_tracing, Cli};
use logmerge_core::LogMerger;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_tracing(&cli.log_level, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(2);
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{:#}", err), "logmerge failed");
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.load_config().context("Failed to load configuration")?;
    let merger = LogMerger::new(config)?;
    let stats = merger.run().context("Merge failed")?;
    tracing::info!(
        groups = stats.groups,
        lines = stats.lines,
        per_source = ?stats.lines_per_source,
        "merged log files"
    );
    Ok(())
}
