//! The `ebl` binary.

use std::process::ExitCode;

use clap::Parser;
use ebl_cli::cli::Cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for reports.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_directive())))
        .init();

    match ebl_cli::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("ebl: {err:#}");
            ExitCode::FAILURE
        }
    }
}
