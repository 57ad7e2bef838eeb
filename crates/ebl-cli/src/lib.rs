//! ebl-cli: the `ebl` command.
//!
//! `ebl check` validates documents against the configured dictionaries and
//! exits non-zero when any document is rejected. `ebl symbols` prints the
//! compiled symbol table.

pub mod check;
pub mod cli;
pub mod config;
pub mod report;

use std::io::{IsTerminal, Write};
use std::process::ExitCode;

use anyhow::Result;
use ebl_kernel::ValidatorOptions;

use crate::check::Settings;
use crate::cli::{CheckArgs, Cli, Commands, DictionaryArgs, OutputFormat};
use crate::report::TextRenderer;

/// Run a parsed command line.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check(args) => run_check(args).await,
        Commands::Symbols(args) => run_symbols(&args),
    }
}

async fn run_check(args: CheckArgs) -> Result<ExitCode> {
    let settings = Settings::resolve(&args.dictionaries)?;
    let options = if args.lenient {
        ValidatorOptions::lenient()
    } else {
        settings.options
    };
    let symbols = settings.symbol_table()?;
    let checked = check::check_files(&args.files, symbols, options).await?;

    let mut stdout = std::io::stdout().lock();
    match args.format {
        OutputFormat::Json => {
            writeln!(stdout, "{}", report::to_json(&checked, args.deny_warnings)?)?;
        }
        OutputFormat::Text => {
            let color = !args.no_color
                && std::env::var_os("NO_COLOR").is_none()
                && std::io::stdout().is_terminal();
            let renderer = TextRenderer::new(color);
            for file in &checked {
                renderer.render_file(file, &mut stdout)?;
            }
            writeln!(stdout, "{}", renderer.summary(&checked, args.deny_warnings))?;
        }
    }

    let rejected = checked
        .iter()
        .filter(|file| !file.passes(args.deny_warnings))
        .count();
    tracing::info!(files = checked.len(), rejected, "check finished");

    Ok(if rejected == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_symbols(args: &DictionaryArgs) -> Result<ExitCode> {
    let table = Settings::resolve(args)?.symbol_table()?;
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(ExitCode::SUCCESS)
}
