//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "ebl", about = "Semantic validator for EBL process definitions")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate EBL documents against the configured dictionaries
    Check(CheckArgs),

    /// Print the compiled symbol table as JSON
    Symbols(DictionaryArgs),
}

/// Where dictionaries come from.
#[derive(Debug, Clone, Args)]
pub struct DictionaryArgs {
    /// Config file (default: ./ebl.toml, then the user config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Additional dictionary file; may be repeated
    #[arg(short, long = "dict", value_name = "PATH")]
    pub dictionaries: Vec<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub dictionaries: DictionaryArgs,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Treat warnings as failures
    #[arg(long)]
    pub deny_warnings: bool,

    /// Skip the relationship-endpoint and free-text checks
    #[arg(long)]
    pub lenient: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Documents to validate
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Default `EnvFilter` directive for the verbosity level.
    pub fn log_directive(&self) -> String {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        format!("ebl_kernel={level},ebl_cli={level}")
    }
}
