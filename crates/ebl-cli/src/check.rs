//! Loading dictionaries and checking documents.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use ebl_kernel::{EblError, SymbolTable, ValidatorOptions};

use crate::cli::DictionaryArgs;
use crate::config::Config;
use crate::report::{CheckedFile, Outcome};

/// Dictionaries and options after config and flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub dictionaries: Vec<PathBuf>,
    pub options: ValidatorOptions,
}

impl Settings {
    /// Config file entries first, then `--dict` flags in the order given.
    pub fn resolve(args: &DictionaryArgs) -> Result<Self> {
        let (config, origin) = Config::discover(args.config.as_deref())?;
        if let Some(origin) = &origin {
            tracing::info!(config = %origin.display(), "loaded config");
        }

        let mut dictionaries = config.dictionaries;
        dictionaries.extend(args.dictionaries.iter().cloned());
        Ok(Self {
            dictionaries,
            options: config.validator,
        })
    }

    pub fn symbol_table(&self) -> Result<SymbolTable> {
        if self.dictionaries.is_empty() {
            tracing::warn!("no dictionaries configured; every name will be unknown");
        }
        let table = SymbolTable::from_paths(&self.dictionaries)?;
        tracing::info!(dictionaries = self.dictionaries.len(), "compiled symbol table");
        Ok(table)
    }
}

fn check_source(path: PathBuf, source: String, symbols: &SymbolTable, options: ValidatorOptions) -> Result<CheckedFile> {
    let outcome = match ebl_kernel::check(&source, symbols, options) {
        Ok(diagnostics) => Outcome::Validated(diagnostics),
        Err(EblError::Parse(errors)) => Outcome::ParseFailed(errors),
        Err(err) => return Err(err.into()),
    };
    Ok(CheckedFile { path, source, outcome })
}

async fn check_file(path: PathBuf, symbols: Arc<SymbolTable>, options: ValidatorOptions) -> Result<CheckedFile> {
    let source = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    tokio::task::spawn_blocking(move || {
        let _span = tracing::debug_span!("check", file = %path.display()).entered();
        check_source(path, source, &symbols, options)
    })
    .await
    .context("validation task panicked")?
}

/// Check every file concurrently; results come back in input order.
pub async fn check_files(
    files: &[impl AsRef<Path>],
    symbols: SymbolTable,
    options: ValidatorOptions,
) -> Result<Vec<CheckedFile>> {
    let symbols = Arc::new(symbols);
    let handles: Vec<_> = files
        .iter()
        .map(|file| tokio::spawn(check_file(file.as_ref().to_path_buf(), Arc::clone(&symbols), options)))
        .collect();

    let mut checked = Vec::with_capacity(handles.len());
    for handle in handles {
        checked.push(handle.await.context("check task panicked")??);
    }
    Ok(checked)
}
