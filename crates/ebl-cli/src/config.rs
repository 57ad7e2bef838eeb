//! `ebl.toml` discovery and loading.
//!
//! ```toml
//! dictionaries = ["dictionaries/banking.json", "dictionaries/kyc.json"]
//!
//! [validator]
//! check-relationship-endpoints = true
//! check-free-text = false
//! ```
//!
//! Lookup order: an explicit `--config`, then `./ebl.toml`, then
//! `$XDG_CONFIG_HOME/ebl/ebl.toml`. Relative dictionary paths resolve
//! against the directory of the file that names them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use ebl_kernel::ValidatorOptions;
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "ebl.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dictionaries: Vec<PathBuf>,
    pub validator: ValidatorOptions,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid config")
    }

    /// Load a config file, resolving its dictionary paths.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&text)
            .with_context(|| format!("failed to load config {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for dict in &mut config.dictionaries {
            if dict.is_relative() {
                *dict = base.join(&*dict);
            }
        }
        Ok(config)
    }

    /// Find and load the config that applies, if any.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let candidates = [Some(PathBuf::from(CONFIG_FILE_NAME)), user_config_path()];
        for candidate in candidates.into_iter().flatten() {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "using config");
                let config = Self::load(&candidate)?;
                return Ok((config, Some(candidate)));
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok((Self::default(), None))
    }
}

/// `$XDG_CONFIG_HOME/ebl/ebl.toml` or the platform equivalent.
pub fn user_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join("ebl").join(CONFIG_FILE_NAME))
}
