//! Hard failures of the toolchain.
//!
//! Semantic problems in a document are never errors here; they are reported
//! as [`ebl_types::ValidationIssue`]s. These types cover input that is not
//! well-formed enough to validate at all.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ParseError;

/// A dictionary document could not be loaded.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dictionary {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that stops a document from reaching the validator.
#[derive(Debug, Error)]
pub enum EblError {
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error("document has {} parse error(s)", .0.len())]
    Parse(Vec<ParseError>),
}

impl From<Vec<ParseError>> for EblError {
    fn from(errors: Vec<ParseError>) -> Self {
        EblError::Parse(errors)
    }
}

/// Result type for toolchain operations.
pub type EblResult<T> = Result<T, EblError>;
