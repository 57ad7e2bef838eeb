//! ebl-kernel: the core of the EBL toolchain.
//!
//! This crate provides:
//!
//! - **Lexer**: Tokenizes EBL source using logos
//! - **Parser**: Builds the AST from tokens using chumsky
//! - **AST**: Type definitions for the syntax tree
//! - **Dictionary**: Decodes vocabulary/permission dictionaries and compiles them into a [`SymbolTable`]
//! - **Validator**: A single-pass semantic check of a document against a symbol table

pub mod ast;
pub mod dictionary;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod validator;

pub use dictionary::SymbolTable;
pub use ebl_types::{Diagnostics, IssueCode, Severity, ValidationIssue};
pub use error::{DictionaryError, EblError, EblResult};
pub use validator::{Validator, ValidatorOptions};

/// Parse and validate one document.
///
/// Parse failures are returned as [`EblError::Parse`]; everything the
/// validator finds is in the returned [`Diagnostics`].
pub fn check(source: &str, symbols: &SymbolTable, options: ValidatorOptions) -> EblResult<Diagnostics> {
    let document = parser::parse(source)?;
    Ok(Validator::with_options(symbols, options).validate(&document))
}
