//! Semantic validation for EBL documents.
//!
//! The validator runs after parsing and checks every name in the document
//! against a compiled [`SymbolTable`](crate::dictionary::SymbolTable):
//!
//! - **Vocabulary**: are actors, verbs and relationship types known?
//! - **Permissions**: may this actor perform this verb, read or write this data object?
//! - **References**: does every `dataRef` and step data object resolve?
//! - **Hygiene**: reserved words, unused actors, inverted ranges, enum defaults
//!
//! # Example
//!
//! ```ignore
//! use ebl_kernel::dictionary::SymbolTable;
//! use ebl_kernel::parser::parse;
//! use ebl_kernel::validator::Validator;
//!
//! let symbols = SymbolTable::from_json_str(dictionary_json)?;
//! let document = parse(source)?;
//! let diagnostics = Validator::new(&symbols).validate(&document);
//!
//! for issue in diagnostics.issues() {
//!     println!("{}", issue.format(source));
//! }
//! ```

mod actor_tracker;
mod options;
pub mod rules;
mod walker;

pub use actor_tracker::{ActorFrame, ActorTracker};
pub use options::ValidatorOptions;
pub use walker::Validator;
