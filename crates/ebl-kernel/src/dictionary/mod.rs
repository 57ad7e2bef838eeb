//! Vocabulary and permission dictionaries.
//!
//! A dictionary is a JSON document with a shared `core` (reserved keywords,
//! verb permission kinds, relationship types) and any number of `domains`
//! (actors, verbs, entities, data objects and who may do what to which).
//! [`RawDictionary`] is the document as written; [`SymbolTable`] is the
//! compiled union of one or more of them, queried by the validator.

mod raw;
mod symbols;

pub use raw::{RawCore, RawDataPerms, RawDictionary, RawDomain, RawKeywords};
pub use symbols::{PermissionKind, Restriction, SymbolTable};
