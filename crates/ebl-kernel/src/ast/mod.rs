//! Abstract Syntax Tree types for EBL.
//!
//! This module provides:
//! - AST type definitions (`types` module, re-exported at this level)
//! - S-expression formatter for compact parser assertions (`sexpr` module)

mod types;
pub mod sexpr;

pub use types::*;
