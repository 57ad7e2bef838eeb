//! ebl-types: pure data types shared by the EBL toolchain.
//!
//! - **Canonical names**: case- and punctuation-insensitive symbol identity
//! - **Diagnostics**: issue codes, severities, spans and the per-run
//!   accumulator the validator writes into
//!
//! Nothing here performs I/O.

pub mod canonical;
pub mod diagnostics;

pub use canonical::{canon, CanonicalName};
pub use diagnostics::{DiagnosticSink, Diagnostics, IssueCode, Severity, Span, ValidationIssue};
