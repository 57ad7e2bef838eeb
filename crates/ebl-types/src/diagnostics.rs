//! Validation issues and the per-run diagnostics they accumulate into.
//!
//! A validation run owns a [`DiagnosticSink`]. Rules append to it while the
//! syntax tree is walked; [`DiagnosticSink::finish`] then hands the caller a
//! [`Diagnostics`] value with no mutating API. Errors block acceptance of a
//! document, warnings never do.

use std::fmt;

use serde::Serialize;

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks acceptance of the document.
    Error,
    /// Advisory only.
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier for every rule that can fire.
///
/// `E1xx` codes are errors and `W2xx` codes are warnings. The codes are part
/// of the output contract: fixture files and downstream tooling match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCode {
    UnknownActor,
    UnknownVerb,
    VerbNotPermitted,
    ReadNotPermitted,
    WriteNotPermitted,
    UnknownDataRef,
    UnknownRelationshipType,
    ReservedWord,
    FieldRangeInverted,
    EnumDefaultNotInValues,
    UnusedActor,
    VerbNeverPermitted,
    EnumWithoutValues,
    UnknownRelationshipEndpoint,
    ReservedWordInText,
}

impl IssueCode {
    /// Short code such as `E103`.
    pub fn code(&self) -> &'static str {
        match self {
            IssueCode::UnknownActor => "E101",
            IssueCode::UnknownVerb => "E102",
            IssueCode::VerbNotPermitted => "E103",
            IssueCode::ReadNotPermitted => "E104",
            IssueCode::WriteNotPermitted => "E105",
            IssueCode::UnknownDataRef => "E106",
            IssueCode::UnknownRelationshipType => "E107",
            IssueCode::ReservedWord => "E108",
            IssueCode::FieldRangeInverted => "E109",
            IssueCode::EnumDefaultNotInValues => "E110",
            IssueCode::UnusedActor => "W201",
            IssueCode::VerbNeverPermitted => "W202",
            IssueCode::EnumWithoutValues => "W203",
            IssueCode::UnknownRelationshipEndpoint => "W204",
            IssueCode::ReservedWordInText => "W205",
        }
    }

    /// The severity this code is always reported with.
    pub fn severity(&self) -> Severity {
        match self {
            IssueCode::UnusedActor
            | IssueCode::VerbNeverPermitted
            | IssueCode::EnumWithoutValues
            | IssueCode::UnknownRelationshipEndpoint
            | IssueCode::ReservedWordInText => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Look a code up by its short form (`E103`) or kebab-case name.
    pub fn parse(s: &str) -> Option<Self> {
        IssueCode::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(s) || c.name() == s)
    }

    /// Kebab-case rule name, e.g. `verb-not-permitted`.
    pub fn name(&self) -> &'static str {
        match self {
            IssueCode::UnknownActor => "unknown-actor",
            IssueCode::UnknownVerb => "unknown-verb",
            IssueCode::VerbNotPermitted => "verb-not-permitted",
            IssueCode::ReadNotPermitted => "read-not-permitted",
            IssueCode::WriteNotPermitted => "write-not-permitted",
            IssueCode::UnknownDataRef => "unknown-data-ref",
            IssueCode::UnknownRelationshipType => "unknown-relationship-type",
            IssueCode::ReservedWord => "reserved-word",
            IssueCode::FieldRangeInverted => "field-range-inverted",
            IssueCode::EnumDefaultNotInValues => "enum-default-not-in-values",
            IssueCode::UnusedActor => "unused-actor",
            IssueCode::VerbNeverPermitted => "verb-never-permitted",
            IssueCode::EnumWithoutValues => "enum-without-values",
            IssueCode::UnknownRelationshipEndpoint => "unknown-relationship-endpoint",
            IssueCode::ReservedWordInText => "reserved-word-in-text",
        }
    }

    pub const ALL: [IssueCode; 15] = [
        IssueCode::UnknownActor,
        IssueCode::UnknownVerb,
        IssueCode::VerbNotPermitted,
        IssueCode::ReadNotPermitted,
        IssueCode::WriteNotPermitted,
        IssueCode::UnknownDataRef,
        IssueCode::UnknownRelationshipType,
        IssueCode::ReservedWord,
        IssueCode::FieldRangeInverted,
        IssueCode::EnumDefaultNotInValues,
        IssueCode::UnusedActor,
        IssueCode::VerbNeverPermitted,
        IssueCode::EnumWithoutValues,
        IssueCode::UnknownRelationshipEndpoint,
        IssueCode::ReservedWordInText,
    ];
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Byte range into the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// 1-based line and column (in chars) of the span start.
    ///
    /// Offsets past the end of `source` clamp to the last position.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let mut offset = self.start.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let col = before[line_start..].chars().count() + 1;
        (line, col)
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// A single issue found by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub severity: Severity,
    pub message: String,
    /// Where in the document the issue arose, e.g. `Process 'Settle', step 2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl ValidationIssue {
    /// Create an issue whose severity is taken from its code.
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            message: message.into(),
            context: None,
            span: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// One-line rendering with a `line:col` prefix resolved against `source`.
    pub fn format(&self, source: &str) -> String {
        let location = match self.span {
            Some(span) => {
                let (line, col) = span.line_col(source);
                format!("{line}:{col}: ")
            }
            None => String::new(),
        };
        format!("{location}{self}")
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }
        Ok(())
    }
}

/// Append-only accumulator used during a single validation run.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    issues: Vec<ValidationIssue>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Freeze the accumulated issues.
    pub fn finish(self) -> Diagnostics {
        Diagnostics {
            issues: self.issues,
        }
    }
}

/// The frozen outcome of one validation run.
///
/// Issues keep the order they were recorded in. Errors and warnings are
/// exposed as two independent views over that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    issues: Vec<ValidationIssue>,
}

impl Diagnostics {
    /// All issues in traversal order.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// A document is accepted when no error was recorded.
    pub fn is_accepted(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Issues carrying the given code, in order.
    pub fn with_code(&self, code: IssueCode) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }
}
