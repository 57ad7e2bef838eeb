//! Rendering check results for humans (ariadne) and machines (JSON).

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use ebl_kernel::parser::ParseError;
use ebl_kernel::{Diagnostics, Severity, ValidationIssue};
use owo_colors::OwoColorize;
use serde::Serialize;

/// What happened to one document.
#[derive(Debug)]
pub enum Outcome {
    Validated(Diagnostics),
    ParseFailed(Vec<ParseError>),
}

/// A checked document with the source it was checked against.
#[derive(Debug)]
pub struct CheckedFile {
    pub path: PathBuf,
    pub source: String,
    pub outcome: Outcome,
}

impl CheckedFile {
    pub fn error_count(&self) -> usize {
        match &self.outcome {
            Outcome::Validated(diagnostics) => diagnostics.error_count(),
            Outcome::ParseFailed(errors) => errors.len(),
        }
    }

    pub fn warning_count(&self) -> usize {
        match &self.outcome {
            Outcome::Validated(diagnostics) => diagnostics.warning_count(),
            Outcome::ParseFailed(_) => 0,
        }
    }

    /// Whether the document passes, optionally treating warnings as failures.
    pub fn passes(&self, deny_warnings: bool) -> bool {
        match &self.outcome {
            Outcome::Validated(diagnostics) => {
                diagnostics.is_accepted() && !(deny_warnings && diagnostics.warning_count() > 0)
            }
            Outcome::ParseFailed(_) => false,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonParseError<'a> {
    message: &'a str,
    line: usize,
    column: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonIssue<'a> {
    #[serde(flatten)]
    issue: &'a ValidationIssue,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport<'a> {
    file: String,
    accepted: bool,
    errors: usize,
    warnings: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parse_errors: Vec<JsonParseError<'a>>,
    issues: Vec<JsonIssue<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    accepted: bool,
    files: Vec<FileReport<'a>>,
}

impl<'a> FileReport<'a> {
    fn new(file: &'a CheckedFile, deny_warnings: bool) -> Self {
        let (parse_errors, issues) = match &file.outcome {
            Outcome::ParseFailed(errors) => {
                let errors = errors
                    .iter()
                    .map(|error| {
                        let (line, column) = error.span.line_col(&file.source);
                        JsonParseError {
                            message: &error.message,
                            line,
                            column,
                        }
                    })
                    .collect();
                (errors, Vec::new())
            }
            Outcome::Validated(diagnostics) => {
                let issues = diagnostics
                    .issues()
                    .iter()
                    .map(|issue| {
                        let position = issue.span.map(|span| span.line_col(&file.source));
                        JsonIssue {
                            issue,
                            line: position.map(|(line, _)| line),
                            column: position.map(|(_, column)| column),
                        }
                    })
                    .collect();
                (Vec::new(), issues)
            }
        };
        Self {
            file: file.path.display().to_string(),
            accepted: file.passes(deny_warnings),
            errors: file.error_count(),
            warnings: file.warning_count(),
            parse_errors,
            issues,
        }
    }
}

/// Serialize all results as one pretty-printed JSON document.
pub fn to_json(files: &[CheckedFile], deny_warnings: bool) -> Result<String> {
    let report = JsonReport {
        accepted: files.iter().all(|file| file.passes(deny_warnings)),
        files: files
            .iter()
            .map(|file| FileReport::new(file, deny_warnings))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Text rendering of check results.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    color: bool,
}

impl TextRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn config(&self) -> Config {
        Config::default()
            .with_color(self.color)
            .with_index_type(IndexType::Byte)
    }

    /// Render every issue of one file.
    pub fn render_file(&self, file: &CheckedFile, out: &mut impl Write) -> Result<()> {
        let id = file.path.display().to_string();
        match &file.outcome {
            Outcome::ParseFailed(errors) => {
                for error in errors {
                    self.render_parse_error(&id, &file.source, error, out)?;
                }
            }
            Outcome::Validated(diagnostics) => {
                for issue in diagnostics.issues() {
                    self.render_issue(&id, &file.source, issue, out)?;
                }
            }
        }
        Ok(())
    }

    fn render_issue(
        &self,
        id: &str,
        source: &str,
        issue: &ValidationIssue,
        out: &mut impl Write,
    ) -> Result<()> {
        let (kind, color) = match issue.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };
        let range = issue.span.map(|span| span.range()).unwrap_or(0..0);

        // Without a span there is no label to carry the context, and ariadne
        // drops notes on label-less reports.
        let message = match (&issue.span, &issue.context) {
            (None, Some(context)) => format!("{} ({context})", issue.message),
            _ => issue.message.clone(),
        };

        let mut report = Report::build(kind, (id.to_string(), range.clone()))
            .with_config(self.config())
            .with_code(issue.code.code())
            .with_message(message);
        if issue.span.is_some() {
            let label = Label::new((id.to_string(), range)).with_color(color);
            let label = match &issue.context {
                Some(context) => label.with_message(context),
                None => label,
            };
            report = report.with_label(label);
        }

        report
            .finish()
            .write((id.to_string(), Source::from(source)), out)?;
        Ok(())
    }

    fn render_parse_error(
        &self,
        id: &str,
        source: &str,
        error: &ParseError,
        out: &mut impl Write,
    ) -> Result<()> {
        let range = error.span.range();
        Report::build(ReportKind::Error, (id.to_string(), range.clone()))
            .with_config(self.config())
            .with_message("parse error")
            .with_label(
                Label::new((id.to_string(), range))
                    .with_message(&error.message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((id.to_string(), Source::from(source)), out)?;
        Ok(())
    }

    /// The closing one-line summary.
    pub fn summary(&self, files: &[CheckedFile], deny_warnings: bool) -> String {
        let errors: usize = files.iter().map(CheckedFile::error_count).sum();
        let warnings: usize = files.iter().map(CheckedFile::warning_count).sum();
        let rejected = files.iter().filter(|file| !file.passes(deny_warnings)).count();

        let counts = format!(
            "{} file(s) checked: {errors} error(s), {warnings} warning(s)",
            files.len()
        );
        let verdict = if rejected == 0 {
            "accepted".to_string()
        } else {
            format!("{rejected} rejected")
        };

        if !self.color {
            return format!("{counts}; {verdict}");
        }
        let verdict = if rejected == 0 {
            verdict.green().bold().to_string()
        } else {
            verdict.red().bold().to_string()
        };
        format!("{}; {verdict}", counts.bold())
    }
}
