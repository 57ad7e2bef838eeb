//! Parser fixture runner.
//!
//! Each block in `tests/parser/*.test` carries an optional `# expect: ok|error`
//! header. `ok` cases compare the parsed document's S-expression rendering;
//! `error` cases only require that parsing fails.

use ebl_kernel::ast::sexpr::format_document;
use ebl_kernel::parser::parse;

use crate::{split_blocks, TestResult, TestSummary};

#[derive(Debug, Clone)]
pub struct ParserTestCase {
    pub name: String,
    pub line_number: usize,
    pub input: String,
    pub expected: ParserExpectation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParserExpectation {
    /// Expected S-expression rendering.
    Ok(String),
    /// Parsing must fail; the text documents why.
    Error(String),
}

pub fn parse_parser_tests(content: &str) -> Vec<ParserTestCase> {
    split_blocks(content)
        .into_iter()
        .map(|block| {
            let expected = match block.header("expect") {
                Some("error") => ParserExpectation::Error(block.expected.clone()),
                _ => ParserExpectation::Ok(block.expected.clone()),
            };
            ParserTestCase {
                name: block.name,
                line_number: block.line_number,
                input: block.input,
                expected,
            }
        })
        .collect()
}

/// Collapse whitespace so expectations may wrap across lines.
fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl ParserTestCase {
    pub fn run(&self) -> TestResult {
        match (parse(&self.input), &self.expected) {
            (Ok(doc), ParserExpectation::Ok(expected)) => {
                let actual = format_document(&doc);
                if normalize(&actual) == normalize(expected) {
                    TestResult::Pass
                } else {
                    TestResult::Fail {
                        expected: expected.clone(),
                        actual,
                    }
                }
            }
            (Ok(doc), ParserExpectation::Error(reason)) => TestResult::Fail {
                expected: format!("parse error: {reason}"),
                actual: format_document(&doc),
            },
            (Err(_), ParserExpectation::Error(_)) => TestResult::Pass,
            (Err(errors), ParserExpectation::Ok(expected)) => TestResult::Fail {
                expected: expected.clone(),
                actual: errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            },
        }
    }
}

pub fn run_parser_tests(cases: &[ParserTestCase]) -> TestSummary {
    let mut summary = TestSummary::new();
    for case in cases {
        summary.record(&case.name, case.line_number, case.run());
    }
    summary
}
