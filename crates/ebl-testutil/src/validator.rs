//! Validator fixture runner.
//!
//! Blocks in `tests/validator/*.test` name their dictionaries and list the
//! expected issues, one `severity code` per line in emission order:
//!
//! ```text
//! # test: verb_not_permitted
//! # dict: banking
//! ---
//! Process P { Actors: [Teller] Steps: - Teller Approve }
//! ---
//! error E103
//! ===
//! ```
//!
//! `# dict:` takes a comma-separated list of fixture names resolved as
//! `<dir>/<name>.json`. `# options: lenient` turns the supplemental checks
//! off. An expected section of exactly `parse-error` requires the source to
//! be rejected by the parser.

use std::collections::HashMap;
use std::path::Path;

use ebl_kernel::parser::parse;
use ebl_kernel::{SymbolTable, Validator, ValidatorOptions};

use crate::{split_blocks, TestResult, TestSummary};

#[derive(Debug, Clone)]
pub struct ValidatorTestCase {
    pub name: String,
    pub line_number: usize,
    pub dictionaries: Vec<String>,
    pub options: ValidatorOptions,
    pub input: String,
    pub expected: ValidatorExpectation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorExpectation {
    /// `severity code` lines, in order. Empty means a clean document.
    Issues(Vec<String>),
    ParseError,
}

pub fn parse_validator_tests(content: &str) -> Vec<ValidatorTestCase> {
    split_blocks(content)
        .into_iter()
        .map(|block| {
            let dictionaries = block
                .header("dict")
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            let options = match block.header("options") {
                Some("lenient") => ValidatorOptions::lenient(),
                _ => ValidatorOptions::strict(),
            };
            let expected = if block.expected == "parse-error" {
                ValidatorExpectation::ParseError
            } else {
                ValidatorExpectation::Issues(
                    block
                        .expected
                        .lines()
                        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
                        .filter(|line| !line.is_empty())
                        .collect(),
                )
            };
            ValidatorTestCase {
                name: block.name,
                line_number: block.line_number,
                dictionaries,
                options,
                input: block.input,
                expected,
            }
        })
        .collect()
}

impl ValidatorTestCase {
    /// Run against an already compiled symbol table.
    pub fn run(&self, symbols: &SymbolTable) -> TestResult {
        let doc = match (parse(&self.input), &self.expected) {
            (Ok(doc), _) => doc,
            (Err(_), ValidatorExpectation::ParseError) => return TestResult::Pass,
            (Err(errors), ValidatorExpectation::Issues(_)) => {
                let first = errors.first().map(ToString::to_string).unwrap_or_default();
                return TestResult::Error {
                    message: format!("parse failed: {first}"),
                };
            }
        };

        let diagnostics = Validator::with_options(symbols, self.options).validate(&doc);
        let actual: Vec<String> = diagnostics
            .issues()
            .iter()
            .map(|issue| format!("{} {}", issue.severity, issue.code))
            .collect();

        match &self.expected {
            ValidatorExpectation::Issues(expected) if *expected == actual => TestResult::Pass,
            ValidatorExpectation::Issues(expected) => TestResult::Fail {
                expected: expected.join(", "),
                actual: diagnostics
                    .issues()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            },
            ValidatorExpectation::ParseError => TestResult::Fail {
                expected: "parse-error".into(),
                actual: actual.join(", "),
            },
        }
    }
}

/// Run every case, loading each distinct dictionary combination once from
/// `dict_dir`.
pub fn run_validator_tests(cases: &[ValidatorTestCase], dict_dir: &Path) -> TestSummary {
    let mut summary = TestSummary::new();
    let mut tables: HashMap<Vec<String>, SymbolTable> = HashMap::new();

    for case in cases {
        if !tables.contains_key(&case.dictionaries) {
            let paths: Vec<_> = case
                .dictionaries
                .iter()
                .map(|name| dict_dir.join(format!("{name}.json")))
                .collect();
            match SymbolTable::from_paths(&paths) {
                Ok(table) => {
                    tables.insert(case.dictionaries.clone(), table);
                }
                Err(err) => {
                    summary.record(
                        &case.name,
                        case.line_number,
                        TestResult::Error {
                            message: err.to_string(),
                        },
                    );
                    continue;
                }
            }
        }

        let result = match tables.get(&case.dictionaries) {
            Some(symbols) => case.run(symbols),
            None => TestResult::Error {
                message: "dictionary not loaded".into(),
            },
        };
        summary.record(&case.name, case.line_number, result);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    const DICT: &str = r#"{
        "domains": {
            "d": {
                "verbs": ["Approve", "View"],
                "actors": ["Teller"],
                "actorVerbs": { "Teller": ["View"] }
            }
        }
    }"#;

    #[test]
    fn parses_headers_and_expectations() {
        let cases = parse_validator_tests(
            r#"
# test: not_permitted
# dict: banking, kyc
# options: lenient
---
Process P { Steps: - Teller Approve }
---
error   E103
warning W202
===

# test: broken
---
Process {
---
parse-error
===
"#,
        );
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].dictionaries, ["banking", "kyc"]);
        assert_eq!(cases[0].options, ValidatorOptions::lenient());
        assert_eq!(
            cases[0].expected,
            ValidatorExpectation::Issues(vec!["error E103".into(), "warning W202".into()])
        );
        assert!(cases[1].dictionaries.is_empty());
        assert_eq!(cases[1].expected, ValidatorExpectation::ParseError);
    }

    #[test]
    fn runs_against_a_table() {
        let symbols = SymbolTable::from_json_str(DICT).expect("valid dictionary");
        let cases = parse_validator_tests(
            r#"
# test: not_permitted
---
Process P { Steps: - Teller Approve }
---
error E103
warning W202
===

# test: clean
---
Process P { Steps: - Teller View }
---
===

# test: wrong_expectation
---
Process P { Steps: - Teller View }
---
error E101
===
"#,
        );
        assert!(cases[0].run(&symbols).is_pass());
        assert!(cases[1].run(&symbols).is_pass());
        assert!(cases[2].run(&symbols).is_fail());
    }

    #[test]
    fn missing_dictionary_is_an_error() {
        let cases = parse_validator_tests(
            "# test: t\n# dict: nowhere\n---\nDataObject D {}\n---\n===\n",
        );
        let summary = run_validator_tests(&cases, Path::new("/definitely/not/here"));
        assert_eq!(summary.errors, 1);
        assert!(!summary.all_passed());
    }
}
