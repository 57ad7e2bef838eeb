//! Test utilities for EBL.
//!
//! Provides parsers and runners for the fixture formats used in the workspace:
//! - `tests/parser/*.test`: source with the expected S-expression AST
//! - `tests/validator/*.test`: source, dictionaries and the expected issue codes
//!
//! Both formats share the same block layout:
//!
//! ```text
//! # test: name
//! # key: value        (any number of header lines)
//! ---
//! source
//! ---
//! expected
//! ===
//! ```

pub mod parser;
pub mod validator;

use std::fmt;

/// The result of running a single test case.
#[derive(Debug, Clone)]
pub enum TestResult {
    Pass,
    /// Expected vs actual mismatch.
    Fail { expected: String, actual: String },
    /// The case could not be run at all.
    Error { message: String },
}

impl TestResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Fail { .. })
    }
}

/// Summary of running multiple test cases.
#[derive(Debug, Default)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub failures: Vec<TestFailure>,
}

/// A single failing case with its location in the fixture file.
#[derive(Debug, Clone)]
pub struct TestFailure {
    pub name: String,
    pub line: usize,
    pub result: TestResult,
}

impl TestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>, line: usize, result: TestResult) {
        match result {
            TestResult::Pass => {
                self.passed += 1;
                return;
            }
            TestResult::Fail { .. } => self.failed += 1,
            TestResult::Error { .. } => self.errors += 1,
        }
        self.failures.push(TestFailure {
            name: name.into(),
            line,
            result,
        });
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errors
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

impl fmt::Display for TestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} cases: {} passed, {} failed, {} errors",
            self.total(),
            self.passed,
            self.failed,
            self.errors
        )?;
        for failure in &self.failures {
            writeln!(f, "  {} (line {})", failure.name, failure.line)?;
            match &failure.result {
                TestResult::Fail { expected, actual } => {
                    writeln!(f, "    expected: {expected}")?;
                    writeln!(f, "    actual:   {actual}")?;
                }
                TestResult::Error { message } => writeln!(f, "    error: {message}")?,
                TestResult::Pass => {}
            }
        }
        Ok(())
    }
}

/// One `# test:` block before format-specific interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureBlock {
    pub name: String,
    /// 1-based line of the `# test:` header.
    pub line_number: usize,
    /// `# key: value` lines following the header, in order.
    pub headers: Vec<(String, String)>,
    pub input: String,
    /// Expected section, trimmed.
    pub expected: String,
}

impl FixtureBlock {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Split a fixture file into its `# test:` blocks.
pub fn split_blocks(content: &str) -> Vec<FixtureBlock> {
    let mut blocks = Vec::new();
    let mut lines = content.lines().enumerate().peekable();

    while let Some((index, line)) = lines.next() {
        let Some(name) = line.trim().strip_prefix("# test:") else {
            continue;
        };

        let mut headers = Vec::new();
        while let Some((_, next)) = lines.peek() {
            let Some((key, value)) = next
                .trim()
                .strip_prefix('#')
                .and_then(|rest| rest.split_once(':'))
            else {
                break;
            };
            headers.push((key.trim().to_string(), value.trim().to_string()));
            lines.next();
        }

        let mut section = |terminator: &str| {
            let mut collected = Vec::new();
            for (_, line) in lines.by_ref() {
                if line.trim() == terminator {
                    break;
                }
                collected.push(line);
            }
            collected.join("\n")
        };
        section("---");
        let input = section("---");
        let expected = section("===").trim().to_string();

        blocks.push(FixtureBlock {
            name: name.trim().to_string(),
            line_number: index + 1,
            headers,
            input,
            expected,
        });
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_blocks_with_headers() {
        let content = "\
// leading commentary is ignored
# test: first
# dict: banking
# options: lenient
---
Process P {}
---
error E101
===

# test: second
---
DataObject D {}
---
===
";
        let blocks = split_blocks(content);
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].name, "first");
        assert_eq!(blocks[0].line_number, 2);
        assert_eq!(blocks[0].header("dict"), Some("banking"));
        assert_eq!(blocks[0].header("options"), Some("lenient"));
        assert_eq!(blocks[0].input, "Process P {}");
        assert_eq!(blocks[0].expected, "error E101");

        assert_eq!(blocks[1].name, "second");
        assert!(blocks[1].headers.is_empty());
        assert_eq!(blocks[1].expected, "");
    }

    #[test]
    fn summary_counts() {
        let mut summary = TestSummary::new();
        summary.record("a", 1, TestResult::Pass);
        summary.record(
            "b",
            9,
            TestResult::Fail {
                expected: "x".into(),
                actual: "y".into(),
            },
        );
        assert_eq!(summary.total(), 2);
        assert!(!summary.all_passed());
        assert_eq!(summary.failures[0].name, "b");
        assert!(summary.to_string().contains("b (line 9)"));
    }
}
