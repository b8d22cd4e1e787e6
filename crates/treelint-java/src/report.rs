//! Result types for a lint run over files on disk.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use treelint_core::{Diagnostic, Severity};

/// A diagnostic attributed to the file it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiagnostic {
    /// Path of the offending file, relative to the analyzer root.
    pub file: PathBuf,
    /// The diagnostic itself.
    #[serde(flatten)]
    pub diagnostic: Diagnostic,
}

impl std::fmt::Display for FileDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.diagnostic)
    }
}

/// A file the analyzer skipped because it could not be parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    /// Path of the skipped file, relative to the analyzer root.
    pub file: PathBuf,
    /// Why the file was skipped.
    pub reason: String,
}

/// A rule failure contained while analyzing one file.
///
/// The rule was disabled for the remainder of that file only; diagnostics it
/// emitted before failing are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFailureRecord {
    /// Path of the file the rule failed on.
    pub file: PathBuf,
    /// Name of the failed rule.
    pub rule: String,
    /// The error the rule raised.
    pub error: String,
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All diagnostics found, sorted by file, line, and code.
    pub diagnostics: Vec<FileDiagnostic>,
    /// Number of files analyzed to completion.
    pub files_checked: usize,
    /// Files skipped as unparseable.
    pub skipped: Vec<SkippedFile>,
    /// Per-rule-per-file failures contained during analysis.
    pub failures: Vec<RuleFailureRecord>,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any error-severity diagnostics.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_diagnostics_at(Severity::Error)
    }

    /// Checks if any diagnostics meet or exceed the given severity.
    #[must_use]
    pub fn has_diagnostics_at(&self, severity: Severity) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.diagnostic.severity >= severity)
    }

    /// Counts diagnostics by severity as (errors, warnings, infos).
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |severity: Severity| {
            self.diagnostics
                .iter()
                .filter(|d| d.diagnostic.severity == severity)
                .count()
        };
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Prints a summary report to stdout.
    pub fn print_report(&self) {
        for diagnostic in &self.diagnostics {
            println!("{diagnostic}");
        }
        for skipped in &self.skipped {
            println!("skipped {}: {}", skipped.file.display(), skipped.reason);
        }

        let (errors, warnings, infos) = self.count_by_severity();
        println!(
            "\nFound {} error(s), {} warning(s), {} info(s) in {} file(s)",
            errors, warnings, infos, self.files_checked
        );
    }

    /// Serializes the result as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_diagnostic(severity: Severity, line: usize) -> FileDiagnostic {
        FileDiagnostic {
            file: PathBuf::from("src/Main.java"),
            diagnostic: Diagnostic::new(
                "JL001",
                "exception-context",
                severity,
                line,
                "Either log or rethrow this exception along with some contextual information.",
            ),
        }
    }

    #[test]
    fn display_prefixes_the_file() {
        let diagnostic = make_diagnostic(Severity::Error, 14);
        assert!(diagnostic
            .to_string()
            .starts_with("src/Main.java:14: error [JL001]"));
    }

    #[test]
    fn counts_by_severity() {
        let mut result = LintResult::new();
        result.diagnostics.push(make_diagnostic(Severity::Error, 1));
        result
            .diagnostics
            .push(make_diagnostic(Severity::Warning, 2));
        result.diagnostics.push(make_diagnostic(Severity::Error, 3));

        assert_eq!(result.count_by_severity(), (2, 1, 0));
        assert!(result.has_errors());
        assert!(result.has_diagnostics_at(Severity::Warning));
    }

    #[test]
    fn json_round_trips() {
        let mut result = LintResult::new();
        result.files_checked = 1;
        result.diagnostics.push(make_diagnostic(Severity::Error, 7));

        let json = result.to_json().expect("serializes");
        assert!(json.contains("JL001"));
        assert!(json.contains("Main.java"));

        let back: LintResult = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back.diagnostics, result.diagnostics);
        assert_eq!(back.files_checked, 1);
    }
}
