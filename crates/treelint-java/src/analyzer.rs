//! Analyzer orchestrating lint execution over Java sources on disk.

use crate::parser::JavaParser;
use crate::report::{FileDiagnostic, LintResult, RuleFailureRecord, SkippedFile};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use treelint_core::{Config, DiagnosticBuffer, Dispatcher, Rule, RuleBox};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file failed to parse and `fail_on_parse_error` is set.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] treelint_core::ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to abort on parse errors (default: false, files are
    /// skipped with a record instead).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// Rules disabled by the configuration are dropped here, before the
    /// dispatcher's subscription table is built.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        // Merge exclude patterns from config
        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.clone());

        // Add default excludes if none specified
        if exclude_patterns.is_empty() {
            exclude_patterns.extend(["**/target/**".to_string(), "**/build/**".to_string()]);
        }

        let rules: Vec<RuleBox> = self
            .rules
            .into_iter()
            .filter(|rule| {
                let enabled = config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.name());
                }
                enabled
            })
            .collect();

        Ok(Analyzer {
            root,
            dispatcher: Dispatcher::new(rules),
            exclude_patterns,
            config,
            fail_on_parse_error: self.fail_on_parse_error,
            parser: JavaParser::new(),
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance. One analyzer drives
/// one dispatcher and therefore one rule-state set; it must not be shared
/// across concurrent traversals. Analyze files in parallel by giving each
/// worker its own analyzer.
pub struct Analyzer {
    root: PathBuf,
    dispatcher: Dispatcher,
    exclude_patterns: Vec<String>,
    config: Config,
    fail_on_parse_error: bool,
    parser: JavaParser,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of enabled rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.dispatcher.rules().len()
    }

    /// Analyzes all Java files under the root and returns the results.
    ///
    /// A file that cannot be parsed yields no diagnostics and a
    /// [`SkippedFile`] record; a rule that fails on one file is contained
    /// and recorded without disturbing other rules or files.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery or reading fails, or on the first
    /// parse error when `fail_on_parse_error` is set.
    pub fn analyze(&mut self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let mut result = LintResult::new();
        let files = self.discover_files()?;

        info!("Found {} files to analyze", files.len());

        for file_path in &files {
            let relative = file_path
                .strip_prefix(&self.root)
                .map_or_else(|_| file_path.clone(), Path::to_path_buf);

            let source = std::fs::read_to_string(file_path)?;
            let tree = match self.parser.parse(&source) {
                Ok(tree) => tree,
                Err(error) => {
                    warn!("Skipping {}: {}", file_path.display(), error);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse {
                            path: file_path.clone(),
                            message: error.to_string(),
                        });
                    }
                    result.skipped.push(SkippedFile {
                        file: relative,
                        reason: error.to_string(),
                    });
                    continue;
                }
            };

            debug!("Analyzing: {}", file_path.display());
            let mut sink = DiagnosticBuffer::new();
            for failure in self.dispatcher.run(&tree, &mut sink) {
                result.failures.push(RuleFailureRecord {
                    file: relative.clone(),
                    rule: failure.rule.to_string(),
                    error: failure.error.to_string(),
                });
            }

            for mut diagnostic in sink.into_diagnostics() {
                if let Some(severity) = self.config.rule_severity(&diagnostic.rule) {
                    diagnostic.severity = severity;
                }
                result.diagnostics.push(FileDiagnostic {
                    file: relative.clone(),
                    diagnostic,
                });
            }
            result.files_checked += 1;
        }

        // Sort diagnostics by file, then line, then code
        result.diagnostics.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then(a.diagnostic.line.cmp(&b.diagnostic.line))
                .then(a.diagnostic.code.cmp(&b.diagnostic.code))
        });

        info!(
            "Analysis complete: {} diagnostics in {} files",
            result.diagnostics.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Discovers all Java source files to analyze, in stable order.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let pattern = format!("{}/**/*.java", self.root.display());
        let mut files = Vec::new();

        for entry in glob::glob(&pattern)? {
            let path = entry.map_err(|e| AnalyzerError::Io(e.into_error()))?;

            if self.should_exclude(&path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path);
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.exclude_patterns {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
            }

            // Also check as substring for patterns like "**/target/**"
            let normalized_pattern = pattern.replace("**", "");
            if !normalized_pattern.is_empty() && path_str.contains(&normalized_pattern) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treelint_rules::ExceptionContext;

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/target/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/target/**")
            .excludes(["**/generated/**"])
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.should_exclude(Path::new("/foo/target/classes/Main.java")));
        assert!(analyzer.should_exclude(Path::new("/foo/generated/Stub.java")));
        assert!(!analyzer.should_exclude(Path::new("/foo/src/Main.java")));
    }

    #[test]
    fn disabled_rules_are_dropped_at_build_time() {
        let config = Config::parse("[rules.exception-context]\nenabled = false\n")
            .expect("config parses");
        let analyzer = Analyzer::builder()
            .root(".")
            .config(config)
            .rule(ExceptionContext::new())
            .build()
            .expect("Failed to build analyzer");

        assert_eq!(analyzer.rule_count(), 0);
    }
}
