//! # treelint-java
//!
//! Java front end for treelint.
//!
//! This crate connects the parser-independent engine in `treelint-core` to
//! real Java sources. It provides:
//!
//! - [`JavaParser`] for Tree-sitter based parsing into core syntax trees
//! - [`Analyzer`] to discover, parse, and dispatch rules over the Java
//!   files under a root directory
//! - [`LintResult`] with file-attributed diagnostics plus skip and failure
//!   records
//!
//! ## Example
//!
//! ```ignore
//! use treelint_java::Analyzer;
//! use treelint_rules::all_rules;
//!
//! let mut builder = Analyzer::builder().root("./src/main/java");
//! for rule in all_rules() {
//!     builder = builder.rule_box(rule);
//! }
//! let mut analyzer = builder.build()?;
//! let result = analyzer.analyze()?;
//! result.print_report();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod parser;
mod report;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use parser::{JavaParser, ParseError};
pub use report::{FileDiagnostic, LintResult, RuleFailureRecord, SkippedFile};
