//! # treelint-core
//!
//! Parser-independent engine for syntax-tree lint rules.
//!
//! This crate provides the foundational types for building linters over an
//! externally-parsed syntax tree. It includes:
//!
//! - [`SyntaxTree`] and [`TreeBuilder`] for the index-arena tree a parser
//!   adapter fills in, read-only during analysis
//! - [`NodeKind`] as the closed catalog of grammar productions rules can
//!   subscribe to
//! - [`Rule`] for the enter/leave contract of tree-walking rules
//! - [`Dispatcher`] for subscription-based depth-first fan-out over a tree
//! - [`Diagnostic`] and [`DiagnosticSink`] for the one-way reporting channel
//!
//! ## Example
//!
//! ```ignore
//! use treelint_core::{Dispatcher, DiagnosticBuffer};
//!
//! let mut dispatcher = Dispatcher::new(vec![Box::new(MyRule::new())]);
//! let mut sink = DiagnosticBuffer::new();
//! let failures = dispatcher.run(&tree, &mut sink);
//! for diagnostic in sink.diagnostics() {
//!     println!("{diagnostic}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod diagnostic;
mod dispatcher;
mod kind;
mod rule;
mod tree;

pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use diagnostic::{Diagnostic, DiagnosticBuffer, DiagnosticSink, Severity};
pub use dispatcher::Dispatcher;
pub use kind::NodeKind;
pub use rule::{Rule, RuleBox, RuleCtx, RuleError, RuleFailure};
pub use tree::{Descendants, NodeId, NodeRef, SyntaxTree, Token, TreeBuilder};
