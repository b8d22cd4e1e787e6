//! # treelint-rules
//!
//! Built-in lint rules for treelint.
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | JL001 | `exception-context` | Catch clauses must log or rethrow the caught exception with contextual information |
//!
//! ## Usage
//!
//! ```ignore
//! use treelint_core::{Dispatcher, DiagnosticBuffer};
//! use treelint_rules::all_rules;
//!
//! let mut dispatcher = Dispatcher::new(all_rules());
//! let mut sink = DiagnosticBuffer::new();
//! dispatcher.run(&tree, &mut sink);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod exception_context;

pub use exception_context::ExceptionContext;

/// Re-export core types for convenience.
pub use treelint_core::{Rule, RuleBox, Severity};

/// Returns all built-in rules, in stable registration order.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![Box::new(ExceptionContext::new())]
}
