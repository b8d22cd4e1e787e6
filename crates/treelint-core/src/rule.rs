//! Rule contract for tree-walking lint rules.

use crate::diagnostic::{Diagnostic, DiagnosticSink, Severity};
use crate::kind::NodeKind;
use crate::tree::NodeRef;
use thiserror::Error;

/// Errors a rule hook can raise during traversal.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The tree is missing a child the grammar guarantees. This points at a
    /// parser/grammar defect upstream, not at rule logic; rules fail fast
    /// instead of guessing.
    #[error("malformed syntax tree: {node} node is missing its {missing}")]
    MalformedTree {
        /// Kind of the enclosing node.
        node: NodeKind,
        /// The missing child.
        missing: &'static str,
    },

    /// A rule's private traversal state went out of balance, e.g. a frame
    /// pop without a matching push. Indicates asymmetric enter/leave
    /// dispatch or a predicate evaluating differently between the two.
    #[error("rule state imbalance: {detail}")]
    StateImbalance {
        /// What went out of balance.
        detail: &'static str,
    },
}

/// A per-rule, per-file failure contained at the dispatcher boundary.
#[derive(Debug)]
pub struct RuleFailure {
    /// Name of the failed rule.
    pub rule: &'static str,
    /// The error the rule raised.
    pub error: RuleError,
}

/// Reporting handle passed to rule hooks.
///
/// Carries the identity of the rule currently being invoked and forwards
/// diagnostics to the sink; rules never hold the sink themselves.
pub struct RuleCtx<'a> {
    code: &'static str,
    rule: &'static str,
    severity: Severity,
    sink: &'a mut dyn DiagnosticSink,
}

impl<'a> RuleCtx<'a> {
    /// Creates a reporting context for one rule. Normally done by the
    /// dispatcher; public so rule crates can drive hooks directly in tests.
    pub fn new(
        code: &'static str,
        rule: &'static str,
        severity: Severity,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Self {
            code,
            rule,
            severity,
            sink,
        }
    }

    /// Reports a diagnostic anchored at `node`'s starting line.
    pub fn report(&mut self, node: NodeRef<'_>, message: impl Into<String>) {
        self.report_at_line(node.start_line(), message);
    }

    /// Reports a diagnostic at an explicit 1-based line.
    pub fn report_at_line(&mut self, line: usize, message: impl Into<String>) {
        self.sink.report(Diagnostic::new(
            self.code,
            self.rule,
            self.severity,
            line,
            message,
        ));
    }
}

/// A tree-walking lint rule.
///
/// A rule declares the node kinds it wants to see once, and the
/// [`Dispatcher`](crate::Dispatcher) invokes its enter hook before a
/// subscribed node's children are visited and its leave hook after. Any
/// analysis state lives privately on the rule; no rule may inspect another's
/// state, and state must be fully cleared by [`reset`](Rule::reset) so that
/// instances can be reused across files.
///
/// # Example
///
/// ```ignore
/// use treelint_core::{NodeKind, NodeRef, Rule, RuleCtx, RuleError};
///
/// pub struct DeepBlocks {
///     depth: usize,
/// }
///
/// impl Rule for DeepBlocks {
///     fn name(&self) -> &'static str { "deep-blocks" }
///     fn code(&self) -> &'static str { "JL099" }
///     fn subscriptions(&self) -> &'static [NodeKind] { &[NodeKind::Block] }
///
///     fn reset(&mut self) { self.depth = 0; }
///
///     fn on_enter(&mut self, node: NodeRef<'_>, ctx: &mut RuleCtx<'_>) -> Result<(), RuleError> {
///         self.depth += 1;
///         if self.depth > 4 {
///             ctx.report(node, "Blocks should not nest this deeply.");
///         }
///         Ok(())
///     }
///
///     fn on_leave(&mut self, _node: NodeRef<'_>, _ctx: &mut RuleCtx<'_>) -> Result<(), RuleError> {
///         self.depth -= 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Rule: Send {
    /// Kebab-case name of this rule (e.g. "exception-context").
    fn name(&self) -> &'static str;

    /// Stable rule code (e.g. "JL001").
    fn code(&self) -> &'static str;

    /// Brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Default severity for diagnostics from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Node kinds this rule must be invoked for; queried once at
    /// registration.
    fn subscriptions(&self) -> &'static [NodeKind];

    /// Clears all private traversal state. Called by the dispatcher before
    /// every traversal, so state can never leak across files.
    fn reset(&mut self) {}

    /// Invoked when entering a subscribed node, before its children.
    fn on_enter(&mut self, _node: NodeRef<'_>, _ctx: &mut RuleCtx<'_>) -> Result<(), RuleError> {
        Ok(())
    }

    /// Invoked when leaving a subscribed node, after all its children.
    fn on_leave(&mut self, _node: NodeRef<'_>, _ctx: &mut RuleCtx<'_>) -> Result<(), RuleError> {
        Ok(())
    }
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticBuffer;
    use crate::tree::TreeBuilder;

    struct TestRule;

    impl Rule for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn description(&self) -> &'static str {
            "A test rule"
        }
        fn subscriptions(&self) -> &'static [NodeKind] {
            &[NodeKind::Block]
        }
    }

    #[test]
    fn trait_defaults() {
        let rule = TestRule;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.code(), "TEST001");
        assert_eq!(rule.default_severity(), Severity::Error);
        assert_eq!(rule.subscriptions(), &[NodeKind::Block]);
    }

    #[test]
    fn ctx_reports_with_rule_identity() {
        let mut builder = TreeBuilder::new(NodeKind::Block);
        builder.token("{", 7);
        builder.token("}", 8);
        let tree = builder.finish();

        let mut sink = DiagnosticBuffer::new();
        let mut ctx = RuleCtx::new("TEST001", "test-rule", Severity::Warning, &mut sink);
        ctx.report(tree.root(), "something odd");

        let diagnostics = sink.into_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "TEST001");
        assert_eq!(diagnostics[0].rule, "test-rule");
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].line, 7);
        assert_eq!(diagnostics[0].message, "something odd");
    }

    #[test]
    fn error_messages_name_the_parts() {
        let malformed = RuleError::MalformedTree {
            node: NodeKind::CatchClause,
            missing: "catch formal parameter",
        };
        assert_eq!(
            malformed.to_string(),
            "malformed syntax tree: catch clause node is missing its catch formal parameter"
        );

        let imbalance = RuleError::StateImbalance {
            detail: "frame popped with no matching push",
        };
        assert_eq!(
            imbalance.to_string(),
            "rule state imbalance: frame popped with no matching push"
        );
    }
}
