//! Depth-first dispatch of rule hooks over a syntax tree.

use crate::diagnostic::DiagnosticSink;
use crate::kind::NodeKind;
use crate::rule::{RuleBox, RuleCtx, RuleFailure};
use crate::tree::{NodeRef, SyntaxTree};
use tracing::{debug, warn};

#[derive(Clone, Copy)]
enum Phase {
    Enter,
    Leave,
}

/// Drives registered rules over syntax trees.
///
/// The dispatcher owns the rules and a kind-indexed subscription table built
/// once at construction. [`run`](Dispatcher::run) performs one depth-first
/// traversal: for every node whose kind a rule subscribed to, the rule's
/// enter hook fires before the node's children are visited and its leave
/// hook after, always in registration order. Registration order only affects
/// diagnostic ordering; rules share no state.
///
/// A hook error deactivates the failing rule for the remainder of the file
/// and is returned as a [`RuleFailure`]. Other rules and later files are
/// unaffected: the next [`run`](Dispatcher::run) reactivates the rule from a
/// fresh [`reset`](crate::Rule::reset).
pub struct Dispatcher {
    rules: Vec<RuleBox>,
    subscriptions: Vec<Vec<usize>>,
}

impl Dispatcher {
    /// Creates a dispatcher over `rules`, querying each rule's subscriptions
    /// once to build the lookup table.
    #[must_use]
    pub fn new(rules: Vec<RuleBox>) -> Self {
        let mut subscriptions = vec![Vec::new(); NodeKind::COUNT];
        for (index, rule) in rules.iter().enumerate() {
            for &kind in rule.subscriptions() {
                let subscribers: &mut Vec<usize> = &mut subscriptions[kind.index()];
                if !subscribers.contains(&index) {
                    subscribers.push(index);
                }
            }
        }
        Self {
            rules,
            subscriptions,
        }
    }

    /// Registered rules, in registration order.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Walks `tree` once, invoking subscribed rule hooks and forwarding
    /// diagnostics to `sink`.
    ///
    /// Every rule is reset before the walk starts, so one dispatcher can be
    /// reused across files. Returns the failures contained during the walk;
    /// diagnostics emitted before a failure are kept.
    pub fn run(&mut self, tree: &SyntaxTree, sink: &mut dyn DiagnosticSink) -> Vec<RuleFailure> {
        debug!(
            "dispatching {} rules over {} nodes",
            self.rules.len(),
            tree.node_count()
        );

        for rule in &mut self.rules {
            rule.reset();
        }

        let mut active = vec![true; self.rules.len()];
        let mut failures = Vec::new();
        self.walk(tree.root(), sink, &mut active, &mut failures);
        failures
    }

    fn walk(
        &mut self,
        node: NodeRef<'_>,
        sink: &mut dyn DiagnosticSink,
        active: &mut [bool],
        failures: &mut Vec<RuleFailure>,
    ) {
        self.dispatch(node, sink, active, failures, Phase::Enter);
        for child in node.children() {
            self.walk(child, sink, active, failures);
        }
        self.dispatch(node, sink, active, failures, Phase::Leave);
    }

    fn dispatch(
        &mut self,
        node: NodeRef<'_>,
        sink: &mut dyn DiagnosticSink,
        active: &mut [bool],
        failures: &mut Vec<RuleFailure>,
        phase: Phase,
    ) {
        for &index in &self.subscriptions[node.kind().index()] {
            if !active[index] {
                continue;
            }
            let rule = &mut self.rules[index];
            let mut ctx = RuleCtx::new(rule.code(), rule.name(), rule.default_severity(), sink);
            let outcome = match phase {
                Phase::Enter => rule.on_enter(node, &mut ctx),
                Phase::Leave => rule.on_leave(node, &mut ctx),
            };
            if let Err(error) = outcome {
                warn!(
                    "rule '{}' failed: {}; disabled for the rest of this file",
                    rule.name(),
                    error
                );
                active[index] = false;
                failures.push(RuleFailure {
                    rule: rule.name(),
                    error,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticBuffer;
    use crate::rule::{Rule, RuleError};
    use crate::tree::TreeBuilder;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    /// `SourceFile { Block { Identifier(a) Block { Identifier(b) } } }`
    fn sample_tree() -> SyntaxTree {
        let mut builder = TreeBuilder::new(NodeKind::SourceFile);
        builder.start_node(NodeKind::Block);
        builder.start_node(NodeKind::Identifier);
        builder.token("a", 1);
        builder.finish_node();
        builder.start_node(NodeKind::Block);
        builder.start_node(NodeKind::Identifier);
        builder.token("b", 2);
        builder.finish_node();
        builder.finish_node();
        builder.finish_node();
        builder.finish()
    }

    struct Recorder {
        name: &'static str,
        kinds: &'static [NodeKind],
        log: Log,
    }

    impl Recorder {
        fn record(&self, phase: &str, node: NodeRef<'_>) {
            let label = node.token_text().unwrap_or("-");
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{phase}:{}:{label}", self.name, node.kind()));
        }
    }

    impl Rule for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }
        fn code(&self) -> &'static str {
            "REC001"
        }
        fn subscriptions(&self) -> &'static [NodeKind] {
            self.kinds
        }
        fn on_enter(&mut self, node: NodeRef<'_>, _ctx: &mut RuleCtx<'_>) -> Result<(), RuleError> {
            self.record("enter", node);
            Ok(())
        }
        fn on_leave(&mut self, node: NodeRef<'_>, _ctx: &mut RuleCtx<'_>) -> Result<(), RuleError> {
            self.record("leave", node);
            Ok(())
        }
    }

    #[test]
    fn enter_precedes_children_and_leave_follows_them() {
        let log: Log = Log::default();
        let mut dispatcher = Dispatcher::new(vec![Box::new(Recorder {
            name: "walker",
            kinds: &[NodeKind::Block, NodeKind::Identifier],
            log: Arc::clone(&log),
        })]);

        let tree = sample_tree();
        let mut sink = DiagnosticBuffer::new();
        let failures = dispatcher.run(&tree, &mut sink);
        assert!(failures.is_empty());

        // A block's token range covers its descendants, so the outer block
        // is labelled by its first descendant token.
        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "walker:enter:block:a",
                "walker:enter:identifier:a",
                "walker:leave:identifier:a",
                "walker:enter:block:b",
                "walker:enter:identifier:b",
                "walker:leave:identifier:b",
                "walker:leave:block:b",
                "walker:leave:block:a",
            ]
        );
    }

    #[test]
    fn rules_fire_in_registration_order() {
        let log: Log = Log::default();
        let mut dispatcher = Dispatcher::new(vec![
            Box::new(Recorder {
                name: "first",
                kinds: &[NodeKind::Identifier],
                log: Arc::clone(&log),
            }),
            Box::new(Recorder {
                name: "second",
                kinds: &[NodeKind::Identifier],
                log: Arc::clone(&log),
            }),
        ]);

        let tree = sample_tree();
        let mut sink = DiagnosticBuffer::new();
        dispatcher.run(&tree, &mut sink);

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "first:enter:identifier:a",
                "second:enter:identifier:a",
                "first:leave:identifier:a",
                "second:leave:identifier:a",
                "first:enter:identifier:b",
                "second:enter:identifier:b",
                "first:leave:identifier:b",
                "second:leave:identifier:b",
            ]
        );
    }

    /// Reports on every identifier, then fails on the second one.
    struct FailsOnSecond {
        seen: usize,
    }

    impl Rule for FailsOnSecond {
        fn name(&self) -> &'static str {
            "fails-on-second"
        }
        fn code(&self) -> &'static str {
            "FAIL001"
        }
        fn subscriptions(&self) -> &'static [NodeKind] {
            &[NodeKind::Identifier]
        }
        fn reset(&mut self) {
            self.seen = 0;
        }
        fn on_enter(&mut self, node: NodeRef<'_>, ctx: &mut RuleCtx<'_>) -> Result<(), RuleError> {
            self.seen += 1;
            if self.seen > 1 {
                return Err(RuleError::StateImbalance {
                    detail: "synthetic failure",
                });
            }
            ctx.report(node, "before the failure");
            Ok(())
        }
    }

    #[test]
    fn failure_is_contained_and_other_rules_continue() {
        let log: Log = Log::default();
        let mut dispatcher = Dispatcher::new(vec![
            Box::new(FailsOnSecond { seen: 0 }),
            Box::new(Recorder {
                name: "healthy",
                kinds: &[NodeKind::Identifier],
                log: Arc::clone(&log),
            }),
        ]);

        let tree = sample_tree();
        let mut sink = DiagnosticBuffer::new();
        let failures = dispatcher.run(&tree, &mut sink);

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, "fails-on-second");

        // The diagnostic emitted before the failure is kept.
        assert_eq!(sink.diagnostics().len(), 1);
        assert_eq!(sink.diagnostics()[0].message, "before the failure");

        // The healthy rule saw every identifier despite the failure.
        let healthy_events = log.lock().unwrap().len();
        assert_eq!(healthy_events, 4);
    }

    #[test]
    fn failed_rule_is_reactivated_on_the_next_run() {
        let mut dispatcher = Dispatcher::new(vec![Box::new(FailsOnSecond { seen: 0 })]);
        let tree = sample_tree();

        let mut first_sink = DiagnosticBuffer::new();
        let first_failures = dispatcher.run(&tree, &mut first_sink);
        let mut second_sink = DiagnosticBuffer::new();
        let second_failures = dispatcher.run(&tree, &mut second_sink);

        assert_eq!(first_failures.len(), 1);
        assert_eq!(second_failures.len(), 1);
        assert_eq!(first_sink.diagnostics(), second_sink.diagnostics());
    }

    #[test]
    fn unsubscribed_kinds_are_never_dispatched() {
        let log: Log = Log::default();
        let mut dispatcher = Dispatcher::new(vec![Box::new(Recorder {
            name: "blocks-only",
            kinds: &[NodeKind::Block],
            log: Arc::clone(&log),
        })]);

        let tree = sample_tree();
        let mut sink = DiagnosticBuffer::new();
        dispatcher.run(&tree, &mut sink);

        let events = log.lock().unwrap().clone();
        assert!(events.iter().all(|e| e.contains(":block:")));
        assert_eq!(events.len(), 4);
    }
}
