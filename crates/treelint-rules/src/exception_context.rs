//! Rule to require contextual information when handling caught exceptions.
//!
//! # Rationale
//!
//! A catch block that neither logs the caught exception nor rethrows it with
//! additional context erases the failure's history and makes production
//! debugging guesswork.
//!
//! # Detected Patterns
//!
//! ```text
//! // BAD: the exception is silently replaced by a message
//! try { ... } catch (IOException e) {
//!     System.out.println("something went wrong");
//! }
//!
//! // BAD: a bare rethrow in the last catch clause adds no context
//! try { ... } catch (Exception e) {
//!     throw e;
//! }
//! ```
//!
//! # Accepted Patterns
//!
//! ```text
//! // GOOD: logged together with the exception
//! try { ... } catch (IOException e) {
//!     logger.error("copy failed", e);
//! }
//!
//! // GOOD: wrapped as the cause of a new exception
//! try { ... } catch (IOException e) {
//!     throw new IllegalStateException("copy failed", e);
//! }
//!
//! // GOOD: bare rethrow while a later handler can still add context
//! try { ... } catch (IOException e) {
//!     throw e;
//! } catch (Exception e) {
//!     logger.error("unexpected", e);
//! }
//! ```
//!
//! Detection is purely syntactic: a call argument list with two or more
//! top-level arguments, one of which is the bare caught variable, counts as
//! a context-carrying usage. The heuristic accepts any such call, logger or
//! not, and that looseness is part of the rule's contract.

use treelint_core::{NodeKind, NodeRef, Rule, RuleCtx, RuleError, Severity};

/// Rule code for exception-context.
pub const CODE: &str = "JL001";

/// Rule name for exception-context.
pub const NAME: &str = "exception-context";

/// Message reported for a violating catch clause.
pub const MESSAGE: &str =
    "Either log or rethrow this exception along with some contextual information.";

const SUBSCRIPTIONS: &[NodeKind] = &[NodeKind::CatchClause, NodeKind::ArgumentList];

/// Per-open-catch analysis state.
///
/// One frame is pushed when a non-excluded catch clause is entered and
/// popped when it is left; the stack depth therefore always equals the
/// number of open, non-excluded catch clauses on the path from the root to
/// the node being visited.
#[derive(Debug)]
struct ScopeFrame {
    variable: String,
    found_usage: bool,
}

/// Requires catch clauses to log or rethrow the caught exception together
/// with contextual information.
#[derive(Debug)]
pub struct ExceptionContext {
    severity: Severity,
    frames: Vec<ScopeFrame>,
}

impl Default for ExceptionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExceptionContext {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            frames: Vec::new(),
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for ExceptionContext {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Catch clauses must log or rethrow the caught exception with contextual information"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn subscriptions(&self) -> &'static [NodeKind] {
        SUBSCRIPTIONS
    }

    fn reset(&mut self) {
        self.frames.clear();
    }

    fn on_enter(&mut self, node: NodeRef<'_>, _ctx: &mut RuleCtx<'_>) -> Result<(), RuleError> {
        if node.is(NodeKind::CatchClause) {
            // An excluded clause contributes no frame and stays invisible
            // to nested analysis.
            if !is_excluded(node)? {
                self.frames.push(ScopeFrame {
                    variable: caught_variable(node)?,
                    found_usage: false,
                });
            }
        } else if let Some(frame) = self.frames.last_mut() {
            // Argument list inside an open catch: a call passing two or
            // more arguments, one being the bare caught variable, counts
            // as a context-carrying usage of the innermost open clause.
            if has_several_arguments(node) {
                for argument in node.children() {
                    if is_bare_reference(argument, &frame.variable) {
                        frame.found_usage = true;
                    }
                }
            }
        }
        Ok(())
    }

    fn on_leave(&mut self, node: NodeRef<'_>, ctx: &mut RuleCtx<'_>) -> Result<(), RuleError> {
        if node.is(NodeKind::CatchClause) && !is_excluded(node)? {
            let frame = self.frames.pop().ok_or(RuleError::StateImbalance {
                detail: "catch frame popped with no matching push",
            })?;
            if !frame.found_usage {
                ctx.report(node, MESSAGE);
            }
        }
        Ok(())
    }
}

/// Name of the single identifier bound by the catch formal parameter.
fn caught_variable(catch_clause: NodeRef<'_>) -> Result<String, RuleError> {
    let parameter = catch_clause
        .first_child_of_kind(NodeKind::CatchFormalParameter)
        .ok_or(RuleError::MalformedTree {
            node: NodeKind::CatchClause,
            missing: "catch formal parameter",
        })?;
    let name = parameter
        .first_child_of_kind(NodeKind::Identifier)
        .ok_or(RuleError::MalformedTree {
            node: NodeKind::CatchFormalParameter,
            missing: "bound identifier",
        })?;
    let text = name.token_text().ok_or(RuleError::MalformedTree {
        node: NodeKind::Identifier,
        missing: "token",
    })?;
    Ok(text.to_string())
}

/// A catch clause is excluded when its body is a single throw statement
/// that either propagates to a later handler or wraps the caught exception
/// as the cause of a new one.
fn is_excluded(catch_clause: NodeRef<'_>) -> Result<bool, RuleError> {
    let block = catch_clause
        .first_child_of_kind(NodeKind::Block)
        .ok_or(RuleError::MalformedTree {
            node: NodeKind::CatchClause,
            missing: "block",
        })?;

    let mut statements = block.children();
    let (Some(statement), None) = (statements.next(), statements.next()) else {
        return Ok(false);
    };
    if !statement.is(NodeKind::ThrowStatement) {
        return Ok(false);
    }

    let variable = caught_variable(catch_clause)?;
    Ok(is_propagation(catch_clause, &variable, statement) || is_conversion(&variable, statement))
}

/// A bare rethrow counts as propagation only while a later sibling catch
/// clause can still supply context; in the last clause it is a violation.
fn is_propagation(
    catch_clause: NodeRef<'_>,
    variable: &str,
    throw_statement: NodeRef<'_>,
) -> bool {
    !is_last_catch(catch_clause) && thrown_variable(throw_statement) == variable
}

fn is_last_catch(catch_clause: NodeRef<'_>) -> bool {
    !catch_clause
        .next_sibling()
        .is_some_and(|sibling| sibling.is(NodeKind::CatchClause))
}

/// Name of the thrown expression when it is a single token; the empty
/// string otherwise, which matches no caught variable.
fn thrown_variable(throw_statement: NodeRef<'_>) -> &str {
    throw_statement
        .children()
        .next()
        .filter(|expression| expression.has_single_token())
        .and_then(NodeRef::token_text)
        .unwrap_or("")
}

/// Checked-to-unchecked conversion: the caught variable is passed as a
/// top-level argument somewhere inside the thrown expression.
fn is_conversion(variable: &str, throw_statement: NodeRef<'_>) -> bool {
    throw_statement
        .descendants_of_kind(NodeKind::ArgumentList)
        .any(|arguments| {
            arguments
                .children()
                .any(|argument| argument.matches_tokens(variable))
        })
}

fn has_several_arguments(arguments: NodeRef<'_>) -> bool {
    arguments.children().nth(1).is_some()
}

fn is_bare_reference(node: NodeRef<'_>, variable: &str) -> bool {
    node.has_single_token() && node.token_text() == Some(variable)
}
