//! Java parser adapter using Tree-sitter.
//!
//! Converts a Tree-sitter CST into the core [`SyntaxTree`] arena: named
//! grammar nodes become arena nodes through the closed kind mapping, every
//! leaf (named or punctuation) becomes a token, and comments are dropped.

use thiserror::Error;
use tree_sitter::{Language, Node, Parser};
use treelint_core::{NodeKind, SyntaxTree, TreeBuilder};

/// Errors from parsing Java source.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The Java grammar could not be loaded into the parser.
    #[error("failed to load java grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The parser returned no tree at all.
    #[error("parser produced no tree")]
    NoTree,

    /// The source contains syntax errors; no tree is produced because rules
    /// cannot trust a partially-recovered one.
    #[error("source contains syntax errors")]
    Syntax,
}

/// Parses Java source into a [`SyntaxTree`] over the core kind catalog.
pub struct JavaParser {
    language: Language,
}

impl JavaParser {
    /// Creates a new Java parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }

    /// Parses `source` into a syntax tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or if the source
    /// does not parse cleanly; callers treat the latter as a skipped file.
    pub fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;

        let src = source.as_bytes();
        let tree = parser.parse(src, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::Syntax);
        }

        let mut builder = TreeBuilder::new(node_kind(root.kind()));
        convert_children(root, src, &mut builder);
        Ok(builder.finish())
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps Tree-sitter grammar kinds onto the closed core catalog.
fn node_kind(kind: &str) -> NodeKind {
    match kind {
        "program" => NodeKind::SourceFile,
        "class_declaration" => NodeKind::ClassDeclaration,
        "method_declaration" | "constructor_declaration" => NodeKind::MethodDeclaration,
        "try_statement" | "try_with_resources_statement" => NodeKind::TryStatement,
        "catch_clause" => NodeKind::CatchClause,
        "catch_formal_parameter" => NodeKind::CatchFormalParameter,
        "catch_type" => NodeKind::CatchType,
        "block" | "constructor_body" => NodeKind::Block,
        "expression_statement" => NodeKind::ExpressionStatement,
        "local_variable_declaration" => NodeKind::LocalVariableDeclaration,
        "throw_statement" => NodeKind::ThrowStatement,
        "method_invocation" => NodeKind::MethodInvocation,
        "object_creation_expression" => NodeKind::ObjectCreation,
        "argument_list" => NodeKind::ArgumentList,
        "field_access" => NodeKind::FieldAccess,
        "identifier" => NodeKind::Identifier,
        "type_identifier" => NodeKind::TypeIdentifier,
        kind if kind.ends_with("_literal") => NodeKind::Literal,
        _ => NodeKind::Other,
    }
}

fn is_trivia(kind: &str) -> bool {
    matches!(kind, "line_comment" | "block_comment")
}

fn convert_children(node: Node<'_>, src: &[u8], builder: &mut TreeBuilder) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if is_trivia(child.kind()) {
            continue;
        }
        if child.child_count() == 0 {
            if child.is_named() {
                builder.start_node(node_kind(child.kind()));
                builder.token(text(child, src), line(child));
                builder.finish_node();
            } else {
                builder.token(text(child, src), line(child));
            }
        } else {
            builder.start_node(node_kind(child.kind()));
            convert_children(child, src, builder);
            builder.finish_node();
        }
    }
}

fn text<'a>(node: Node<'_>, src: &'a [u8]) -> &'a str {
    std::str::from_utf8(&src[node.start_byte()..node.end_byte()]).unwrap_or("")
}

fn line(node: Node<'_>) -> usize {
    node.start_position().row + 1
}
