//! Immutable syntax tree arena and its builder.
//!
//! A [`SyntaxTree`] is produced once per source file by a parser adapter and
//! is read-only during traversal. Nodes live in a flat arena and refer to
//! each other by index; the tree owns everything, so sibling and parent
//! navigation is plain index lookup with no independent lifetimes. Tokens
//! live in a separate flat stream and each node holds a half-open range into
//! it. Keywords and punctuation appear only in the token stream, never as
//! nodes.

use crate::kind::NodeKind;

/// A lexical token: original source text plus 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    line: usize,
}

impl Token {
    /// Original source text of the token.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 1-based source line the token starts on.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Index of a node within its [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    next_sibling: Option<NodeId>,
    children: Vec<NodeId>,
    token_start: usize,
    token_end: usize,
}

/// An immutable, ordered syntax tree.
///
/// Built through [`TreeBuilder`]; the first node started becomes the root.
#[derive(Debug)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    tokens: Vec<Token>,
}

impl SyntaxTree {
    /// Root node of the tree.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: NodeId(0),
        }
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of tokens in the stream.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// Copyable handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    /// Identity of this node within the arena.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// Grammar production kind of this node.
    #[must_use]
    pub fn kind(self) -> NodeKind {
        self.data().kind
    }

    /// Whether this node has the given kind.
    #[must_use]
    pub fn is(self, kind: NodeKind) -> bool {
        self.kind() == kind
    }

    /// Parent node, or `None` for the root.
    #[must_use]
    pub fn parent(self) -> Option<NodeRef<'t>> {
        self.data().parent.map(|id| self.at(id))
    }

    /// Next sibling in document order, if any.
    #[must_use]
    pub fn next_sibling(self) -> Option<NodeRef<'t>> {
        self.data().next_sibling.map(|id| self.at(id))
    }

    /// Child nodes in document order.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;
        self.data().children.iter().map(move |&id| NodeRef { tree, id })
    }

    /// Child nodes of the given kind, in document order.
    pub fn children_of_kind(self, kind: NodeKind) -> impl Iterator<Item = NodeRef<'t>> + 't {
        self.children().filter(move |child| child.is(kind))
    }

    /// First child of the given kind, if any.
    #[must_use]
    pub fn first_child_of_kind(self, kind: NodeKind) -> Option<NodeRef<'t>> {
        self.children_of_kind(kind).next()
    }

    /// Depth-first pre-order iterator over descendants, excluding this node.
    #[must_use]
    pub fn descendants(self) -> Descendants<'t> {
        let mut stack = self.data().children.clone();
        stack.reverse();
        Descendants {
            tree: self.tree,
            stack,
        }
    }

    /// Descendants of the given kind, pre-order, excluding this node.
    pub fn descendants_of_kind(self, kind: NodeKind) -> impl Iterator<Item = NodeRef<'t>> + 't {
        self.descendants().filter(move |node| node.is(kind))
    }

    /// Tokens covered by this node, in source order.
    #[must_use]
    pub fn tokens(self) -> &'t [Token] {
        let data = self.data();
        &self.tree.tokens[data.token_start..data.token_end]
    }

    /// First token covered by this node.
    #[must_use]
    pub fn first_token(self) -> Option<&'t Token> {
        self.tokens().first()
    }

    /// Last token covered by this node.
    #[must_use]
    pub fn last_token(self) -> Option<&'t Token> {
        self.tokens().last()
    }

    /// Whether this node covers exactly one token.
    #[must_use]
    pub fn has_single_token(self) -> bool {
        self.tokens().len() == 1
    }

    /// Text of the first token covered by this node.
    #[must_use]
    pub fn token_text(self) -> Option<&'t str> {
        self.first_token().map(Token::text)
    }

    /// 1-based line of the first covered token, or 0 for a token-less node.
    #[must_use]
    pub fn start_line(self) -> usize {
        self.first_token().map_or(0, Token::line)
    }

    /// Whether the concatenated texts of this node's tokens equal `text`.
    ///
    /// A node covering no tokens matches nothing.
    #[must_use]
    pub fn matches_tokens(self, text: &str) -> bool {
        let tokens = self.tokens();
        if tokens.is_empty() {
            return false;
        }
        let mut rest = text;
        for token in tokens {
            match rest.strip_prefix(token.text()) {
                Some(tail) => rest = tail,
                None => return false,
            }
        }
        rest.is_empty()
    }

    fn at(self, id: NodeId) -> NodeRef<'t> {
        NodeRef {
            tree: self.tree,
            id,
        }
    }

    fn data(self) -> &'t NodeData {
        self.tree.data(self.id)
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Depth-first pre-order descendant iterator; see [`NodeRef::descendants`].
#[derive(Debug)]
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = &self.tree.data(id).children;
        self.stack.extend(children.iter().rev().copied());
        Some(NodeRef {
            tree: self.tree,
            id,
        })
    }
}

/// Event-style builder for [`SyntaxTree`], used by parser adapters and tests.
///
/// Nodes open with [`start_node`](TreeBuilder::start_node) and close with
/// [`finish_node`](TreeBuilder::finish_node); tokens attach to the stream at
/// the current position and are covered by every currently-open node. Calls
/// must be balanced; [`finish`](TreeBuilder::finish) closes anything still
/// open.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    tokens: Vec<Token>,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    /// Creates a builder with an open root node of the given kind.
    #[must_use]
    pub fn new(root: NodeKind) -> Self {
        let mut builder = Self {
            nodes: Vec::new(),
            tokens: Vec::new(),
            stack: Vec::new(),
        };
        builder.start_node(root);
        builder
    }

    /// Opens a child node of the current node.
    #[allow(clippy::cast_possible_truncation)] // arenas stay far below u32::MAX nodes
    pub fn start_node(&mut self, kind: NodeKind) {
        let id = NodeId(self.nodes.len() as u32);
        let parent = self.stack.last().copied();
        self.nodes.push(NodeData {
            kind,
            parent,
            next_sibling: None,
            children: Vec::new(),
            token_start: self.tokens.len(),
            token_end: self.tokens.len(),
        });
        if let Some(parent_id) = parent {
            let previous = self.nodes[parent_id.index()].children.last().copied();
            self.nodes[parent_id.index()].children.push(id);
            if let Some(previous_id) = previous {
                self.nodes[previous_id.index()].next_sibling = Some(id);
            }
        }
        self.stack.push(id);
    }

    /// Appends a token at the current position.
    pub fn token(&mut self, text: impl Into<String>, line: usize) {
        self.tokens.push(Token {
            text: text.into(),
            line,
        });
    }

    /// Closes the most recently opened node. No effect once the root closed.
    pub fn finish_node(&mut self) {
        if let Some(id) = self.stack.pop() {
            self.nodes[id.index()].token_end = self.tokens.len();
        }
    }

    /// Closes any still-open nodes and returns the finished tree.
    #[must_use]
    pub fn finish(mut self) -> SyntaxTree {
        while !self.stack.is_empty() {
            self.finish_node();
        }
        SyntaxTree {
            nodes: self.nodes,
            tokens: self.tokens,
        }
    }
}
