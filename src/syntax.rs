//! Immutable syntax tree model
//!
//! Nodes are produced by an external parser and are read-only inputs to the
//! engine. A rewrite never mutates: it builds a new node and rebuilds the
//! ancestor chain up to the root, sharing every untouched sibling subtree.
//! Non-semantic source text (whitespace, comments) travels as leading and
//! trailing trivia on node boundaries and survives rewrites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Half-open byte range into the rendered source text
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check whether `other` lies fully inside this span
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Node kind tags
///
/// The set mirrors what the shipped rules inspect plus enough statement
/// kinds to build realistic test trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntaxKind {
    SourceFile,
    Block,
    IfStatement,
    ExpressionStatement,
    LogicalNot,
    Parenthesized,
    Call,
    MemberAccess,
    Lambda,
    Binary,
    ObjectCreation,
    Identifier,
    GenericName,
    QualifiedName,
    TrueLiteral,
    FalseLiteral,
    NumericLiteral,
}

impl SyntaxKind {
    /// Leaf kinds carry their token text directly
    pub fn is_token(&self) -> bool {
        matches!(
            self,
            SyntaxKind::Identifier
                | SyntaxKind::TrueLiteral
                | SyntaxKind::FalseLiteral
                | SyntaxKind::NumericLiteral
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyntaxKind::SourceFile => "source-file",
            SyntaxKind::Block => "block",
            SyntaxKind::IfStatement => "if-statement",
            SyntaxKind::ExpressionStatement => "expression-statement",
            SyntaxKind::LogicalNot => "logical-not",
            SyntaxKind::Parenthesized => "parenthesized",
            SyntaxKind::Call => "call",
            SyntaxKind::MemberAccess => "member-access",
            SyntaxKind::Lambda => "lambda",
            SyntaxKind::Binary => "binary",
            SyntaxKind::ObjectCreation => "object-creation",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::GenericName => "generic-name",
            SyntaxKind::QualifiedName => "qualified-name",
            SyntaxKind::TrueLiteral => "true-literal",
            SyntaxKind::FalseLiteral => "false-literal",
            SyntaxKind::NumericLiteral => "numeric-literal",
        };
        write!(f, "{}", name)
    }
}

/// A node in the immutable syntax tree
///
/// Structural conventions (child order):
/// - `Call`: callee, then argument expressions
/// - `MemberAccess`: receiver, then name
/// - `Lambda`: parameter, then body
/// - `ObjectCreation`: type name, then argument expressions
/// - `Binary`: left, right (`text` holds the operator token)
/// - `QualifiedName`: qualifier, then name
/// - `GenericName`: type arguments (`text` holds the base name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind: SyntaxKind,
    text: String,
    children: Vec<Arc<SyntaxNode>>,
    span: Span,
    leading: String,
    trailing: String,
}

/// One step of a node's rendered layout
enum Part<'a> {
    Token(&'a str),
    Child(usize),
}

impl SyntaxNode {
    fn node(kind: SyntaxKind, text: &str, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind,
            text: text.to_string(),
            children: children.into_iter().map(Arc::new).collect(),
            span: Span::default(),
            leading: String::new(),
            trailing: String::new(),
        }
    }

    pub fn identifier(name: &str) -> Self {
        Self::node(SyntaxKind::Identifier, name, Vec::new())
    }

    pub fn true_literal() -> Self {
        Self::node(SyntaxKind::TrueLiteral, "true", Vec::new())
    }

    pub fn false_literal() -> Self {
        Self::node(SyntaxKind::FalseLiteral, "false", Vec::new())
    }

    pub fn numeric_literal(text: &str) -> Self {
        Self::node(SyntaxKind::NumericLiteral, text, Vec::new())
    }

    pub fn logical_not(operand: SyntaxNode) -> Self {
        Self::node(SyntaxKind::LogicalNot, "", vec![operand])
    }

    pub fn parenthesized(inner: SyntaxNode) -> Self {
        Self::node(SyntaxKind::Parenthesized, "", vec![inner])
    }

    pub fn call(callee: SyntaxNode, args: Vec<SyntaxNode>) -> Self {
        let mut children = vec![callee];
        children.extend(args);
        Self::node(SyntaxKind::Call, "", children)
    }

    pub fn member_access(receiver: SyntaxNode, name: SyntaxNode) -> Self {
        Self::node(SyntaxKind::MemberAccess, "", vec![receiver, name])
    }

    pub fn lambda(parameter: SyntaxNode, body: SyntaxNode) -> Self {
        Self::node(SyntaxKind::Lambda, "", vec![parameter, body])
    }

    pub fn binary(operator: &str, left: SyntaxNode, right: SyntaxNode) -> Self {
        Self::node(SyntaxKind::Binary, operator, vec![left, right])
    }

    pub fn object_creation(type_name: SyntaxNode, args: Vec<SyntaxNode>) -> Self {
        let mut children = vec![type_name];
        children.extend(args);
        Self::node(SyntaxKind::ObjectCreation, "", children)
    }

    pub fn generic_name(base: &str, type_args: Vec<SyntaxNode>) -> Self {
        Self::node(SyntaxKind::GenericName, base, type_args)
    }

    pub fn qualified_name(qualifier: SyntaxNode, name: SyntaxNode) -> Self {
        Self::node(SyntaxKind::QualifiedName, "", vec![qualifier, name])
    }

    pub fn if_statement(condition: SyntaxNode, body: SyntaxNode) -> Self {
        Self::node(SyntaxKind::IfStatement, "", vec![condition, body])
    }

    pub fn block(statements: Vec<SyntaxNode>) -> Self {
        Self::node(SyntaxKind::Block, "", statements)
    }

    pub fn expression_statement(expr: SyntaxNode) -> Self {
        Self::node(SyntaxKind::ExpressionStatement, "", vec![expr])
    }

    pub fn source_file(declarations: Vec<SyntaxNode>) -> Self {
        Self::node(SyntaxKind::SourceFile, "", declarations)
    }

    /// Attach leading trivia (builder style)
    pub fn with_leading(mut self, trivia: &str) -> Self {
        self.leading = trivia.to_string();
        self
    }

    /// Attach trailing trivia (builder style)
    pub fn with_trailing(mut self, trivia: &str) -> Self {
        self.trailing = trivia.to_string();
        self
    }

    /// Copy both trivia runs from another node
    ///
    /// Used by fixes so the replacement occupies the exact formatting slot
    /// of the node it replaces.
    pub fn with_trivia_from(mut self, other: &SyntaxNode) -> Self {
        self.leading = other.leading.clone();
        self.trailing = other.trailing.clone();
        self
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Token text for leaf kinds, operator for `Binary`, base name for
    /// `GenericName`; empty otherwise
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Arc<SyntaxNode>] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Arc<SyntaxNode>> {
        self.children.get(index)
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn leading_trivia(&self) -> &str {
        &self.leading
    }

    pub fn trailing_trivia(&self) -> &str {
        &self.trailing
    }

    /// The identifier text of a simple or member-access name
    ///
    /// For `MemberAccess` this is the accessed member's name; for
    /// `Identifier` and `GenericName` the node's own text.
    pub fn name_text(&self) -> Option<&str> {
        match self.kind {
            SyntaxKind::Identifier | SyntaxKind::GenericName => Some(&self.text),
            SyntaxKind::MemberAccess => self.child(1).map(|n| n.text()),
            _ => None,
        }
    }

    fn parts(&self) -> Vec<Part<'_>> {
        use Part::{Child, Token};
        match self.kind {
            SyntaxKind::Identifier
            | SyntaxKind::TrueLiteral
            | SyntaxKind::FalseLiteral
            | SyntaxKind::NumericLiteral => vec![Token(&self.text)],
            SyntaxKind::LogicalNot => vec![Token("!"), Child(0)],
            SyntaxKind::Parenthesized => vec![Token("("), Child(0), Token(")")],
            SyntaxKind::Call => {
                let mut parts = vec![Child(0), Token("(")];
                for i in 1..self.children.len() {
                    if i > 1 {
                        parts.push(Token(", "));
                    }
                    parts.push(Child(i));
                }
                parts.push(Token(")"));
                parts
            }
            SyntaxKind::MemberAccess | SyntaxKind::QualifiedName => {
                vec![Child(0), Token("."), Child(1)]
            }
            SyntaxKind::Lambda => vec![Child(0), Token(" => "), Child(1)],
            SyntaxKind::Binary => {
                vec![Child(0), Token(" "), Token(&self.text), Token(" "), Child(1)]
            }
            SyntaxKind::ObjectCreation => {
                let mut parts = vec![Token("new "), Child(0), Token("(")];
                for i in 1..self.children.len() {
                    if i > 1 {
                        parts.push(Token(", "));
                    }
                    parts.push(Child(i));
                }
                parts.push(Token(")"));
                parts
            }
            SyntaxKind::GenericName => {
                let mut parts = vec![Token(&self.text), Token("<")];
                for i in 0..self.children.len() {
                    if i > 0 {
                        parts.push(Token(", "));
                    }
                    parts.push(Child(i));
                }
                parts.push(Token(">"));
                parts
            }
            SyntaxKind::IfStatement => vec![Token("if ("), Child(0), Token(")"), Child(1)],
            SyntaxKind::Block => {
                let mut parts = vec![Token("{")];
                for i in 0..self.children.len() {
                    parts.push(Child(i));
                }
                parts.push(Token("}"));
                parts
            }
            SyntaxKind::ExpressionStatement => vec![Child(0), Token(";")],
            SyntaxKind::SourceFile => (0..self.children.len()).map(Child).collect(),
        }
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(&self.leading);
        for part in self.parts() {
            match part {
                Part::Token(tok) => out.push_str(tok),
                Part::Child(i) => self.children[i].render_into(out),
            }
        }
        out.push_str(&self.trailing);
    }

    /// Render this subtree back to source text, trivia included
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    /// Rebuild this subtree with spans assigned from a running text cursor
    fn with_spans(&self, cursor: &mut usize) -> SyntaxNode {
        *cursor += self.leading.len();
        let start = *cursor;
        let mut new_children = self.children.clone();
        for part in self.parts() {
            match part {
                Part::Token(tok) => *cursor += tok.len(),
                Part::Child(i) => {
                    new_children[i] = Arc::new(self.children[i].with_spans(cursor));
                }
            }
        }
        let end = *cursor;
        *cursor += self.trailing.len();
        SyntaxNode {
            kind: self.kind,
            text: self.text.clone(),
            children: new_children,
            span: Span::new(start, end),
            leading: self.leading.clone(),
            trailing: self.trailing.clone(),
        }
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A rooted immutable tree with assigned spans
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    root: Arc<SyntaxNode>,
}

impl SyntaxTree {
    /// Build a tree, assigning every node its span in the rendered text
    pub fn new(root: SyntaxNode) -> Self {
        let mut cursor = 0usize;
        Self {
            root: Arc::new(root.with_spans(&mut cursor)),
        }
    }

    pub fn root(&self) -> &Arc<SyntaxNode> {
        &self.root
    }

    /// Render the whole tree back to source text
    pub fn text(&self) -> String {
        self.root.render()
    }

    /// Preorder iteration over every node in the tree
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![&self.root],
        }
    }

    /// Node at a child-index path from the root
    pub fn node_at(&self, path: &[usize]) -> Option<&Arc<SyntaxNode>> {
        let mut node = &self.root;
        for &index in path {
            node = node.child(index)?;
        }
        Some(node)
    }

    /// Innermost node covering `span` that satisfies `pred`, with its path
    pub fn find_innermost(
        &self,
        span: Span,
        pred: impl Fn(&SyntaxNode) -> bool,
    ) -> Option<(Vec<usize>, Arc<SyntaxNode>)> {
        fn walk(
            node: &Arc<SyntaxNode>,
            span: Span,
            pred: &impl Fn(&SyntaxNode) -> bool,
            path: &mut Vec<usize>,
            best: &mut Option<(Vec<usize>, Arc<SyntaxNode>)>,
        ) {
            if !node.span().contains(span) {
                return;
            }
            if pred(node) {
                *best = Some((path.clone(), Arc::clone(node)));
            }
            for (i, child) in node.children().iter().enumerate() {
                path.push(i);
                walk(child, span, pred, path, best);
                path.pop();
            }
        }

        let mut best = None;
        let mut path = Vec::new();
        walk(&self.root, span, &pred, &mut path, &mut best);
        best
    }

    /// Replace the node at `path`, rebuilding ancestors and sharing siblings
    ///
    /// The replacement takes over the replaced node's span; spans inside the
    /// replacement subtree are laid out from that position. Nodes outside
    /// the path keep their spans, which keeps independent replacements on
    /// disjoint nodes commutative.
    pub fn replace(&self, path: &[usize], replacement: SyntaxNode) -> Option<SyntaxTree> {
        fn rebuild(
            node: &Arc<SyntaxNode>,
            path: &[usize],
            replacement: SyntaxNode,
        ) -> Option<SyntaxNode> {
            match path.split_first() {
                None => {
                    let mut cursor = node.span().start.saturating_sub(replacement.leading.len());
                    Some(replacement.with_spans(&mut cursor))
                }
                Some((&index, rest)) => {
                    let child = node.child(index)?;
                    let new_child = rebuild(child, rest, replacement)?;
                    let mut new_node = (**node).clone();
                    new_node.children[index] = Arc::new(new_child);
                    Some(new_node)
                }
            }
        }

        rebuild(&self.root, path, replacement).map(|root| SyntaxTree {
            root: Arc::new(root),
        })
    }
}

/// Preorder node iterator
pub struct Descendants<'a> {
    stack: Vec<&'a Arc<SyntaxNode>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Arc<SyntaxNode>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Strip any number of enclosing parenthesized layers
pub fn strip_parentheses(mut node: &SyntaxNode) -> &SyntaxNode {
    while node.kind() == SyntaxKind::Parenthesized {
        match node.child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn not_call(name: &str) -> SyntaxNode {
        SyntaxNode::logical_not(SyntaxNode::call(SyntaxNode::identifier(name), Vec::new()))
    }

    #[test]
    fn test_render_call_with_args() {
        let call = SyntaxNode::call(
            SyntaxNode::identifier("IsValid"),
            vec![SyntaxNode::numeric_literal("1")],
        );
        assert_eq!(call.render(), "IsValid(1)");
    }

    #[test]
    fn test_render_preserves_trivia() {
        let stmt = SyntaxNode::if_statement(
            not_call("HasPermission"),
            SyntaxNode::block(Vec::new()).with_leading(" "),
        )
        .with_leading("\n    ")
        .with_trailing("\n");
        assert_eq!(stmt.render(), "\n    if (!HasPermission()) {}\n");
    }

    #[test]
    fn test_render_object_creation() {
        let creation = SyntaxNode::object_creation(
            SyntaxNode::generic_name("TaskCompletionSource", vec![SyntaxNode::identifier("int")]),
            vec![SyntaxNode::member_access(
                SyntaxNode::identifier("TaskCreationOptions"),
                SyntaxNode::identifier("RunContinuationsAsynchronously"),
            )],
        );
        assert_eq!(
            creation.render(),
            "new TaskCompletionSource<int>(TaskCreationOptions.RunContinuationsAsynchronously)"
        );
    }

    #[test]
    fn test_spans_follow_rendered_text() {
        let tree = SyntaxTree::new(
            SyntaxNode::expression_statement(not_call("M")).with_leading("  "),
        );
        let text = tree.text();
        assert_eq!(text, "  !M();");

        let not = tree.root().child(0).unwrap();
        assert_eq!(not.kind(), SyntaxKind::LogicalNot);
        assert_eq!(&text[not.span().start..not.span().end], "!M()");
    }

    #[test]
    fn test_strip_parentheses() {
        let node = SyntaxNode::parenthesized(SyntaxNode::parenthesized(SyntaxNode::identifier(
            "x",
        )));
        assert_eq!(strip_parentheses(&node).kind(), SyntaxKind::Identifier);
    }

    #[test]
    fn test_replace_shares_siblings_and_keeps_text() {
        let tree = SyntaxTree::new(SyntaxNode::source_file(vec![
            SyntaxNode::expression_statement(SyntaxNode::identifier("a")),
            SyntaxNode::expression_statement(SyntaxNode::identifier("b")),
        ]));
        let replaced = tree
            .replace(&[1, 0], SyntaxNode::identifier("c"))
            .unwrap();
        assert_eq!(replaced.text(), "a;c;");

        // Untouched sibling subtree is shared, not copied
        assert!(Arc::ptr_eq(
            tree.root().child(0).unwrap(),
            replaced.root().child(0).unwrap()
        ));
    }

    #[test]
    fn test_find_innermost_prefers_deepest_match() {
        let tree = SyntaxTree::new(SyntaxNode::expression_statement(SyntaxNode::logical_not(
            SyntaxNode::logical_not(SyntaxNode::identifier("x")),
        )));
        let inner = tree.root().child(0).unwrap().child(0).unwrap();
        let (path, found) = tree
            .find_innermost(inner.span(), |n| n.kind() == SyntaxKind::LogicalNot)
            .unwrap();
        assert_eq!(path, vec![0, 0]);
        assert_eq!(found.span(), inner.span());
    }
}
