//! Negated boolean-method-call rule
//!
//! `!M()` where `M` resolves to a boolean-returning method reads worse than
//! an explicit comparison; the paired fix rewrites the negation to
//! `M(...) == false`, keeping the surrounding formatting intact.

use crate::diagnostic::{Descriptor, Diagnostic, Severity};
use crate::rule::Rule;
use crate::symbol::Resolver;
use crate::syntax::{strip_parentheses, SyntaxKind, SyntaxNode};

static DESCRIPTOR: Descriptor = Descriptor::new(
    "negated-boolean-method",
    "style",
    Severity::Error,
    "Negated boolean method '{0}' conditions should be rewritten as {0}(...) == false",
);

/// Flags logical-not over a call to a boolean-returning method
pub struct NegatedBooleanMethod;

impl NegatedBooleanMethod {
    /// The call under the negation, with any parenthesization stripped
    fn negated_call(node: &SyntaxNode) -> Option<&SyntaxNode> {
        if node.kind() != SyntaxKind::LogicalNot {
            return None;
        }
        let operand = strip_parentheses(node.child(0)?);
        if operand.kind() != SyntaxKind::Call {
            return None;
        }
        Some(operand)
    }
}

impl Rule for NegatedBooleanMethod {
    fn descriptor(&self) -> &Descriptor {
        &DESCRIPTOR
    }

    fn node_kinds(&self) -> &[SyntaxKind] {
        &[SyntaxKind::LogicalNot]
    }

    fn check(&self, node: &SyntaxNode, resolver: &dyn Resolver) -> Option<Diagnostic> {
        let call = Self::negated_call(node)?;

        let resolution = resolver.resolve(call);
        let method = resolution.symbol_or_single_candidate()?;
        if !method.returns_boolean() {
            return None;
        }

        Some(DESCRIPTOR.at(node.span(), &[&method.name]))
    }

    fn fixable(&self) -> bool {
        true
    }

    /// `!M(...)` becomes `M(...) == false`, with the negation's trivia
    /// carried onto the comparison
    fn build_fix(&self, node: &SyntaxNode, _resolver: &dyn Resolver) -> Option<SyntaxNode> {
        let call = Self::negated_call(node)?.clone();
        Some(SyntaxNode::binary("==", call, SyntaxNode::false_literal()).with_trivia_from(node))
    }
}
