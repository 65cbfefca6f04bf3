//! Rule capability interface
//!
//! A rule is a pure predicate over a single node plus an optional paired
//! fix. It declares the node kinds it inspects up front so the dispatcher
//! can index it; it is invoked at most once per matching node and must hold
//! no mutable state across invocations.

use crate::diagnostic::{Descriptor, Diagnostic};
use crate::symbol::Resolver;
use crate::syntax::{SyntaxKind, SyntaxNode};

/// A registered analysis rule
///
/// Both preconditions gate every report: the structural one (node shape)
/// and the semantic one (a resolvable symbol meeting the rule's criteria).
/// A rule that cannot establish both must stay silent; false positives are
/// worse than false negatives here.
pub trait Rule: Send + Sync {
    /// Static descriptor: stable id, category, severity, message format
    fn descriptor(&self) -> &Descriptor;

    /// Node kinds this rule inspects
    fn node_kinds(&self) -> &[SyntaxKind];

    /// Inspect one node; report at most one diagnostic
    fn check(&self, node: &SyntaxNode, resolver: &dyn Resolver) -> Option<Diagnostic>;

    /// Whether this rule pairs its diagnostic with a structural fix
    fn fixable(&self) -> bool {
        false
    }

    /// Compute a replacement for the offending node (not the whole tree)
    ///
    /// Only meaningful when [`fixable`](Rule::fixable) is true. Returns
    /// `None` when the node no longer matches the trigger shape, so a fix
    /// request against an already-rewritten tree degrades to "not
    /// applicable" rather than producing a wrong rewrite.
    fn build_fix(&self, node: &SyntaxNode, resolver: &dyn Resolver) -> Option<SyntaxNode> {
        let _ = (node, resolver);
        None
    }

    /// Stable rule identifier (shorthand for the descriptor id)
    fn id(&self) -> &'static str {
        self.descriptor().id
    }
}
