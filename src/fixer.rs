//! Fix engine
//!
//! Fix computation is a separate, on-demand operation per diagnostic, not
//! part of traversal. The engine locates the smallest node of the rule's
//! declared kinds covering the diagnostic, asks the rule for a replacement
//! of that node (never of an ancestor), and substitutes it by structural
//! path: ancestors rebuilt, sibling subtrees shared unchanged.

use crate::diagnostic::Diagnostic;
use crate::registry::Registry;
use crate::symbol::Resolver;
use crate::syntax::{Span, SyntaxTree};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Cooperative cancellation signal
///
/// Checked before each potentially expensive step; on cancellation the
/// operation yields no result and no partial state (the immutable tree
/// makes partial mutation impossible by construction).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Error applying a fix
#[derive(Debug, Error)]
pub enum FixError {
    #[error("no rule registered with id '{0}'")]
    UnknownRule(String),

    #[error("rule '{0}' provides no fix")]
    NoFixAvailable(String),

    #[error("no node of a kind inspected by rule '{rule_id}' covers {span}")]
    TargetNotFound { rule_id: String, span: Span },

    #[error("rule '{0}' declined to fix the located node")]
    NotApplicable(String),

    /// Distinct from inapplicability: the caller asked to stop
    #[error("fix computation was cancelled")]
    Cancelled,
}

/// Result of applying a batch of fixes
#[derive(Debug)]
pub struct FixResult {
    /// The rewritten tree
    pub tree: SyntaxTree,
    /// Number of fixes applied
    pub applied: usize,
    /// Number of fixes skipped (overlapping or inapplicable)
    pub skipped: usize,
}

/// Applies rule fixes to trees
pub struct Fixer<'r> {
    registry: &'r Registry,
}

impl<'r> Fixer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Fix entry point: a new tree with one diagnostic's fix applied
    pub fn fix(
        &self,
        tree: &SyntaxTree,
        diagnostic: &Diagnostic,
        resolver: &dyn Resolver,
        cancel: &CancellationToken,
    ) -> Result<SyntaxTree, FixError> {
        let rule = self
            .registry
            .rule(&diagnostic.rule_id)
            .ok_or_else(|| FixError::UnknownRule(diagnostic.rule_id.clone()))?;
        if !rule.fixable() {
            return Err(FixError::NoFixAvailable(diagnostic.rule_id.clone()));
        }
        if cancel.is_cancelled() {
            return Err(FixError::Cancelled);
        }

        let (path, node) = tree
            .find_innermost(diagnostic.span, |n| rule.node_kinds().contains(&n.kind()))
            .ok_or_else(|| FixError::TargetNotFound {
                rule_id: diagnostic.rule_id.clone(),
                span: diagnostic.span,
            })?;

        // Resolver queries happen inside the rule's fix builder
        if cancel.is_cancelled() {
            return Err(FixError::Cancelled);
        }
        let replacement = rule
            .build_fix(&node, resolver)
            .ok_or_else(|| FixError::NotApplicable(diagnostic.rule_id.clone()))?;

        tree.replace(&path, replacement)
            .ok_or_else(|| FixError::TargetNotFound {
                rule_id: diagnostic.rule_id.clone(),
                span: diagnostic.span,
            })
    }

    /// Apply fixes for several diagnostics in one batch
    ///
    /// Diagnostics on overlapping spans are skipped after the first; fixes
    /// on disjoint nodes are independently applicable and commutative, so
    /// application order does not change the result.
    pub fn fix_all(
        &self,
        tree: &SyntaxTree,
        diagnostics: &[Diagnostic],
        resolver: &dyn Resolver,
        cancel: &CancellationToken,
    ) -> Result<FixResult, FixError> {
        let mut current = tree.clone();
        let mut applied = 0usize;
        let mut skipped = 0usize;
        let mut touched: Vec<Span> = Vec::new();

        for diagnostic in diagnostics {
            if cancel.is_cancelled() {
                return Err(FixError::Cancelled);
            }
            if touched
                .iter()
                .any(|span| span.contains(diagnostic.span) || diagnostic.span.contains(*span))
            {
                log::warn!(
                    "skipping fix for '{}' at {}: overlaps an earlier fix in this batch",
                    diagnostic.rule_id,
                    diagnostic.span
                );
                skipped += 1;
                continue;
            }

            match self.fix(&current, diagnostic, resolver, cancel) {
                Ok(next) => {
                    touched.push(diagnostic.span);
                    current = next;
                    applied += 1;
                }
                Err(FixError::Cancelled) => return Err(FixError::Cancelled),
                Err(FixError::NoFixAvailable(_)) | Err(FixError::NotApplicable(_)) => {
                    skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(FixResult {
            tree: current,
            applied,
            skipped,
        })
    }
}
