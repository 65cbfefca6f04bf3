//! Rule registry and analysis dispatcher
//!
//! Rules are indexed by the node kinds they declare; one traversal of the
//! tree invokes every interested rule once per matching node. Rules are
//! node-local and side-effect-free, so visit order does not affect
//! correctness; output is sorted by source location (ties broken by rule
//! id) for deterministic results either way.

use crate::diagnostic::Diagnostic;
use crate::options::AnalyzerOptions;
use crate::rule::Rule;
use crate::symbol::Resolver;
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxTree};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Error raised at registration time
///
/// Malformed rule configuration is fatal immediately, never at analysis
/// time.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("rule '{0}' is already registered")]
    DuplicateId(String),

    #[error("rule '{0}' declares no node kinds")]
    NoNodeKinds(String),

    #[error("rule '{0}' has an empty message format")]
    EmptyMessageFormat(String),
}

/// Rules indexed by the node kinds they inspect
#[derive(Default)]
pub struct Registry {
    rules: Vec<Arc<dyn Rule>>,
    by_kind: HashMap<SyntaxKind, Vec<usize>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule, validating its configuration
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        let id = rule.id();
        if self.rules.iter().any(|r| r.id() == id) {
            return Err(RegistryError::DuplicateId(id.to_string()));
        }
        if rule.node_kinds().is_empty() {
            return Err(RegistryError::NoNodeKinds(id.to_string()));
        }
        if rule.descriptor().message_format.is_empty() {
            return Err(RegistryError::EmptyMessageFormat(id.to_string()));
        }

        let index = self.rules.len();
        for &kind in rule.node_kinds() {
            self.by_kind.entry(kind).or_default().push(index);
        }
        log::debug!("registered rule '{}'", id);
        self.rules.push(rule);
        Ok(())
    }

    /// Look up a rule by id
    pub fn rule(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.iter().find(|r| r.id() == id)
    }

    /// All registered rules
    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    fn rules_for(&self, kind: SyntaxKind) -> &[usize] {
        self.by_kind.get(&kind).map_or(&[], Vec::as_slice)
    }
}

/// Result of one analysis pass
#[derive(Debug, Default)]
pub struct Analysis {
    /// Diagnostics ordered by span start, then rule id
    pub diagnostics: Vec<Diagnostic>,

    /// Nodes visited by the traversal
    pub nodes_visited: usize,

    /// Total errors
    pub error_count: usize,

    /// Total warnings
    pub warning_count: usize,

    /// Total info messages
    pub info_count: usize,

    /// Pass duration
    pub duration: Duration,

    /// Rules disabled mid-pass after a panic
    pub faulted_rules: Vec<String>,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// The analysis engine
///
/// Owns a registry plus options and drives a single traversal per pass.
/// A rule that panics is a defect of that rule, not of the pass: the panic
/// is caught, logged, and the rule sits out the remainder of the pass.
pub struct Analyzer {
    registry: Registry,
    options: AnalyzerOptions,
}

impl Analyzer {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            options: AnalyzerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AnalyzerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Analysis entry point: ordered diagnostics for one tree
    pub fn analyze(&self, tree: &SyntaxTree, resolver: &dyn Resolver) -> Vec<Diagnostic> {
        self.run(tree, resolver).diagnostics
    }

    /// Full pass with summary statistics
    pub fn run(&self, tree: &SyntaxTree, resolver: &dyn Resolver) -> Analysis {
        let start = Instant::now();
        let faulted: Mutex<HashSet<String>> = Mutex::new(HashSet::new());

        let mut analysis = Analysis::default();

        if self.options.parallel && tree.root().children().len() > 1 {
            // Rules are stateless per node, so independent top-level
            // subtrees can run on the pool; the root node itself is visited
            // first so no kind registration is lost.
            let mut diagnostics = Vec::new();
            self.visit_one(tree.root(), resolver, &faulted, &mut diagnostics);
            analysis.nodes_visited += 1;

            let subtree_results: Vec<(Vec<Diagnostic>, usize)> = tree
                .root()
                .children()
                .par_iter()
                .map(|child| {
                    let mut out = Vec::new();
                    let visited = self.visit_subtree(child, resolver, &faulted, &mut out);
                    (out, visited)
                })
                .collect();

            for (out, visited) in subtree_results {
                diagnostics.extend(out);
                analysis.nodes_visited += visited;
            }
            analysis.diagnostics = diagnostics;
        } else {
            let mut diagnostics = Vec::new();
            for node in tree.descendants() {
                self.visit_one(node, resolver, &faulted, &mut diagnostics);
                analysis.nodes_visited += 1;
            }
            analysis.diagnostics = diagnostics;
        }

        analysis
            .diagnostics
            .sort_by(|a, b| (a.span.start, &a.rule_id).cmp(&(b.span.start, &b.rule_id)));

        for diag in &analysis.diagnostics {
            match diag.severity {
                crate::diagnostic::Severity::Error => analysis.error_count += 1,
                crate::diagnostic::Severity::Warning => analysis.warning_count += 1,
                crate::diagnostic::Severity::Info => analysis.info_count += 1,
            }
        }

        analysis.faulted_rules = {
            let mut ids: Vec<String> = faulted.into_inner().unwrap_or_default().into_iter().collect();
            ids.sort();
            ids
        };
        analysis.duration = start.elapsed();
        analysis
    }

    /// Visit a node and all its descendants; returns the visit count
    fn visit_subtree(
        &self,
        node: &Arc<SyntaxNode>,
        resolver: &dyn Resolver,
        faulted: &Mutex<HashSet<String>>,
        out: &mut Vec<Diagnostic>,
    ) -> usize {
        self.visit_one(node, resolver, faulted, out);
        let mut visited = 1;
        for child in node.children() {
            visited += self.visit_subtree(child, resolver, faulted, out);
        }
        visited
    }

    /// Invoke every interested rule on a single node
    fn visit_one(
        &self,
        node: &Arc<SyntaxNode>,
        resolver: &dyn Resolver,
        faulted: &Mutex<HashSet<String>>,
        out: &mut Vec<Diagnostic>,
    ) {
        for &index in self.registry.rules_for(node.kind()) {
            let rule = &self.registry.rules[index];
            if !self.options.is_enabled(rule.id()) {
                continue;
            }
            if faulted.lock().map_or(true, |f| f.contains(rule.id())) {
                continue;
            }

            let outcome = catch_unwind(AssertUnwindSafe(|| rule.check(node, resolver)));
            match outcome {
                Ok(Some(diagnostic)) => {
                    let severity = self
                        .options
                        .severity_for(rule.id(), diagnostic.severity);
                    out.push(diagnostic.with_severity(severity));
                }
                Ok(None) => {}
                Err(_) => {
                    log::error!(
                        "rule '{}' panicked at {}; disabled for the remainder of this pass",
                        rule.id(),
                        node.span()
                    );
                    if let Ok(mut f) = faulted.lock() {
                        f.insert(rule.id().to_string());
                    }
                }
            }
        }
    }
}
