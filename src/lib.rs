//! Synlint - rule-based static analysis over immutable syntax trees
//!
//! Given a parsed source tree and a resolver that maps syntax nodes to
//! semantic symbols, the engine detects specific anti-pattern shapes, emits
//! diagnostics, and - for rules that support it - computes a structural
//! rewrite that replaces the offending subtree while preserving the
//! surrounding trivia.
//!
//! # Architecture
//!
//! ```text
//! Host -> Analyzer -> Registry -> Rule -> Resolver
//!               \
//!                -> Fixer -> SyntaxTree (replace by path)
//! ```
//!
//! The host builds a [`Registry`] of rules, wraps it in an [`Analyzer`],
//! and runs one traversal per tree; each node is handed to every rule
//! registered for its kind. Fixes are computed on demand per diagnostic,
//! never during traversal.
//!
//! # Example
//!
//! ```
//! use synlint::{Analyzer, Registry, Resolution, Resolver, SyntaxNode, SyntaxTree};
//! use synlint::rules::CompletionSourceRule;
//! use std::sync::Arc;
//!
//! struct NoSymbols;
//!
//! impl Resolver for NoSymbols {
//!     fn resolve(&self, _node: &SyntaxNode) -> Resolution {
//!         Resolution::Unresolved
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register(Arc::new(CompletionSourceRule)).unwrap();
//!
//! let tree = SyntaxTree::new(SyntaxNode::expression_statement(
//!     SyntaxNode::object_creation(
//!         SyntaxNode::identifier("TaskCompletionSource"),
//!         Vec::new(),
//!     ),
//! ));
//!
//! let diagnostics = Analyzer::new(registry).analyze(&tree, &NoSymbols);
//! assert_eq!(diagnostics.len(), 1);
//! ```

pub mod diagnostic;
pub mod fixer;
pub mod options;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod symbol;
pub mod syntax;

// Re-export main types
pub use diagnostic::{Descriptor, Diagnostic, Severity};
pub use fixer::{CancellationToken, FixError, FixResult, Fixer};
pub use options::{AnalyzerOptions, OptionsError, RuleOptions};
pub use registry::{Analysis, Analyzer, Registry, RegistryError};
pub use rule::Rule;
pub use symbol::{Resolution, Resolver, Symbol, SymbolKind};
pub use syntax::{Span, SyntaxKind, SyntaxNode, SyntaxTree};
