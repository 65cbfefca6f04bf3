//! Semantic symbols and the resolver boundary
//!
//! Symbol binding is performed by an external front end; the engine only
//! consumes the result. Resolution of a reference may succeed, fail, or end
//! ambiguous with a candidate set (an overload set the front end could not
//! narrow without full type inference).

use crate::syntax::SyntaxNode;
use serde::{Deserialize, Serialize};

/// Well-known type names used in exact-match comparisons
pub mod types {
    /// Fully-qualified name of the boolean primitive
    pub const BOOLEAN: &str = "System.Boolean";
}

/// Declaration kind facet of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Method,
    Property,
    Field,
    Type,
}

/// A declaration bound to a syntax node
///
/// Only the facets the rules inspect are modeled: name, kind, declared
/// return type (methods), the containing type's fully-qualified name, and
/// the simple names of attached marker attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Declared name
    pub name: String,
    /// Declaration kind
    pub kind: SymbolKind,
    /// Fully-qualified declared return type, for methods
    pub return_type: Option<String>,
    /// Fully-qualified name of the containing type
    pub containing_type: String,
    /// Simple names of attributes attached to the declaration
    pub attributes: Vec<String>,
}

impl Symbol {
    pub fn method(name: &str, containing_type: &str, return_type: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Method,
            return_type: Some(return_type.to_string()),
            containing_type: containing_type.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn property(name: &str, containing_type: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Property,
            return_type: None,
            containing_type: containing_type.to_string(),
            attributes: Vec::new(),
        }
    }

    /// Attach a marker attribute by simple name (builder style)
    pub fn with_attribute(mut self, name: &str) -> Self {
        self.attributes.push(name.to_string());
        self
    }

    /// Check for a marker attribute by exact simple name
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    /// Whether this is a method returning exactly boolean
    pub fn returns_boolean(&self) -> bool {
        self.kind == SymbolKind::Method && self.return_type.as_deref() == Some(types::BOOLEAN)
    }
}

/// Outcome of resolving a syntax node to a symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A single symbol was bound
    Resolved(Symbol),
    /// More than one viable candidate remained (e.g. an overload set)
    Ambiguous(Vec<Symbol>),
    /// No binding exists
    Unresolved,
}

impl Resolution {
    /// The bound symbol, or the sole ambiguous candidate
    ///
    /// Ambiguity with exactly one candidate is treated as a successful
    /// resolution; more than one candidate, or none, yields nothing.
    /// Under-reporting beats misattributing semantics to the wrong overload.
    pub fn symbol_or_single_candidate(&self) -> Option<&Symbol> {
        match self {
            Resolution::Resolved(symbol) => Some(symbol),
            Resolution::Ambiguous(candidates) if candidates.len() == 1 => candidates.first(),
            _ => None,
        }
    }

    /// The bound symbol only, with no candidate fallback
    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            Resolution::Resolved(symbol) => Some(symbol),
            _ => None,
        }
    }
}

/// Read-only query interface mapping syntax nodes to symbols
///
/// Implementations are supplied by the host. Resolution is potentially
/// expensive; the engine treats it as a pure query and never calls it with
/// nodes from a different tree than the one under analysis.
pub trait Resolver: Send + Sync {
    fn resolve(&self, node: &SyntaxNode) -> Resolution;
}
