//! Diagnostic types for analysis results

use crate::syntax::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning - potential issue
    #[default]
    Warning,
    /// Error - definite problem
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(()),
        }
    }
}

/// Static description of a diagnostic a rule can produce
///
/// The message format uses positional `{0}`, `{1}`, ... placeholders filled
/// in when a concrete diagnostic is materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    /// Stable rule identifier (e.g. "negated-boolean-method")
    pub id: &'static str,
    /// Grouping category (e.g. "style", "reliability")
    pub category: &'static str,
    /// Severity used unless overridden by options
    pub default_severity: Severity,
    /// Message template with positional placeholders
    pub message_format: &'static str,
}

impl Descriptor {
    pub const fn new(
        id: &'static str,
        category: &'static str,
        default_severity: Severity,
        message_format: &'static str,
    ) -> Self {
        Self {
            id,
            category,
            default_severity,
            message_format,
        }
    }

    /// Fill positional placeholders in the message format
    pub fn format(&self, args: &[&str]) -> String {
        let mut message = self.message_format.to_string();
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", i), arg);
        }
        message
    }

    /// Materialize a diagnostic at a source location
    pub fn at(&self, span: Span, args: &[&str]) -> Diagnostic {
        Diagnostic {
            rule_id: self.id.to_string(),
            severity: self.default_severity,
            message: self.format(args),
            span,
        }
    }
}

/// A reported finding (immutable value object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule ID that triggered this diagnostic
    pub rule_id: String,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Source span of the triggering node
    pub span: Span,
}

impl Diagnostic {
    /// Override the severity (used when options remap a rule)
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] at {}: {}",
            self.severity, self.rule_id, self.span, self.message
        )
    }
}
