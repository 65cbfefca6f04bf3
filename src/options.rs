//! Analyzer options
//!
//! Per-rule enable/disable and severity overrides plus engine toggles,
//! deserializable from JSON so a host can ship project-level settings.

use crate::diagnostic::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Error loading options
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-rule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOptions {
    /// Whether the rule runs at all
    pub enabled: bool,

    /// Severity override (None = use the descriptor default)
    pub severity: Option<Severity>,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: None,
        }
    }
}

/// Engine-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    /// Fan dispatch out over top-level declarations
    pub parallel: bool,

    /// Per-rule overrides, keyed by rule id
    pub rules: HashMap<String, RuleOptions>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            rules: HashMap::new(),
        }
    }
}

impl AnalyzerOptions {
    /// Parse options from a JSON document
    pub fn from_json(content: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Whether a rule is enabled (unknown rules default to enabled)
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.rules.get(rule_id).map_or(true, |r| r.enabled)
    }

    /// Effective severity for a rule, given its descriptor default
    pub fn severity_for(&self, rule_id: &str, default: Severity) -> Severity {
        self.rules
            .get(rule_id)
            .and_then(|r| r.severity)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AnalyzerOptions::default();
        assert!(!options.parallel);
        assert!(options.is_enabled("anything"));
        assert_eq!(
            options.severity_for("anything", Severity::Warning),
            Severity::Warning
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"
        {
            "parallel": true,
            "rules": {
                "negated-boolean-method": { "severity": "warning" },
                "completion-source-continuations": { "enabled": false }
            }
        }"#;

        let options = AnalyzerOptions::from_json(json).unwrap();
        assert!(options.parallel);
        assert!(!options.is_enabled("completion-source-continuations"));
        assert!(options.is_enabled("negated-boolean-method"));
        assert_eq!(
            options.severity_for("negated-boolean-method", Severity::Error),
            Severity::Warning
        );
    }
}
