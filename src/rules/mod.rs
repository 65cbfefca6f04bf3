//! Built-in analysis rules

pub mod completion_source;
pub mod configuration_key;
pub mod negated_boolean;

pub use completion_source::{CompletionSourceRule, ContinuationOptions};
pub use configuration_key::ConfigurationKeyRule;
pub use negated_boolean::NegatedBooleanMethod;

use crate::rule::Rule;
use std::sync::Arc;

/// All shipped rules, configured for the given configuration type
/// (fully-qualified name, consumed by the configuration-key rule)
pub fn builtin_rules(configuration_type: &str) -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(NegatedBooleanMethod),
        Arc::new(ConfigurationKeyRule::new(configuration_type)),
        Arc::new(CompletionSourceRule),
    ]
}
