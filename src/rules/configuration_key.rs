//! Configuration-key accessor validation rule
//!
//! Project convention: every property handed to the configuration type's
//! `GetKey(x => x.Property)` accessor must itself be declared as a
//! configuration entry via a marker attribute. The type system cannot
//! express that, so it is enforced structurally here. There is no fix; the
//! missing marker has to be added by a human.

use crate::diagnostic::{Descriptor, Diagnostic, Severity};
use crate::rule::Rule;
use crate::symbol::{Resolver, SymbolKind};
use crate::syntax::{SyntaxKind, SyntaxNode};

/// Name of the accessor method on the configuration type
pub const ACCESSOR_METHOD: &str = "GetKey";

/// Default simple name of the marker attribute
pub const MARKER_ATTRIBUTE: &str = "ConfigurationEntryAttribute";

static DESCRIPTOR: Descriptor = Descriptor::new(
    "configuration-entry-key",
    "correctness",
    Severity::Warning,
    "Property '{0}' is passed to GetKey but is not marked as a configuration entry",
);

/// Flags `GetKey(x => x.Property)` where the property lacks the marker
///
/// The configuration type is matched by fully-qualified name, not by local
/// name, so unrelated types with the same short name never match. Both
/// names are exact-match stable identifiers.
pub struct ConfigurationKeyRule {
    configuration_type: String,
    marker_attribute: String,
}

impl ConfigurationKeyRule {
    /// Rule for the given configuration type (fully-qualified name)
    pub fn new(configuration_type: &str) -> Self {
        Self {
            configuration_type: configuration_type.to_string(),
            marker_attribute: MARKER_ATTRIBUTE.to_string(),
        }
    }

    /// Override the marker attribute's simple name
    pub fn with_marker_attribute(mut self, name: &str) -> Self {
        self.marker_attribute = name.to_string();
        self
    }

    /// The lambda body's member access, if the call has the trigger shape
    ///
    /// Shape: exactly one argument, a single-parameter lambda whose body is
    /// a member access on that parameter.
    fn accessed_member(call: &SyntaxNode) -> Option<&SyntaxNode> {
        let args = call.children().get(1..)?;
        if args.len() != 1 {
            return None;
        }
        let lambda = args[0].as_ref();
        if lambda.kind() != SyntaxKind::Lambda {
            return None;
        }

        let parameter = lambda.child(0)?;
        let body = lambda.child(1)?;
        if body.kind() != SyntaxKind::MemberAccess {
            return None;
        }
        let receiver = body.child(0)?;
        if receiver.kind() != SyntaxKind::Identifier || receiver.text() != parameter.text() {
            return None;
        }
        Some(body)
    }
}

impl Rule for ConfigurationKeyRule {
    fn descriptor(&self) -> &Descriptor {
        &DESCRIPTOR
    }

    fn node_kinds(&self) -> &[SyntaxKind] {
        &[SyntaxKind::Call]
    }

    fn check(&self, node: &SyntaxNode, resolver: &dyn Resolver) -> Option<Diagnostic> {
        // Callee must be a bare identifier or a simple member access,
        // not an arbitrary expression
        let callee = node.child(0)?;
        if !matches!(
            callee.kind(),
            SyntaxKind::Identifier | SyntaxKind::MemberAccess
        ) {
            return None;
        }

        let resolution = resolver.resolve(callee);
        let method = resolution.symbol_or_single_candidate()?;
        if method.kind != SymbolKind::Method
            || method.name != ACCESSOR_METHOD
            || method.containing_type != self.configuration_type
        {
            return None;
        }

        let member = Self::accessed_member(node)?;

        // An unresolved property stays silent rather than guessed at
        let property_resolution = resolver.resolve(member);
        let property = property_resolution.symbol()?;
        if property.kind != SymbolKind::Property
            || property.containing_type != self.configuration_type
            || property.has_attribute(&self.marker_attribute)
        {
            return None;
        }

        // Reported on the property's name, not the whole call
        let name_node = member.child(1)?;
        Some(DESCRIPTOR.at(name_node.span(), &[&property.name]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Analyzer, Registry};
    use crate::symbol::{Resolution, Symbol};
    use crate::syntax::SyntaxTree;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Arc;

    const CONFIG_TYPE: &str = "Server.Config.CoreConfiguration";

    /// Resolves the `GetKey` callee and lambda-body member accesses by name
    struct ConfigResolver {
        callee: Resolution,
        properties: HashMap<String, Resolution>,
    }

    impl ConfigResolver {
        fn new(callee: Resolution) -> Self {
            Self {
                callee,
                properties: HashMap::new(),
            }
        }

        fn with_property(mut self, name: &str, resolution: Resolution) -> Self {
            self.properties.insert(name.to_string(), resolution);
            self
        }
    }

    impl Resolver for ConfigResolver {
        fn resolve(&self, node: &SyntaxNode) -> Resolution {
            let name = match node.name_text() {
                Some(name) => name,
                None => return Resolution::Unresolved,
            };
            if let Some(resolution) = self.properties.get(name) {
                return resolution.clone();
            }
            if name == ACCESSOR_METHOD || name.starts_with("GetKey") {
                return self.callee.clone();
            }
            Resolution::Unresolved
        }
    }

    fn get_key_method() -> Symbol {
        Symbol::method(ACCESSOR_METHOD, CONFIG_TYPE, "System.String")
    }

    fn analyzer() -> Analyzer {
        let mut registry = Registry::new();
        registry
            .register(Arc::new(ConfigurationKeyRule::new(CONFIG_TYPE)))
            .unwrap();
        Analyzer::new(registry)
    }

    /// `Config.GetKey(x => x.<property>)`
    fn get_key_call(property: &str) -> SyntaxTree {
        get_key_call_named("GetKey", property)
    }

    fn get_key_call_named(method: &str, property: &str) -> SyntaxTree {
        SyntaxTree::new(SyntaxNode::expression_statement(SyntaxNode::call(
            SyntaxNode::member_access(
                SyntaxNode::identifier("Config"),
                SyntaxNode::identifier(method),
            ),
            vec![SyntaxNode::lambda(
                SyntaxNode::identifier("x"),
                SyntaxNode::member_access(
                    SyntaxNode::identifier("x"),
                    SyntaxNode::identifier(property),
                ),
            )],
        )))
    }

    #[test]
    fn test_reports_unmarked_property_at_its_name() {
        let resolver = ConfigResolver::new(Resolution::Resolved(get_key_method()))
            .with_property(
                "Foo",
                Resolution::Resolved(Symbol::property("Foo", CONFIG_TYPE)),
            );
        let tree = get_key_call("Foo");

        let diagnostics = analyzer().analyze(&tree, &resolver);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Property 'Foo' is passed to GetKey but is not marked as a configuration entry"
        );

        let text = tree.text();
        let span = diagnostics[0].span;
        assert_eq!(&text[span.start..span.end], "Foo");
    }

    #[test]
    fn test_marked_property_is_silent() {
        let marked = Symbol::property("Foo", CONFIG_TYPE).with_attribute(MARKER_ATTRIBUTE);
        let resolver = ConfigResolver::new(Resolution::Resolved(get_key_method()))
            .with_property("Foo", Resolution::Resolved(marked));

        assert!(analyzer().analyze(&get_key_call("Foo"), &resolver).is_empty());
    }

    #[test]
    fn test_unresolved_property_is_silent() {
        let resolver = ConfigResolver::new(Resolution::Resolved(get_key_method()));
        assert!(analyzer().analyze(&get_key_call("Foo"), &resolver).is_empty());
    }

    #[test]
    fn test_get_key_on_other_type_is_silent() {
        let other = Symbol::method(ACCESSOR_METHOD, "Other.Namespace.CoreConfiguration", "System.String");
        let resolver = ConfigResolver::new(Resolution::Resolved(other)).with_property(
            "Foo",
            Resolution::Resolved(Symbol::property("Foo", CONFIG_TYPE)),
        );

        assert!(analyzer().analyze(&get_key_call("Foo"), &resolver).is_empty());
    }

    #[test]
    fn test_differently_named_method_is_silent() {
        let other = Symbol::method("GetKeyOrDefault", CONFIG_TYPE, "System.String");
        let resolver = ConfigResolver::new(Resolution::Resolved(other)).with_property(
            "Foo",
            Resolution::Resolved(Symbol::property("Foo", CONFIG_TYPE)),
        );

        assert!(analyzer()
            .analyze(&get_key_call_named("GetKeyOrDefault", "Foo"), &resolver)
            .is_empty());
    }

    #[test]
    fn test_ambiguous_callee_single_candidate_reports() {
        let resolver = ConfigResolver::new(Resolution::Ambiguous(vec![get_key_method()]))
            .with_property(
                "Foo",
                Resolution::Resolved(Symbol::property("Foo", CONFIG_TYPE)),
            );

        assert_eq!(analyzer().analyze(&get_key_call("Foo"), &resolver).len(), 1);
    }

    #[test]
    fn test_ambiguous_callee_multiple_candidates_silent() {
        let resolver = ConfigResolver::new(Resolution::Ambiguous(vec![
            get_key_method(),
            get_key_method(),
        ]))
        .with_property(
            "Foo",
            Resolution::Resolved(Symbol::property("Foo", CONFIG_TYPE)),
        );

        assert!(analyzer().analyze(&get_key_call("Foo"), &resolver).is_empty());
    }

    #[test]
    fn test_non_lambda_argument_is_silent() {
        let resolver = ConfigResolver::new(Resolution::Resolved(get_key_method()));
        let tree = SyntaxTree::new(SyntaxNode::expression_statement(SyntaxNode::call(
            SyntaxNode::member_access(
                SyntaxNode::identifier("Config"),
                SyntaxNode::identifier("GetKey"),
            ),
            vec![SyntaxNode::identifier("foo")],
        )));

        assert!(analyzer().analyze(&tree, &resolver).is_empty());
    }

    #[test]
    fn test_lambda_body_on_other_receiver_is_silent() {
        let resolver = ConfigResolver::new(Resolution::Resolved(get_key_method()))
            .with_property(
                "Foo",
                Resolution::Resolved(Symbol::property("Foo", CONFIG_TYPE)),
            );
        // `Config.GetKey(x => y.Foo)` - body does not access the parameter
        let tree = SyntaxTree::new(SyntaxNode::expression_statement(SyntaxNode::call(
            SyntaxNode::member_access(
                SyntaxNode::identifier("Config"),
                SyntaxNode::identifier("GetKey"),
            ),
            vec![SyntaxNode::lambda(
                SyntaxNode::identifier("x"),
                SyntaxNode::member_access(
                    SyntaxNode::identifier("y"),
                    SyntaxNode::identifier("Foo"),
                ),
            )],
        )));

        assert!(analyzer().analyze(&tree, &resolver).is_empty());
    }

    #[test]
    fn test_complex_callee_is_silent() {
        // `(Config.GetKey)(x => x.Foo)` - callee is neither an identifier
        // nor a simple member access
        let resolver = ConfigResolver::new(Resolution::Resolved(get_key_method()))
            .with_property(
                "Foo",
                Resolution::Resolved(Symbol::property("Foo", CONFIG_TYPE)),
            );
        let tree = SyntaxTree::new(SyntaxNode::expression_statement(SyntaxNode::call(
            SyntaxNode::parenthesized(SyntaxNode::member_access(
                SyntaxNode::identifier("Config"),
                SyntaxNode::identifier("GetKey"),
            )),
            vec![SyntaxNode::lambda(
                SyntaxNode::identifier("x"),
                SyntaxNode::member_access(
                    SyntaxNode::identifier("x"),
                    SyntaxNode::identifier("Foo"),
                ),
            )],
        )));

        assert!(analyzer().analyze(&tree, &resolver).is_empty());
    }
}
