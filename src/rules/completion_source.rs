//! Completion-source continuation-mode rule
//!
//! Continuations on a completion source run inline on the completing
//! thread unless the source is constructed with the
//! run-continuations-asynchronously option, a well-known deadlock and
//! latency hazard. The check is structural/textual: the constructed type
//! is matched by simple name (it is not always fully qualified at the
//! syntax level), and the option argument is recognized from the enum's
//! known member values, including OR-combinations with other flags.

use crate::diagnostic::{Descriptor, Diagnostic, Severity};
use crate::rule::Rule;
use crate::symbol::Resolver;
use crate::syntax::{SyntaxKind, SyntaxNode};
use bitflags::bitflags;

/// Simple name of the async-completion-source type
pub const COMPLETION_SOURCE_TYPE: &str = "TaskCompletionSource";

/// Name of the continuation-execution option member
pub const RUN_CONTINUATIONS_ASYNCHRONOUSLY: &str = "RunContinuationsAsynchronously";

bitflags! {
    /// Continuation-options flags, mirroring the platform enum's values
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ContinuationOptions: u32 {
        const PREFER_FAIRNESS = 0x1;
        const LONG_RUNNING = 0x2;
        const ATTACHED_TO_PARENT = 0x4;
        const DENY_CHILD_ATTACH = 0x8;
        const HIDE_SCHEDULER = 0x10;
        const LAZY_CANCELLATION = 0x20;
        const RUN_CONTINUATIONS_ASYNCHRONOUSLY = 0x40;
        const NOT_ON_RAN_TO_COMPLETION = 0x10000;
        const NOT_ON_FAULTED = 0x20000;
        const NOT_ON_CANCELED = 0x40000;
        const ONLY_ON_CANCELED = 0x30000;
        const ONLY_ON_FAULTED = 0x50000;
        const ONLY_ON_RAN_TO_COMPLETION = 0x60000;
        const EXECUTE_SYNCHRONOUSLY = 0x80000;
    }
}

impl ContinuationOptions {
    /// Parse a single enum member name, case-insensitively
    pub fn parse_member(name: &str) -> Option<Self> {
        let value = match name.to_ascii_lowercase().as_str() {
            "none" => Self::empty(),
            "preferfairness" => Self::PREFER_FAIRNESS,
            "longrunning" => Self::LONG_RUNNING,
            "attachedtoparent" => Self::ATTACHED_TO_PARENT,
            "denychildattach" => Self::DENY_CHILD_ATTACH,
            "hidescheduler" => Self::HIDE_SCHEDULER,
            "lazycancellation" => Self::LAZY_CANCELLATION,
            "runcontinuationsasynchronously" => Self::RUN_CONTINUATIONS_ASYNCHRONOUSLY,
            "notonrantocompletion" => Self::NOT_ON_RAN_TO_COMPLETION,
            "notonfaulted" => Self::NOT_ON_FAULTED,
            "notoncanceled" => Self::NOT_ON_CANCELED,
            "onlyoncanceled" => Self::ONLY_ON_CANCELED,
            "onlyonfaulted" => Self::ONLY_ON_FAULTED,
            "onlyonrantocompletion" => Self::ONLY_ON_RAN_TO_COMPLETION,
            "executesynchronously" => Self::EXECUTE_SYNCHRONOUSLY,
            _ => return None,
        };
        Some(value)
    }
}

static DESCRIPTOR: Descriptor = Descriptor::new(
    "completion-source-continuations",
    "reliability",
    Severity::Warning,
    "TaskCompletionSource must be created with TaskCreationOptions.RunContinuationsAsynchronously",
);

/// Flags completion-source constructions without the async-continuations option
pub struct CompletionSourceRule;

impl CompletionSourceRule {
    /// Match the constructed type by simple name text
    ///
    /// Accepts the bare identifier, the generic form, and either of those
    /// as the right side of a qualified name.
    fn is_completion_source(type_name: &SyntaxNode) -> bool {
        match type_name.kind() {
            SyntaxKind::Identifier | SyntaxKind::GenericName => {
                type_name.text() == COMPLETION_SOURCE_TYPE
            }
            SyntaxKind::QualifiedName => type_name
                .child(1)
                .is_some_and(|name| Self::is_completion_source(name)),
            _ => false,
        }
    }

    /// Whether an argument expression denotes the async-continuations option
    ///
    /// Recursive so the option is still found when OR-combined with other
    /// flags. The member name must both contain the option's name and
    /// enum-parse to a flags value that includes its bit.
    fn denotes_async_continuations(expr: &SyntaxNode) -> bool {
        match expr.kind() {
            SyntaxKind::MemberAccess => {
                let name = match expr.child(1) {
                    Some(name) => name.text(),
                    None => return false,
                };
                if !name.contains(RUN_CONTINUATIONS_ASYNCHRONOUSLY) {
                    return false;
                }
                ContinuationOptions::parse_member(name).is_some_and(|options| {
                    options.contains(ContinuationOptions::RUN_CONTINUATIONS_ASYNCHRONOUSLY)
                })
            }
            SyntaxKind::Binary => expr
                .children()
                .iter()
                .any(|operand| Self::denotes_async_continuations(operand)),
            _ => false,
        }
    }
}

impl Rule for CompletionSourceRule {
    fn descriptor(&self) -> &Descriptor {
        &DESCRIPTOR
    }

    fn node_kinds(&self) -> &[SyntaxKind] {
        &[SyntaxKind::ObjectCreation]
    }

    fn check(&self, node: &SyntaxNode, _resolver: &dyn Resolver) -> Option<Diagnostic> {
        let type_name = node.child(0)?;
        if !Self::is_completion_source(type_name) {
            return None;
        }

        let has_option = node
            .children()
            .iter()
            .skip(1)
            .any(|arg| Self::denotes_async_continuations(arg));
        if has_option {
            return None;
        }

        Some(DESCRIPTOR.at(node.span(), &[]))
    }
}
