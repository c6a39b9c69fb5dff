//! Error boundary around reflected-function lowering
//!
//! A failure never aborts the file being transformed. Whatever goes wrong
//! while lowering one reflected function, including a panic, becomes an `Err`
//! node in its place, reported later by whoever interprets the IR.

use crate::function::{FunctionFlavor, lower_function};
use crate::{LowerResult, LoweringContext};
use log::{debug, warn};
use rf_ir::{ErrorValue, Node};
use rf_syntax::SyntaxNode;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Error name carried by `Err` nodes that stand for a caught panic
pub const INTERNAL_ERROR: &str = "InternalError";

/// Lower the reflected function in `node`, never failing
pub fn lower_reflected(ctx: &LoweringContext<'_>, node: &SyntaxNode, drop_args: usize) -> Node {
    contain(|| lower_function(ctx, node, FunctionFlavor::Declaration, drop_args))
}

/// Run a lowering entry point, converting errors and panics into `Err` nodes
pub fn contain(lower: impl FnOnce() -> LowerResult) -> Node {
    match panic::catch_unwind(AssertUnwindSafe(lower)) {
        Ok(Ok(node)) => node,
        Ok(Err(error)) => {
            debug!("deferring lowering failure at {:?}: {error}", error.span());
            Node::error(error.to_error_value())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("lowering panicked: {message}");
            Node::error(ErrorValue::new(INTERNAL_ERROR, message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "lowering panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoweringError;
    use crate::test_support::{first_function, no_types, parse};

    #[test]
    fn test_success_passes_through() {
        let root = parse("reflect((x) => x);");
        let node = lower_reflected(&no_types(), first_function(&root), 0);
        assert!(matches!(node, Node::FunctionDecl { .. }));
        assert!(node.errors().is_empty());
    }

    #[test]
    fn test_failure_becomes_err_node() {
        let root = parse("reflect((x) => x ** 2);");
        let node = lower_reflected(&no_types(), first_function(&root), 0);
        let Node::Err { error } = node else {
            panic!("expected an error node, got {node:?}");
        };
        assert_eq!(error.name, "UnsupportedOperatorError");
        assert_eq!(error.message, "unsupported operator `**` in `x ** 2`");
    }

    #[test]
    fn test_panic_becomes_internal_error() {
        let node = contain(|| panic!("lost track of {}", "scope"));
        assert_eq!(
            node,
            Node::error(ErrorValue::new(INTERNAL_ERROR, "lost track of scope"))
        );

        let node = contain(|| std::panic::panic_any(7_u8));
        assert_eq!(node, Node::error(ErrorValue::new(INTERNAL_ERROR, "lowering panicked")));
    }

    #[test]
    fn test_error_value_matches_error() {
        let root = parse("reflect(handler);");
        let slot = root
            .find(&|node| node.text == "handler" && node.kind == rf_syntax::SyntaxKind::Identifier)
            .unwrap();
        let expected = LoweringError::declaration_only(slot).to_error_value();
        assert_eq!(lower_reflected(&no_types(), slot, 0), Node::error(expected));
    }
}
