//! Binding of call arguments to resolved parameters

use crate::expr::lower_element;
use crate::{LowerResult, LoweringContext, LoweringError};
use rf_ir::Node;
use rf_syntax::SyntaxNode;
use rf_ty::{Signature, markers};

/// Lower the arguments of a call or `new` expression into `Argument` nodes
///
/// With a resolved signature there is one `Argument` per parameter: a rest
/// parameter collects the remaining arguments into an array and a missing
/// argument leaves the slot empty. Without one, every supplied argument is
/// bound positionally and unnamed.
///
/// # Errors
///
/// Fails if an argument cannot be lowered, or if the callee is a callable
/// wrapper with more than one call signature.
pub fn bind_arguments(ctx: &LoweringContext<'_>, invocation: &SyntaxNode) -> LowerResult<Vec<Node>> {
    let supplied = invocation.call_arguments();

    let signature = match resolve_signature(ctx, invocation)? {
        Some(signature) if !signature.parameters.is_empty() => signature,
        _ => {
            return supplied
                .into_iter()
                .map(|argument| Ok(Node::argument(Some(lower_element(ctx, argument)?), None)))
                .collect();
        }
    };

    signature
        .parameters
        .iter()
        .enumerate()
        .map(|(index, parameter)| {
            let name = (!parameter.name.is_empty()).then(|| parameter.name.clone());
            let expr = if parameter.rest {
                let items = supplied
                    .iter()
                    .skip(index)
                    .map(|argument| lower_element(ctx, argument))
                    .collect::<LowerResult<_>>()?;
                Some(Node::ArrayLiteralExpr { items })
            } else {
                supplied
                    .get(index)
                    .map(|argument| lower_element(ctx, argument))
                    .transpose()?
            };
            Ok(Node::argument(expr, name))
        })
        .collect()
}

/// Signature the invocation binds against
///
/// A callee branded as a callable wrapper is resolved through its branded
/// function type, which must not be overloaded.
fn resolve_signature(
    ctx: &LoweringContext<'_>,
    invocation: &SyntaxNode,
) -> LowerResult<Option<Signature>> {
    let oracle = ctx.oracle();
    let branded = invocation
        .callee()
        .and_then(|callee| oracle.type_of(callee))
        .and_then(|callee| markers::callable_brand(oracle, &callee));

    let Some(branded) = branded else {
        return Ok(oracle.resolved_signature(invocation));
    };

    let mut signatures = oracle.signatures_of(&branded);
    match signatures.len() {
        0 | 1 => Ok(signatures.pop()),
        count => Err(LoweringError::multiple_signatures(invocation, count)),
    }
}
