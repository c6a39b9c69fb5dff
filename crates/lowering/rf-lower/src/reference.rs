//! Recognition of handles to externally managed resources

use crate::LoweringContext;
use rf_ir::Node;
use rf_syntax::{SyntaxKind, SyntaxNode};
use rf_ty::markers;

/// Lower `node` to a `ReferenceExpr` if its type is tagged with a reference kind
pub fn resolve_reference(ctx: &LoweringContext<'_>, node: &SyntaxNode) -> Option<Node> {
    let oracle = ctx.oracle();
    let ty = oracle.type_of(node)?;
    let kind = markers::reference_kind(oracle, &ty)?;
    log::trace!("`{}` refers to a {}", node.text, kind.tag());

    Some(Node::ReferenceExpr {
        path: reference_path(node),
        reference: node.text.clone(),
    })
}

/// Reconstruct the access path of `node` (`props.table`, `tables[0].name`)
///
/// Returns an empty string when the expression is not a plain access chain.
pub fn reference_path(node: &SyntaxNode) -> String {
    access_path(node).unwrap_or_default()
}

fn access_path(node: &SyntaxNode) -> Option<String> {
    match node.kind {
        SyntaxKind::Identifier
        | SyntaxKind::ShorthandPropertyIdentifier
        | SyntaxKind::PropertyIdentifier => Some(node.text.clone()),
        SyntaxKind::MemberExpression => {
            let object = access_path(node.child_by_field("object")?)?;
            let property = node.child_by_field("property")?;
            Some(format!("{object}.{}", property.text))
        }
        SyntaxKind::SubscriptExpression => {
            let object = access_path(node.child_by_field("object")?)?;
            let index = node.child_by_field("index")?;
            let element = match index.kind {
                SyntaxKind::String | SyntaxKind::Number => index.text.clone(),
                _ => access_path(index)?,
            };
            Some(format!("{object}[{element}]"))
        }
        SyntaxKind::ParenthesizedExpression
        | SyntaxKind::AsExpression
        | SyntaxKind::SatisfiesExpression
        | SyntaxKind::NonNullExpression => access_path(node.first_named_child()?),
        SyntaxKind::TypeAssertion => access_path(node.named_children().last()?),
        _ => None,
    }
}
