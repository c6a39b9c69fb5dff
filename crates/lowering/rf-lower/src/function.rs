//! Lowering of function shapes

use crate::{LowerResult, LoweringContext, LoweringError, expr, stmt};
use rf_ir::Node;
use rf_syntax::{SyntaxKind, SyntaxNode};

/// Which IR node a lowered function becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionFlavor {
    /// The reflected function itself (`FunctionDecl`)
    Declaration,
    /// A function nested inside a reflected function (`FunctionExpr`)
    Expression,
}

/// Lower a function literal or declaration
///
/// The first `drop_args` parameters are framework-supplied and left out of the
/// IR. An expression-bodied arrow gets a block body with a single `return`.
///
/// # Errors
///
/// Fails with [`LoweringError::DeclarationOnlyFunction`] if `node` is not a
/// function with a body, and with [`LoweringError::UnsupportedConstruct`] for
/// generators, async functions and destructured parameters.
pub fn lower_function(
    ctx: &LoweringContext<'_>,
    node: &SyntaxNode,
    flavor: FunctionFlavor,
    drop_args: usize,
) -> LowerResult {
    match node.kind {
        SyntaxKind::ArrowFunction | SyntaxKind::FunctionExpression | SyntaxKind::FunctionDeclaration => {}
        SyntaxKind::GeneratorFunction | SyntaxKind::GeneratorFunctionDeclaration => {
            return Err(LoweringError::unsupported_as(node, "generator function"));
        }
        _ => return Err(LoweringError::declaration_only(node)),
    }

    let Some(body) = node.child_by_field("body") else {
        return Err(LoweringError::declaration_only(node));
    };
    if node.has_token("async") {
        return Err(LoweringError::unsupported_as(node, "async function"));
    }

    let parameters = lower_parameters(node)?
        .into_iter()
        .skip(drop_args)
        .map(|name| Node::ParameterDecl { name })
        .collect();

    let body = if body.kind == SyntaxKind::StatementBlock {
        stmt::lower_block(ctx, body)?
    } else {
        Node::block(vec![Node::ret(expr::lower_expr(ctx, body)?)])
    };

    let body = Box::new(body);
    Ok(match flavor {
        FunctionFlavor::Declaration => Node::FunctionDecl { parameters, body },
        FunctionFlavor::Expression => Node::FunctionExpr { parameters, body },
    })
}

/// Bound names of a function's parameters, in order
fn lower_parameters(node: &SyntaxNode) -> LowerResult<Vec<String>> {
    // `x => ...` has a lone identifier instead of a parameter list
    if let Some(parameter) = node.child_by_field("parameter") {
        return Ok(vec![parameter.text.clone()]);
    }
    let Some(list) = node.child_by_field("parameters") else {
        return Ok(Vec::new());
    };

    list.named_children()
        .map(|parameter| match parameter.kind {
            SyntaxKind::RequiredParameter | SyntaxKind::OptionalParameter => {
                let pattern = parameter
                    .child_by_field("pattern")
                    .ok_or_else(|| LoweringError::unsupported(parameter))?;
                parameter_name(pattern)
            }
            SyntaxKind::Identifier => Ok(parameter.text.clone()),
            _ => parameter_name(parameter),
        })
        .collect()
}

fn parameter_name(pattern: &SyntaxNode) -> LowerResult<String> {
    match pattern.kind {
        SyntaxKind::Identifier => Ok(pattern.text.clone()),
        SyntaxKind::RestPattern => match pattern.first_named_child() {
            Some(name) if name.kind == SyntaxKind::Identifier => Ok(name.text.clone()),
            _ => Err(LoweringError::unsupported_as(pattern, "destructured rest parameter")),
        },
        SyntaxKind::ObjectPattern | SyntaxKind::ArrayPattern => {
            Err(LoweringError::unsupported_as(pattern, "destructured parameter"))
        }
        _ => Err(LoweringError::unsupported(pattern)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{first_function, no_types, parse};

    fn lower(source: &str, drop_args: usize) -> LowerResult {
        let root = parse(source);
        lower_function(&no_types(), first_function(&root), FunctionFlavor::Declaration, drop_args)
    }

    fn parameter_names(node: &Node) -> Vec<&str> {
        match node {
            Node::FunctionDecl { parameters, .. } | Node::FunctionExpr { parameters, .. } => parameters
                .iter()
                .map(|parameter| match parameter {
                    Node::ParameterDecl { name } => name.as_str(),
                    other => panic!("unexpected parameter {other:?}"),
                })
                .collect(),
            other => panic!("not a function: {other:?}"),
        }
    }

    #[test]
    fn test_expression_body_is_wrapped() {
        let node = lower("const f = (x: number) => x + 1;", 0).unwrap();
        assert_eq!(
            node,
            Node::FunctionDecl {
                parameters: vec![Node::ParameterDecl { name: "x".into() }],
                body: Box::new(Node::block(vec![Node::ret(Node::binary(
                    Node::identifier("x"),
                    "+",
                    Node::number("1"),
                ))])),
            }
        );
    }

    #[test]
    fn test_parameter_shapes() {
        let node = lower("function f(a: string, b?: number, c = 1, ...rest: any[]) { }", 0).unwrap();
        assert_eq!(parameter_names(&node), vec!["a", "b", "c", "rest"]);

        let node = lower("const f = x => x;", 0).unwrap();
        assert_eq!(parameter_names(&node), vec!["x"]);
    }

    #[test]
    fn test_drop_args_removes_leading_parameters() {
        let node = lower("const f = (context, input) => input;", 1).unwrap();
        assert_eq!(parameter_names(&node), vec!["input"]);

        let node = lower("const f = (context) => 1;", 3).unwrap();
        assert!(parameter_names(&node).is_empty());
    }

    #[test]
    fn test_nested_flavor() {
        let root = parse("const f = function () { return; };");
        let node =
            lower_function(&no_types(), first_function(&root), FunctionFlavor::Expression, 0).unwrap();
        assert_eq!(
            node,
            Node::FunctionExpr {
                parameters: vec![],
                body: Box::new(Node::block(vec![Node::ret(Node::UndefinedLiteralExpr)])),
            }
        );
    }

    #[test]
    fn test_signature_without_body() {
        let error = lower("function f(a: string): void;", 0).unwrap_err();
        assert_eq!(error.name(), "DeclarationOnlyFunctionError");
    }

    #[test]
    fn test_non_function_slot() {
        let root = parse("handler;");
        let node = root.find(&|node| node.kind == SyntaxKind::Identifier).unwrap();
        let error = lower_function(&no_types(), node, FunctionFlavor::Declaration, 0).unwrap_err();
        assert!(matches!(error, LoweringError::DeclarationOnlyFunction { .. }));
    }

    #[test]
    fn test_rejected_shapes() {
        for source in [
            "const f = async (x) => x;",
            "function* f() { yield 1; }",
            "const f = ({ a }) => a;",
            "const f = ([a, b]) => a;",
        ] {
            let error = lower(source, 0).unwrap_err();
            assert_eq!(error.name(), "UnsupportedConstructError", "{source}");
        }
    }
}
