//! Expression lowering

use crate::function::{FunctionFlavor, lower_function};
use crate::reference::resolve_reference;
use crate::{LowerResult, LoweringContext, LoweringError, binder, operator};
use rf_ir::{Node, TemplatePart};
use rf_syntax::{SyntaxKind, SyntaxNode, literal};

/// Lower an expression
///
/// # Errors
///
/// Fails for any expression outside the reflectable subset.
pub fn lower_expr(ctx: &LoweringContext<'_>, node: &SyntaxNode) -> LowerResult {
    match node.kind {
        SyntaxKind::Identifier | SyntaxKind::ShorthandPropertyIdentifier => {
            if node.text == "undefined" {
                return Ok(Node::UndefinedLiteralExpr);
            }
            Ok(resolve_reference(ctx, node).unwrap_or_else(|| Node::identifier(node.text.clone())))
        }
        SyntaxKind::Undefined => Ok(Node::UndefinedLiteralExpr),
        SyntaxKind::Null => Ok(Node::NullLiteralExpr),
        SyntaxKind::True => Ok(Node::BooleanLiteralExpr { value: true }),
        SyntaxKind::False => Ok(Node::BooleanLiteralExpr { value: false }),
        SyntaxKind::Number => Ok(Node::number(node.text.clone())),
        SyntaxKind::String => Ok(Node::string(node.text.clone())),
        SyntaxKind::TemplateString => lower_template(ctx, node),

        SyntaxKind::ParenthesizedExpression
        | SyntaxKind::AsExpression
        | SyntaxKind::SatisfiesExpression
        | SyntaxKind::NonNullExpression => lower_expr(ctx, operand(node)?),
        SyntaxKind::TypeAssertion => {
            let inner = node
                .named_children()
                .last()
                .ok_or_else(|| LoweringError::unsupported(node))?;
            lower_expr(ctx, inner)
        }

        SyntaxKind::MemberExpression => {
            reject_optional_chain(node)?;
            if let Some(reference) = resolve_reference(ctx, node) {
                return Ok(reference);
            }
            Ok(Node::PropAccessExpr {
                expr: Box::new(lower_expr(ctx, field(node, "object")?)?),
                name: field(node, "property")?.text.clone(),
                ty: type_snapshot(ctx, node),
            })
        }
        SyntaxKind::SubscriptExpression => {
            reject_optional_chain(node)?;
            if let Some(reference) = resolve_reference(ctx, node) {
                return Ok(reference);
            }
            Ok(Node::ElementAccessExpr {
                expr: Box::new(lower_expr(ctx, field(node, "object")?)?),
                element: Box::new(lower_expr(ctx, field(node, "index")?)?),
                ty: type_snapshot(ctx, node),
            })
        }

        SyntaxKind::CallExpression => {
            reject_optional_chain(node)?;
            match node.child_by_field("arguments") {
                Some(arguments) if arguments.kind == SyntaxKind::Arguments => {}
                _ => return Err(LoweringError::unsupported_as(node, "tagged template")),
            }
            Ok(Node::CallExpr {
                expr: Box::new(lower_expr(ctx, field(node, "function")?)?),
                args: binder::bind_arguments(ctx, node)?,
            })
        }
        SyntaxKind::NewExpression => {
            let args = if node.child_by_field("arguments").is_some() {
                binder::bind_arguments(ctx, node)?
            } else {
                Vec::new()
            };
            Ok(Node::NewExpr {
                expr: Box::new(lower_expr(ctx, field(node, "constructor")?)?),
                args,
            })
        }

        SyntaxKind::BinaryExpression => {
            let token = field(node, "operator")?.text.as_str();
            let op = operator::binary(token).ok_or_else(|| LoweringError::operator(node, token))?;
            Ok(Node::binary(
                lower_expr(ctx, field(node, "left")?)?,
                op,
                lower_expr(ctx, field(node, "right")?)?,
            ))
        }
        SyntaxKind::AssignmentExpression => Ok(Node::binary(
            lower_expr(ctx, field(node, "left")?)?,
            "=",
            lower_expr(ctx, field(node, "right")?)?,
        )),
        SyntaxKind::AugmentedAssignmentExpression | SyntaxKind::UpdateExpression => {
            let token = field(node, "operator")?.text.clone();
            Err(LoweringError::operator(node, token))
        }
        SyntaxKind::UnaryExpression => {
            let token = field(node, "operator")?.text.as_str();
            let argument = field(node, "argument")?;
            if token == "typeof" {
                return Ok(Node::TypeOfExpr {
                    expr: Box::new(lower_expr(ctx, argument)?),
                });
            }
            let op = operator::unary(token).ok_or_else(|| LoweringError::operator(node, token))?;
            Ok(Node::UnaryExpr {
                op: op.to_string(),
                expr: Box::new(lower_expr(ctx, argument)?),
            })
        }
        SyntaxKind::TernaryExpression => Ok(Node::ConditionExpr {
            when: Box::new(lower_expr(ctx, field(node, "condition")?)?),
            then: Box::new(lower_expr(ctx, field(node, "consequence")?)?),
            otherwise: Box::new(lower_expr(ctx, field(node, "alternative")?)?),
        }),

        SyntaxKind::Array => {
            let items = node
                .named_children()
                .map(|item| lower_element(ctx, item))
                .collect::<LowerResult<_>>()?;
            Ok(Node::ArrayLiteralExpr { items })
        }
        SyntaxKind::Object => {
            let properties = node
                .named_children()
                .map(|property| lower_property(ctx, property))
                .collect::<LowerResult<_>>()?;
            Ok(Node::ObjectLiteralExpr { properties })
        }

        SyntaxKind::ArrowFunction | SyntaxKind::FunctionExpression | SyntaxKind::GeneratorFunction => {
            lower_function(ctx, node, FunctionFlavor::Expression, 0)
        }

        _ => Err(LoweringError::unsupported(node)),
    }
}

/// An array element or call argument, which may be spread
pub fn lower_element(ctx: &LoweringContext<'_>, node: &SyntaxNode) -> LowerResult {
    if node.kind == SyntaxKind::SpreadElement {
        return Ok(Node::SpreadElementExpr {
            expr: Box::new(lower_expr(ctx, operand(node)?)?),
        });
    }
    lower_expr(ctx, node)
}

fn lower_property(ctx: &LoweringContext<'_>, node: &SyntaxNode) -> LowerResult {
    match node.kind {
        SyntaxKind::Pair => Ok(Node::PropAssignExpr {
            name: Box::new(lower_property_name(ctx, field(node, "key")?)?),
            expr: Box::new(lower_expr(ctx, field(node, "value")?)?),
        }),
        SyntaxKind::ShorthandPropertyIdentifier => Ok(Node::PropAssignExpr {
            name: Box::new(Node::identifier(node.text.clone())),
            expr: Box::new(lower_expr(ctx, node)?),
        }),
        SyntaxKind::SpreadElement => Ok(Node::SpreadAssignExpr {
            expr: Box::new(lower_expr(ctx, operand(node)?)?),
        }),
        SyntaxKind::MethodDefinition => Err(LoweringError::unsupported_as(node, "method shorthand")),
        _ => Err(LoweringError::unsupported(node)),
    }
}

fn lower_property_name(ctx: &LoweringContext<'_>, key: &SyntaxNode) -> LowerResult {
    match key.kind {
        SyntaxKind::PropertyIdentifier => Ok(Node::identifier(key.text.clone())),
        SyntaxKind::String => Ok(Node::string(key.text.clone())),
        SyntaxKind::Number => Ok(Node::number(key.text.clone())),
        SyntaxKind::ComputedPropertyName => Ok(Node::ComputedPropertyNameExpr {
            expr: Box::new(lower_expr(ctx, operand(key)?)?),
        }),
        _ => Err(LoweringError::unsupported(key)),
    }
}

/// Flatten a template literal into cooked text and lowered substitutions
///
/// Literal text is taken from the spans between substitutions so that escape
/// sequences and fragments are decoded together.
fn lower_template(ctx: &LoweringContext<'_>, node: &SyntaxNode) -> LowerResult {
    let start = node.span.start as usize;
    let slice = |from: usize, to: usize| node.text.get(from - start..to - start).unwrap_or_default();

    let mut parts = Vec::new();
    // Skip the opening backtick
    let mut cursor = start + 1;
    for child in &node.children {
        if child.kind != SyntaxKind::TemplateSubstitution {
            continue;
        }
        push_literal(&mut parts, slice(cursor, child.span.start as usize));
        parts.push(TemplatePart::Expr(lower_expr(ctx, operand(child)?)?));
        cursor = child.span.end as usize;
    }
    let end = (node.span.end as usize).saturating_sub(1).max(cursor);
    push_literal(&mut parts, slice(cursor, end));

    Ok(Node::TemplateExpr { parts })
}

fn push_literal(parts: &mut Vec<TemplatePart>, raw: &str) {
    if !raw.is_empty() {
        parts.push(TemplatePart::Literal(literal::cook(raw)));
    }
}

fn reject_optional_chain(node: &SyntaxNode) -> LowerResult<()> {
    let optional = node.child_by_field("optional_chain").is_some()
        || node.has_token("?.")
        || node
            .children
            .iter()
            .any(|child| child.kind == SyntaxKind::OptionalChain);
    if optional {
        Err(LoweringError::unsupported_as(node, "optional chain"))
    } else {
        Ok(())
    }
}

/// Resolved type of an access expression, as text
fn type_snapshot(ctx: &LoweringContext<'_>, node: &SyntaxNode) -> Option<String> {
    let oracle = ctx.oracle();
    oracle.type_of(node).map(|ty| oracle.type_to_string(&ty))
}

/// The single operand of a wrapper, spread or substitution
fn operand(node: &SyntaxNode) -> LowerResult<&SyntaxNode> {
    node.first_named_child()
        .ok_or_else(|| LoweringError::unsupported(node))
}

fn field<'tree>(node: &'tree SyntaxNode, name: &str) -> LowerResult<&'tree SyntaxNode> {
    node.child_by_field(name)
        .ok_or_else(|| LoweringError::unsupported(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{first_of, no_types, parse, with_types};
    use rf_ty::DeclaredTypes;
    use rf_ty::declared::TypeDef;

    fn lower_with(ctx: &LoweringContext<'_>, source: &str) -> LowerResult {
        let root = parse(source);
        let statement = first_of(&root, &SyntaxKind::ExpressionStatement);
        lower_expr(ctx, statement.first_named_child().unwrap())
    }

    fn lower(source: &str) -> LowerResult {
        lower_with(&no_types(), source)
    }

    fn table_types() -> DeclaredTypes {
        DeclaredTypes::new()
            .bind("props", "Props")
            .bind("item", "Item")
            .define("Props", TypeDef::new().property("table", "Table"))
            .define("Item", TypeDef::new().property("name", "string"))
            .define(
                "Table",
                TypeDef::new()
                    .literal_property("kind", "Table")
                    .property("name", "string"),
            )
    }

    #[test]
    fn test_literals_keep_raw_text() {
        assert_eq!(lower("0x1F;").unwrap(), Node::number("0x1F"));
        assert_eq!(lower("'a\\n';").unwrap(), Node::string("'a\\n'"));
        assert_eq!(lower("true;").unwrap(), Node::BooleanLiteralExpr { value: true });
        assert_eq!(lower("null;").unwrap(), Node::NullLiteralExpr);
        assert_eq!(lower("undefined;").unwrap(), Node::UndefinedLiteralExpr);
    }

    #[test]
    fn test_wrappers_are_transparent() {
        assert_eq!(lower("((x as any)!);").unwrap(), Node::identifier("x"));
        assert_eq!(lower("(x satisfies number);").unwrap(), Node::identifier("x"));
        assert_eq!(lower("(<string>x);").unwrap(), Node::identifier("x"));
    }

    #[test]
    fn test_equality_and_assignment() {
        assert_eq!(
            lower("a === b;").unwrap(),
            Node::binary(Node::identifier("a"), "==", Node::identifier("b"))
        );
        assert_eq!(
            lower("a = 1;").unwrap(),
            Node::binary(Node::identifier("a"), "=", Node::number("1"))
        );
    }

    #[test]
    fn test_unary_and_typeof() {
        assert_eq!(
            lower("!ok;").unwrap(),
            Node::UnaryExpr {
                op: "!".into(),
                expr: Box::new(Node::identifier("ok")),
            }
        );
        assert_eq!(
            lower("typeof x;").unwrap(),
            Node::TypeOfExpr {
                expr: Box::new(Node::identifier("x")),
            }
        );
    }

    #[test]
    fn test_unsupported_operators() {
        for source in ["x %= 2;", "x++;", "--x;", "a & b;", "a instanceof B;", "delete a.b;", "void 0;", "~a;"] {
            assert_eq!(lower(source).unwrap_err().name(), "UnsupportedOperatorError", "{source}");
        }
    }

    #[test]
    fn test_template_parts() {
        assert_eq!(
            lower("`hello ${name}\\n${count}`;").unwrap(),
            Node::TemplateExpr {
                parts: vec![
                    TemplatePart::Literal("hello ".into()),
                    TemplatePart::Expr(Node::identifier("name")),
                    TemplatePart::Literal("\n".into()),
                    TemplatePart::Expr(Node::identifier("count")),
                ],
            }
        );
        assert_eq!(lower("``;").unwrap(), Node::TemplateExpr { parts: vec![] });
    }

    #[test]
    fn test_template_text_is_cooked() {
        assert_eq!(
            lower("`\\uD83D\\uDE00 ${x}`;").unwrap(),
            Node::TemplateExpr {
                parts: vec![
                    TemplatePart::Literal("\u{1F600} ".into()),
                    TemplatePart::Expr(Node::identifier("x")),
                ],
            }
        );
        assert_eq!(
            lower("`a\r\nb\rc`;").unwrap(),
            Node::TemplateExpr {
                parts: vec![TemplatePart::Literal("a\nb\nc".into())],
            }
        );
    }

    #[test]
    fn test_object_literal_properties() {
        let node = lower("({ a: 1, 'b': 2, [k]: 3, c, ...rest });").unwrap();
        let Node::ObjectLiteralExpr { properties } = node else {
            panic!("not an object: {node:?}");
        };
        assert_eq!(
            properties,
            vec![
                Node::PropAssignExpr {
                    name: Box::new(Node::identifier("a")),
                    expr: Box::new(Node::number("1")),
                },
                Node::PropAssignExpr {
                    name: Box::new(Node::string("'b'")),
                    expr: Box::new(Node::number("2")),
                },
                Node::PropAssignExpr {
                    name: Box::new(Node::ComputedPropertyNameExpr {
                        expr: Box::new(Node::identifier("k")),
                    }),
                    expr: Box::new(Node::number("3")),
                },
                Node::PropAssignExpr {
                    name: Box::new(Node::identifier("c")),
                    expr: Box::new(Node::identifier("c")),
                },
                Node::SpreadAssignExpr {
                    expr: Box::new(Node::identifier("rest")),
                },
            ]
        );
    }

    #[test]
    fn test_array_with_spread() {
        assert_eq!(
            lower("[1, ...xs];").unwrap(),
            Node::ArrayLiteralExpr {
                items: vec![
                    Node::number("1"),
                    Node::SpreadElementExpr {
                        expr: Box::new(Node::identifier("xs")),
                    },
                ],
            }
        );
    }

    #[test]
    fn test_property_access_carries_type() {
        let types = table_types();
        let ctx = with_types(&types);
        assert_eq!(
            lower_with(&ctx, "item.name;").unwrap(),
            Node::PropAccessExpr {
                expr: Box::new(Node::identifier("item")),
                name: "name".into(),
                ty: Some("string".into()),
            }
        );
        assert_eq!(
            lower("item[0];").unwrap(),
            Node::ElementAccessExpr {
                expr: Box::new(Node::identifier("item")),
                element: Box::new(Node::number("0")),
                ty: None,
            }
        );
    }

    #[test]
    fn test_reference_path_is_preserved() {
        let types = table_types();
        let ctx = with_types(&types);
        assert_eq!(
            lower_with(&ctx, "props.table;").unwrap(),
            Node::ReferenceExpr {
                path: "props.table".into(),
                reference: "props.table".into(),
            }
        );
        // Only the resource itself is a reference; its fields are plain accesses
        let Node::PropAccessExpr { expr, ty, .. } = lower_with(&ctx, "props.table.name;").unwrap() else {
            panic!("expected a property access");
        };
        assert!(matches!(*expr, Node::ReferenceExpr { .. }));
        assert_eq!(ty.as_deref(), Some("string"));
    }

    #[test]
    fn test_shorthand_property_value_resolves_references() {
        let types = DeclaredTypes::new()
            .bind("table", "Table")
            .define("Table", TypeDef::new().literal_property("kind", "Table"));
        let ctx = with_types(&types);
        let node = lower_with(&ctx, "({ table });").unwrap();
        assert_eq!(
            node,
            Node::ObjectLiteralExpr {
                properties: vec![Node::PropAssignExpr {
                    name: Box::new(Node::identifier("table")),
                    expr: Box::new(Node::ReferenceExpr {
                        path: "table".into(),
                        reference: "table".into(),
                    }),
                }],
            }
        );
    }

    #[test]
    fn test_new_without_arguments() {
        assert_eq!(
            lower("new Date;").unwrap(),
            Node::NewExpr {
                expr: Box::new(Node::identifier("Date")),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_nested_functions_are_expressions() {
        let node = lower("xs.map(x => x);").unwrap();
        let Node::CallExpr { args, .. } = node else {
            panic!("not a call");
        };
        assert!(matches!(
            &args[0],
            Node::Argument { expr: Some(expr), name: None } if matches!(**expr, Node::FunctionExpr { .. })
        ));
    }

    #[test]
    fn test_unsupported_expressions() {
        for source in [
            "a?.b;",
            "a?.[0];",
            "f?.();",
            "this.x;",
            "/ab+c/;",
            "(a, b);",
            "tag`x`;",
            "({ m() { return 1; } });",
            "(class {});",
        ] {
            assert_eq!(lower(source).unwrap_err().name(), "UnsupportedConstructError", "{source}");
        }
    }

    #[test]
    fn test_await_is_unsupported() {
        let root = parse("async function f() { await g(); }");
        let node = first_of(&root, &SyntaxKind::AwaitExpression);
        assert_eq!(lower_expr(&no_types(), node).unwrap_err().name(), "UnsupportedConstructError");
    }
}
