//! Statement lowering

use crate::function::{FunctionFlavor, lower_function};
use crate::{LowerResult, LoweringContext, LoweringError, expr::lower_expr};
use rf_ir::Node;
use rf_syntax::{SyntaxKind, SyntaxNode};

/// Lower a `{ ... }` block to a `BlockStmt`
pub fn lower_block(ctx: &LoweringContext<'_>, block: &SyntaxNode) -> LowerResult {
    let mut statements = Vec::new();
    for statement in block.named_children() {
        statements.extend(lower_statement(ctx, statement)?);
    }
    Ok(Node::BlockStmt { statements })
}

/// Lower one statement
///
/// Declarations with several declarators produce one node each, and empty
/// statements produce none.
pub fn lower_statement(ctx: &LoweringContext<'_>, node: &SyntaxNode) -> LowerResult<Vec<Node>> {
    let lowered = match node.kind {
        SyntaxKind::ExpressionStatement => Node::ExprStmt {
            expr: Box::new(lower_expr(ctx, required_child(node)?)?),
        },
        SyntaxKind::StatementBlock => lower_block(ctx, node)?,
        SyntaxKind::LexicalDeclaration | SyntaxKind::VariableDeclaration => {
            return node
                .named_children()
                .filter(|child| child.kind == SyntaxKind::VariableDeclarator)
                .map(|declarator| lower_declarator(ctx, declarator))
                .collect();
        }
        SyntaxKind::EmptyStatement => return Ok(Vec::new()),
        SyntaxKind::ReturnStatement => {
            let expr = match node.first_named_child() {
                Some(value) => lower_expr(ctx, value)?,
                None => Node::UndefinedLiteralExpr,
            };
            Node::ret(expr)
        }
        SyntaxKind::IfStatement => lower_if(ctx, node)?,
        SyntaxKind::WhileStatement => Node::WhileStmt {
            condition: Box::new(lower_expr(ctx, field(node, "condition")?)?),
            block: Box::new(lower_loop_body(ctx, field(node, "body")?)?),
        },
        SyntaxKind::DoStatement => Node::DoStmt {
            block: Box::new(lower_loop_body(ctx, field(node, "body")?)?),
            condition: Box::new(lower_expr(ctx, field(node, "condition")?)?),
        },
        SyntaxKind::ForInStatement => lower_for_in(ctx, node)?,
        SyntaxKind::BreakStatement | SyntaxKind::ContinueStatement => {
            if node.first_named_child().is_some() {
                return Err(LoweringError::unsupported_as(node, "labeled jump"));
            }
            if node.kind == SyntaxKind::BreakStatement {
                Node::BreakStmt
            } else {
                Node::ContinueStmt
            }
        }
        SyntaxKind::TryStatement => lower_try(ctx, node)?,
        SyntaxKind::ThrowStatement => Node::ThrowStmt {
            expr: Box::new(lower_expr(ctx, required_child(node)?)?),
        },
        SyntaxKind::FunctionDeclaration => {
            let name = field(node, "name")?.text.clone();
            let function = lower_function(ctx, node, FunctionFlavor::Expression, 0)?;
            Node::VariableStmt {
                name,
                initializer: Some(Box::new(function)),
            }
        }
        SyntaxKind::FunctionSignature => return Err(LoweringError::declaration_only(node)),
        _ => return Err(LoweringError::unsupported(node)),
    };
    Ok(vec![lowered])
}

/// A statement in a position that holds exactly one node
fn lower_single(ctx: &LoweringContext<'_>, node: &SyntaxNode) -> LowerResult {
    let mut lowered = lower_statement(ctx, node)?;
    if lowered.len() == 1 {
        Ok(lowered.remove(0))
    } else {
        Ok(Node::block(lowered))
    }
}

/// Loop bodies are always blocks
fn lower_loop_body(ctx: &LoweringContext<'_>, body: &SyntaxNode) -> LowerResult {
    if body.kind == SyntaxKind::StatementBlock {
        lower_block(ctx, body)
    } else {
        Ok(Node::block(lower_statement(ctx, body)?))
    }
}

fn lower_declarator(ctx: &LoweringContext<'_>, declarator: &SyntaxNode) -> LowerResult {
    let name = field(declarator, "name")?;
    if name.kind != SyntaxKind::Identifier {
        return Err(LoweringError::unsupported_as(name, "destructuring declaration"));
    }
    let initializer = declarator
        .child_by_field("value")
        .map(|value| lower_expr(ctx, value).map(Box::new))
        .transpose()?;
    Ok(Node::VariableStmt {
        name: name.text.clone(),
        initializer,
    })
}

fn lower_if(ctx: &LoweringContext<'_>, node: &SyntaxNode) -> LowerResult {
    let when = lower_expr(ctx, field(node, "condition")?)?;
    let then = lower_single(ctx, field(node, "consequence")?)?;
    let otherwise = match node.child_by_field("alternative") {
        Some(clause) => Some(Box::new(lower_single(ctx, required_child(clause)?)?)),
        None => None,
    };
    Ok(Node::IfStmt {
        when: Box::new(when),
        then: Box::new(then),
        otherwise,
    })
}

/// `for (x of xs)` and `for (x in obj)`
fn lower_for_in(ctx: &LoweringContext<'_>, node: &SyntaxNode) -> LowerResult {
    if node.has_token("await") {
        return Err(LoweringError::unsupported_as(node, "for await loop"));
    }

    let left = field(node, "left")?;
    if left.kind != SyntaxKind::Identifier {
        return Err(LoweringError::unsupported_as(left, "loop destructuring"));
    }
    let declared = ["const", "let", "var"]
        .iter()
        .any(|keyword| node.has_token(keyword));
    let variable = if declared {
        Node::VariableStmt {
            name: left.text.clone(),
            initializer: None,
        }
    } else {
        Node::identifier(left.text.clone())
    };

    let variable = Box::new(variable);
    let expr = Box::new(lower_expr(ctx, field(node, "right")?)?);
    let body = Box::new(lower_loop_body(ctx, field(node, "body")?)?);

    if node.has_token("of") {
        Ok(Node::ForOfStmt {
            variable,
            expr,
            body,
        })
    } else {
        Ok(Node::ForInStmt {
            variable,
            expr,
            body,
        })
    }
}

fn lower_try(ctx: &LoweringContext<'_>, node: &SyntaxNode) -> LowerResult {
    let try_block = lower_block(ctx, field(node, "body")?)?;

    let catch_clause = match node.child_by_field("handler") {
        Some(handler) => {
            let variable = match handler.child_by_field("parameter") {
                Some(parameter) if parameter.kind == SyntaxKind::Identifier => {
                    Some(Box::new(Node::VariableStmt {
                        name: parameter.text.clone(),
                        initializer: None,
                    }))
                }
                Some(parameter) => {
                    return Err(LoweringError::unsupported_as(parameter, "catch destructuring"));
                }
                None => None,
            };
            Some(Box::new(Node::CatchClause {
                variable,
                block: Box::new(lower_block(ctx, field(handler, "body")?)?),
            }))
        }
        None => None,
    };

    let finally_block = match node.child_by_field("finalizer") {
        Some(finalizer) => Some(Box::new(lower_block(ctx, field(finalizer, "body")?)?)),
        None => None,
    };

    Ok(Node::TryStmt {
        try_block: Box::new(try_block),
        catch_clause,
        finally_block,
    })
}

/// Child in grammar field `name`; a missing field means a shape we do not know
fn field<'tree>(node: &'tree SyntaxNode, name: &str) -> LowerResult<&'tree SyntaxNode> {
    node.child_by_field(name)
        .ok_or_else(|| LoweringError::unsupported(node))
}

fn required_child(node: &SyntaxNode) -> LowerResult<&SyntaxNode> {
    node.first_named_child()
        .ok_or_else(|| LoweringError::unsupported(node))
}
