//! Reflected-function Intermediate Representation
//!
//! The IR is a closed set of tree-node kinds produced by lowering a reflected
//! function. Each kind carries a fixed, ordered set of children; interpreters
//! downstream turn the tree into templates, state machines or event patterns.
//! Trees are built once by the lowering engine and never mutated afterwards.

pub mod visitor;

use serde::{Deserialize, Serialize};
use std::fmt;

/// An IR node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum Node {
    /// Top-level reflected function
    FunctionDecl {
        /// `ParameterDecl` nodes, in order
        parameters: Vec<Node>,
        /// `BlockStmt` body
        body: Box<Node>,
    },
    /// Function nested inside a reflected function
    FunctionExpr {
        /// `ParameterDecl` nodes, in order
        parameters: Vec<Node>,
        /// `BlockStmt` body
        body: Box<Node>,
    },
    /// A parameter's bound name
    ParameterDecl {
        /// Parameter name
        name: String,
    },
    /// `{ ... }`
    BlockStmt {
        /// Statements in order
        statements: Vec<Node>,
    },
    /// Expression evaluated for its effect
    ExprStmt {
        /// The expression
        expr: Box<Node>,
    },
    /// `return expr`
    ReturnStmt {
        /// Returned value (`UndefinedLiteralExpr` for a bare `return`)
        expr: Box<Node>,
    },
    /// `let name = initializer`
    VariableStmt {
        /// Bound name
        name: String,
        /// Initial value
        initializer: Option<Box<Node>>,
    },
    /// `if (when) then else otherwise`
    IfStmt {
        /// Condition
        when: Box<Node>,
        /// Then branch
        then: Box<Node>,
        /// Else branch
        otherwise: Option<Box<Node>>,
    },
    /// `for (variable of expr) body`
    ForOfStmt {
        /// `VariableStmt` or `Identifier` bound on each iteration
        variable: Box<Node>,
        /// Iterated value
        expr: Box<Node>,
        /// `BlockStmt` body
        body: Box<Node>,
    },
    /// `for (variable in expr) body`
    ForInStmt {
        /// `VariableStmt` or `Identifier` bound on each iteration
        variable: Box<Node>,
        /// Iterated object
        expr: Box<Node>,
        /// `BlockStmt` body
        body: Box<Node>,
    },
    /// `while (condition) block`
    WhileStmt {
        /// Loop condition
        condition: Box<Node>,
        /// `BlockStmt` body
        block: Box<Node>,
    },
    /// `do block while (condition)`
    DoStmt {
        /// `BlockStmt` body
        block: Box<Node>,
        /// Loop condition
        condition: Box<Node>,
    },
    /// `break`
    BreakStmt,
    /// `continue`
    ContinueStmt,
    /// `try { } catch { } finally { }`
    TryStmt {
        /// Guarded block
        try_block: Box<Node>,
        /// `CatchClause`
        catch_clause: Option<Box<Node>>,
        /// Finalizer block
        finally_block: Option<Box<Node>>,
    },
    /// `catch (variable) block`
    CatchClause {
        /// `VariableStmt` binding the caught value
        variable: Option<Box<Node>>,
        /// Handler block
        block: Box<Node>,
    },
    /// `throw expr`
    ThrowStmt {
        /// Thrown value
        expr: Box<Node>,
    },
    /// `when ? then : otherwise`
    ConditionExpr {
        /// Condition
        when: Box<Node>,
        /// Value when true
        then: Box<Node>,
        /// Value when false
        otherwise: Box<Node>,
    },
    /// `left op right`
    BinaryExpr {
        /// Left operand
        left: Box<Node>,
        /// Canonical operator symbol
        op: String,
        /// Right operand
        right: Box<Node>,
    },
    /// `op expr`
    UnaryExpr {
        /// Canonical operator symbol
        op: String,
        /// Operand
        expr: Box<Node>,
    },
    /// `expr(args)`
    CallExpr {
        /// Callee
        expr: Box<Node>,
        /// `Argument` nodes
        args: Vec<Node>,
    },
    /// `new expr(args)`
    NewExpr {
        /// Constructor
        expr: Box<Node>,
        /// `Argument` nodes
        args: Vec<Node>,
    },
    /// A value bound to a parameter slot
    Argument {
        /// Bound value, absent when the parameter was not supplied
        expr: Option<Box<Node>>,
        /// Name of the parameter the value binds to
        name: Option<String>,
    },
    /// `expr.name`
    PropAccessExpr {
        /// Object
        expr: Box<Node>,
        /// Property name
        name: String,
        /// Resolved type of the access, as text
        #[serde(rename = "type")]
        ty: Option<String>,
    },
    /// `expr[element]`
    ElementAccessExpr {
        /// Object
        expr: Box<Node>,
        /// Index expression
        element: Box<Node>,
        /// Resolved type of the access, as text
        #[serde(rename = "type")]
        ty: Option<String>,
    },
    /// `[items]`
    ArrayLiteralExpr {
        /// Elements, possibly `SpreadElementExpr`
        items: Vec<Node>,
    },
    /// `{ properties }`
    ObjectLiteralExpr {
        /// `PropAssignExpr` / `SpreadAssignExpr` nodes
        properties: Vec<Node>,
    },
    /// `name: expr`
    PropAssignExpr {
        /// `Identifier`, string/number literal or `ComputedPropertyNameExpr`
        name: Box<Node>,
        /// Value
        expr: Box<Node>,
    },
    /// `...expr` inside an object literal
    SpreadAssignExpr {
        /// Spread value
        expr: Box<Node>,
    },
    /// `...expr` inside an array literal
    SpreadElementExpr {
        /// Spread value
        expr: Box<Node>,
    },
    /// `[expr]` as a property name
    ComputedPropertyNameExpr {
        /// Key expression
        expr: Box<Node>,
    },
    /// Template literal
    TemplateExpr {
        /// Literal text and interpolated expressions, in source order
        parts: Vec<TemplatePart>,
    },
    /// A plain name
    Identifier {
        /// The name
        name: String,
    },
    /// A handle to an externally managed resource
    ReferenceExpr {
        /// Reconstructed access path (`table`, `props.table`), empty if unknown
        path: String,
        /// Original expression text, re-evaluated by the host runtime
        reference: String,
    },
    /// `typeof expr`
    TypeOfExpr {
        /// Operand
        expr: Box<Node>,
    },
    /// String literal, raw source text including quotes
    StringLiteralExpr {
        /// Raw literal text
        raw: String,
    },
    /// Numeric literal, raw source text
    NumberLiteralExpr {
        /// Raw literal text
        raw: String,
    },
    /// `true` / `false`
    BooleanLiteralExpr {
        /// The value
        value: bool,
    },
    /// `null`
    NullLiteralExpr,
    /// `undefined`
    UndefinedLiteralExpr,
    /// A function that failed to lower
    Err {
        /// The failure, reconstructed by the host at evaluation time
        error: ErrorValue,
    },
}

/// One part of a template literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplatePart {
    /// Cooked literal text
    Literal(String),
    /// Interpolated expression
    Expr(Node),
}

/// Name and message of a lowering failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorValue {
    /// Error class name, e.g. `UnsupportedConstructError`
    pub name: String,
    /// Human readable message
    pub message: String,
}

impl ErrorValue {
    /// Create an error value from a class name and message
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// The closed set of IR node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// [`Node::FunctionDecl`]
    FunctionDecl,
    /// [`Node::FunctionExpr`]
    FunctionExpr,
    /// [`Node::ParameterDecl`]
    ParameterDecl,
    /// [`Node::BlockStmt`]
    BlockStmt,
    /// [`Node::ExprStmt`]
    ExprStmt,
    /// [`Node::ReturnStmt`]
    ReturnStmt,
    /// [`Node::VariableStmt`]
    VariableStmt,
    /// [`Node::IfStmt`]
    IfStmt,
    /// [`Node::ForOfStmt`]
    ForOfStmt,
    /// [`Node::ForInStmt`]
    ForInStmt,
    /// [`Node::WhileStmt`]
    WhileStmt,
    /// [`Node::DoStmt`]
    DoStmt,
    /// [`Node::BreakStmt`]
    BreakStmt,
    /// [`Node::ContinueStmt`]
    ContinueStmt,
    /// [`Node::TryStmt`]
    TryStmt,
    /// [`Node::CatchClause`]
    CatchClause,
    /// [`Node::ThrowStmt`]
    ThrowStmt,
    /// [`Node::ConditionExpr`]
    ConditionExpr,
    /// [`Node::BinaryExpr`]
    BinaryExpr,
    /// [`Node::UnaryExpr`]
    UnaryExpr,
    /// [`Node::CallExpr`]
    CallExpr,
    /// [`Node::NewExpr`]
    NewExpr,
    /// [`Node::Argument`]
    Argument,
    /// [`Node::PropAccessExpr`]
    PropAccessExpr,
    /// [`Node::ElementAccessExpr`]
    ElementAccessExpr,
    /// [`Node::ArrayLiteralExpr`]
    ArrayLiteralExpr,
    /// [`Node::ObjectLiteralExpr`]
    ObjectLiteralExpr,
    /// [`Node::PropAssignExpr`]
    PropAssignExpr,
    /// [`Node::SpreadAssignExpr`]
    SpreadAssignExpr,
    /// [`Node::SpreadElementExpr`]
    SpreadElementExpr,
    /// [`Node::ComputedPropertyNameExpr`]
    ComputedPropertyNameExpr,
    /// [`Node::TemplateExpr`]
    TemplateExpr,
    /// [`Node::Identifier`]
    Identifier,
    /// [`Node::ReferenceExpr`]
    ReferenceExpr,
    /// [`Node::TypeOfExpr`]
    TypeOfExpr,
    /// [`Node::StringLiteralExpr`]
    StringLiteralExpr,
    /// [`Node::NumberLiteralExpr`]
    NumberLiteralExpr,
    /// [`Node::BooleanLiteralExpr`]
    BooleanLiteralExpr,
    /// [`Node::NullLiteralExpr`]
    NullLiteralExpr,
    /// [`Node::UndefinedLiteralExpr`]
    UndefinedLiteralExpr,
    /// [`Node::Err`]
    Err,
}

impl NodeKind {
    /// Name of the kind as used by emitted construction code
    pub fn name(self) -> &'static str {
        match self {
            Self::FunctionDecl => "FunctionDecl",
            Self::FunctionExpr => "FunctionExpr",
            Self::ParameterDecl => "ParameterDecl",
            Self::BlockStmt => "BlockStmt",
            Self::ExprStmt => "ExprStmt",
            Self::ReturnStmt => "ReturnStmt",
            Self::VariableStmt => "VariableStmt",
            Self::IfStmt => "IfStmt",
            Self::ForOfStmt => "ForOfStmt",
            Self::ForInStmt => "ForInStmt",
            Self::WhileStmt => "WhileStmt",
            Self::DoStmt => "DoStmt",
            Self::BreakStmt => "BreakStmt",
            Self::ContinueStmt => "ContinueStmt",
            Self::TryStmt => "TryStmt",
            Self::CatchClause => "CatchClause",
            Self::ThrowStmt => "ThrowStmt",
            Self::ConditionExpr => "ConditionExpr",
            Self::BinaryExpr => "BinaryExpr",
            Self::UnaryExpr => "UnaryExpr",
            Self::CallExpr => "CallExpr",
            Self::NewExpr => "NewExpr",
            Self::Argument => "Argument",
            Self::PropAccessExpr => "PropAccessExpr",
            Self::ElementAccessExpr => "ElementAccessExpr",
            Self::ArrayLiteralExpr => "ArrayLiteralExpr",
            Self::ObjectLiteralExpr => "ObjectLiteralExpr",
            Self::PropAssignExpr => "PropAssignExpr",
            Self::SpreadAssignExpr => "SpreadAssignExpr",
            Self::SpreadElementExpr => "SpreadElementExpr",
            Self::ComputedPropertyNameExpr => "ComputedPropertyNameExpr",
            Self::TemplateExpr => "TemplateExpr",
            Self::Identifier => "Identifier",
            Self::ReferenceExpr => "ReferenceExpr",
            Self::TypeOfExpr => "TypeOfExpr",
            Self::StringLiteralExpr => "StringLiteralExpr",
            Self::NumberLiteralExpr => "NumberLiteralExpr",
            Self::BooleanLiteralExpr => "BooleanLiteralExpr",
            Self::NullLiteralExpr => "NullLiteralExpr",
            Self::UndefinedLiteralExpr => "UndefinedLiteralExpr",
            Self::Err => "Err",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl Node {
    /// The kind of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::FunctionDecl { .. } => NodeKind::FunctionDecl,
            Self::FunctionExpr { .. } => NodeKind::FunctionExpr,
            Self::ParameterDecl { .. } => NodeKind::ParameterDecl,
            Self::BlockStmt { .. } => NodeKind::BlockStmt,
            Self::ExprStmt { .. } => NodeKind::ExprStmt,
            Self::ReturnStmt { .. } => NodeKind::ReturnStmt,
            Self::VariableStmt { .. } => NodeKind::VariableStmt,
            Self::IfStmt { .. } => NodeKind::IfStmt,
            Self::ForOfStmt { .. } => NodeKind::ForOfStmt,
            Self::ForInStmt { .. } => NodeKind::ForInStmt,
            Self::WhileStmt { .. } => NodeKind::WhileStmt,
            Self::DoStmt { .. } => NodeKind::DoStmt,
            Self::BreakStmt => NodeKind::BreakStmt,
            Self::ContinueStmt => NodeKind::ContinueStmt,
            Self::TryStmt { .. } => NodeKind::TryStmt,
            Self::CatchClause { .. } => NodeKind::CatchClause,
            Self::ThrowStmt { .. } => NodeKind::ThrowStmt,
            Self::ConditionExpr { .. } => NodeKind::ConditionExpr,
            Self::BinaryExpr { .. } => NodeKind::BinaryExpr,
            Self::UnaryExpr { .. } => NodeKind::UnaryExpr,
            Self::CallExpr { .. } => NodeKind::CallExpr,
            Self::NewExpr { .. } => NodeKind::NewExpr,
            Self::Argument { .. } => NodeKind::Argument,
            Self::PropAccessExpr { .. } => NodeKind::PropAccessExpr,
            Self::ElementAccessExpr { .. } => NodeKind::ElementAccessExpr,
            Self::ArrayLiteralExpr { .. } => NodeKind::ArrayLiteralExpr,
            Self::ObjectLiteralExpr { .. } => NodeKind::ObjectLiteralExpr,
            Self::PropAssignExpr { .. } => NodeKind::PropAssignExpr,
            Self::SpreadAssignExpr { .. } => NodeKind::SpreadAssignExpr,
            Self::SpreadElementExpr { .. } => NodeKind::SpreadElementExpr,
            Self::ComputedPropertyNameExpr { .. } => NodeKind::ComputedPropertyNameExpr,
            Self::TemplateExpr { .. } => NodeKind::TemplateExpr,
            Self::Identifier { .. } => NodeKind::Identifier,
            Self::ReferenceExpr { .. } => NodeKind::ReferenceExpr,
            Self::TypeOfExpr { .. } => NodeKind::TypeOfExpr,
            Self::StringLiteralExpr { .. } => NodeKind::StringLiteralExpr,
            Self::NumberLiteralExpr { .. } => NodeKind::NumberLiteralExpr,
            Self::BooleanLiteralExpr { .. } => NodeKind::BooleanLiteralExpr,
            Self::NullLiteralExpr => NodeKind::NullLiteralExpr,
            Self::UndefinedLiteralExpr => NodeKind::UndefinedLiteralExpr,
            Self::Err { .. } => NodeKind::Err,
        }
    }

    /// Child nodes in construction order
    ///
    /// String payloads (names, operators, raw literals) are not nodes and are
    /// not included.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Self::FunctionDecl { parameters, body } | Self::FunctionExpr { parameters, body } => {
                parameters.iter().chain(std::iter::once(body.as_ref())).collect()
            }
            Self::BlockStmt { statements } => statements.iter().collect(),
            Self::ExprStmt { expr }
            | Self::ReturnStmt { expr }
            | Self::ThrowStmt { expr }
            | Self::UnaryExpr { expr, .. }
            | Self::SpreadAssignExpr { expr }
            | Self::SpreadElementExpr { expr }
            | Self::ComputedPropertyNameExpr { expr }
            | Self::TypeOfExpr { expr }
            | Self::PropAccessExpr { expr, .. } => vec![expr.as_ref()],
            Self::VariableStmt { initializer, .. } => initializer.iter().map(AsRef::as_ref).collect(),
            Self::IfStmt {
                when,
                then,
                otherwise,
            } => [Some(when), Some(then), otherwise.as_ref()]
                .into_iter()
                .flatten()
                .map(AsRef::as_ref)
                .collect(),
            Self::ForOfStmt {
                variable,
                expr,
                body,
            }
            | Self::ForInStmt {
                variable,
                expr,
                body,
            } => vec![variable.as_ref(), expr.as_ref(), body.as_ref()],
            Self::WhileStmt { condition, block } => vec![condition.as_ref(), block.as_ref()],
            Self::DoStmt { block, condition } => vec![block.as_ref(), condition.as_ref()],
            Self::TryStmt {
                try_block,
                catch_clause,
                finally_block,
            } => [Some(try_block), catch_clause.as_ref(), finally_block.as_ref()]
                .into_iter()
                .flatten()
                .map(AsRef::as_ref)
                .collect(),
            Self::CatchClause { variable, block } => variable
                .iter()
                .chain(std::iter::once(block))
                .map(AsRef::as_ref)
                .collect(),
            Self::ConditionExpr {
                when,
                then,
                otherwise,
            } => vec![when.as_ref(), then.as_ref(), otherwise.as_ref()],
            Self::BinaryExpr { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Self::CallExpr { expr, args } | Self::NewExpr { expr, args } => {
                std::iter::once(expr.as_ref()).chain(args.iter()).collect()
            }
            Self::Argument { expr, .. } => expr.iter().map(AsRef::as_ref).collect(),
            Self::ElementAccessExpr { expr, element, .. } => vec![expr.as_ref(), element.as_ref()],
            Self::ArrayLiteralExpr { items } => items.iter().collect(),
            Self::ObjectLiteralExpr { properties } => properties.iter().collect(),
            Self::PropAssignExpr { name, expr } => vec![name.as_ref(), expr.as_ref()],
            Self::TemplateExpr { parts } => parts
                .iter()
                .filter_map(|part| match part {
                    TemplatePart::Expr(node) => Some(node),
                    TemplatePart::Literal(_) => None,
                })
                .collect(),
            Self::ParameterDecl { .. }
            | Self::BreakStmt
            | Self::ContinueStmt
            | Self::Identifier { .. }
            | Self::ReferenceExpr { .. }
            | Self::StringLiteralExpr { .. }
            | Self::NumberLiteralExpr { .. }
            | Self::BooleanLiteralExpr { .. }
            | Self::NullLiteralExpr
            | Self::UndefinedLiteralExpr
            | Self::Err { .. } => Vec::new(),
        }
    }

    /// Every `Err` node in this tree, in pre-order
    pub fn errors(&self) -> Vec<&ErrorValue> {
        visitor::ErrorCollector::collect(self)
    }

    /// An `Identifier`
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier { name: name.into() }
    }

    /// A `NumberLiteralExpr` with raw text `raw`
    pub fn number(raw: impl Into<String>) -> Self {
        Self::NumberLiteralExpr { raw: raw.into() }
    }

    /// A `StringLiteralExpr` with raw text `raw`, quotes included
    pub fn string(raw: impl Into<String>) -> Self {
        Self::StringLiteralExpr { raw: raw.into() }
    }

    /// A `BinaryExpr`
    pub fn binary(left: Node, op: impl Into<String>, right: Node) -> Self {
        Self::BinaryExpr {
            left: Box::new(left),
            op: op.into(),
            right: Box::new(right),
        }
    }

    /// A `BlockStmt`
    pub fn block(statements: Vec<Node>) -> Self {
        Self::BlockStmt { statements }
    }

    /// A `ReturnStmt`
    pub fn ret(expr: Node) -> Self {
        Self::ReturnStmt {
            expr: Box::new(expr),
        }
    }

    /// An `Argument`, empty when `expr` is `None`
    pub fn argument(expr: Option<Node>, name: Option<String>) -> Self {
        Self::Argument {
            expr: expr.map(Box::new),
            name,
        }
    }

    /// An `Err` node
    pub fn error(error: ErrorValue) -> Self {
        Self::Err { error }
    }
}
