//! Lowering failures
//!
//! Note: the struct fields are read by miette's `#[derive(Diagnostic)]` macro
//! for rich error output, which the unused-assignment lint cannot see through.

#![allow(unused_assignments)]

use miette::{Diagnostic, SourceSpan};
use rf_ir::ErrorValue;
use rf_syntax::SyntaxNode;
use thiserror::Error;

/// Why a reflected function could not be lowered
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum LoweringError {
    /// Syntax outside the reflectable subset
    #[error("unsupported {kind}: `{text}`")]
    #[diagnostic(
        code(lower::unsupported_construct),
        help("reflected functions support a subset of TypeScript without classes, generators or async code")
    )]
    UnsupportedConstruct {
        /// Human readable kind of the construct
        kind: String,
        /// Source text of the construct
        text: String,
        /// Source location
        #[label("not supported in a reflected function")]
        span: SourceSpan,
    },

    /// Operator without a canonical IR symbol
    #[error("unsupported operator `{operator}` in `{text}`")]
    #[diagnostic(code(lower::unsupported_operator))]
    UnsupportedOperator {
        /// The operator token
        operator: String,
        /// Source text of the expression
        text: String,
        /// Source location
        #[label("`{operator}` cannot be reflected")]
        span: SourceSpan,
    },

    /// Callable wrapper whose branded type is overloaded
    #[error("`{text}` has {count} call signatures, expected at most one")]
    #[diagnostic(code(lower::multiple_signatures))]
    MultipleSignatures {
        /// Number of signatures found
        count: usize,
        /// Source text of the invocation
        text: String,
        /// Source location
        #[label("overloaded callee")]
        span: SourceSpan,
    },

    /// A reflectable slot that is not a function with a body
    #[error("expected a function with a body, found `{text}`")]
    #[diagnostic(
        code(lower::declaration_only_function),
        help("pass an arrow function or function expression")
    )]
    DeclarationOnlyFunction {
        /// Source text of the slot
        text: String,
        /// Source location
        #[label("no function body here")]
        span: SourceSpan,
    },
}

fn source_span(node: &SyntaxNode) -> SourceSpan {
    node.span.into()
}

impl LoweringError {
    /// Unsupported construct described by its syntax kind
    pub fn unsupported(node: &SyntaxNode) -> Self {
        Self::unsupported_as(node, node.kind.to_string())
    }

    /// Unsupported construct described as `kind` rather than by its syntax kind
    pub fn unsupported_as(node: &SyntaxNode, kind: impl Into<String>) -> Self {
        Self::UnsupportedConstruct {
            kind: kind.into(),
            text: node.text.clone(),
            span: source_span(node),
        }
    }

    /// Operator `operator` of `node` has no IR symbol
    pub fn operator(node: &SyntaxNode, operator: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
            text: node.text.clone(),
            span: source_span(node),
        }
    }

    /// Invocation `node` resolves to `count` branded signatures
    pub fn multiple_signatures(node: &SyntaxNode, count: usize) -> Self {
        Self::MultipleSignatures {
            count,
            text: node.text.clone(),
            span: source_span(node),
        }
    }

    /// Reflected slot `node` is not a function with a body
    pub fn declaration_only(node: &SyntaxNode) -> Self {
        Self::DeclarationOnlyFunction {
            text: node.text.clone(),
            span: source_span(node),
        }
    }

    /// Error class name carried by the `Err` node
    pub fn name(&self) -> &'static str {
        match self {
            Self::UnsupportedConstruct { .. } => "UnsupportedConstructError",
            Self::UnsupportedOperator { .. } => "UnsupportedOperatorError",
            Self::MultipleSignatures { .. } => "MultipleSignaturesError",
            Self::DeclarationOnlyFunction { .. } => "DeclarationOnlyFunctionError",
        }
    }

    /// Source location of the failure
    pub fn span(&self) -> SourceSpan {
        match self {
            Self::UnsupportedConstruct { span, .. }
            | Self::UnsupportedOperator { span, .. }
            | Self::MultipleSignatures { span, .. }
            | Self::DeclarationOnlyFunction { span, .. } => *span,
        }
    }

    /// The name and message an `Err` node reconstructs
    pub fn to_error_value(&self) -> ErrorValue {
        ErrorValue::new(self.name(), self.to_string())
    }
}
