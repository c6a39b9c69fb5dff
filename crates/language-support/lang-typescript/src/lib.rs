//! TypeScript language adapter
//!
//! Parses TypeScript and TSX with the tree-sitter grammars and converts the
//! concrete tree into generic [`SyntaxNode`]s.

use anyhow::Result;
use rf_span::Span;
use rf_syntax::{Language, SyntaxKind, SyntaxNode};
use std::path::Path;
use tree_sitter::{Parser, Tree};

/// Grammar flavour to parse with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Plain TypeScript (`.ts`, `.mts`, `.cts`)
    #[default]
    TypeScript,
    /// TypeScript with JSX (`.tsx`)
    Tsx,
}

/// TypeScript language implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptLanguage {
    dialect: Dialect,
}

impl TypeScriptLanguage {
    /// Creates an adapter for plain TypeScript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the dialect from a file extension; anything but `.tsx` parses as TypeScript
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        let dialect = match path.extension().and_then(|ext| ext.to_str()) {
            Some("tsx") => Dialect::Tsx,
            _ => Dialect::TypeScript,
        };
        Self { dialect }
    }

    /// The dialect this adapter parses
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn lower_with_field(
        &self,
        node: &tree_sitter::Node,
        field: Option<&'static str>,
        source: &str,
    ) -> SyntaxNode {
        let kind = if node.is_named() {
            syntax_kind(node.kind())
        } else {
            SyntaxKind::Unknown(node.kind().to_string())
        };

        let span = Span::from(node.byte_range());
        let text = span.slice(source).unwrap_or_default().to_string();

        let mut children = Vec::new();
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                children.push(self.lower_with_field(&child, cursor.field_name(), source));
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        SyntaxNode {
            kind,
            field,
            named: node.is_named(),
            span,
            text,
            children,
        }
    }
}

impl Language for TypeScriptLanguage {
    fn name(&self) -> &'static str {
        match self.dialect {
            Dialect::TypeScript => "typescript",
            Dialect::Tsx => "tsx",
        }
    }

    fn extensions(&self) -> &[&'static str] {
        match self.dialect {
            Dialect::TypeScript => &["ts", "mts", "cts"],
            Dialect::Tsx => &["tsx"],
        }
    }

    fn tree_sitter_language(&self) -> tree_sitter::Language {
        match self.dialect {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser.set_language(&self.tree_sitter_language())?;

        parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("tree-sitter parse failed"))
    }

    fn lower_node(&self, node: &tree_sitter::Node, source: &str) -> SyntaxNode {
        self.lower_with_field(node, None, source)
    }
}

/// Map a named grammar node to its syntax kind
fn syntax_kind(grammar_name: &str) -> SyntaxKind {
    match grammar_name {
        "program" => SyntaxKind::Program,
        "comment" | "html_comment" => SyntaxKind::Comment,
        "ERROR" => SyntaxKind::Error,
        "expression_statement" => SyntaxKind::ExpressionStatement,
        "statement_block" => SyntaxKind::StatementBlock,
        "lexical_declaration" => SyntaxKind::LexicalDeclaration,
        "variable_declaration" => SyntaxKind::VariableDeclaration,
        "variable_declarator" => SyntaxKind::VariableDeclarator,
        "return_statement" => SyntaxKind::ReturnStatement,
        "if_statement" => SyntaxKind::IfStatement,
        "else_clause" => SyntaxKind::ElseClause,
        "while_statement" => SyntaxKind::WhileStatement,
        "do_statement" => SyntaxKind::DoStatement,
        "for_in_statement" => SyntaxKind::ForInStatement,
        "for_statement" => SyntaxKind::ForStatement,
        "break_statement" => SyntaxKind::BreakStatement,
        "continue_statement" => SyntaxKind::ContinueStatement,
        "try_statement" => SyntaxKind::TryStatement,
        "catch_clause" => SyntaxKind::CatchClause,
        "finally_clause" => SyntaxKind::FinallyClause,
        "throw_statement" => SyntaxKind::ThrowStatement,
        "empty_statement" => SyntaxKind::EmptyStatement,
        "labeled_statement" => SyntaxKind::LabeledStatement,
        "switch_statement" => SyntaxKind::SwitchStatement,
        "function_declaration" => SyntaxKind::FunctionDeclaration,
        "function_signature" => SyntaxKind::FunctionSignature,
        "generator_function_declaration" => SyntaxKind::GeneratorFunctionDeclaration,
        "class_declaration" => SyntaxKind::ClassDeclaration,
        "import_statement" => SyntaxKind::ImportStatement,
        "identifier" => SyntaxKind::Identifier,
        "property_identifier" | "private_property_identifier" => SyntaxKind::PropertyIdentifier,
        "shorthand_property_identifier" => SyntaxKind::ShorthandPropertyIdentifier,
        "number" => SyntaxKind::Number,
        "string" => SyntaxKind::String,
        "template_string" => SyntaxKind::TemplateString,
        "template_substitution" => SyntaxKind::TemplateSubstitution,
        "true" => SyntaxKind::True,
        "false" => SyntaxKind::False,
        "null" => SyntaxKind::Null,
        "undefined" => SyntaxKind::Undefined,
        "this" => SyntaxKind::This,
        "super" => SyntaxKind::Super,
        "regex" => SyntaxKind::Regex,
        "call_expression" => SyntaxKind::CallExpression,
        "new_expression" => SyntaxKind::NewExpression,
        "arguments" => SyntaxKind::Arguments,
        "arrow_function" => SyntaxKind::ArrowFunction,
        "function_expression" | "function" => SyntaxKind::FunctionExpression,
        "generator_function" => SyntaxKind::GeneratorFunction,
        "formal_parameters" => SyntaxKind::FormalParameters,
        "required_parameter" => SyntaxKind::RequiredParameter,
        "optional_parameter" => SyntaxKind::OptionalParameter,
        "rest_pattern" => SyntaxKind::RestPattern,
        "member_expression" => SyntaxKind::MemberExpression,
        "subscript_expression" => SyntaxKind::SubscriptExpression,
        "binary_expression" => SyntaxKind::BinaryExpression,
        "unary_expression" => SyntaxKind::UnaryExpression,
        "update_expression" => SyntaxKind::UpdateExpression,
        "assignment_expression" => SyntaxKind::AssignmentExpression,
        "augmented_assignment_expression" => SyntaxKind::AugmentedAssignmentExpression,
        "ternary_expression" => SyntaxKind::TernaryExpression,
        "parenthesized_expression" => SyntaxKind::ParenthesizedExpression,
        "as_expression" => SyntaxKind::AsExpression,
        "satisfies_expression" => SyntaxKind::SatisfiesExpression,
        "non_null_expression" => SyntaxKind::NonNullExpression,
        "type_assertion" => SyntaxKind::TypeAssertion,
        "array" => SyntaxKind::Array,
        "object" => SyntaxKind::Object,
        "pair" => SyntaxKind::Pair,
        "computed_property_name" => SyntaxKind::ComputedPropertyName,
        "spread_element" => SyntaxKind::SpreadElement,
        "method_definition" => SyntaxKind::MethodDefinition,
        "await_expression" => SyntaxKind::AwaitExpression,
        "yield_expression" => SyntaxKind::YieldExpression,
        "sequence_expression" => SyntaxKind::SequenceExpression,
        "array_pattern" => SyntaxKind::ArrayPattern,
        "object_pattern" => SyntaxKind::ObjectPattern,
        "optional_chain" => SyntaxKind::OptionalChain,
        "type_annotation" => SyntaxKind::TypeAnnotation,
        other => SyntaxKind::Unknown(other.to_string()),
    }
}
