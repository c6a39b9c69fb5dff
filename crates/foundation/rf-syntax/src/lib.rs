//! Generic syntax tree for the JavaScript/TypeScript grammar family
//!
//! Language adapters convert a concrete tree-sitter tree into [`SyntaxNode`]s
//! so that the lowering engine and the construct selector can work on a
//! uniform, owned tree.

pub mod literal;

use anyhow::Result;
use rf_span::Span;
use std::fmt;

/// Generic syntax tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// The kind of this node
    pub kind: SyntaxKind,
    /// Name of the grammar field this node occupies in its parent
    pub field: Option<&'static str>,
    /// Whether this is a named node (as opposed to an anonymous token)
    pub named: bool,
    /// Source location
    pub span: Span,
    /// Source text covered by this node
    pub text: String,
    /// Child nodes, including anonymous tokens
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// First child occupying the given grammar field
    pub fn child_by_field(&self, field: &str) -> Option<&SyntaxNode> {
        self.children
            .iter()
            .find(|child| child.field == Some(field))
    }

    /// Named children, skipping anonymous tokens and comments
    pub fn named_children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children
            .iter()
            .filter(|child| child.named && child.kind != SyntaxKind::Comment)
    }

    /// First named child that is not a comment
    pub fn first_named_child(&self) -> Option<&SyntaxNode> {
        self.named_children().next()
    }

    /// Whether an anonymous token with exactly this text is a direct child
    pub fn has_token(&self, token: &str) -> bool {
        self.children
            .iter()
            .any(|child| !child.named && child.text == token)
    }

    /// Whether this node is a function literal or declaration of any shape
    pub fn is_function_like(&self) -> bool {
        matches!(
            self.kind,
            SyntaxKind::ArrowFunction
                | SyntaxKind::FunctionExpression
                | SyntaxKind::FunctionDeclaration
                | SyntaxKind::FunctionSignature
                | SyntaxKind::GeneratorFunction
                | SyntaxKind::GeneratorFunctionDeclaration
        )
    }

    /// Arguments of a call or `new` expression, in source order
    ///
    /// Returns an empty list for other nodes and for `new C` without parens.
    pub fn call_arguments(&self) -> Vec<&SyntaxNode> {
        match self.kind {
            SyntaxKind::CallExpression | SyntaxKind::NewExpression => self
                .child_by_field("arguments")
                .filter(|args| args.kind == SyntaxKind::Arguments)
                .map(|args| args.named_children().collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// The callee of a call (`function`) or `new` (`constructor`) expression
    pub fn callee(&self) -> Option<&SyntaxNode> {
        match self.kind {
            SyntaxKind::CallExpression => self.child_by_field("function"),
            SyntaxKind::NewExpression => self.child_by_field("constructor"),
            _ => None,
        }
    }

    /// Depth-first pre-order search for the first node matching `predicate`
    pub fn find(&self, predicate: &impl Fn(&SyntaxNode) -> bool) -> Option<&SyntaxNode> {
        if predicate(self) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find(predicate))
    }
}

/// Node kinds of the JavaScript/TypeScript grammar family
///
/// Kinds the lowering engine never inspects are kept as `Unknown` with their
/// grammar name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxKind {
    /// Root of the syntax tree
    Program,
    /// Comment (extra node, may appear anywhere)
    Comment,
    /// Syntax error recovered by the parser
    Error,

    // Statements
    /// `expr;`
    ExpressionStatement,
    /// `{ ... }`
    StatementBlock,
    /// `let` / `const` declaration
    LexicalDeclaration,
    /// `var` declaration
    VariableDeclaration,
    /// Single `name = value` inside a declaration
    VariableDeclarator,
    /// `return`
    ReturnStatement,
    /// `if`
    IfStatement,
    /// `else` clause of an `if`
    ElseClause,
    /// `while`
    WhileStatement,
    /// `do ... while`
    DoStatement,
    /// `for (... of ...)` and `for (... in ...)`
    ForInStatement,
    /// Classic `for (;;)`
    ForStatement,
    /// `break`
    BreakStatement,
    /// `continue`
    ContinueStatement,
    /// `try`
    TryStatement,
    /// `catch` clause
    CatchClause,
    /// `finally` clause
    FinallyClause,
    /// `throw`
    ThrowStatement,
    /// Lone `;`
    EmptyStatement,
    /// `label: statement`
    LabeledStatement,
    /// `switch`
    SwitchStatement,
    /// `function name() {}`
    FunctionDeclaration,
    /// `function name();` without body
    FunctionSignature,
    /// `function* name() {}`
    GeneratorFunctionDeclaration,
    /// `class Name {}`
    ClassDeclaration,
    /// `import ... from ...`
    ImportStatement,

    // Expressions
    /// Identifier in expression position
    Identifier,
    /// Property name after `.` or as an object key
    PropertyIdentifier,
    /// `{ name }` in an object literal
    ShorthandPropertyIdentifier,
    /// Numeric literal
    Number,
    /// String literal
    String,
    /// Template literal
    TemplateString,
    /// `${ expr }` inside a template literal
    TemplateSubstitution,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `this`
    This,
    /// `super`
    Super,
    /// Regular expression literal
    Regex,
    /// `f(...)`
    CallExpression,
    /// `new C(...)`
    NewExpression,
    /// Argument list of a call
    Arguments,
    /// `(x) => ...`
    ArrowFunction,
    /// `function () {}` in expression position
    FunctionExpression,
    /// `function* () {}` in expression position
    GeneratorFunction,
    /// Parameter list
    FormalParameters,
    /// Required parameter (TypeScript)
    RequiredParameter,
    /// Optional parameter (TypeScript)
    OptionalParameter,
    /// `...rest`
    RestPattern,
    /// `a.b`
    MemberExpression,
    /// `a[b]`
    SubscriptExpression,
    /// `a + b`
    BinaryExpression,
    /// `!a`
    UnaryExpression,
    /// `a++`
    UpdateExpression,
    /// `a = b`
    AssignmentExpression,
    /// `a += b`
    AugmentedAssignmentExpression,
    /// `a ? b : c`
    TernaryExpression,
    /// `(a)`
    ParenthesizedExpression,
    /// `a as T`
    AsExpression,
    /// `a satisfies T`
    SatisfiesExpression,
    /// `a!`
    NonNullExpression,
    /// `<T>a`
    TypeAssertion,
    /// `[a, b]`
    Array,
    /// `{ a: b }`
    Object,
    /// `key: value` inside an object literal
    Pair,
    /// `[expr]` used as a property name
    ComputedPropertyName,
    /// `...expr`
    SpreadElement,
    /// Method shorthand or accessor in an object literal or class
    MethodDefinition,
    /// `await expr`
    AwaitExpression,
    /// `yield expr`
    YieldExpression,
    /// `a, b`
    SequenceExpression,
    /// `[a, b]` binding pattern
    ArrayPattern,
    /// `{ a, b }` binding pattern
    ObjectPattern,
    /// `?.`
    OptionalChain,
    /// `: T`
    TypeAnnotation,

    /// Grammar node the engine has no dedicated kind for
    Unknown(String),
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Program => "program",
            Self::Comment => "comment",
            Self::Error => "syntax error",
            Self::ExpressionStatement => "expression statement",
            Self::StatementBlock => "block",
            Self::LexicalDeclaration => "lexical declaration",
            Self::VariableDeclaration => "variable declaration",
            Self::VariableDeclarator => "variable declarator",
            Self::ReturnStatement => "return statement",
            Self::IfStatement => "if statement",
            Self::ElseClause => "else clause",
            Self::WhileStatement => "while statement",
            Self::DoStatement => "do statement",
            Self::ForInStatement => "for-in/of statement",
            Self::ForStatement => "for statement",
            Self::BreakStatement => "break statement",
            Self::ContinueStatement => "continue statement",
            Self::TryStatement => "try statement",
            Self::CatchClause => "catch clause",
            Self::FinallyClause => "finally clause",
            Self::ThrowStatement => "throw statement",
            Self::EmptyStatement => "empty statement",
            Self::LabeledStatement => "labeled statement",
            Self::SwitchStatement => "switch statement",
            Self::FunctionDeclaration => "function declaration",
            Self::FunctionSignature => "function signature",
            Self::GeneratorFunctionDeclaration => "generator declaration",
            Self::ClassDeclaration => "class declaration",
            Self::ImportStatement => "import statement",
            Self::Identifier => "identifier",
            Self::PropertyIdentifier => "property identifier",
            Self::ShorthandPropertyIdentifier => "shorthand property",
            Self::Number => "number literal",
            Self::String => "string literal",
            Self::TemplateString => "template literal",
            Self::TemplateSubstitution => "template substitution",
            Self::True | Self::False => "boolean literal",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::This => "this",
            Self::Super => "super",
            Self::Regex => "regular expression",
            Self::CallExpression => "call expression",
            Self::NewExpression => "new expression",
            Self::Arguments => "arguments",
            Self::ArrowFunction => "arrow function",
            Self::FunctionExpression => "function expression",
            Self::GeneratorFunction => "generator function",
            Self::FormalParameters => "parameters",
            Self::RequiredParameter => "parameter",
            Self::OptionalParameter => "optional parameter",
            Self::RestPattern => "rest pattern",
            Self::MemberExpression => "property access",
            Self::SubscriptExpression => "element access",
            Self::BinaryExpression => "binary expression",
            Self::UnaryExpression => "unary expression",
            Self::UpdateExpression => "update expression",
            Self::AssignmentExpression => "assignment",
            Self::AugmentedAssignmentExpression => "compound assignment",
            Self::TernaryExpression => "conditional expression",
            Self::ParenthesizedExpression => "parenthesized expression",
            Self::AsExpression => "as expression",
            Self::SatisfiesExpression => "satisfies expression",
            Self::NonNullExpression => "non-null assertion",
            Self::TypeAssertion => "type assertion",
            Self::Array => "array literal",
            Self::Object => "object literal",
            Self::Pair => "property assignment",
            Self::ComputedPropertyName => "computed property name",
            Self::SpreadElement => "spread element",
            Self::MethodDefinition => "method definition",
            Self::AwaitExpression => "await expression",
            Self::YieldExpression => "yield expression",
            Self::SequenceExpression => "sequence expression",
            Self::ArrayPattern => "array destructuring pattern",
            Self::ObjectPattern => "object destructuring pattern",
            Self::OptionalChain => "optional chain",
            Self::TypeAnnotation => "type annotation",
            Self::Unknown(name) => return write!(formatter, "{}", name.replace('_', " ")),
        };
        formatter.write_str(name)
    }
}

/// Trait for language-specific parsers
pub trait Language: Send + Sync + 'static {
    /// Name of the language
    fn name(&self) -> &'static str;

    /// File extensions this language handles
    fn extensions(&self) -> &[&'static str];

    /// tree-sitter language instance
    fn tree_sitter_language(&self) -> tree_sitter::Language;

    /// Parse source code to concrete syntax tree
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails
    fn parse(&self, source: &str) -> Result<tree_sitter::Tree>;

    /// Convert tree-sitter node to generic syntax node
    fn lower_node(&self, node: &tree_sitter::Node, source: &str) -> SyntaxNode;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: SyntaxKind, field: Option<&'static str>, named: bool, text: &str) -> SyntaxNode {
        SyntaxNode {
            kind,
            field,
            named,
            span: Span::new(0, text.len() as u32),
            text: text.to_string(),
            children: vec![],
        }
    }

    fn call(callee: &str, args: &[&str]) -> SyntaxNode {
        let mut arguments = vec![leaf(SyntaxKind::Unknown("(".into()), None, false, "(")];
        for arg in args {
            arguments.push(leaf(SyntaxKind::Number, None, true, arg));
            arguments.push(leaf(SyntaxKind::Unknown(",".into()), None, false, ","));
        }
        arguments.push(leaf(SyntaxKind::Comment, None, true, "/* c */"));
        SyntaxNode {
            kind: SyntaxKind::CallExpression,
            field: None,
            named: true,
            span: Span::new(0, 0),
            text: String::new(),
            children: vec![
                leaf(SyntaxKind::Identifier, Some("function"), true, callee),
                SyntaxNode {
                    kind: SyntaxKind::Arguments,
                    field: Some("arguments"),
                    named: true,
                    span: Span::new(0, 0),
                    text: String::new(),
                    children: arguments,
                },
            ],
        }
    }

    #[test]
    fn test_call_arguments_skip_tokens_and_comments() {
        let node = call("f", &["1", "2"]);
        let args: Vec<_> = node.call_arguments().iter().map(|arg| arg.text.as_str()).collect();
        assert_eq!(args, vec!["1", "2"]);
        assert_eq!(node.callee().map(|callee| callee.text.as_str()), Some("f"));
    }

    #[test]
    fn test_has_token_ignores_named_children() {
        let node = call("f", &["1"]);
        let arguments = node.child_by_field("arguments").unwrap();
        assert!(arguments.has_token("("));
        assert!(!arguments.has_token("1"));
    }

    #[test]
    fn test_find_is_preorder() {
        let node = call("f", &["7"]);
        let found = node.find(&|candidate| candidate.kind == SyntaxKind::Number);
        assert_eq!(found.map(|number| number.text.as_str()), Some("7"));
    }

    #[test]
    fn test_unknown_kind_display() {
        assert_eq!(SyntaxKind::Unknown("class_body".into()).to_string(), "class body");
        assert_eq!(SyntaxKind::ArrowFunction.to_string(), "arrow function");
    }
}
