//! IR construction code emitter
//!
//! Renders an IR tree as a TypeScript expression that rebuilds it at runtime:
//! every node becomes `new <ns>.<Kind>(children...)`, where `<ns>` is the
//! namespace the IR module is imported under. Absent optional children are
//! written as `undefined`.

use rf_ir::{Node, TemplatePart};
use serde::Deserialize;

/// Where emitted code finds the IR node classes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IrModule {
    /// Identifier the module is imported as
    pub namespace: String,
    /// Module specifier to import from
    pub module: String,
}

impl Default for IrModule {
    fn default() -> Self {
        Self {
            namespace: "$ir".to_string(),
            module: "refract/ir".to_string(),
        }
    }
}

impl IrModule {
    /// Import `module` under `namespace`
    pub fn new(namespace: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            module: module.into(),
        }
    }

    /// `import * as <ns> from "<module>";`
    pub fn import_line(&self) -> String {
        format!("import * as {} from {};", self.namespace, quote(&self.module))
    }

    /// Construction code for `node`
    pub fn emit(&self, node: &Node) -> String {
        let mut emitter = Emitter {
            namespace: &self.namespace,
            out: String::new(),
        };
        emitter.node(node);
        emitter.out
    }
}

/// Quote `text` as a string literal
pub fn quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

struct Emitter<'module> {
    namespace: &'module str,
    out: String,
}

/// One constructor argument
enum Arg<'node> {
    Node(&'node Node),
    OptionalNode(Option<&'node Node>),
    Nodes(&'node [Node]),
    Str(&'node str),
    OptionalStr(Option<&'node str>),
    Raw(&'node str),
    Template(&'node [TemplatePart]),
    Thunk(&'node str),
}

impl Emitter<'_> {
    fn node(&mut self, node: &Node) {
        use Arg::{Node as N, Nodes, OptionalNode, OptionalStr, Raw, Str, Template, Thunk};

        if let Node::Err { error } = node {
            let error = format!(
                "Object.assign(new Error({}), {{ name: {} }})",
                quote(&error.message),
                quote(&error.name)
            );
            self.construct(node, &[Raw(&error)]);
            return;
        }

        let args: Vec<Arg<'_>> = match node {
            Node::FunctionDecl { parameters, body } | Node::FunctionExpr { parameters, body } => {
                vec![Nodes(parameters), N(body)]
            }
            Node::ParameterDecl { name } | Node::Identifier { name } => vec![Str(name)],
            Node::BlockStmt { statements } => vec![Nodes(statements)],
            Node::ExprStmt { expr }
            | Node::ReturnStmt { expr }
            | Node::ThrowStmt { expr }
            | Node::SpreadAssignExpr { expr }
            | Node::SpreadElementExpr { expr }
            | Node::ComputedPropertyNameExpr { expr }
            | Node::TypeOfExpr { expr } => vec![N(expr)],
            Node::VariableStmt { name, initializer } => {
                vec![Str(name), OptionalNode(initializer.as_deref())]
            }
            Node::IfStmt {
                when,
                then,
                otherwise,
            } => vec![N(when), N(then), OptionalNode(otherwise.as_deref())],
            Node::ForOfStmt {
                variable,
                expr,
                body,
            }
            | Node::ForInStmt {
                variable,
                expr,
                body,
            } => vec![N(variable), N(expr), N(body)],
            Node::WhileStmt { condition, block } => vec![N(condition), N(block)],
            Node::DoStmt { block, condition } => vec![N(block), N(condition)],
            Node::TryStmt {
                try_block,
                catch_clause,
                finally_block,
            } => vec![
                N(try_block),
                OptionalNode(catch_clause.as_deref()),
                OptionalNode(finally_block.as_deref()),
            ],
            Node::CatchClause { variable, block } => {
                vec![OptionalNode(variable.as_deref()), N(block)]
            }
            Node::ConditionExpr {
                when,
                then,
                otherwise,
            } => vec![N(when), N(then), N(otherwise)],
            Node::BinaryExpr { left, op, right } => vec![N(left), Str(op), N(right)],
            Node::UnaryExpr { op, expr } => vec![Str(op), N(expr)],
            Node::CallExpr { expr, args } | Node::NewExpr { expr, args } => {
                vec![N(expr), Nodes(args)]
            }
            Node::Argument { expr, name } => {
                vec![OptionalNode(expr.as_deref()), OptionalStr(name.as_deref())]
            }
            Node::PropAccessExpr { expr, name, ty } => {
                vec![N(expr), Str(name), OptionalStr(ty.as_deref())]
            }
            Node::ElementAccessExpr { expr, element, ty } => {
                vec![N(expr), N(element), OptionalStr(ty.as_deref())]
            }
            Node::ArrayLiteralExpr { items } => vec![Nodes(items)],
            Node::ObjectLiteralExpr { properties } => vec![Nodes(properties)],
            Node::PropAssignExpr { name, expr } => vec![N(name), N(expr)],
            Node::TemplateExpr { parts } => vec![Template(parts)],
            Node::ReferenceExpr { path, reference } => vec![Str(path), Thunk(reference)],
            Node::StringLiteralExpr { raw } | Node::NumberLiteralExpr { raw } => vec![Raw(raw)],
            Node::BooleanLiteralExpr { value } => {
                vec![Raw(if *value { "true" } else { "false" })]
            }
            Node::BreakStmt
            | Node::ContinueStmt
            | Node::NullLiteralExpr
            | Node::UndefinedLiteralExpr
            | Node::Err { .. } => Vec::new(),
        };
        self.construct(node, &args);
    }

    fn construct(&mut self, node: &Node, args: &[Arg<'_>]) {
        self.out.push_str("new ");
        self.out.push_str(self.namespace);
        self.out.push('.');
        self.out.push_str(node.kind().name());
        self.out.push('(');
        for (index, arg) in args.iter().enumerate() {
            if index > 0 {
                self.out.push_str(", ");
            }
            self.arg(arg);
        }
        self.out.push(')');
    }

    fn arg(&mut self, arg: &Arg<'_>) {
        match arg {
            Arg::Node(node) => self.node(node),
            Arg::OptionalNode(Some(node)) => self.node(node),
            Arg::OptionalNode(None) | Arg::OptionalStr(None) => self.out.push_str("undefined"),
            Arg::Nodes(nodes) => {
                self.out.push('[');
                for (index, node) in nodes.iter().enumerate() {
                    if index > 0 {
                        self.out.push_str(", ");
                    }
                    self.node(node);
                }
                self.out.push(']');
            }
            Arg::Str(text) | Arg::OptionalStr(Some(text)) => self.out.push_str(&quote(text)),
            Arg::Raw(text) => self.out.push_str(text),
            Arg::Template(parts) => {
                self.out.push('[');
                for (index, part) in parts.iter().enumerate() {
                    if index > 0 {
                        self.out.push_str(", ");
                    }
                    match part {
                        TemplatePart::Literal(text) => self.out.push_str(&quote(text)),
                        TemplatePart::Expr(node) => self.node(node),
                    }
                }
                self.out.push(']');
            }
            Arg::Thunk(expression) => {
                self.out.push_str("() => ");
                self.out.push_str(expression);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use rf_ir::ErrorValue;

    fn emit(node: &Node) -> String {
        IrModule::default().emit(node)
    }

    #[test]
    fn test_increment_function() {
        let node = Node::FunctionDecl {
            parameters: vec![Node::ParameterDecl { name: "x".into() }],
            body: Box::new(Node::block(vec![Node::ret(Node::binary(
                Node::identifier("x"),
                "+",
                Node::number("1"),
            ))])),
        };
        expect![[r#"new $ir.FunctionDecl([new $ir.ParameterDecl("x")], new $ir.BlockStmt([new $ir.ReturnStmt(new $ir.BinaryExpr(new $ir.Identifier("x"), "+", new $ir.NumberLiteralExpr(1)))]))"#]]
            .assert_eq(&emit(&node));
    }

    #[test]
    fn test_absent_children_are_undefined() {
        let node = Node::IfStmt {
            when: Box::new(Node::BooleanLiteralExpr { value: false }),
            then: Box::new(Node::BreakStmt),
            otherwise: None,
        };
        expect![[r#"new $ir.IfStmt(new $ir.BooleanLiteralExpr(false), new $ir.BreakStmt(), undefined)"#]]
            .assert_eq(&emit(&node));

        let node = Node::argument(None, Some("payload".into()));
        expect![[r#"new $ir.Argument(undefined, "payload")"#]].assert_eq(&emit(&node));
    }

    #[test]
    fn test_reference_is_a_thunk() {
        let node = Node::ReferenceExpr {
            path: "props.table".into(),
            reference: "props.table".into(),
        };
        expect![[r#"new $ir.ReferenceExpr("props.table", () => props.table)"#]].assert_eq(&emit(&node));
    }

    #[test]
    fn test_literals_are_opaque() {
        let node = Node::ArrayLiteralExpr {
            items: vec![Node::string("'it\\'s'"), Node::number("1_000"), Node::NullLiteralExpr],
        };
        expect![[r#"new $ir.ArrayLiteralExpr([new $ir.StringLiteralExpr('it\'s'), new $ir.NumberLiteralExpr(1_000), new $ir.NullLiteralExpr()])"#]]
            .assert_eq(&emit(&node));
    }

    #[test]
    fn test_template_parts_are_quoted() {
        let node = Node::TemplateExpr {
            parts: vec![
                TemplatePart::Literal("say \"hi\"\n".into()),
                TemplatePart::Expr(Node::identifier("name")),
            ],
        };
        expect![[r#"new $ir.TemplateExpr(["say \"hi\"\n", new $ir.Identifier("name")])"#]].assert_eq(&emit(&node));
    }

    #[test]
    fn test_error_node_reconstructs_error() {
        let node = Node::error(ErrorValue::new(
            "UnsupportedConstructError",
            "unsupported this: `this`",
        ));
        expect![[r#"new $ir.Err(Object.assign(new Error("unsupported this: `this`"), { name: "UnsupportedConstructError" }))"#]]
            .assert_eq(&emit(&node));
    }

    #[test]
    fn test_custom_namespace_and_import() {
        let module = IrModule::new("ir", "@acme/ir");
        assert_eq!(module.import_line(), "import * as ir from \"@acme/ir\";");
        assert_eq!(module.emit(&Node::ContinueStmt), "new ir.ContinueStmt()");
    }
}
