//! Visitor infrastructure for traversing IR trees

use crate::{ErrorValue, Node, NodeKind};
use rustc_hash::FxHashMap;

/// Visitor trait for IR nodes
///
/// The default implementation of [`NodeVisitor::visit`] dispatches `Err`
/// nodes to [`NodeVisitor::visit_error`] and recurses into the children of
/// everything else in construction order. `'tree` is the lifetime of the
/// visited tree, so visitors may keep references into it.
pub trait NodeVisitor<'tree> {
    /// Visit a node and, by default, its children
    fn visit(&mut self, node: &'tree Node) {
        match node {
            Node::Err { error } => self.visit_error(error),
            Node::ReferenceExpr { path, reference } => self.visit_reference(path, reference),
            other => {
                self.enter(other);
                walk(self, other);
            }
        }
    }

    /// Called before the children of a non-error, non-reference node are visited
    fn enter(&mut self, _node: &'tree Node) {}

    /// Visit an `Err` node
    fn visit_error(&mut self, _error: &'tree ErrorValue) {}

    /// Visit a `ReferenceExpr` node
    fn visit_reference(&mut self, _path: &'tree str, _reference: &'tree str) {}
}

/// Visit every child of `node`
pub fn walk<'tree, V: NodeVisitor<'tree> + ?Sized>(visitor: &mut V, node: &'tree Node) {
    for child in node.children() {
        visitor.visit(child);
    }
}

/// Collects every `Err` node in pre-order
///
/// Errors nested inside an `Err` payload do not exist; collection stops at
/// each `Err` node.
#[derive(Debug, Default)]
pub struct ErrorCollector<'tree> {
    errors: Vec<&'tree ErrorValue>,
}

impl<'tree> ErrorCollector<'tree> {
    /// Collect the errors of `node`
    pub fn collect(node: &'tree Node) -> Vec<&'tree ErrorValue> {
        let mut collector = Self::default();
        collector.visit(node);
        collector.errors
    }
}

impl<'tree> NodeVisitor<'tree> for ErrorCollector<'tree> {
    fn visit_error(&mut self, error: &'tree ErrorValue) {
        self.errors.push(error);
    }
}

/// Counts nodes by kind
#[derive(Debug, Default)]
pub struct KindCounter {
    counts: FxHashMap<NodeKind, usize>,
}

impl KindCounter {
    /// How many nodes of `kind` were visited
    pub fn count(&self, kind: NodeKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or_default()
    }

    fn bump(&mut self, kind: NodeKind) {
        *self.counts.entry(kind).or_default() += 1;
    }
}

impl NodeVisitor<'_> for KindCounter {
    fn enter(&mut self, node: &Node) {
        self.bump(node.kind());
    }

    fn visit_error(&mut self, _error: &ErrorValue) {
        self.bump(NodeKind::Err);
    }

    fn visit_reference(&mut self, _path: &str, _reference: &str) {
        self.bump(NodeKind::ReferenceExpr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_counter_visits_every_node() {
        let node = Node::block(vec![
            Node::ExprStmt {
                expr: Box::new(Node::binary(Node::identifier("a"), "+", Node::identifier("b"))),
            },
            Node::ExprStmt {
                expr: Box::new(Node::ReferenceExpr {
                    path: "table".to_string(),
                    reference: "table".to_string(),
                }),
            },
        ]);

        let mut counter = KindCounter::default();
        counter.visit(&node);

        assert_eq!(counter.count(NodeKind::BlockStmt), 1);
        assert_eq!(counter.count(NodeKind::ExprStmt), 2);
        assert_eq!(counter.count(NodeKind::Identifier), 2);
        assert_eq!(counter.count(NodeKind::ReferenceExpr), 1);
        assert_eq!(counter.count(NodeKind::WhileStmt), 0);
    }

    #[test]
    fn test_error_collector_does_not_descend_into_errors() {
        let node = Node::ret(Node::error(ErrorValue::new("InternalError", "boom")));
        let errors = ErrorCollector::collect(&node);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].name, "InternalError");
    }

    #[test]
    fn test_error_collector_skips_references() {
        let node = Node::block(vec![
            Node::ExprStmt {
                expr: Box::new(Node::ReferenceExpr {
                    path: "bus".to_string(),
                    reference: "bus".to_string(),
                }),
            },
            Node::error(ErrorValue::new("UnsupportedConstructError", "this")),
        ]);

        let mut collector = ErrorCollector::default();
        collector.visit(&node);
        assert_eq!(collector.errors, vec![&ErrorValue::new("UnsupportedConstructError", "this")]);
    }
}
