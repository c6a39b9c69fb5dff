//! Type oracle capability for the lowering engine
//!
//! Lowering never depends on a concrete type checker. Everything it needs to
//! know about types (a node's resolved type, property lookups, call
//! signatures) is asked of a [`TypeOracle`]. The [`markers`] module holds the
//! nominal marker catalogue, and [`declared`] provides an oracle backed by a
//! TOML description of the types in play.

pub mod declared;
pub mod markers;

pub use declared::{DeclaredTypes, DeclaredTypesError};
pub use markers::{ComponentKind, ReferenceKind};

use rf_syntax::SyntaxNode;
use std::fmt;

/// A resolved type, as far as the lowering engine cares
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// A type known by name (`Table`, `number`, `EventBus`)
    Named(String),
    /// A string literal type, e.g. the `"Table"` in `kind: "Table"`
    StringLiteral(String),
}

impl Type {
    /// A named type
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// The literal value, if this is a string literal type
    pub fn as_string_literal(&self) -> Option<&str> {
        match self {
            Self::StringLiteral(value) => Some(value),
            Self::Named(_) => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => formatter.write_str(name),
            Self::StringLiteral(value) => write!(formatter, "\"{value}\""),
        }
    }
}

/// One parameter of a call signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Declared name, may be empty
    pub name: String,
    /// Whether this is a `...rest` parameter
    pub rest: bool,
}

impl Parameter {
    /// A positional parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rest: false,
        }
    }

    /// A `...rest` parameter collecting the remaining arguments
    pub fn rest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rest: true,
        }
    }
}

/// A call signature
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    /// Parameters in declaration order
    pub parameters: Vec<Parameter>,
}

impl Signature {
    /// A signature over `parameters`
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    /// Whether `argc` positional arguments can bind to this signature
    pub fn accepts(&self, argc: usize) -> bool {
        argc <= self.parameters.len() || self.parameters.iter().any(|param| param.rest)
    }
}

/// Pick the overload matching `argc`: the first one that accepts it, else the first
pub fn select_overload(signatures: &[Signature], argc: usize) -> Option<&Signature> {
    signatures
        .iter()
        .find(|signature| signature.accepts(argc))
        .or_else(|| signatures.first())
}

/// Type information the lowering engine consumes
///
/// Implementations answer questions about nodes of the syntax tree currently
/// being transformed. Any question may go unanswered (`None` / empty), which
/// the engine treats as "not a reference", "not a component" or "no usable
/// signature".
pub trait TypeOracle {
    /// Resolved type of an expression node
    fn type_of(&self, node: &SyntaxNode) -> Option<Type>;

    /// Type of instance property `name` on `ty`
    fn property_type(&self, ty: &Type, name: &str) -> Option<Type>;

    /// Type of static property `name` on the class `ty`
    fn static_property_type(&self, ty: &Type, name: &str) -> Option<Type>;

    /// Signature the invocation (call or `new`) resolves to
    fn resolved_signature(&self, invocation: &SyntaxNode) -> Option<Signature>;

    /// Every call signature of `ty`
    fn signatures_of(&self, ty: &Type) -> Vec<Signature>;

    /// Human-readable form of `ty`
    fn type_to_string(&self, ty: &Type) -> String {
        ty.to_string()
    }
}

/// An oracle that knows nothing
///
/// Lowering with it treats every identifier as a plain value and binds every
/// argument positionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTypes;

impl TypeOracle for NoTypes {
    fn type_of(&self, _node: &SyntaxNode) -> Option<Type> {
        None
    }

    fn property_type(&self, _ty: &Type, _name: &str) -> Option<Type> {
        None
    }

    fn static_property_type(&self, _ty: &Type, _name: &str) -> Option<Type> {
        None
    }

    fn resolved_signature(&self, _invocation: &SyntaxNode) -> Option<Signature> {
        None
    }

    fn signatures_of(&self, _ty: &Type) -> Vec<Signature> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overload_selection_by_arity() {
        let signatures = vec![
            Signature::new(vec![Parameter::new("a")]),
            Signature::new(vec![Parameter::new("a"), Parameter::new("b")]),
        ];
        assert_eq!(select_overload(&signatures, 2), Some(&signatures[1]));
        assert_eq!(select_overload(&signatures, 0), Some(&signatures[0]));
        assert_eq!(select_overload(&signatures, 5), Some(&signatures[0]));
        assert_eq!(select_overload(&[], 1), None);
    }

    #[test]
    fn test_rest_parameter_accepts_any_arity() {
        let signature = Signature::new(vec![Parameter::new("a"), Parameter::rest("rest")]);
        assert!(signature.accepts(10));
        assert!(!Signature::new(vec![Parameter::new("a")]).accepts(2));
    }

    #[test]
    fn test_type_display() {
        assert_eq!(Type::named("Table").to_string(), "Table");
        assert_eq!(Type::StringLiteral("Table".into()).to_string(), "\"Table\"");
        assert_eq!(NoTypes.type_to_string(&Type::named("number")), "number");
    }
}
