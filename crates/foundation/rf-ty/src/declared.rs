//! Declarative type oracle
//!
//! [`DeclaredTypes`] answers type questions from a small nominal model:
//! named bindings for free identifiers and a table of type definitions with
//! properties, statics, call signatures, a return type and an element type.
//! It is loaded from TOML or built in code.
//!
//! ```toml
//! [bindings]
//! table = "Table"
//!
//! [types.Table]
//! properties = { kind = { literal = "Table" }, name = "string" }
//!
//! [types.Resolver]
//! statics = { componentKind = { literal = "Resolver" } }
//! signatures = [{ params = ["request", "...rest"] }]
//! ```
//!
//! The signatures of a class type double as its constructor signatures.

use crate::{Parameter, Signature, Type, TypeOracle, select_overload};
use indexmap::IndexMap;
use rf_syntax::{SyntaxKind, SyntaxNode, literal};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Names every declaration may refer to without defining them
const PRIMITIVES: &[&str] = &[
    "string",
    "number",
    "boolean",
    "any",
    "unknown",
    "object",
    "void",
    "undefined",
    "null",
    "never",
];

/// Errors produced while loading type declarations
#[derive(Debug, Error)]
pub enum DeclaredTypesError {
    /// The declaration file could not be read
    #[error("failed to read type declarations from {path}")]
    Io {
        /// The file that was read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The declaration text is not valid
    #[error("invalid type declarations: {0}")]
    Parse(#[from] toml::de::Error),

    /// A declaration names a type that is neither declared nor primitive
    #[error("unknown type `{name}` referenced by {referenced_by}")]
    UnknownType {
        /// The unknown name
        name: String,
        /// The binding or type that mentions it
        referenced_by: String,
    },
}

/// Reference to a type inside a declaration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    /// `"Table"`
    Name(String),
    /// `{ literal = "Table" }`
    Literal {
        /// The literal string value
        literal: String,
    },
}

impl TypeRef {
    fn to_type(&self) -> Type {
        match self {
            Self::Name(name) => Type::Named(name.clone()),
            Self::Literal { literal } => Type::StringLiteral(literal.clone()),
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// A call signature as declared: parameter names, `...` marking a rest parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureDef {
    /// Parameter names in order; a `...` prefix marks the rest parameter
    #[serde(default)]
    pub params: Vec<String>,
}

impl SignatureDef {
    fn to_signature(&self) -> Signature {
        let parameters = self
            .params
            .iter()
            .map(|param| match param.strip_prefix("...") {
                Some(name) => Parameter::rest(name),
                None => Parameter::new(param.as_str()),
            })
            .collect();
        Signature::new(parameters)
    }
}

/// One declared type
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeDef {
    /// Instance properties
    pub properties: IndexMap<String, TypeRef>,
    /// Static properties of the class of this name
    pub statics: IndexMap<String, TypeRef>,
    /// Call signatures, which double as constructor signatures
    pub signatures: Vec<SignatureDef>,
    /// Type of a call's result
    pub returns: Option<TypeRef>,
    /// Element type, for array-like types
    pub element: Option<TypeRef>,
}

impl TypeDef {
    /// An empty declaration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance property of type `ty`
    #[must_use]
    pub fn property(mut self, name: &str, ty: impl Into<TypeRef>) -> Self {
        self.properties.insert(name.to_string(), ty.into());
        self
    }

    /// Add an instance property whose type is the string literal `value`
    #[must_use]
    pub fn literal_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            TypeRef::Literal {
                literal: value.to_string(),
            },
        );
        self
    }

    /// Add a static property whose type is the string literal `value`
    #[must_use]
    pub fn literal_static(mut self, name: &str, value: &str) -> Self {
        self.statics.insert(
            name.to_string(),
            TypeRef::Literal {
                literal: value.to_string(),
            },
        );
        self
    }

    /// Add a call signature; see [`SignatureDef::params`]
    #[must_use]
    pub fn signature(mut self, params: &[&str]) -> Self {
        self.signatures.push(SignatureDef {
            params: params.iter().map(|param| (*param).to_string()).collect(),
        });
        self
    }

    /// Set the call result type
    #[must_use]
    pub fn returns(mut self, ty: impl Into<TypeRef>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    /// Set the element type
    #[must_use]
    pub fn element(mut self, ty: impl Into<TypeRef>) -> Self {
        self.element = Some(ty.into());
        self
    }
}

/// Type oracle backed by declared bindings and types
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeclaredTypes {
    bindings: IndexMap<String, TypeRef>,
    types: IndexMap<String, TypeDef>,
}

impl DeclaredTypes {
    /// An oracle with no declarations
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate declarations from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for the declaration
    /// schema, or if a declaration refers to an undeclared type.
    pub fn from_toml_str(text: &str) -> Result<Self, DeclaredTypesError> {
        let declared: Self = toml::from_str(text)?;
        declared.validate()?;
        Ok(declared)
    }

    /// Load declarations from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn load(path: &Path) -> Result<Self, DeclaredTypesError> {
        let text = std::fs::read_to_string(path).map_err(|source| DeclaredTypesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Bind a free identifier to a type
    #[must_use]
    pub fn bind(mut self, name: &str, ty: impl Into<TypeRef>) -> Self {
        self.bindings.insert(name.to_string(), ty.into());
        self
    }

    /// Declare a type
    #[must_use]
    pub fn define(mut self, name: &str, def: TypeDef) -> Self {
        self.types.insert(name.to_string(), def);
        self
    }

    /// Check that every named type reference resolves
    ///
    /// # Errors
    ///
    /// Returns the first reference to a type that is neither declared nor primitive.
    pub fn validate(&self) -> Result<(), DeclaredTypesError> {
        for (name, ty) in &self.bindings {
            self.check_ref(ty, || format!("binding `{name}`"))?;
        }
        for (type_name, def) in &self.types {
            for (name, ty) in &def.properties {
                self.check_ref(ty, || format!("property `{type_name}.{name}`"))?;
            }
            for (name, ty) in &def.statics {
                self.check_ref(ty, || format!("static `{type_name}.{name}`"))?;
            }
            if let Some(ty) = &def.returns {
                self.check_ref(ty, || format!("return type of `{type_name}`"))?;
            }
            if let Some(ty) = &def.element {
                self.check_ref(ty, || format!("element type of `{type_name}`"))?;
            }
        }
        Ok(())
    }

    fn check_ref(
        &self,
        ty: &TypeRef,
        referenced_by: impl FnOnce() -> String,
    ) -> Result<(), DeclaredTypesError> {
        match ty {
            TypeRef::Name(name)
                if !self.types.contains_key(name) && !PRIMITIVES.contains(&name.as_str()) =>
            {
                Err(DeclaredTypesError::UnknownType {
                    name: name.clone(),
                    referenced_by: referenced_by(),
                })
            }
            _ => Ok(()),
        }
    }

    fn def(&self, ty: &Type) -> Option<&TypeDef> {
        match ty {
            Type::Named(name) => self.types.get(name),
            Type::StringLiteral(_) => None,
        }
    }

    /// Type of a free identifier: its binding, else the declared type of that name
    fn resolve_name(&self, name: &str) -> Option<Type> {
        self.bindings
            .get(name)
            .map(TypeRef::to_type)
            .or_else(|| self.types.contains_key(name).then(|| Type::named(name)))
    }

    fn element_type(&self, ty: &Type) -> Option<Type> {
        self.def(ty)?.element.as_ref().map(TypeRef::to_type)
    }
}

impl TypeOracle for DeclaredTypes {
    fn type_of(&self, node: &SyntaxNode) -> Option<Type> {
        match node.kind {
            SyntaxKind::Identifier | SyntaxKind::ShorthandPropertyIdentifier => {
                self.resolve_name(&node.text)
            }
            SyntaxKind::MemberExpression => {
                let object = self.type_of(node.child_by_field("object")?)?;
                self.property_type(&object, &node.child_by_field("property")?.text)
            }
            SyntaxKind::SubscriptExpression => {
                let object = self.type_of(node.child_by_field("object")?)?;
                let index = node.child_by_field("index")?;
                if index.kind == SyntaxKind::String {
                    self.property_type(&object, &literal::string_value(&index.text))
                        .or_else(|| self.element_type(&object))
                } else {
                    self.element_type(&object)
                }
            }
            SyntaxKind::CallExpression => {
                let callee = self.type_of(node.callee()?)?;
                self.def(&callee)?.returns.as_ref().map(TypeRef::to_type)
            }
            SyntaxKind::NewExpression => self.type_of(node.callee()?),
            SyntaxKind::ParenthesizedExpression
            | SyntaxKind::AsExpression
            | SyntaxKind::SatisfiesExpression
            | SyntaxKind::NonNullExpression => self.type_of(node.first_named_child()?),
            SyntaxKind::TypeAssertion => self.type_of(node.named_children().last()?),
            SyntaxKind::String => Some(Type::StringLiteral(literal::string_value(&node.text))),
            SyntaxKind::TemplateString => Some(Type::named("string")),
            SyntaxKind::Number => Some(Type::named("number")),
            SyntaxKind::True | SyntaxKind::False => Some(Type::named("boolean")),
            _ => None,
        }
    }

    fn property_type(&self, ty: &Type, name: &str) -> Option<Type> {
        self.def(ty)?.properties.get(name).map(TypeRef::to_type)
    }

    fn static_property_type(&self, ty: &Type, name: &str) -> Option<Type> {
        self.def(ty)?.statics.get(name).map(TypeRef::to_type)
    }

    fn resolved_signature(&self, invocation: &SyntaxNode) -> Option<Signature> {
        let callee = self.type_of(invocation.callee()?)?;
        let signatures = self.signatures_of(&callee);
        select_overload(&signatures, invocation.call_arguments().len()).cloned()
    }

    fn signatures_of(&self, ty: &Type) -> Vec<Signature> {
        self.def(ty)
            .map(|def| def.signatures.iter().map(SignatureDef::to_signature).collect())
            .unwrap_or_default()
    }
}
