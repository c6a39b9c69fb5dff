//! Nominal marker catalogue
//!
//! Library types announce what they are through literal-typed properties.
//! A resource handle carries `kind: "Table"`; a construct whose callbacks get
//! reflected carries a `componentKind` tag; a wrapped function carries the
//! callable brand whose type is the wrapped function's type.

use crate::{Type, TypeOracle};

/// Property holding a [`ReferenceKind`] tag
pub const REFERENCE_MARKER: &str = "kind";

/// Property (static or instance) holding a [`ComponentKind`] tag
pub const COMPONENT_MARKER: &str = "componentKind";

/// Property whose type is the signature-bearing function type of a wrapper
pub const CALLABLE_BRAND: &str = "__callableBrand";

/// Externally managed resources a reflected function may refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Managed compute endpoint
    Function,
    /// Managed table
    Table,
    /// Standard state machine
    StepFunction,
    /// Express state machine
    ExpressStepFunction,
    /// Event bus
    EventBus,
}

impl ReferenceKind {
    /// Every reference kind
    pub const ALL: [Self; 5] = [
        Self::Function,
        Self::Table,
        Self::StepFunction,
        Self::ExpressStepFunction,
        Self::EventBus,
    ];

    /// Parse a marker tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// The marker tag
    pub fn tag(self) -> &'static str {
        match self {
            Self::Function => "Function",
            Self::Table => "Table",
            Self::StepFunction => "StepFunction",
            Self::ExpressStepFunction => "ExpressStepFunction",
            Self::EventBus => "EventBus",
        }
    }
}

/// Constructs whose function arguments are reflected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// `new Resolver(f)`, reflecting `f`
    Resolver,
    /// Standard state machine, reflecting its trailing definition
    StepFunction,
    /// Express state machine, reflecting its trailing definition
    ExpressStepFunction,
    /// Event bus, whose `.when` predicates are reflected
    EventBus,
    /// Rule on an event bus, reflecting its predicate and its `.when` / `.map` callbacks
    EventBusRule,
    /// Transform of a rule's events, reflecting its leading function
    EventBusTransform,
}

impl ComponentKind {
    /// Every component kind
    pub const ALL: [Self; 6] = [
        Self::Resolver,
        Self::StepFunction,
        Self::ExpressStepFunction,
        Self::EventBus,
        Self::EventBusRule,
        Self::EventBusTransform,
    ];

    /// Parse a marker tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// The marker tag
    pub fn tag(self) -> &'static str {
        match self {
            Self::Resolver => "Resolver",
            Self::StepFunction => "StepFunction",
            Self::ExpressStepFunction => "ExpressStepFunction",
            Self::EventBus => "EventBus",
            Self::EventBusRule => "EventBusRule",
            Self::EventBusTransform => "EventBusTransform",
        }
    }
}

/// The reference kind `ty` declares through its `kind` property
pub fn reference_kind(oracle: &dyn TypeOracle, ty: &Type) -> Option<ReferenceKind> {
    oracle
        .property_type(ty, REFERENCE_MARKER)
        .as_ref()
        .and_then(Type::as_string_literal)
        .and_then(ReferenceKind::from_tag)
}

/// The component kind `ty` declares, checking statics before instance properties
pub fn component_kind(oracle: &dyn TypeOracle, ty: &Type) -> Option<ComponentKind> {
    oracle
        .static_property_type(ty, COMPONENT_MARKER)
        .or_else(|| oracle.property_type(ty, COMPONENT_MARKER))
        .as_ref()
        .and_then(Type::as_string_literal)
        .and_then(ComponentKind::from_tag)
}

/// The branded function type of a callable wrapper, if `ty` is one
pub fn callable_brand(oracle: &dyn TypeOracle, ty: &Type) -> Option<Type> {
    oracle.property_type(ty, CALLABLE_BRAND)
}
