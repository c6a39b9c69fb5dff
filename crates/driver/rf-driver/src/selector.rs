//! Construct selector
//!
//! Decides which call and construction sites hold reflected functions. The
//! rules are tried in a fixed order and the first match wins:
//! 1. `reflect(f)` with exactly one argument
//! 2. `new C(...)` where `C` carries a component marker and the arity fits
//! 3. `.when(...)` / `.map(...)` on an event bus or rule, trailing function argument
//!
//! Anything else, including a marked construct with an unexpected arity, is
//! not a match and passes through untouched.

use rf_syntax::{SyntaxKind, SyntaxNode};
use rf_ty::{ComponentKind, TypeOracle, markers};
use serde::Serialize;
use std::fmt;

/// The construct a match was recognized as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstructKind {
    /// `reflect(f)`
    Reflect,
    /// `new Resolver(f)`
    Resolver,
    /// `new StepFunction(scope, id, [props,] f)`
    StepFunction,
    /// `new ExpressStepFunction(scope, id, [props,] f)`
    ExpressStepFunction,
    /// `new EventBusRule(scope, id, bus, predicate)`
    EventBusRule,
    /// `new EventBusTransform(f, rule)`
    EventBusTransform,
    /// `bus.when(...)` / `rule.when(...)`
    When,
    /// `rule.map(...)`
    Map,
}

impl ConstructKind {
    /// Name used in logs and reports
    pub fn name(self) -> &'static str {
        match self {
            Self::Reflect => "reflect",
            Self::Resolver => "Resolver",
            Self::StepFunction => "StepFunction",
            Self::ExpressStepFunction => "ExpressStepFunction",
            Self::EventBusRule => "EventBusRule",
            Self::EventBusTransform => "EventBusTransform",
            Self::When => "when",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Which arguments of a matched site are reflected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorMatch {
    /// What was matched
    pub kind: ConstructKind,
    /// Indices of the reflected arguments
    pub reflect: Vec<usize>,
    /// Leading parameters of the reflected function supplied by the framework
    pub drop_args: usize,
}

impl SelectorMatch {
    fn new(kind: ConstructKind, slot: usize) -> Self {
        Self {
            kind,
            reflect: vec![slot],
            drop_args: 0,
        }
    }
}

/// Test `node` against the selector rules
pub fn select(oracle: &dyn TypeOracle, node: &SyntaxNode) -> Option<SelectorMatch> {
    match node.kind {
        SyntaxKind::CallExpression => select_reflect(node).or_else(|| select_event_method(oracle, node)),
        SyntaxKind::NewExpression => select_component(oracle, node),
        _ => None,
    }
}

fn select_reflect(node: &SyntaxNode) -> Option<SelectorMatch> {
    let callee = node.callee()?;
    let is_reflect = callee.kind == SyntaxKind::Identifier && callee.text == "reflect";
    (is_reflect && node.call_arguments().len() == 1)
        .then(|| SelectorMatch::new(ConstructKind::Reflect, 0))
}

fn select_component(oracle: &dyn TypeOracle, node: &SyntaxNode) -> Option<SelectorMatch> {
    let class = oracle.type_of(node.callee()?);
    let component = class
        .as_ref()
        .and_then(|class| markers::component_kind(oracle, class))
        .or_else(|| {
            let instance = oracle.type_of(node)?;
            markers::component_kind(oracle, &instance)
        })?;

    let argc = node.call_arguments().len();
    let found = match (component, argc) {
        (ComponentKind::Resolver, 1) => SelectorMatch {
            drop_args: 1,
            ..SelectorMatch::new(ConstructKind::Resolver, 0)
        },
        (ComponentKind::StepFunction, 3 | 4) => {
            SelectorMatch::new(ConstructKind::StepFunction, argc - 1)
        }
        (ComponentKind::ExpressStepFunction, 3 | 4) => {
            SelectorMatch::new(ConstructKind::ExpressStepFunction, argc - 1)
        }
        (ComponentKind::EventBusRule, 4) => SelectorMatch::new(ConstructKind::EventBusRule, 3),
        (ComponentKind::EventBusTransform, 2) => {
            SelectorMatch::new(ConstructKind::EventBusTransform, 0)
        }
        _ => {
            log::trace!("`{}` is a {} with {argc} arguments, not reflected", node.text, component.tag());
            return None;
        }
    };
    Some(found)
}

fn select_event_method(oracle: &dyn TypeOracle, node: &SyntaxNode) -> Option<SelectorMatch> {
    let callee = node.callee()?;
    if callee.kind != SyntaxKind::MemberExpression {
        return None;
    }
    let kind = match callee.child_by_field("property")?.text.as_str() {
        "when" => ConstructKind::When,
        "map" => ConstructKind::Map,
        _ => return None,
    };

    let receiver = oracle.type_of(callee.child_by_field("object")?)?;
    if !matches!(
        markers::component_kind(oracle, &receiver),
        Some(ComponentKind::EventBus | ComponentKind::EventBusRule)
    ) {
        return None;
    }

    let args = node.call_arguments();
    let slot = args.len().checked_sub(1)?;
    let trailing = args[slot];
    let function_typed = matches!(
        trailing.kind,
        SyntaxKind::ArrowFunction | SyntaxKind::FunctionExpression
    ) || oracle
        .type_of(trailing)
        .is_some_and(|ty| !oracle.signatures_of(&ty).is_empty());

    function_typed.then(|| SelectorMatch::new(kind, slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_ty::declared::TypeDef;
    use rf_ty::{DeclaredTypes, NoTypes};

    fn parse(source: &str) -> SyntaxNode {
        rf_parser::parse_source(source).syntax.unwrap()
    }

    fn first(root: &SyntaxNode, kind: SyntaxKind) -> &SyntaxNode {
        root.find(&|node| node.kind == kind).unwrap()
    }

    fn catalogue() -> DeclaredTypes {
        DeclaredTypes::new()
            .bind("bus", "EventBus")
            .bind("rule", "EventBusRule")
            .bind("predicate", "Predicate")
            .bind("table", "Table")
            .define("Resolver", TypeDef::new().literal_static("componentKind", "Resolver"))
            .define(
                "StepFunction",
                TypeDef::new().literal_static("componentKind", "StepFunction"),
            )
            .define(
                "ExpressStepFunction",
                TypeDef::new().literal_property("componentKind", "ExpressStepFunction"),
            )
            .define(
                "EventBusRule",
                TypeDef::new().literal_property("componentKind", "EventBusRule"),
            )
            .define(
                "EventBusTransform",
                TypeDef::new().literal_static("componentKind", "EventBusTransform"),
            )
            .define("EventBus", TypeDef::new().literal_property("componentKind", "EventBus"))
            .define("Predicate", TypeDef::new().signature(&["event"]))
            .define("Table", TypeDef::new().literal_property("kind", "Table"))
    }

    fn select_new(source: &str) -> Option<SelectorMatch> {
        let root = parse(source);
        select(&catalogue(), first(&root, SyntaxKind::NewExpression))
    }

    fn select_call(source: &str) -> Option<SelectorMatch> {
        let root = parse(source);
        select(&catalogue(), first(&root, SyntaxKind::CallExpression))
    }

    #[test]
    fn test_reflect_needs_exactly_one_argument() {
        let root = parse("reflect(() => 1);");
        let call = first(&root, SyntaxKind::CallExpression);
        assert_eq!(
            select(&NoTypes, call),
            Some(SelectorMatch::new(ConstructKind::Reflect, 0))
        );
        assert_eq!(select_call("reflect(a, b);"), None);
        assert_eq!(select_call("reflect();"), None);
        assert_eq!(select_call("other.reflect(a);"), None);
    }

    #[test]
    fn test_resolver_drops_context_parameter() {
        assert_eq!(
            select_new("new Resolver(($context) => 1);"),
            Some(SelectorMatch {
                kind: ConstructKind::Resolver,
                reflect: vec![0],
                drop_args: 1,
            })
        );
        assert_eq!(select_new("new Resolver(a, b);"), None);
    }

    #[test]
    fn test_step_function_slot_depends_on_arity() {
        assert_eq!(
            select_new("new StepFunction(scope, 'id', () => {});").map(|found| found.reflect),
            Some(vec![2])
        );
        assert_eq!(
            select_new("new StepFunction(scope, 'id', props, () => {});").map(|found| found.reflect),
            Some(vec![3])
        );
        assert_eq!(select_new("new StepFunction(scope, 'id');"), None);
    }

    #[test]
    fn test_instance_marker_is_honoured() {
        let found = select_new("new ExpressStepFunction(scope, 'id', () => {});").unwrap();
        assert_eq!(found.kind, ConstructKind::ExpressStepFunction);
        assert_eq!(found.reflect, vec![2]);
    }

    #[test]
    fn test_event_bus_constructs() {
        assert_eq!(
            select_new("new EventBusRule(scope, 'id', bus, (event) => true);").map(|found| found.reflect),
            Some(vec![3])
        );
        assert_eq!(select_new("new EventBusRule(scope, 'id', bus);"), None);
        assert_eq!(
            select_new("new EventBusTransform((event) => event.detail, rule);").map(|found| found.reflect),
            Some(vec![0])
        );
    }

    #[test]
    fn test_unmarked_constructs_pass_through() {
        assert_eq!(select_new("new Table(() => 1);"), None);
        assert_eq!(select_new("new Unknown(() => 1);"), None);
    }

    #[test]
    fn test_when_and_map_need_event_receivers() {
        assert_eq!(
            select_call("bus.when('rule', (event) => true);"),
            Some(SelectorMatch::new(ConstructKind::When, 1))
        );
        assert_eq!(
            select_call("rule.map(function (event) { return event; });"),
            Some(SelectorMatch::new(ConstructKind::Map, 0))
        );
        assert_eq!(select_call("rule.when(predicate);"), Some(SelectorMatch::new(ConstructKind::When, 0)));
        assert_eq!(select_call("items.map((item) => item);"), None);
        assert_eq!(select_call("table.map((item) => item);"), None);
        assert_eq!(select_call("bus.when('rule', table);"), None);
        assert_eq!(select_call("bus.when();"), None);
        assert_eq!(select_call("bus.filter((event) => true);"), None);
    }
}
