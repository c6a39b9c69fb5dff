//! Whole-project transform tests
//!
//! Each test loads a project from `test-projects/`, transforms its sources
//! against the project's declared types and checks the rewritten text.

use expect_test::expect;
use lowering_tests::TestProject;
use rf_driver::ConstructKind;
use std::path::PathBuf;

#[test]
fn test_01_table_handler() {
    let project = TestProject::load("01-table-handler").unwrap();
    let output = project.transform("src/handler.ts").unwrap();

    assert_eq!(output.rewrites.len(), 1);
    assert_eq!(output.rewrites[0].kind, ConstructKind::Reflect);
    assert!(output.rewrites[0].ir.errors().is_empty());
    expect![[r#"
        import * as $ir from "refract/ir";
        import { reflect } from "refract";

        export const handler = reflect(new $ir.FunctionDecl([new $ir.ParameterDecl("id")], new $ir.BlockStmt([new $ir.ReturnStmt(new $ir.CallExpr(new $ir.Identifier("putItem"), [new $ir.Argument(new $ir.ReferenceExpr("table", () => table), "table"), new $ir.Argument(new $ir.ObjectLiteralExpr([new $ir.PropAssignExpr(new $ir.Identifier("id"), new $ir.Identifier("id"))]), "item")]))])));
    "#]]
    .assert_eq(&output.source);
}

#[test]
fn test_02_event_bus_with_config() {
    let project = TestProject::load("02-event-bus").unwrap();
    let outputs = project.transform_all().unwrap();

    let paths: Vec<PathBuf> = outputs.iter().map(|(path, _)| path.clone()).collect();
    assert_eq!(
        paths,
        vec![PathBuf::from("src/rules.test.ts"), PathBuf::from("src/rules.ts")]
    );

    let (_, excluded) = &outputs[0];
    assert!(excluded.excluded);
    assert_eq!(excluded.source, "bus.when(\"test\", (event) => true);\n");

    let (_, rules) = &outputs[1];
    assert!(!rules.excluded);
    assert_eq!(rules.rewrites[0].kind, ConstructKind::When);
    expect![[r#"
        import * as ir from "@acme/ir";
        bus.when("orders", new ir.FunctionDecl([new ir.ParameterDecl("event")], new ir.BlockStmt([new ir.ReturnStmt(new ir.BinaryExpr(new ir.PropAccessExpr(new ir.Identifier("event"), "source", undefined), "==", new ir.StringLiteralExpr("shop")))])));
    "#]]
    .assert_eq(&rules.source);
}

#[test]
fn test_03_step_function_after_shebang() {
    let project = TestProject::load("03-step-function").unwrap();
    let output = project.transform("src/workflow.ts").unwrap();

    assert_eq!(output.rewrites.len(), 1);
    assert_eq!(output.rewrites[0].kind, ConstructKind::StepFunction);
    expect![[r#"
        #!/usr/bin/env node
        import * as $ir from "refract/ir";
        const workflow = new StepFunction(stack, "Workflow", new $ir.FunctionDecl([new $ir.ParameterDecl("input")], new $ir.BlockStmt([new $ir.VariableStmt("order", new $ir.CallExpr(new $ir.ReferenceExpr("fetchOrder", () => fetchOrder), [new $ir.Argument(new $ir.PropAccessExpr(new $ir.Identifier("input"), "id", undefined), undefined)])), new $ir.IfStmt(new $ir.BinaryExpr(new $ir.PropAccessExpr(new $ir.Identifier("order"), "total", undefined), ">", new $ir.NumberLiteralExpr(100)), new $ir.BlockStmt([new $ir.ReturnStmt(new $ir.StringLiteralExpr("large"))]), undefined), new $ir.ReturnStmt(new $ir.StringLiteralExpr("small"))])));
    "#]]
    .assert_eq(&output.source);
}

#[test]
fn test_transform_is_deterministic() {
    let project = TestProject::load("03-step-function").unwrap();
    let first = project.transform_all().unwrap();
    let second = project.transform_all().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_project_from_temp_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("src")).unwrap();
    std::fs::write(
        dir.path().join("types.toml"),
        "[types.Resolver]\nstatics = { componentKind = { literal = \"Resolver\" } }\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("src/api.ts"),
        "new Resolver(($context, name) => name);\n",
    )
    .unwrap();

    let project = TestProject::from_dir(dir.path()).unwrap();
    let outputs = project.transform_all().unwrap();
    assert_eq!(outputs.len(), 1);

    let (_, output) = &outputs[0];
    assert_eq!(output.rewrites[0].kind, ConstructKind::Resolver);
    expect![[r#"
        import * as $ir from "refract/ir";
        new Resolver(new $ir.FunctionDecl([new $ir.ParameterDecl("name")], new $ir.BlockStmt([new $ir.ReturnStmt(new $ir.Identifier("name"))])));
    "#]]
    .assert_eq(&output.source);
}

#[test]
fn test_invalid_types_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("types.toml"), "[bindings]\ntable = \"Missing\"\n").unwrap();

    let error = TestProject::from_dir(dir.path()).err().unwrap();
    assert!(format!("{error:#}").contains("unknown type `Missing`"));
}
