//! End-to-end compilation tests
//!
//! Each test compiles a quoted AST in a fresh project context and inspects
//! the resulting triples.

mod common;

use common::*;
use exgraph_ir::shared::models::{Object, Triple};
use exgraph_ir::{Ast, ExprKind, FileKind, Graph, Literal, Predicate};
use pretty_assertions::assert_eq;

fn id(n: u64) -> String {
    format!("{BASE}expr/{n}")
}

// ═══════════════════════════════════════════════════════════════════════════
// Arithmetic (exact graph)
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_binary_arithmetic_exact_triples() {
    let (root, graph) = compiled(compile(&Ast::op("+", Ast::int(1), Ast::int(2))));
    assert_eq!(root, id(0));

    let expected = vec![
        Triple::new(id(0), Predicate::Type, Object::Class(ExprKind::ArithmeticOperator)),
        Triple::literal(id(0), Predicate::OperatorSymbol, Literal::string("+")),
        Triple::edge(id(0), Predicate::LeftOperand, id(1)),
        Triple::new(id(1), Predicate::Type, Object::Class(ExprKind::IntegerLiteral)),
        Triple::literal(id(1), Predicate::Value, Literal::integer(1)),
        Triple::edge(id(0), Predicate::RightOperand, id(2)),
        Triple::new(id(2), Predicate::Type, Object::Class(ExprKind::IntegerLiteral)),
        Triple::literal(id(2), Predicate::Value, Literal::integer(2)),
    ];
    assert_eq!(graph.triples(), expected.as_slice());

    assert_kind_count(&graph, ExprKind::ArithmeticOperator, 1);
    assert_kind_count(&graph, ExprKind::IntegerLiteral, 2);
    let values = graph
        .triples()
        .iter()
        .filter(|t| t.predicate == Predicate::Value)
        .count();
    assert_eq!(values, 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// Pattern dispatch without else
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_case_without_else_emits_no_else_clause() {
    let (root, graph) = compiled(compile(&three_clause_case()));
    assert_kind(&graph, &root, ExprKind::CaseExpression);
    assert_eq!(graph.targets(&root, Predicate::Clause).len(), 3);
    assert_no_predicate(&graph, Predicate::ElseClause);
    assert_kind_count(&graph, ExprKind::MatchClause, 3);
}

// ═══════════════════════════════════════════════════════════════════════════
// Ranges
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_range_with_and_without_step() {
    let stepped = Ast::call("..//", vec![Ast::int(1), Ast::int(10), Ast::int(2)]);
    let (root, graph) = compiled(compile(&stepped));
    assert_kind(&graph, &root, ExprKind::RangeLiteral);
    single_target(&graph, &root, Predicate::RangeStart);
    single_target(&graph, &root, Predicate::RangeEnd);
    single_target(&graph, &root, Predicate::RangeStep);

    let plain = Ast::call("..", vec![Ast::int(1), Ast::int(10)]);
    let (root, graph) = compiled(compile(&plain));
    single_target(&graph, &root, Predicate::RangeStart);
    single_target(&graph, &root, Predicate::RangeEnd);
    assert_no_predicate(&graph, Predicate::RangeStep);
}

// ═══════════════════════════════════════════════════════════════════════════
// Boundaries
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_empty_list_is_empty_charlist() {
    let (root, graph) = compiled(compile(&Ast::list(vec![])));
    assert_kind(&graph, &root, ExprKind::CharlistLiteral);
    assert_literal(&graph, &root, Predicate::Value, Literal::string(""));
}

#[test]
fn test_empty_map_has_no_entries() {
    let (root, graph) = compiled(compile(&Ast::call("%{}", vec![])));
    assert_kind(&graph, &root, ExprKind::MapLiteral);
    assert_eq!(graph.len(), 1);
}

#[test]
fn test_charlist_and_integer_list() {
    // 'hi'
    let (root, graph) = compiled(compile(&Ast::list(vec![Ast::int(104), Ast::int(105)])));
    assert_kind(&graph, &root, ExprKind::CharlistLiteral);
    assert_literal(&graph, &root, Predicate::Value, Literal::string("hi"));

    // [-1, 2] cannot be text
    let (root, graph) = compiled(compile(&Ast::list(vec![Ast::int(-1), Ast::int(2)])));
    assert_kind(&graph, &root, ExprKind::ListLiteral);
    assert_eq!(graph.targets(&root, Predicate::Element).len(), 2);
}

#[test]
fn test_interpolated_string_falls_back() {
    // "hi #{name}"
    let interpolated = Ast::call(
        "<<>>",
        vec![
            Ast::string("hi "),
            Ast::op(
                "::",
                Ast::remote(Ast::aliases(&["Kernel"]), "to_string", vec![Ast::var("name")]),
                Ast::var("binary"),
            ),
        ],
    );
    let (root, graph) = compiled(compile(&interpolated));
    assert_kind(&graph, &root, ExprKind::UnknownExpression);
    assert_literal(
        &graph,
        &root,
        Predicate::Diagnostic,
        Literal::string("non-literal binary"),
    );
}

#[test]
fn test_literal_binary() {
    let bytes = Ast::call("<<>>", vec![Ast::int(1), Ast::int(255)]);
    let (root, graph) = compiled(compile(&bytes));
    assert_kind(&graph, &root, ExprKind::BinaryLiteral);
    assert_literal(&graph, &root, Predicate::Value, Literal::hex_binary(&[1, 255]));
}

#[test]
fn test_unknown_call_head_degrades() {
    // A list in head position is not a call
    let weird = Ast::form(
        Ast::list(vec![Ast::int(1)]),
        exgraph_ir::shared::models::Args::List(vec![]),
    );
    let (root, graph) = compiled(compile(&weird));
    assert_kind(&graph, &root, ExprKind::UnknownExpression);
    assert_eq!(graph.len(), 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// Mode gating
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_mode_gating() {
    let ast = Ast::op("+", Ast::int(1), Ast::int(2));
    for (kind, full_mode, compiles) in [
        (FileKind::Project, true, true),
        (FileKind::Project, false, false),
        (FileKind::Dependency, true, false),
        (FileKind::Dependency, false, false),
    ] {
        let outcome = exgraph_ir::compile_expression(Some(&ast), BASE, kind, full_mode);
        assert_eq!(!outcome.is_skip(), compiles, "{kind:?} full_mode={full_mode}");
    }
    assert!(exgraph_ir::compile_expression(None, BASE, FileKind::Project, true).is_skip());
}

// ═══════════════════════════════════════════════════════════════════════════
// Determinism and structure
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_compilation_is_deterministic() {
    let ast = kitchen_sink();
    let first: Graph = compiled(compile(&ast)).1;
    let second: Graph = compiled(compile(&ast)).1;
    assert_eq!(first, second);
}

#[test]
fn test_every_node_is_typed_once() {
    let (_, graph) = compiled(compile(&kitchen_sink()));
    let mut subjects: Vec<&str> = graph.triples().iter().map(|t| t.subject.as_str()).collect();
    subjects.sort_unstable();
    subjects.dedup();
    for subject in subjects {
        let types = graph.objects(subject, Predicate::Type);
        assert_eq!(types.len(), 1, "{subject} has types {types:?}");
    }
}

#[test]
fn test_ids_are_preorder() {
    // [a, [b]]: outer 0, a 1, inner 2, b 3
    let ast = Ast::list(vec![Ast::var("a"), Ast::list(vec![Ast::var("b")])]);
    let (root, graph) = compiled(compile(&ast));
    assert_eq!(root, id(0));
    let elements = graph.targets(&root, Predicate::Element);
    assert_eq!(elements, vec![id(1).as_str(), id(2).as_str()]);
    assert_eq!(graph.targets(&id(2), Predicate::Element), vec![id(3).as_str()]);
}

#[test]
fn test_locations_are_emitted() {
    let ast = Ast::var("x").at(3, 7);
    let (root, graph) = compiled(compile(&ast));
    assert_literal(&graph, &root, Predicate::StartLine, Literal::count(3));
    assert_literal(&graph, &root, Predicate::StartColumn, Literal::count(7));
}

// ═══════════════════════════════════════════════════════════════════════════
// JSON input
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_json_ast_compiles() {
    let ast = Ast::remote(Ast::aliases(&["Enum"]), "sum", vec![Ast::var("xs")]);
    let json = ast.to_json().unwrap();
    let decoded = Ast::from_json(&json).unwrap();
    assert_eq!(decoded, ast);

    let (root, graph) = compiled(compile(&decoded));
    assert_kind(&graph, &root, ExprKind::RemoteCall);
    assert_literal(&graph, &root, Predicate::RefersToModule, Literal::string("Enum"));
}

#[test]
fn test_integer_beyond_i64_compiles_exactly() {
    // [18446744073709551616, 1]
    let json = r#"{"t": "list", "v": [
        {"t": "integer", "v": 18446744073709551616},
        {"t": "integer", "v": 1}
    ]}"#;
    let decoded = Ast::from_json(json).unwrap();

    let (root, graph) = compiled(compile(&decoded));
    assert_kind(&graph, &root, ExprKind::ListLiteral);
    let big = graph.targets(&root, Predicate::Element)[0];
    assert_kind(&graph, big, ExprKind::IntegerLiteral);
    let value = graph.literal(big, Predicate::Value).unwrap();
    assert_eq!(value.lexical, "18446744073709551616");
    assert_eq!(value.datatype, exgraph_ir::shared::models::Datatype::Integer);
    assert_kind_count(&graph, ExprKind::UnknownExpression, 0);
}

#[test]
fn test_invalid_json_is_a_parse_error() {
    let err = Ast::from_json("{\"t\": \"nope\"}").unwrap_err();
    assert_eq!(err.kind, exgraph_ir::shared::models::ErrorKind::Parse);
}
