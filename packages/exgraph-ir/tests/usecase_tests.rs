//! Batch compilation through the application layer

mod common;

use std::io::Write;

use common::*;
use exgraph_ir::{
    Ast, CompilationUnit, ExprKind, ExpressionBuilderUseCase, ExpressionBuilderUseCaseImpl,
    ExpressionConfig, Preset,
};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

fn units() -> Vec<CompilationUnit> {
    (0..16)
        .map(|i| {
            let path = if i % 4 == 3 {
                format!("deps/lib_{i}/lib/dep.ex")
            } else {
                format!("lib/mod_{i}.ex")
            };
            CompilationUnit::new(path, kitchen_sink())
        })
        .collect()
}

#[test]
fn test_batch_keeps_order_and_skips_dependencies() {
    let usecase = ExpressionBuilderUseCaseImpl::new(
        ExpressionConfig::preset(Preset::Full).parallelism(4),
    );
    let results = usecase.compile_units(units());
    assert_eq!(results.len(), 16);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.outcome.is_skip(), i % 4 == 3, "{}", result.path);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let parallel = ExpressionBuilderUseCaseImpl::new(
        ExpressionConfig::preset(Preset::Full).parallelism(8),
    );
    let single = ExpressionBuilderUseCaseImpl::new(
        ExpressionConfig::preset(Preset::Full).parallelism(1),
    );
    assert_eq!(parallel.compile_units(units()), single.compile_units(units()));
}

#[test]
fn test_merged_graph_keeps_files_apart() {
    let usecase = ExpressionBuilderUseCaseImpl::new(ExpressionConfig::preset(Preset::Full));
    let results = usecase.compile_units(vec![
        CompilationUnit::new("lib/a.ex", three_clause_case()),
        CompilationUnit::new("lib/b.ex", three_clause_case()),
    ]);
    let merged = usecase.merge(&results);
    assert_eq!(merged.nodes_of_kind(ExprKind::CaseExpression).len(), 2);
    assert_eq!(
        merged.len(),
        results.iter().map(|r| r.triple_count()).sum::<usize>()
    );
}

#[test]
fn test_yaml_config_drives_batch() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "version: 1\npreset: full\noverrides:\n  base_iri: \"urn:proj/\"\n  parallelism: 2\n"
    )
    .unwrap();

    let config = ExpressionConfig::from_yaml(file.path()).unwrap();
    let usecase = ExpressionBuilderUseCaseImpl::new(config);
    let result = usecase.compile_unit(&CompilationUnit::new("lib/x.ex", Ast::int(1)));
    assert_eq!(result.outcome.root(), Some("urn:proj/lib/x.ex/expr/0"));
}

#[test]
fn test_units_from_json() {
    let json = Ast::op("+", Ast::int(1), Ast::int(2)).to_json().unwrap();
    let unit = CompilationUnit::from_json("lib/j.ex", &json).unwrap();
    let usecase = ExpressionBuilderUseCaseImpl::new(ExpressionConfig::preset(Preset::Full));
    let result = usecase.compile_unit(&unit);
    let (root, graph) = compiled(result.outcome);
    assert_kind(&graph, &root, ExprKind::ArithmeticOperator);
}
