//! Custom assertions for graph verification

use exgraph_ir::{ExprKind, Graph, Literal, Outcome, Predicate};

/// Unwrap a compiled outcome, failing on `Skip`
pub fn compiled(outcome: Outcome) -> (String, Graph) {
    match outcome {
        Outcome::Compiled { root, graph } => (root, graph),
        Outcome::Skip => panic!("Expected a compiled graph, got Skip"),
    }
}

/// Assert the node has the given class
pub fn assert_kind(graph: &Graph, node: &str, expected: ExprKind) {
    assert_eq!(
        graph.kind_of(node),
        Some(expected),
        "Node {node} has kind {:?}, expected {expected:?}",
        graph.kind_of(node)
    );
}

/// Assert the graph holds exactly `expected` nodes of a class
pub fn assert_kind_count(graph: &Graph, kind: ExprKind, expected: usize) {
    let nodes = graph.nodes_of_kind(kind);
    assert_eq!(
        nodes.len(),
        expected,
        "Expected {expected} {kind:?} nodes, got {}: {nodes:?}",
        nodes.len()
    );
}

/// Assert the node's single target over `predicate` and return it
pub fn single_target<'g>(graph: &'g Graph, node: &str, predicate: Predicate) -> &'g str {
    let targets = graph.targets(node, predicate);
    assert_eq!(
        targets.len(),
        1,
        "Expected one {predicate:?} target of {node}, got {targets:?}"
    );
    targets[0]
}

/// Assert no triple of the predicate exists anywhere in the graph
pub fn assert_no_predicate(graph: &Graph, predicate: Predicate) {
    let found: Vec<_> = graph
        .triples()
        .iter()
        .filter(|t| t.predicate == predicate)
        .collect();
    assert!(found.is_empty(), "Unexpected {predicate:?} triples: {found:?}");
}

pub fn assert_literal(graph: &Graph, node: &str, predicate: Predicate, expected: Literal) {
    assert_eq!(graph.literal(node, predicate), Some(&expected));
}
