//! Expression Builder Domain - Port/Adapter Interface

use crate::config::ExpressionConfig;
use crate::shared::models::{
    Ast, ExpressionNode, FileKind, Graph, Literal, NodeId, Predicate, Triple,
};
use crate::shared::utils::id_generator::IdGenerator;

/// Expression Builder Trait (Port)
pub trait ExpressionBuilderTrait {
    /// Compile one expression subtree; `None` is the absent expression
    fn build(&self, ast: Option<&Ast>, ctx: &mut CompileContext) -> Outcome;
}

/// Per-file compilation state
///
/// Created once per file, discarded after. Owns the id counter, so ids are
/// unique within the file and independent of any other file compiled
/// concurrently.
#[derive(Debug, Clone)]
pub struct CompileContext {
    /// Prefix of every id minted in this context
    pub base_iri: String,

    /// Source file the subtree came from (informational)
    pub file_path: Option<String>,

    pub file_kind: FileKind,

    /// Global "full expression extraction" switch
    pub full_mode: bool,

    ids: IdGenerator,
}

impl CompileContext {
    pub fn new(base_iri: impl Into<String>, file_kind: FileKind, full_mode: bool) -> Self {
        let base_iri = base_iri.into();
        Self {
            ids: IdGenerator::new(&base_iri),
            base_iri,
            file_path: None,
            file_kind,
            full_mode,
        }
    }

    /// Context for one file: classification and base IRI come from the config
    ///
    /// The file path becomes part of the base IRI so ids stay unique when the
    /// graphs of several files are merged.
    pub fn for_file(config: &ExpressionConfig, file_path: &str) -> Self {
        let base_iri = format!("{}{}/", config.base_iri, iri_path_segment(file_path));
        let mut ctx = Self::new(
            base_iri,
            config.classify_path(file_path),
            config.include_expressions,
        );
        ctx.file_path = Some(file_path.to_string());
        ctx
    }

    /// Allocate the next node id
    pub fn next_id(&mut self) -> NodeId {
        self.ids.next_id()
    }

    pub fn ids_allocated(&self) -> u64 {
        self.ids.allocated()
    }
}

/// Normalize a file path for use inside an IRI
fn iri_path_segment(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let trimmed = normalized.trim_start_matches("./").trim_start_matches('/');
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        match ch {
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '%' => out.push_str("%25"),
            _ => out.push(ch),
        }
    }
    out
}

/// Result of compiling one subtree
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Absent input or light mode
    Skip,
    Compiled { root: NodeId, graph: Graph },
}

impl Outcome {
    pub fn is_skip(&self) -> bool {
        matches!(self, Outcome::Skip)
    }

    pub fn root(&self) -> Option<&str> {
        match self {
            Outcome::Compiled { root, .. } => Some(root),
            Outcome::Skip => None,
        }
    }

    pub fn graph(&self) -> Option<&Graph> {
        match self {
            Outcome::Compiled { graph, .. } => Some(graph),
            Outcome::Skip => None,
        }
    }

    pub fn into_graph(self) -> Option<Graph> {
        match self {
            Outcome::Compiled { graph, .. } => Some(graph),
            Outcome::Skip => None,
        }
    }
}

/// `(node_id, triples)` produced by one compiler branch
///
/// Parents absorb their children's triples when linking them.
#[derive(Debug, Clone)]
pub struct Built {
    pub id: NodeId,
    pub triples: Vec<Triple>,
}

impl Built {
    pub fn new(node: ExpressionNode) -> Self {
        let id = node.id.clone();
        Self {
            id,
            triples: node.into_triples(),
        }
    }

    /// `(self, predicate, literal)`
    pub fn literal(&mut self, predicate: Predicate, value: Literal) {
        self.triples
            .push(Triple::literal(self.id.clone(), predicate, value));
    }

    /// `(self, predicate, child)` plus the child's own triples
    pub fn child(&mut self, predicate: Predicate, child: Built) {
        self.triples
            .push(Triple::edge(self.id.clone(), predicate, child.id));
        self.triples.extend(child.triples);
    }

    /// Like [`child`](Self::child), also tagging the child with its position
    pub fn child_at(&mut self, predicate: Predicate, mut child: Built, index: usize) {
        child.literal(Predicate::ElementIndex, Literal::count(index));
        self.child(predicate, child);
    }

    pub fn into_graph(self) -> Graph {
        Graph::from_triples(self.triples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::shared::models::{ExprKind, Object};

    #[test]
    fn test_context_ids_are_scoped() {
        let mut a = CompileContext::new("a#", FileKind::Project, true);
        let mut b = CompileContext::new("a#", FileKind::Project, true);
        assert_eq!(a.next_id(), "a#expr/0");
        assert_eq!(a.next_id(), "a#expr/1");
        assert_eq!(b.next_id(), "a#expr/0");
        assert_eq!(a.ids_allocated(), 2);
    }

    #[test]
    fn test_for_file_uses_config() {
        let config = ExpressionConfig::preset(Preset::Full).base_iri("https://ex.org/app/");
        let ctx = CompileContext::for_file(&config, "deps/plug/lib/plug.ex");
        assert_eq!(ctx.file_kind, FileKind::Dependency);
        assert!(ctx.full_mode);
        assert_eq!(ctx.base_iri, "https://ex.org/app/deps/plug/lib/plug.ex/");
    }

    #[test]
    fn test_iri_path_segment_escapes() {
        assert_eq!(iri_path_segment("./lib/my file.ex"), "lib/my%20file.ex");
        assert_eq!(iri_path_segment("lib\\a#b.ex"), "lib/a%23b.ex");
    }

    #[test]
    fn test_built_child_links_and_absorbs() {
        let mut parent = Built::new(ExpressionNode::new("p".into(), ExprKind::ListLiteral));
        let child = Built::new(ExpressionNode::new("c".into(), ExprKind::IntegerLiteral));
        parent.child_at(Predicate::Element, child, 0);

        let graph = parent.into_graph();
        assert_eq!(graph.targets("p", Predicate::Element), vec!["c"]);
        assert_eq!(
            graph.literal("c", Predicate::ElementIndex),
            Some(&Literal::count(0))
        );
        assert!(graph.contains(&Triple::new(
            "c".into(),
            Predicate::Type,
            Object::Class(ExprKind::IntegerLiteral)
        )));
    }
}
