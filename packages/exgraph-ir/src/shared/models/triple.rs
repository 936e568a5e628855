//! Triples and the per-file graph

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::expression::{ExprKind, Literal, NodeId, Predicate};

/// Object position of a triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Object {
    /// Another expression node
    Node(NodeId),
    /// Node class (object of `rdf:type`)
    Class(ExprKind),
    Literal(Literal),
}

impl Object {
    pub fn as_node(&self) -> Option<&str> {
        match self {
            Object::Node(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Object::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

/// `(subject, predicate, object)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: NodeId,
    pub predicate: Predicate,
    pub object: Object,
}

impl Triple {
    pub fn new(subject: NodeId, predicate: Predicate, object: Object) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Edge between two expression nodes
    pub fn edge(subject: NodeId, predicate: Predicate, target: NodeId) -> Self {
        Self::new(subject, predicate, Object::Node(target))
    }

    pub fn literal(subject: NodeId, predicate: Predicate, value: Literal) -> Self {
        Self::new(subject, predicate, Object::Literal(value))
    }
}

/// Deduplicated, insertion-ordered set of triples
///
/// Read-only once handed out by the compiler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Triple>", into = "Vec<Triple>")]
pub struct Graph {
    triples: Vec<Triple>,
    seen: FxHashSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut graph = Self::new();
        graph.extend(triples);
        graph
    }

    /// Insert unless already present; returns whether it was new
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    pub fn extend(&mut self, triples: impl IntoIterator<Item = Triple>) {
        for triple in triples {
            self.insert(triple);
        }
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.seen.contains(triple)
    }

    /// All nodes typed with `kind`
    pub fn nodes_of_kind(&self, kind: ExprKind) -> Vec<&str> {
        self.triples
            .iter()
            .filter(|t| t.predicate == Predicate::Type && t.object == Object::Class(kind))
            .map(|t| t.subject.as_str())
            .collect()
    }

    pub fn kind_of(&self, node: &str) -> Option<ExprKind> {
        self.triples.iter().find_map(|t| match &t.object {
            Object::Class(kind) if t.subject == node && t.predicate == Predicate::Type => {
                Some(*kind)
            }
            _ => None,
        })
    }

    /// Objects of `(node, predicate, ?)` in insertion order
    pub fn objects(&self, node: &str, predicate: Predicate) -> Vec<&Object> {
        self.triples
            .iter()
            .filter(|t| t.subject == node && t.predicate == predicate)
            .map(|t| &t.object)
            .collect()
    }

    /// Node targets of `(node, predicate, ?)`
    pub fn targets(&self, node: &str, predicate: Predicate) -> Vec<&str> {
        self.objects(node, predicate)
            .into_iter()
            .filter_map(Object::as_node)
            .collect()
    }

    /// First literal of `(node, predicate, ?)`
    pub fn literal(&self, node: &str, predicate: Predicate) -> Option<&Literal> {
        self.objects(node, predicate)
            .into_iter()
            .find_map(Object::as_literal)
    }

    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }
}

impl From<Vec<Triple>> for Graph {
    fn from(triples: Vec<Triple>) -> Self {
        Self::from_triples(triples)
    }
}

impl From<Graph> for Vec<Triple> {
    fn from(graph: Graph) -> Self {
        graph.triples
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.triples == other.triples
    }
}
