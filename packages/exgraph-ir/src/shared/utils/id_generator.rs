//! ID generation utilities
//!
//! Node ids are `{base_iri}expr/{n}` where `n` is the traversal position within
//! one compilation context. Identical input compiled under an identical
//! context therefore yields identical ids.
//!
//! The counter lives in the generator value, never in a static: every file
//! gets its own generator, and `next_id` takes `&mut self`, so two traversals
//! cannot share one counter without the borrow checker noticing.

use crate::shared::constants::vocabulary::EXPR_PATH_SEGMENT;
use crate::shared::models::NodeId;

/// Per-context monotonic id allocator
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    next: u64,
}

impl IdGenerator {
    /// Create a generator for ids under `base_iri`
    pub fn new(base_iri: &str) -> Self {
        Self {
            prefix: format!("{}{}", base_iri, EXPR_PATH_SEGMENT),
            next: 0,
        }
    }

    /// Allocate the next id
    pub fn next_id(&mut self) -> NodeId {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u64 {
        self.next
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
