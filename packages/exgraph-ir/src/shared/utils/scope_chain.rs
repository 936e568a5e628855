//! Scope chain for binding resolution
//!
//! A persistent list of immutable frames. Entering a scope builds a new chain
//! value that borrows its parent; leaving the scope is just dropping it, so a
//! frame can never leak into a sibling.
//!
//! ```text
//! module ← function ← fn clause ← case clause
//!                              ↖ (sibling clause, shares the parent only)
//! ```

use std::collections::BTreeSet;

static NO_BINDINGS: BTreeSet<String> = BTreeSet::new();

/// What introduced a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Module,
    Function,
    /// Anonymous function clause (parameters)
    Closure,
    /// case / receive / rescue / catch / else clause
    Clause,
    /// with clause or for generator
    Generator,
    /// Sequential rebinding inside a block
    Block,
}

/// One frame plus a borrowed link to its parent
#[derive(Debug, Clone, Copy)]
pub struct ScopeChain<'a> {
    kind: FrameKind,
    bindings: &'a BTreeSet<String>,
    parent: Option<&'a ScopeChain<'a>>,
}

impl<'a> ScopeChain<'a> {
    /// Outermost frame
    pub fn root(kind: FrameKind, bindings: &'a BTreeSet<String>) -> Self {
        Self {
            kind,
            bindings,
            parent: None,
        }
    }

    /// Frame without bindings (e.g. a module with nothing in scope)
    pub fn empty(kind: FrameKind) -> ScopeChain<'static> {
        ScopeChain {
            kind,
            bindings: &NO_BINDINGS,
            parent: None,
        }
    }

    /// New innermost frame on top of `self`
    pub fn push<'b>(&'b self, kind: FrameKind, bindings: &'b BTreeSet<String>) -> ScopeChain<'b> {
        ScopeChain {
            kind,
            bindings,
            parent: Some(self),
        }
    }

    /// Is `name` bound in this frame or any enclosing one?
    pub fn is_bound(&self, name: &str) -> bool {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if current.bindings.contains(name) {
                return true;
            }
            frame = current.parent;
        }
        false
    }

    /// Kind of the frame that binds `name`, innermost first
    pub fn binding_frame(&self, name: &str) -> Option<FrameKind> {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if current.bindings.contains(name) {
                return Some(current.kind);
            }
            frame = current.parent;
        }
        None
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn bindings(&self) -> &BTreeSet<String> {
        self.bindings
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = Some(self);
        while let Some(current) = frame {
            depth += 1;
            frame = current.parent;
        }
        depth
    }

    /// Frames outermost first
    pub fn frames(&self) -> Vec<&ScopeChain<'a>> {
        let mut frames = Vec::with_capacity(self.depth());
        let mut frame = Some(self);
        while let Some(current) = frame {
            frames.push(current);
            frame = current.parent;
        }
        frames.reverse();
        frames
    }
}
