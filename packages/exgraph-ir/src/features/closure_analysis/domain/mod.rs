//! Closure Analysis Domain
//!
//! Clause structure of an anonymous function, the free variables it
//! captures, and placeholder facts of `&(...)` shorthand captures.

use std::collections::BTreeSet;

use crate::shared::models::{ArrowClause, Ast, SourceLocation};
use crate::shared::utils::scope_chain::FrameKind;

/// One `params when guard -> body` clause of a function literal
#[derive(Debug, Clone, Copy)]
pub struct FnClause<'a> {
    pub params: &'a [Ast],
    pub guard: Option<&'a Ast>,
    pub body: &'a Ast,
    pub location: Option<SourceLocation>,
}

impl<'a> From<ArrowClause<'a>> for FnClause<'a> {
    fn from(clause: ArrowClause<'a>) -> Self {
        Self {
            params: clause.heads,
            guard: clause.guard,
            body: clause.body,
            location: clause.meta.location(),
        }
    }
}

/// `fn ... end` with its clauses already extracted
#[derive(Debug, Clone)]
pub struct FunctionLiteral<'a> {
    pub clauses: Vec<FnClause<'a>>,
    pub location: Option<SourceLocation>,
}

impl<'a> FunctionLiteral<'a> {
    /// Extract from `{:fn, meta, [clause, ...]}`
    ///
    /// `None` unless every argument is a `->` clause.
    pub fn extract(ast: &'a Ast) -> Option<Self> {
        let args = ast.call_args("fn")?;
        if args.is_empty() {
            return None;
        }
        let clauses = args
            .iter()
            .map(|arg| ArrowClause::from_ast(arg).map(FnClause::from))
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            clauses,
            location: ast.location(),
        })
    }

    /// Parameter count of the first clause
    pub fn arity(&self) -> usize {
        self.clauses.first().map_or(0, |c| c.params.len())
    }
}

/// A name the function references but does not bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeVariable {
    pub name: String,
    pub reference_count: usize,
    pub reference_locations: Vec<SourceLocation>,
    /// Frame of the enclosing scope that binds it (`None` = unresolved)
    pub binding_frame: Option<FrameKind>,
}

/// Result of analyzing one function literal or one clause
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeVariableAnalysis {
    /// Sorted by name
    pub free_variables: Vec<FreeVariable>,
    /// Parameter bindings of the analyzed clauses
    pub bound_names: BTreeSet<String>,
}

impl FreeVariableAnalysis {
    pub fn is_closure(&self) -> bool {
        !self.free_variables.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.free_variables.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&FreeVariable> {
        self.free_variables.iter().find(|v| v.name == name)
    }

    /// Fold another clause's result into this one
    pub fn merge(&mut self, other: FreeVariableAnalysis) {
        self.bound_names.extend(other.bound_names);
        for var in other.free_variables {
            match self.free_variables.iter_mut().find(|v| v.name == var.name) {
                Some(existing) => {
                    existing.reference_count += var.reference_count;
                    existing.reference_locations.extend(var.reference_locations);
                    existing.binding_frame = existing.binding_frame.or(var.binding_frame);
                }
                None => self.free_variables.push(var),
            }
        }
        self.free_variables.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

/// `&N` occurrences of one position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePlaceholder {
    pub position: usize,
    pub usage_count: usize,
    pub locations: Vec<SourceLocation>,
}

/// Placeholder facts of one shorthand capture
///
/// `arity` is the highest position even when lower ones are missing; gaps are
/// reported, never compacted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderAnalysis {
    /// Sorted by position
    pub placeholders: Vec<CapturePlaceholder>,
    pub highest_position: usize,
    pub arity: usize,
    pub gaps: Vec<usize>,
    pub total_usages: usize,
}

impl PlaceholderAnalysis {
    pub fn from_placeholders(mut placeholders: Vec<CapturePlaceholder>) -> Self {
        placeholders.sort_by_key(|p| p.position);

        let highest_position = placeholders.last().map_or(0, |p| p.position);
        let gaps = (1..=highest_position)
            .filter(|pos| !placeholders.iter().any(|p| p.position == *pos))
            .collect();
        let total_usages = placeholders.iter().map(|p| p.usage_count).sum();

        Self {
            placeholders,
            highest_position,
            arity: highest_position,
            gaps,
            total_usages,
        }
    }

    pub fn has_gaps(&self) -> bool {
        !self.gaps.is_empty()
    }

    pub fn positions(&self) -> Vec<usize> {
        self.placeholders.iter().map(|p| p.position).collect()
    }
}
