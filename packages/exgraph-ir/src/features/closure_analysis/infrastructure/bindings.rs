//! Names bound and referenced by a pattern
//!
//! A pattern introduces every plain variable it contains. Pinned variables
//! (`^x`) read an existing binding instead, and so do variables inside binary
//! size specs (`<<b::size(n)>>`) unless an earlier segment of the same binary
//! binds them (`<<n::8, b::binary-size(n)>>`).

use std::collections::BTreeSet;

use crate::shared::models::{Ast, SourceLocation};

/// A variable read at a given position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternBindings {
    pub bound: BTreeSet<String>,
    pub references: Vec<Reference>,
}

impl PatternBindings {
    pub fn of(pattern: &Ast) -> Self {
        let mut out = Self::default();
        out.collect(pattern);
        out
    }

    /// Union over several patterns (function parameters, catch heads)
    pub fn of_all(patterns: &[Ast]) -> Self {
        let mut out = Self::default();
        for pattern in patterns {
            out.collect(pattern);
        }
        out
    }

    fn collect(&mut self, pattern: &Ast) {
        match pattern {
            Ast::List(items) => items.iter().for_each(|item| self.collect(item)),
            Ast::Pair(left, right) => {
                self.collect(left);
                self.collect(right);
            }
            Ast::Form(_) => self.collect_form(pattern),
            _ => {}
        }
    }

    fn collect_form(&mut self, pattern: &Ast) {
        if let Some(name) = pattern.var_name() {
            if !is_ignored_name(name) {
                self.bound.insert(name.to_string());
            }
            return;
        }

        let Some((head, args)) = pattern.call_parts() else {
            // Non-atom head: not a pattern shape, nothing bound
            return;
        };

        match (head, args) {
            ("^", [pinned]) => self.reference(pinned),
            ("<<>>", segments) => self.collect_segments(segments),
            ("::", [value, spec]) => {
                self.collect(value);
                self.collect_size_references(spec);
            }
            ("%{}", entries) => {
                for entry in entries {
                    match entry {
                        Ast::Pair(key, value) => {
                            self.collect_pins(key);
                            self.collect(value);
                        }
                        other => self.collect(other),
                    }
                }
            }
            ("%", [module, body]) => {
                // `%name{}` binds the struct name
                if module.var_name().is_some() {
                    self.collect(module);
                }
                self.collect(body);
            }
            ("<>", [_prefix, rest]) => self.collect(rest),
            ("@", _) | ("__aliases__", _) => {}
            (_, args) => args.iter().for_each(|arg| self.collect(arg)),
        }
    }

    fn reference(&mut self, ast: &Ast) {
        if let Some(name) = ast.var_name() {
            if !is_ignored_name(name) {
                self.references.push(Reference {
                    name: name.to_string(),
                    location: ast.location(),
                });
            }
        }
    }

    /// Map keys only ever read (`%{^key => v}`)
    fn collect_pins(&mut self, key: &Ast) {
        if let Some([pinned]) = key.call_args("^") {
            self.reference(pinned);
        }
    }

    /// Segments left to right; a size may read a name bound by an earlier segment
    fn collect_segments(&mut self, segments: &[Ast]) {
        let mut earlier = BTreeSet::new();
        for segment in segments {
            let mut inner = Self::default();
            match segment.call_args("::") {
                Some([value, spec]) => {
                    inner.collect(value);
                    inner.collect_size_references(spec);
                    inner.references.retain(|r| !earlier.contains(&r.name));
                }
                _ => inner.collect(segment),
            }
            earlier.extend(inner.bound.iter().cloned());
            self.bound.extend(inner.bound);
            self.references.extend(inner.references);
        }
    }

    /// `size(n)` / `unit(n)` inside a segment spec read `n`
    fn collect_size_references(&mut self, spec: &Ast) {
        let Some((head, args)) = spec.call_parts() else {
            return;
        };
        match head {
            "size" | "unit" => {
                for arg in args {
                    self.reference(arg);
                }
            }
            "-" | "*" => args
                .iter()
                .for_each(|arg| self.collect_size_references(arg)),
            _ => {}
        }
    }
}

/// Variables that never bind or reference anything observable
///
/// Covers `_`, `_ignored` and pseudo variables like `__MODULE__`.
pub fn is_ignored_name(name: &str) -> bool {
    name.starts_with('_')
}
