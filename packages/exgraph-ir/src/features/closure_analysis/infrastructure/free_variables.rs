//! Free variable analysis over a persistent scope chain
//!
//! Every clause body is walked against its own chain:
//!
//! ```text
//! enclosing ← fn clause (params) ← case clause (pattern) ← block (x = ...)
//! ```
//!
//! A reference is free when no frame of the chain binds it. Frames are pushed
//! by `fn`, `case` / `receive` / `try` clauses, `cond` clauses, `if` branches,
//! `with` / `for` clauses and sequential `=` rebinding inside blocks. A frame
//! lives for the duration of one recursive call, so nested bindings never
//! reach siblings or the outer function.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use super::bindings::{is_ignored_name, PatternBindings, Reference};
use crate::features::closure_analysis::domain::{
    FnClause, FreeVariable, FreeVariableAnalysis, FunctionLiteral,
};
use crate::shared::models::{
    arrow_clauses, keyword_get, split_block_options, Args, ArrowClause, Ast,
};
use crate::shared::utils::scope_chain::{FrameKind, ScopeChain};

/// Computes the variables an anonymous function captures
#[derive(Debug, Default, Clone, Copy)]
pub struct ClosureAnalyzer;

impl ClosureAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze every clause and merge the results
    pub fn analyze(&self, literal: &FunctionLiteral<'_>) -> FreeVariableAnalysis {
        self.analyze_within(literal, &ScopeChain::empty(FrameKind::Module))
    }

    /// Like [`analyze`](Self::analyze), also resolving free names against
    /// the scope the literal appears in
    pub fn analyze_within(
        &self,
        literal: &FunctionLiteral<'_>,
        enclosing: &ScopeChain<'_>,
    ) -> FreeVariableAnalysis {
        let mut merged = FreeVariableAnalysis::default();
        for clause in &literal.clauses {
            merged.merge(self.analyze_clause_within(clause, enclosing));
        }
        merged
    }

    /// One clause against its own parameter bindings only
    pub fn analyze_clause(&self, clause: &FnClause<'_>) -> FreeVariableAnalysis {
        self.analyze_clause_within(clause, &ScopeChain::empty(FrameKind::Module))
    }

    fn analyze_clause_within(
        &self,
        clause: &FnClause<'_>,
        enclosing: &ScopeChain<'_>,
    ) -> FreeVariableAnalysis {
        let params = PatternBindings::of_all(clause.params);
        let frame = ScopeChain::root(FrameKind::Closure, &params.bound);

        let mut walker = Walker::default();
        // Pins in the parameter list read the enclosing scope
        for reference in &params.references {
            walker.record(reference.clone(), &ScopeChain::empty(FrameKind::Module));
        }
        if let Some(guard) = clause.guard {
            walker.walk(guard, &frame);
        }
        walker.walk(clause.body, &frame);

        FreeVariableAnalysis {
            free_variables: walker.into_free_variables(enclosing),
            bound_names: params.bound,
        }
    }
}

/// Accumulates unresolved references while walking one clause
#[derive(Debug, Default)]
struct Walker {
    free: FxHashMap<String, Vec<Reference>>,
}

impl Walker {
    fn record(&mut self, reference: Reference, scope: &ScopeChain<'_>) {
        if !scope.is_bound(&reference.name) {
            self.free
                .entry(reference.name.clone())
                .or_default()
                .push(reference);
        }
    }

    fn reference(&mut self, ast: &Ast, scope: &ScopeChain<'_>) {
        if let Some(name) = ast.var_name() {
            if !is_ignored_name(name) {
                let reference = Reference {
                    name: name.to_string(),
                    location: ast.location(),
                };
                self.record(reference, scope);
            }
        }
    }

    /// Bind a pattern: its pins and size variables are reads in `scope`
    fn bind(&mut self, pattern: &Ast, scope: &ScopeChain<'_>) -> BTreeSet<String> {
        let bindings = PatternBindings::of(pattern);
        for reference in bindings.references {
            self.record(reference, scope);
        }
        bindings.bound
    }

    fn walk_all(&mut self, items: &[Ast], scope: &ScopeChain<'_>) -> BTreeSet<String> {
        let mut bound = BTreeSet::new();
        for item in items {
            bound.extend(self.walk(item, scope));
        }
        bound
    }

    /// Walk an expression; returns the names it binds for later siblings
    fn walk(&mut self, ast: &Ast, scope: &ScopeChain<'_>) -> BTreeSet<String> {
        match ast {
            Ast::List(items) => self.walk_all(items, scope),
            Ast::Pair(left, right) => {
                let mut bound = self.walk(left, scope);
                bound.extend(self.walk(right, scope));
                bound
            }
            Ast::Form(form) => match (&form.head, &form.args) {
                (Ast::Atom(_), Args::Context(_)) => {
                    self.reference(ast, scope);
                    BTreeSet::new()
                }
                (Ast::Atom(name), Args::List(args)) => self.walk_call(name, args, scope),
                (head, Args::List(args)) => self.walk_dynamic_call(head, args, scope),
                (head, Args::Context(_)) => self.walk(head, scope),
            },
            _ => BTreeSet::new(),
        }
    }

    fn walk_call(&mut self, name: &str, args: &[Ast], scope: &ScopeChain<'_>) -> BTreeSet<String> {
        match (name, args) {
            ("__block__", stmts) => self.walk_block(stmts, scope),
            ("=", [pattern, value]) => {
                let mut bound = self.walk(value, scope);
                bound.extend(self.bind(pattern, scope));
                bound
            }
            ("^", [pinned]) => {
                self.reference(pinned, scope);
                BTreeSet::new()
            }
            ("fn", _) => {
                self.walk_fn(args, scope);
                BTreeSet::new()
            }
            ("&", [inner]) => {
                self.walk_capture(inner, scope);
                BTreeSet::new()
            }
            ("case", _) | ("receive", _) | ("try", _) | ("cond", _) => {
                self.walk_clause_form(name, args, scope)
            }
            ("if", _) | ("unless", _) => self.walk_if(args, scope),
            ("with", _) | ("for", _) => {
                self.walk_sequential(name, args, scope);
                BTreeSet::new()
            }
            ("@", _) | ("__aliases__", _) => BTreeSet::new(),
            _ => self.walk_all(args, scope),
        }
    }

    /// `mod.fun(args)`, `fun.(args)` and other non-atom heads
    fn walk_dynamic_call(
        &mut self,
        head: &Ast,
        args: &[Ast],
        scope: &ScopeChain<'_>,
    ) -> BTreeSet<String> {
        match head.call_args(".") {
            Some([receiver, Ast::Atom(_)]) => {
                self.walk(receiver, scope);
            }
            Some(dot_args) => {
                self.walk_all(dot_args, scope);
            }
            None => {
                self.walk(head, scope);
            }
        }
        self.walk_all(args, scope)
    }

    /// Statements see the bindings of the statements before them
    fn walk_block(&mut self, stmts: &[Ast], scope: &ScopeChain<'_>) -> BTreeSet<String> {
        let mut acc = BTreeSet::new();
        for stmt in stmts {
            let bound = {
                let frame = scope.push(FrameKind::Block, &acc);
                self.walk(stmt, &frame)
            };
            acc.extend(bound);
        }
        acc
    }

    fn walk_fn(&mut self, args: &[Ast], scope: &ScopeChain<'_>) {
        let Some(clauses) = args
            .iter()
            .map(ArrowClause::from_ast)
            .collect::<Option<Vec<_>>>()
        else {
            self.walk_all(args, scope);
            return;
        };

        for clause in clauses {
            let bound = self.bind_all(clause.heads, scope);
            let frame = scope.push(FrameKind::Closure, &bound);
            if let Some(guard) = clause.guard {
                self.walk(guard, &frame);
            }
            self.walk(clause.body, &frame);
        }
    }

    fn bind_all(&mut self, patterns: &[Ast], scope: &ScopeChain<'_>) -> BTreeSet<String> {
        let mut bound = BTreeSet::new();
        for pattern in patterns {
            bound.extend(self.bind(pattern, scope));
        }
        bound
    }

    /// `&fun/1` and `&Mod.fun/1` name a function; anything else is shorthand
    fn walk_capture(&mut self, inner: &Ast, scope: &ScopeChain<'_>) {
        if let Some([callee, Ast::Integer(_)]) = inner.call_args("/") {
            if callee.var_name().is_some() {
                return;
            }
            if let Some(form) = callee.as_form() {
                if let Some([receiver, Ast::Atom(_)]) = form.head.call_args(".") {
                    self.walk(receiver, scope);
                    return;
                }
            }
        }
        self.walk(inner, scope);
    }

    /// Clause lists of `case`, `receive`, `try`, `cond`
    fn walk_clause_form(
        &mut self,
        name: &str,
        args: &[Ast],
        scope: &ScopeChain<'_>,
    ) -> BTreeSet<String> {
        let (subjects, options) = split_block_options(args);
        let bound = self.walk_all(subjects, scope);
        let Some(options) = options.and_then(Ast::as_keyword_list) else {
            return bound;
        };

        for option in options {
            let Ast::Pair(key, value) = option else {
                continue;
            };
            match (name, key.as_atom()) {
                ("cond", Some("do")) | ("receive", Some("after")) => {
                    self.walk_expression_clauses(value, scope)
                }
                ("try", Some("do")) | ("try", Some("after")) => {
                    let empty = BTreeSet::new();
                    let frame = scope.push(FrameKind::Clause, &empty);
                    self.walk(value, &frame);
                }
                ("try", Some("rescue")) => self.walk_rescue_clauses(value, scope),
                _ => self.walk_match_clauses(value, scope),
            }
        }
        bound
    }

    /// `pattern when guard -> body` clauses, one frame each
    fn walk_match_clauses(&mut self, clauses: &Ast, scope: &ScopeChain<'_>) {
        let Some(clauses) = arrow_clauses(clauses) else {
            self.walk(clauses, scope);
            return;
        };
        for clause in clauses {
            let bound = self.bind_all(clause.heads, scope);
            let frame = scope.push(FrameKind::Clause, &bound);
            if let Some(guard) = clause.guard {
                self.walk(guard, &frame);
            }
            self.walk(clause.body, &frame);
        }
    }

    /// `e in [Type] -> ...`, `e -> ...`, `Type -> ...`
    fn walk_rescue_clauses(&mut self, clauses: &Ast, scope: &ScopeChain<'_>) {
        let Some(clauses) = arrow_clauses(clauses) else {
            self.walk(clauses, scope);
            return;
        };
        for clause in clauses {
            let mut bound = BTreeSet::new();
            for head in clause.heads {
                match head.call_args("in") {
                    Some([var, _types]) => bound.extend(self.bind(var, scope)),
                    _ => bound.extend(self.bind(head, scope)),
                }
            }
            let frame = scope.push(FrameKind::Clause, &bound);
            self.walk(clause.body, &frame);
        }
    }

    /// `expression -> body` (cond, receive after); bindings made by the
    /// head expression reach its body
    fn walk_expression_clauses(&mut self, clauses: &Ast, scope: &ScopeChain<'_>) {
        let Some(clauses) = arrow_clauses(clauses) else {
            self.walk(clauses, scope);
            return;
        };
        for clause in clauses {
            let bound = self.walk_all(clause.heads, scope);
            let frame = scope.push(FrameKind::Clause, &bound);
            self.walk(clause.body, &frame);
        }
    }

    fn walk_if(&mut self, args: &[Ast], scope: &ScopeChain<'_>) -> BTreeSet<String> {
        let (conditions, options) = split_block_options(args);
        let bound = self.walk_all(conditions, scope);
        let branches = options.map(|o| ["do", "else"].map(|key| keyword_get(o, key)));

        let frame = scope.push(FrameKind::Clause, &bound);
        for branch in branches.into_iter().flatten().flatten() {
            let empty = BTreeSet::new();
            let branch_frame = frame.push(FrameKind::Clause, &empty);
            self.walk(branch, &branch_frame);
        }
        bound
    }

    /// `with` and `for`: each clause sees the bindings of the previous ones
    fn walk_sequential(&mut self, name: &str, args: &[Ast], scope: &ScopeChain<'_>) {
        let (clauses, options) = split_block_options(args);
        // `for x <- xs, into: %{}, do: ...` puts options in a trailing keyword list
        let (clauses, inline_options) = match clauses.split_last() {
            Some((last, rest)) if name == "for" && last.as_keyword_list().is_some() => {
                (rest, Some(last))
            }
            _ => (clauses, None),
        };

        let mut acc = BTreeSet::new();
        for clause in clauses {
            let bound = {
                let frame = scope.push(FrameKind::Generator, &acc);
                self.walk_generator(clause, &frame)
            };
            acc.extend(bound);
        }

        let reduces = name == "for"
            && [inline_options, options]
                .into_iter()
                .flatten()
                .any(|opts| keyword_get(opts, "reduce").is_some());

        let body_frame = scope.push(FrameKind::Generator, &acc);
        for opts in [inline_options, options].into_iter().flatten() {
            let Some(entries) = opts.as_keyword_list() else {
                continue;
            };
            for entry in entries {
                let Ast::Pair(key, value) = entry else {
                    continue;
                };
                match key.as_atom() {
                    Some("do") if reduces => self.walk_match_clauses(value, &body_frame),
                    Some("do") => {
                        self.walk(value, &body_frame);
                    }
                    Some("else") => self.walk_match_clauses(value, scope),
                    _ => {
                        self.walk(value, scope);
                    }
                }
            }
        }
    }

    /// `pattern <- source`, `<<seg <- bin>>`, `pattern = value` or a filter
    fn walk_generator(&mut self, clause: &Ast, scope: &ScopeChain<'_>) -> BTreeSet<String> {
        if let Some([pattern, source]) = clause.call_args("<-") {
            self.walk(source, scope);
            return self.bind_generator_pattern(pattern, scope);
        }
        if let Some([generator]) = clause.call_args("<<>>") {
            if let Some([pattern, source]) = generator.call_args("<-") {
                self.walk(source, scope);
                return self.bind(pattern, scope);
            }
        }
        self.walk(clause, scope)
    }

    /// Generator patterns may carry a guard: `{k, v} when v > 0 <- pairs`
    fn bind_generator_pattern(
        &mut self,
        pattern: &Ast,
        scope: &ScopeChain<'_>,
    ) -> BTreeSet<String> {
        match pattern.call_args("when") {
            Some([pattern, guard]) => {
                let bound = self.bind(pattern, scope);
                let frame = scope.push(FrameKind::Generator, &bound);
                self.walk(guard, &frame);
                bound
            }
            _ => self.bind(pattern, scope),
        }
    }

    /// Unresolved references, sorted by name
    fn into_free_variables(self, enclosing: &ScopeChain<'_>) -> Vec<FreeVariable> {
        let mut vars: Vec<FreeVariable> = self
            .free
            .into_iter()
            .map(|(name, references)| FreeVariable {
                binding_frame: enclosing.binding_frame(&name),
                reference_count: references.len(),
                reference_locations: references.into_iter().filter_map(|r| r.location).collect(),
                name,
            })
            .collect();
        vars.sort_by(|a, b| a.name.cmp(&b.name));
        vars
    }
}
