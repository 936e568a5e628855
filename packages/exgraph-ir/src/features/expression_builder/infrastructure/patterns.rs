//! Pattern Compiler
//!
//! Patterns appear in clause heads, generator heads and on the left of `=`.
//! Every pattern node lists the names it binds with `binds-variable`; pinned
//! variables are references and never bind.

use std::collections::BTreeSet;

use super::dispatcher::ExpressionCompiler;
use super::literals::{literal_key, split_tail};
use crate::features::closure_analysis::infrastructure::is_ignored_name;
use crate::features::expression_builder::domain::{Built, CompileContext};
use crate::shared::models::{Ast, ExprKind, Literal, Predicate};

/// A compiled pattern and the names it introduces
pub(crate) struct CompiledPattern {
    pub built: Built,
    pub binds: BTreeSet<String>,
}

impl CompiledPattern {
    fn leaf(built: Built) -> Self {
        Self {
            built,
            binds: BTreeSet::new(),
        }
    }

    /// Record the bound names on the node itself
    fn finish(mut self) -> Self {
        for name in &self.binds {
            self.built
                .literal(Predicate::BindsVariable, Literal::string(name.as_str()));
        }
        self
    }
}

impl ExpressionCompiler {
    pub(crate) fn compile_pattern(&self, ast: &Ast, ctx: &mut CompileContext) -> Built {
        self.pattern(ast, ctx).built
    }

    /// Binary pattern over bare segments (bitstring generator heads)
    pub(crate) fn compile_segments_pattern(
        &self,
        ast: &Ast,
        segments: &[Ast],
        ctx: &mut CompileContext,
    ) -> Built {
        self.binary_pattern(ast, segments, ctx).built
    }

    pub(crate) fn pattern(&self, ast: &Ast, ctx: &mut CompileContext) -> CompiledPattern {
        match ast {
            Ast::Pair(left, right) => {
                self.tuple_pattern(ast, &[left.as_ref(), right.as_ref()], ctx)
            }
            Ast::List(items) => self.list_pattern(ast, items, ctx),
            Ast::Form(_) => self.form_pattern(ast, ctx),
            scalar => match literal_key(scalar) {
                Some(value) => {
                    CompiledPattern::leaf(self.scalar(ast, ExprKind::LiteralPattern, value, ctx))
                }
                None => CompiledPattern::leaf(self.compile_expr(ast, ctx)),
            },
        }
    }

    fn form_pattern(&self, ast: &Ast, ctx: &mut CompileContext) -> CompiledPattern {
        if let Some(name) = ast.var_name() {
            return self.variable_pattern(ast, name, ctx);
        }
        let Some((head, args)) = ast.call_parts() else {
            return CompiledPattern::leaf(self.compile_expr(ast, ctx));
        };

        match (head, args) {
            ("^", [pinned]) => CompiledPattern::leaf(self.compile_pin(ast, pinned, ctx)),
            ("{}", items) => {
                let items: Vec<&Ast> = items.iter().collect();
                self.tuple_pattern(ast, &items, ctx)
            }
            ("=", [left, right]) => self.as_pattern(ast, left, right, ctx),
            ("<>", [prefix, rest]) => self.prefix_pattern(ast, prefix, rest, ctx),
            ("%{}", entries) => self.map_pattern(ast, entries, ctx),
            ("%", [module, body]) => self.struct_pattern(ast, module, body, ctx),
            ("<<>>", segments) => self.binary_pattern(ast, segments, ctx),
            // aliases, attributes, calls: compiled as values
            _ => CompiledPattern::leaf(self.compile_expr(ast, ctx)),
        }
    }

    fn variable_pattern(&self, ast: &Ast, name: &str, ctx: &mut CompileContext) -> CompiledPattern {
        if name == "_" {
            return CompiledPattern::leaf(self.node(ast, ExprKind::WildcardPattern, ctx));
        }
        let mut node = self.node(ast, ExprKind::VariablePattern, ctx);
        node.literal(Predicate::VariableName, Literal::string(name));
        if is_ignored_name(name) {
            node.literal(Predicate::IsIgnored, Literal::boolean(true));
            return CompiledPattern::leaf(node);
        }
        CompiledPattern {
            built: node,
            binds: BTreeSet::from([name.to_string()]),
        }
        .finish()
    }

    fn tuple_pattern(
        &self,
        ast: &Ast,
        items: &[&Ast],
        ctx: &mut CompileContext,
    ) -> CompiledPattern {
        let mut out = CompiledPattern::leaf(self.node(ast, ExprKind::TuplePattern, ctx));
        for (index, item) in items.iter().enumerate() {
            let child = self.pattern(item, ctx);
            out.binds.extend(child.binds);
            out.built.child_at(Predicate::Element, child.built, index);
        }
        out.finish()
    }

    fn list_pattern(&self, ast: &Ast, items: &[Ast], ctx: &mut CompileContext) -> CompiledPattern {
        let mut out = CompiledPattern::leaf(self.node(ast, ExprKind::ListPattern, ctx));
        let (heads, tail) = split_tail(items);
        for (index, item) in heads.into_iter().enumerate() {
            let child = self.pattern(item, ctx);
            out.binds.extend(child.binds);
            out.built.child_at(Predicate::Element, child.built, index);
        }
        if let Some(tail) = tail {
            let child = self.pattern(tail, ctx);
            out.binds.extend(child.binds);
            out.built.child(Predicate::ListTail, child.built);
        }
        out.finish()
    }

    /// `{a, b} = whole` binds both sides
    fn as_pattern(
        &self,
        ast: &Ast,
        left: &Ast,
        right: &Ast,
        ctx: &mut CompileContext,
    ) -> CompiledPattern {
        let mut out = CompiledPattern::leaf(self.node(ast, ExprKind::AsPattern, ctx));
        let sides = [(Predicate::LeftOperand, left), (Predicate::RightOperand, right)];
        for (predicate, side) in sides {
            let child = self.pattern(side, ctx);
            out.binds.extend(child.binds);
            out.built.child(predicate, child.built);
        }
        out.finish()
    }

    /// `"prefix" <> rest`
    fn prefix_pattern(
        &self,
        ast: &Ast,
        prefix: &Ast,
        rest: &Ast,
        ctx: &mut CompileContext,
    ) -> CompiledPattern {
        let mut out = CompiledPattern::leaf(self.node(ast, ExprKind::StringPrefixPattern, ctx));
        match prefix {
            Ast::String(text) => out
                .built
                .literal(Predicate::StringPrefix, Literal::string(text.as_str())),
            other => {
                let child = self.pattern(other, ctx);
                out.binds.extend(child.binds);
                out.built.child(Predicate::LeftOperand, child.built);
            }
        }
        let child = self.pattern(rest, ctx);
        out.binds.extend(child.binds);
        out.built.child(Predicate::RightOperand, child.built);
        out.finish()
    }

    fn map_pattern(&self, ast: &Ast, entries: &[Ast], ctx: &mut CompileContext) -> CompiledPattern {
        let mut out = CompiledPattern::leaf(self.node(ast, ExprKind::MapPattern, ctx));
        self.map_pattern_entries(&mut out, entries, ctx);
        out.finish()
    }

    fn map_pattern_entries(
        &self,
        out: &mut CompiledPattern,
        entries: &[Ast],
        ctx: &mut CompileContext,
    ) {
        for (index, entry) in entries.iter().enumerate() {
            let Ast::Pair(key, value) = entry else {
                let child = self.pattern(entry, ctx);
                out.binds.extend(child.binds);
                out.built.child_at(Predicate::EntryValue, child.built, index);
                continue;
            };
            let mut child = self.pattern(value, ctx);
            match literal_key(key) {
                Some(key) => child.built.literal(Predicate::EntryKey, key),
                None => {
                    // keys never bind: `^k` or a value expression
                    let key = self.compile_expr(key, ctx);
                    child.built.child(Predicate::EntryKeyExpression, key);
                }
            }
            out.binds.extend(child.binds);
            out.built.child_at(Predicate::EntryValue, child.built, index);
        }
    }

    /// `%Mod{...}`, or `%name{...}` which binds the struct name
    fn struct_pattern(
        &self,
        ast: &Ast,
        module: &Ast,
        body: &Ast,
        ctx: &mut CompileContext,
    ) -> CompiledPattern {
        let mut out = CompiledPattern::leaf(self.node(ast, ExprKind::StructPattern, ctx));
        match module.module_name() {
            Some(name) => out
                .built
                .literal(Predicate::RefersToModule, Literal::string(name)),
            None => {
                let child = self.pattern(module, ctx);
                out.binds.extend(child.binds);
                out.built.child(Predicate::Receiver, child.built);
            }
        }
        let entries = body.call_args("%{}").unwrap_or_default();
        self.map_pattern_entries(&mut out, entries, ctx);
        out.finish()
    }

    /// `<<len::size(8), body::binary-size(len), rest::binary>>`
    fn binary_pattern(
        &self,
        ast: &Ast,
        segments: &[Ast],
        ctx: &mut CompileContext,
    ) -> CompiledPattern {
        let mut out = CompiledPattern::leaf(self.node(ast, ExprKind::BinaryPattern, ctx));
        for (index, segment) in segments.iter().enumerate() {
            let mut seg = CompiledPattern::leaf(self.node(segment, ExprKind::BinarySegment, ctx));
            let (value, spec) = match segment.call_args("::") {
                Some([value, spec]) => (value, Some(spec)),
                _ => (segment, None),
            };

            let child = self.pattern(value, ctx);
            seg.binds.extend(child.binds);
            seg.built.child(Predicate::SegmentValue, child.built);

            if let Some(spec) = spec {
                seg.built
                    .literal(Predicate::SegmentSpec, Literal::string(render_spec(spec)));
                if let Some(size) = segment_size(spec) {
                    let size = self.compile_expr(size, ctx);
                    seg.built.child(Predicate::SegmentSize, size);
                }
            }

            let seg = seg.finish();
            out.binds.extend(seg.binds);
            out.built.child_at(Predicate::Element, seg.built, index);
        }
        out.finish()
    }

    /// Guard node over one or more alternatives (`when a when b`)
    pub(crate) fn compile_guard(&self, guard: &Ast, ctx: &mut CompileContext) -> Built {
        let mut node = self.node(guard, ExprKind::Guard, ctx);
        let mut alternatives = Vec::new();
        flatten_when(guard, &mut alternatives);
        for (index, alternative) in alternatives.into_iter().enumerate() {
            let child = self.compile_expr(alternative, ctx);
            node.child_at(Predicate::GuardExpression, child, index);
        }
        node
    }
}

fn flatten_when<'a>(guard: &'a Ast, out: &mut Vec<&'a Ast>) {
    match guard.call_args("when") {
        Some(alternatives) => alternatives.iter().for_each(|alt| flatten_when(alt, out)),
        None => out.push(guard),
    }
}

/// Size expression of a segment spec (`size(n)` anywhere in `a-b-size(n)`)
fn segment_size(spec: &Ast) -> Option<&Ast> {
    let (head, args) = spec.call_parts()?;
    match (head, args) {
        ("size", [size]) => Some(size),
        ("-", parts) => parts.iter().find_map(segment_size),
        _ => None,
    }
}

/// Source-like text of a segment spec: `binary-size(len)`, `8`, `utf8`
fn render_spec(spec: &Ast) -> String {
    match spec {
        Ast::Integer(value) => value.to_string(),
        Ast::BigInteger(digits) => digits.clone(),
        Ast::Atom(name) => name.clone(),
        _ => {
            if let Some(name) = spec.var_name() {
                return name.to_string();
            }
            match spec.call_parts() {
                Some(("-", parts)) => parts.iter().map(render_spec).collect::<Vec<_>>().join("-"),
                Some(("*", [size, unit])) => format!("{}*{}", render_spec(size), render_spec(unit)),
                Some((name, args)) => format!(
                    "{}({})",
                    name,
                    args.iter().map(render_spec).collect::<Vec<_>>().join(", ")
                ),
                None => "?".to_string(),
            }
        }
    }
}
