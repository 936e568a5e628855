//! Control-Flow Compiler
//!
//! Each construct has its own small clause structure. Optional groups
//! (`else`, `rescue`, `after`, ...) are simply absent from the graph when
//! absent from the source; nothing here can fail except by falling back to
//! `UnknownExpression`.

use super::dispatcher::{ControlForm, ExpressionCompiler};
use crate::features::closure_analysis::infrastructure::placeholder_position;
use crate::features::closure_analysis::FunctionLiteral;
use crate::features::expression_builder::domain::{Built, CompileContext};
use crate::shared::models::{
    arrow_clauses, keyword_get, split_block_options, ArrowClause, Ast, ExprKind, ExpressionNode,
    Literal, Predicate,
};

impl ExpressionCompiler {
    pub(crate) fn compile_control(
        &self,
        ast: &Ast,
        form: ControlForm,
        args: &[Ast],
        ctx: &mut CompileContext,
    ) -> Built {
        match form {
            ControlForm::If => self.compile_if(ast, ExprKind::IfExpression, args, ctx),
            ControlForm::Unless => self.compile_if(ast, ExprKind::UnlessExpression, args, ctx),
            ControlForm::Cond => self.compile_cond(ast, args, ctx),
            ControlForm::Case => self.compile_case(ast, args, ctx),
            ControlForm::With => self.compile_with(ast, args, ctx),
            ControlForm::For => self.compile_for(ast, args, ctx),
            ControlForm::Try => self.compile_try(ast, args, ctx),
            ControlForm::Receive => self.compile_receive(ast, args, ctx),
            ControlForm::Raise => self.compile_raise(ast, args, false, ctx),
            ControlForm::Reraise => self.compile_raise(ast, args, true, ctx),
            ControlForm::Throw => self.compile_single(
                ast,
                ExprKind::ThrowExpression,
                Predicate::ThrownValue,
                args,
                ctx,
            ),
            ControlForm::Exit => {
                self.compile_single(ast, ExprKind::ExitExpression, Predicate::ExitReason, args, ctx)
            }
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Helpers
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `(node, predicate, compile(value))` when the value is present
    fn optional_child(
        &self,
        node: &mut Built,
        predicate: Predicate,
        value: Option<&Ast>,
        ctx: &mut CompileContext,
    ) {
        if let Some(value) = value {
            let child = self.compile_expr(value, ctx);
            node.child(predicate, child);
        }
    }

    /// Clause node positioned at its `->`, tagged with its order
    fn clause_node(
        &self,
        clause: &ArrowClause<'_>,
        kind: ExprKind,
        order: usize,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = Built::new(
            ExpressionNode::new(ctx.next_id(), kind).with_location(clause.meta.location()),
        );
        node.literal(Predicate::ClauseOrder, Literal::count(order));
        node
    }

    /// `pattern when guard -> body`
    fn match_clause(
        &self,
        clause: &ArrowClause<'_>,
        order: usize,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.clause_node(clause, ExprKind::MatchClause, order, ctx);
        for (index, head) in clause.heads.iter().enumerate() {
            let pattern = self.compile_pattern(head, ctx);
            node.child_at(Predicate::Pattern, pattern, index);
        }
        if let Some(guard) = clause.guard {
            let guard = self.compile_guard(guard, ctx);
            node.child(Predicate::Guard, guard);
        }
        let body = self.compile_expr(clause.body, ctx);
        node.child(Predicate::Body, body);
        node
    }

    /// Match clauses of a clause list, each linked with `predicate`
    fn match_clauses(
        &self,
        node: &mut Built,
        predicate: Predicate,
        clauses: Option<&Ast>,
        ctx: &mut CompileContext,
    ) {
        let Some(clauses) = clauses else {
            return;
        };
        match arrow_clauses(clauses) {
            Some(clauses) => {
                for (order, clause) in clauses.iter().enumerate() {
                    let child = self.match_clause(clause, order, ctx);
                    node.child(predicate, child);
                }
            }
            None => {
                let child = self.unknown(clauses, "expected clauses", ctx);
                node.child(predicate, child);
            }
        }
    }

    fn compile_single(
        &self,
        ast: &Ast,
        kind: ExprKind,
        predicate: Predicate,
        args: &[Ast],
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, kind, ctx);
        self.optional_child(&mut node, predicate, args.first(), ctx);
        node
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Branching
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    fn compile_if(
        &self,
        ast: &Ast,
        kind: ExprKind,
        args: &[Ast],
        ctx: &mut CompileContext,
    ) -> Built {
        let (conditions, options) = split_block_options(args);
        let mut node = self.node(ast, kind, ctx);
        self.optional_child(&mut node, Predicate::Condition, conditions.first(), ctx);
        let branch = |key| options.and_then(|opts| keyword_get(opts, key));
        self.optional_child(&mut node, Predicate::ThenBranch, branch("do"), ctx);
        self.optional_child(&mut node, Predicate::ElseBranch, branch("else"), ctx);
        node
    }

    /// First truthy condition wins
    fn compile_cond(&self, ast: &Ast, args: &[Ast], ctx: &mut CompileContext) -> Built {
        let (_, options) = split_block_options(args);
        let Some(clauses) = options
            .and_then(|opts| keyword_get(opts, "do"))
            .and_then(arrow_clauses)
        else {
            return self.unknown(ast, "cond without clauses", ctx);
        };

        let mut node = self.node(ast, ExprKind::CondExpression, ctx);
        for (order, clause) in clauses.iter().enumerate() {
            let mut child = self.clause_node(clause, ExprKind::CondClause, order, ctx);
            for condition in clause.heads {
                let condition = self.compile_expr(condition, ctx);
                child.child(Predicate::Condition, condition);
            }
            let body = self.compile_expr(clause.body, ctx);
            child.child(Predicate::Body, body);
            node.child(Predicate::Clause, child);
        }
        node
    }

    fn compile_case(&self, ast: &Ast, args: &[Ast], ctx: &mut CompileContext) -> Built {
        let (subjects, options) = split_block_options(args);
        let mut node = self.node(ast, ExprKind::CaseExpression, ctx);
        self.optional_child(&mut node, Predicate::Subject, subjects.first(), ctx);
        let clauses = options.and_then(|opts| keyword_get(opts, "do"));
        self.match_clauses(&mut node, Predicate::Clause, clauses, ctx);
        node
    }

    /// Bind clauses in order, body, optional else clauses
    fn compile_with(&self, ast: &Ast, args: &[Ast], ctx: &mut CompileContext) -> Built {
        let (clauses, options) = split_block_options(args);
        let mut node = self.node(ast, ExprKind::WithExpression, ctx);

        for (order, clause) in clauses.iter().enumerate() {
            let mut child = self.node(clause, ExprKind::WithClause, ctx);
            child.literal(Predicate::ClauseOrder, Literal::count(order));
            match clause.call_args("<-").or_else(|| clause.call_args("=")) {
                Some([pattern, source]) => self.bind_clause(&mut child, pattern, source, ctx),
                _ => {
                    let source = self.compile_expr(clause, ctx);
                    child.child(Predicate::Source, source);
                }
            }
            node.child(Predicate::Clause, child);
        }

        let body = options.and_then(|opts| keyword_get(opts, "do"));
        self.optional_child(&mut node, Predicate::Body, body, ctx);
        let else_clauses = options.and_then(|opts| keyword_get(opts, "else"));
        self.match_clauses(&mut node, Predicate::ElseClause, else_clauses, ctx);
        node
    }

    /// `pattern when guard <- source` parts of a with clause or generator
    fn bind_clause(&self, node: &mut Built, pattern: &Ast, source: &Ast, ctx: &mut CompileContext) {
        let (pattern, guard) = match pattern.call_args("when") {
            Some([pattern, guard]) => (pattern, Some(guard)),
            _ => (pattern, None),
        };
        let pattern = self.compile_pattern(pattern, ctx);
        node.child(Predicate::Pattern, pattern);
        if let Some(guard) = guard {
            let guard = self.compile_guard(guard, ctx);
            node.child(Predicate::Guard, guard);
        }
        let source = self.compile_expr(source, ctx);
        node.child(Predicate::Source, source);
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Comprehensions
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Generators, filters, `into` / `uniq` / `reduce` options and body
    fn compile_for(&self, ast: &Ast, args: &[Ast], ctx: &mut CompileContext) -> Built {
        let (clauses, options) = split_block_options(args);
        let (clauses, inline_options) = match clauses.split_last() {
            Some((last, rest)) if last.as_keyword_list().is_some() => (rest, Some(last)),
            _ => (clauses, None),
        };
        let option = |key| {
            [options, inline_options]
                .into_iter()
                .flatten()
                .find_map(|opts| keyword_get(opts, key))
        };

        let mut node = self.node(ast, ExprKind::ForComprehension, ctx);
        let (mut generators, mut filters) = (0, 0);
        for clause in clauses {
            if let Some(generator) = self.generator(clause, generators, ctx) {
                node.child(Predicate::Clause, generator);
                generators += 1;
            } else {
                let filter = self.compile_expr(clause, ctx);
                node.child_at(Predicate::Filter, filter, filters);
                filters += 1;
            }
        }

        self.optional_child(&mut node, Predicate::IntoTarget, option("into"), ctx);
        if let Some(uniq) = option("uniq") {
            node.literal(
                Predicate::IsUnique,
                Literal::boolean(!matches!(uniq.as_atom(), Some("false" | "nil"))),
            );
        }

        match option("reduce") {
            Some(initial) => {
                let initial = self.compile_expr(initial, ctx);
                node.child(Predicate::ReduceInitial, initial);
                self.match_clauses(&mut node, Predicate::Body, option("do"), ctx);
            }
            None => self.optional_child(&mut node, Predicate::Body, option("do"), ctx),
        }
        node
    }

    /// `pattern <- source` or `<<segment <- bitstring>>`
    fn generator(&self, clause: &Ast, order: usize, ctx: &mut CompileContext) -> Option<Built> {
        let (pattern, source, bitstring) = match clause.call_args("<-") {
            Some([pattern, source]) => (pattern, source, false),
            _ => match clause.call_args("<<>>") {
                Some([inner]) => match inner.call_args("<-") {
                    Some([pattern, source]) => (pattern, source, true),
                    _ => return None,
                },
                _ => return None,
            },
        };

        let mut node = self.node(clause, ExprKind::Generator, ctx);
        node.literal(Predicate::ClauseOrder, Literal::count(order));
        if bitstring {
            let pattern = self.compile_segments_pattern(clause, std::slice::from_ref(pattern), ctx);
            node.child(Predicate::Pattern, pattern);
            let source = self.compile_expr(source, ctx);
            node.child(Predicate::Source, source);
        } else {
            self.bind_clause(&mut node, pattern, source, ctx);
        }
        Some(node)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Exceptions and messages
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Body plus independent rescue / catch / else / after groups
    fn compile_try(&self, ast: &Ast, args: &[Ast], ctx: &mut CompileContext) -> Built {
        let (_, options) = split_block_options(args);
        let group = |key| options.and_then(|opts| keyword_get(opts, key));
        let mut node = self.node(ast, ExprKind::TryExpression, ctx);

        self.optional_child(&mut node, Predicate::Body, group("do"), ctx);

        if let Some(rescues) = group("rescue") {
            match arrow_clauses(rescues) {
                Some(clauses) => {
                    for (order, clause) in clauses.iter().enumerate() {
                        let child = self.rescue_clause(clause, order, ctx);
                        node.child(Predicate::RescueClause, child);
                    }
                }
                None => {
                    let child = self.unknown(rescues, "expected rescue clauses", ctx);
                    node.child(Predicate::RescueClause, child);
                }
            }
        }

        if let Some(catches) = group("catch") {
            match arrow_clauses(catches) {
                Some(clauses) => {
                    for (order, clause) in clauses.iter().enumerate() {
                        let child = self.catch_clause(clause, order, ctx);
                        node.child(Predicate::CatchClause, child);
                    }
                }
                None => {
                    let child = self.unknown(catches, "expected catch clauses", ctx);
                    node.child(Predicate::CatchClause, child);
                }
            }
        }

        self.match_clauses(&mut node, Predicate::ElseClause, group("else"), ctx);
        self.optional_child(&mut node, Predicate::AfterBody, group("after"), ctx);
        node
    }

    /// `e in [A, B] ->`, `A ->`, `e ->`
    fn rescue_clause(
        &self,
        clause: &ArrowClause<'_>,
        order: usize,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.clause_node(clause, ExprKind::RescueClause, order, ctx);
        for head in clause.heads {
            match head.call_args("in") {
                Some([var, types]) => {
                    let pattern = self.compile_pattern(var, ctx);
                    node.child(Predicate::Pattern, pattern);
                    let types = match types {
                        Ast::List(items) => items.as_slice(),
                        single => std::slice::from_ref(single),
                    };
                    self.children(&mut node, Predicate::RescuedException, types, ctx);
                }
                _ if head.var_name().is_some() => {
                    let pattern = self.compile_pattern(head, ctx);
                    node.child(Predicate::Pattern, pattern);
                }
                _ => {
                    let exception = self.compile_expr(head, ctx);
                    node.child(Predicate::RescuedException, exception);
                }
            }
        }
        let body = self.compile_expr(clause.body, ctx);
        node.child(Predicate::Body, body);
        node
    }

    /// `value ->` (kind `throw`) or `kind, value ->`
    fn catch_clause(
        &self,
        clause: &ArrowClause<'_>,
        order: usize,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.clause_node(clause, ExprKind::CatchClause, order, ctx);
        let value = match clause.heads {
            [value] => {
                node.literal(Predicate::CatchKind, Literal::string("throw"));
                Some(value)
            }
            [kind, value] => {
                match kind.as_atom() {
                    Some(kind) => node.literal(Predicate::CatchKind, Literal::string(kind)),
                    None => {
                        let kind = self.compile_pattern(kind, ctx);
                        node.child_at(Predicate::Pattern, kind, 0);
                    }
                }
                Some(value)
            }
            _ => None,
        };
        if let Some(value) = value {
            let pattern = self.compile_pattern(value, ctx);
            node.child_at(Predicate::Pattern, pattern, clause.heads.len() - 1);
        }
        if let Some(guard) = clause.guard {
            let guard = self.compile_guard(guard, ctx);
            node.child(Predicate::Guard, guard);
        }
        let body = self.compile_expr(clause.body, ctx);
        node.child(Predicate::Body, body);
        node
    }

    /// `raise` and `reraise` share one kind; `is-reraise` tells them apart
    fn compile_raise(
        &self,
        ast: &Ast,
        args: &[Ast],
        reraise: bool,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::RaiseExpression, ctx);
        node.literal(Predicate::IsReraise, Literal::boolean(reraise));

        let (args, stacktrace) = match (reraise, args.split_last()) {
            (true, Some((stacktrace, rest))) => (rest, Some(stacktrace)),
            _ => (args, None),
        };

        match args {
            [message] if is_message(message) => {
                let message = self.compile_expr(message, ctx);
                node.child(Predicate::Message, message);
            }
            [exception] => {
                let exception = self.compile_expr(exception, ctx);
                node.child(Predicate::Exception, exception);
            }
            [exception, details] => {
                let exception = self.compile_expr(exception, ctx);
                node.child(Predicate::Exception, exception);
                let predicate = if details.as_keyword_list().is_some() {
                    Predicate::ExceptionAttributes
                } else {
                    Predicate::Message
                };
                let details = self.compile_expr(details, ctx);
                node.child(predicate, details);
            }
            _ => {}
        }

        self.optional_child(&mut node, Predicate::Stacktrace, stacktrace, ctx);
        node
    }

    /// Message clauses, optional `after timeout -> body`
    fn compile_receive(&self, ast: &Ast, args: &[Ast], ctx: &mut CompileContext) -> Built {
        let (_, options) = split_block_options(args);
        let group = |key| options.and_then(|opts| keyword_get(opts, key));

        let mut node = self.node(ast, ExprKind::ReceiveExpression, ctx);
        self.match_clauses(&mut node, Predicate::Clause, group("do"), ctx);

        if let Some(after) = group("after") {
            match arrow_clauses(after).as_deref() {
                Some([clause]) => {
                    let timeout = clause.heads.first();
                    let non_blocking = matches!(timeout, Some(Ast::Integer(0)));
                    node.literal(Predicate::IsNonBlocking, Literal::boolean(non_blocking));
                    self.optional_child(&mut node, Predicate::AfterTimeout, timeout, ctx);
                    let body = self.compile_expr(clause.body, ctx);
                    node.child(Predicate::AfterBody, body);
                }
                _ => {
                    let child = self.unknown(after, "expected one after clause", ctx);
                    node.child(Predicate::AfterBody, child);
                }
            }
        }
        node
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Functions and captures
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `fn` with its clauses and one `CapturedVariable` per free variable
    pub(crate) fn compile_fn(&self, ast: &Ast, ctx: &mut CompileContext) -> Built {
        let Some(literal) = FunctionLiteral::extract(ast) else {
            return self.unknown(ast, "fn without clauses", ctx);
        };
        let analysis = self.closures.analyze(&literal);

        let mut node = self.node(ast, ExprKind::AnonymousFunction, ctx);
        node.literal(Predicate::Arity, Literal::count(literal.arity()));
        node.literal(Predicate::IsClosure, Literal::boolean(analysis.is_closure()));

        for (order, clause) in literal.clauses.iter().enumerate() {
            let mut child = Built::new(
                ExpressionNode::new(ctx.next_id(), ExprKind::FunctionClause)
                    .with_location(clause.location),
            );
            child.literal(Predicate::ClauseOrder, Literal::count(order));
            child.literal(Predicate::Arity, Literal::count(clause.params.len()));
            for (index, param) in clause.params.iter().enumerate() {
                let pattern = self.compile_pattern(param, ctx);
                child.child_at(Predicate::Pattern, pattern, index);
            }
            if let Some(guard) = clause.guard {
                let guard = self.compile_guard(guard, ctx);
                child.child(Predicate::Guard, guard);
            }
            let body = self.compile_expr(clause.body, ctx);
            child.child(Predicate::Body, body);
            node.child(Predicate::Clause, child);
        }

        for free in &analysis.free_variables {
            let mut captured = Built::new(
                ExpressionNode::new(ctx.next_id(), ExprKind::CapturedVariable)
                    .with_location(free.reference_locations.first().copied()),
            );
            captured.literal(Predicate::VariableName, Literal::string(free.name.as_str()));
            captured.literal(Predicate::ReferenceCount, Literal::count(free.reference_count));
            node.child(Predicate::Captures, captured);
        }
        node
    }

    /// `&1`, `&fun/2`, `&Mod.fun/2` or shorthand `&(...)`
    pub(crate) fn compile_capture(
        &self,
        ast: &Ast,
        inner: &Ast,
        ctx: &mut CompileContext,
    ) -> Built {
        match (inner, placeholder_position(ast)) {
            (Ast::Integer(_), Some(position)) => {
                let mut node = self.node(ast, ExprKind::CapturePlaceholder, ctx);
                node.literal(Predicate::PlaceholderPosition, Literal::count(position));
                return node;
            }
            (Ast::Integer(n), None) if *n < 1 => {
                return self.unknown(ast, "placeholder position below 1", ctx);
            }
            (Ast::Integer(_) | Ast::BigInteger(_), _) => {
                return self.unknown(ast, "placeholder position out of range", ctx);
            }
            _ => {}
        }

        if let Some([callee, Ast::Integer(arity)]) = inner.call_args("/") {
            if let Some(node) = self.named_capture(ast, callee, *arity, ctx) {
                return node;
            }
        }

        let analysis = self.placeholders.analyze(ast);
        let mut node = self.node(ast, ExprKind::CaptureExpression, ctx);
        node.literal(Predicate::Arity, Literal::count(analysis.arity));
        node.literal(Predicate::HasPlaceholderGaps, Literal::boolean(analysis.has_gaps()));
        for gap in &analysis.gaps {
            node.literal(Predicate::MissingPlaceholder, Literal::count(*gap));
        }
        node.literal(Predicate::PlaceholderUsages, Literal::count(analysis.total_usages));
        let body = self.compile_expr(inner, ctx);
        node.child(Predicate::Body, body);
        node
    }

    /// `&fun/arity` or `&receiver.fun/arity`; `None` for other callees
    fn named_capture(
        &self,
        ast: &Ast,
        callee: &Ast,
        arity: i64,
        ctx: &mut CompileContext,
    ) -> Option<Built> {
        if let Some(function) = callee.var_name() {
            let mut node = self.node(ast, ExprKind::FunctionCapture, ctx);
            node.literal(Predicate::RefersToFunction, Literal::string(function));
            node.literal(Predicate::Arity, Literal::integer(arity));
            return Some(node);
        }

        let form = callee.as_form()?;
        let [receiver, Ast::Atom(function)] = form.head.call_args(".")? else {
            return None;
        };
        let mut node = self.node(ast, ExprKind::FunctionCapture, ctx);
        match super::references::static_module(receiver) {
            Some(module) => node.literal(Predicate::RefersToModule, Literal::string(module)),
            None => {
                let receiver = self.compile_expr(receiver, ctx);
                node.child(Predicate::Receiver, receiver);
            }
        }
        node.literal(Predicate::RefersToFunction, Literal::string(function.as_str()));
        node.literal(Predicate::Arity, Literal::integer(arity));
        Some(node)
    }
}

/// A raise argument that reads as a message rather than an exception
fn is_message(arg: &Ast) -> bool {
    matches!(arg, Ast::String(_)) || arg.call_args("<<>>").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{FileKind, Graph};

    const ROOT: &str = "urn:t#expr/0";

    fn compile(ast: &Ast) -> Graph {
        let mut ctx = CompileContext::new("urn:t#", FileKind::Project, true);
        ExpressionCompiler::new().compile_expr(ast, &mut ctx).into_graph()
    }

    fn arrow(heads: Vec<Ast>, body: Ast) -> Ast {
        Ast::call("->", vec![Ast::list(heads), body])
    }

    #[test]
    fn test_if_branches() {
        let ast = Ast::call(
            "if",
            vec![
                Ast::var("ok"),
                Ast::keyword(vec![("do", Ast::int(1)), ("else", Ast::int(2))]),
            ],
        );
        let graph = compile(&ast);
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::IfExpression));
        assert_eq!(graph.targets(ROOT, Predicate::Condition).len(), 1);
        assert_eq!(graph.targets(ROOT, Predicate::ThenBranch).len(), 1);
        assert_eq!(graph.targets(ROOT, Predicate::ElseBranch).len(), 1);

        let unless = Ast::call(
            "unless",
            vec![Ast::var("ok"), Ast::keyword(vec![("do", Ast::int(1))])],
        );
        let graph = compile(&unless);
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::UnlessExpression));
        assert!(graph.targets(ROOT, Predicate::ElseBranch).is_empty());
    }

    #[test]
    fn test_case_has_no_else_clause() {
        // case x do {:ok, v} when v > 0 -> v; _ -> 0 end
        let guarded = Ast::call(
            "when",
            vec![
                Ast::pair(Ast::atom("ok"), Ast::var("v")),
                Ast::op(">", Ast::var("v"), Ast::int(0)),
            ],
        );
        let ast = Ast::call(
            "case",
            vec![
                Ast::var("x"),
                Ast::keyword(vec![(
                    "do",
                    Ast::list(vec![
                        arrow(vec![guarded], Ast::var("v")),
                        arrow(vec![Ast::var("_")], Ast::int(0)),
                    ]),
                )]),
            ],
        );
        let graph = compile(&ast);
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::CaseExpression));
        assert_eq!(graph.targets(ROOT, Predicate::Subject).len(), 1);
        assert!(graph.targets(ROOT, Predicate::ElseClause).is_empty());

        let clauses = graph.targets(ROOT, Predicate::Clause);
        assert_eq!(clauses.len(), 2);
        let first = clauses[0];
        assert_eq!(graph.kind_of(first), Some(ExprKind::MatchClause));
        assert_eq!(graph.literal(first, Predicate::ClauseOrder), Some(&Literal::count(0)));
        assert_eq!(graph.targets(first, Predicate::Guard).len(), 1);
        let pattern = graph.targets(first, Predicate::Pattern)[0];
        assert_eq!(graph.kind_of(pattern), Some(ExprKind::TuplePattern));
        assert_eq!(
            graph.literal(clauses[1], Predicate::ClauseOrder),
            Some(&Literal::count(1))
        );
    }

    #[test]
    fn test_with_clauses_and_else() {
        // with {:ok, a} <- fetch(), b = a + 1 do b else :error -> nil end
        let ast = Ast::call(
            "with",
            vec![
                Ast::op(
                    "<-",
                    Ast::pair(Ast::atom("ok"), Ast::var("a")),
                    Ast::call("fetch", vec![]),
                ),
                Ast::op("=", Ast::var("b"), Ast::op("+", Ast::var("a"), Ast::int(1))),
                Ast::keyword(vec![
                    ("do", Ast::var("b")),
                    ("else", Ast::list(vec![arrow(vec![Ast::atom("error")], Ast::atom("nil"))])),
                ]),
            ],
        );
        let graph = compile(&ast);
        let clauses = graph.targets(ROOT, Predicate::Clause);
        assert_eq!(clauses.len(), 2);
        for clause in &clauses {
            assert_eq!(graph.kind_of(clause), Some(ExprKind::WithClause));
            assert_eq!(graph.targets(clause, Predicate::Pattern).len(), 1);
            assert_eq!(graph.targets(clause, Predicate::Source).len(), 1);
        }
        assert_eq!(graph.targets(ROOT, Predicate::Body).len(), 1);
        assert_eq!(graph.targets(ROOT, Predicate::ElseClause).len(), 1);
    }

    #[test]
    fn test_for_generators_filters_and_options() {
        // for x <- xs, x > 1, uniq: true, into: %{} do {x, x} end
        let ast = Ast::call(
            "for",
            vec![
                Ast::op("<-", Ast::var("x"), Ast::var("xs")),
                Ast::op(">", Ast::var("x"), Ast::int(1)),
                Ast::keyword(vec![
                    ("uniq", Ast::atom("true")),
                    ("into", Ast::call("%{}", vec![])),
                ]),
                Ast::keyword(vec![("do", Ast::pair(Ast::var("x"), Ast::var("x")))]),
            ],
        );
        let graph = compile(&ast);
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::ForComprehension));
        let generators = graph.targets(ROOT, Predicate::Clause);
        assert_eq!(generators.len(), 1);
        assert_eq!(graph.kind_of(generators[0]), Some(ExprKind::Generator));
        assert_eq!(graph.targets(ROOT, Predicate::Filter).len(), 1);
        assert_eq!(graph.targets(ROOT, Predicate::IntoTarget).len(), 1);
        assert_eq!(
            graph.literal(ROOT, Predicate::IsUnique),
            Some(&Literal::boolean(true))
        );
        assert_eq!(graph.targets(ROOT, Predicate::Body).len(), 1);
    }

    #[test]
    fn test_for_reduce_and_bitstring_generator() {
        // for <<c <- bin>>, reduce: 0 do acc -> acc + c end
        let ast = Ast::call(
            "for",
            vec![
                Ast::call("<<>>", vec![Ast::op("<-", Ast::var("c"), Ast::var("bin"))]),
                Ast::keyword(vec![
                    ("reduce", Ast::int(0)),
                    (
                        "do",
                        Ast::list(vec![arrow(
                            vec![Ast::var("acc")],
                            Ast::op("+", Ast::var("acc"), Ast::var("c")),
                        )]),
                    ),
                ]),
            ],
        );
        let graph = compile(&ast);
        let generator = graph.targets(ROOT, Predicate::Clause)[0];
        let pattern = graph.targets(generator, Predicate::Pattern)[0];
        assert_eq!(graph.kind_of(pattern), Some(ExprKind::BinaryPattern));
        assert_eq!(graph.targets(ROOT, Predicate::ReduceInitial).len(), 1);
        let body = graph.targets(ROOT, Predicate::Body);
        assert_eq!(body.len(), 1);
        assert_eq!(graph.kind_of(body[0]), Some(ExprKind::MatchClause));
    }

    #[test]
    fn test_try_groups() {
        // try do run() rescue e in [ArgumentError] -> e catch :exit, r -> r after cleanup() end
        let rescue = arrow(
            vec![Ast::op(
                "in",
                Ast::var("e"),
                Ast::list(vec![Ast::aliases(&["ArgumentError"])]),
            )],
            Ast::var("e"),
        );
        let catch = arrow(vec![Ast::atom("exit"), Ast::var("r")], Ast::var("r"));
        let ast = Ast::call(
            "try",
            vec![Ast::keyword(vec![
                ("do", Ast::call("run", vec![])),
                ("rescue", Ast::list(vec![rescue])),
                ("catch", Ast::list(vec![catch])),
                ("after", Ast::call("cleanup", vec![])),
            ])],
        );
        let graph = compile(&ast);
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::TryExpression));

        let rescue = graph.targets(ROOT, Predicate::RescueClause)[0];
        assert_eq!(graph.targets(rescue, Predicate::Pattern).len(), 1);
        assert_eq!(graph.targets(rescue, Predicate::RescuedException).len(), 1);

        let catch = graph.targets(ROOT, Predicate::CatchClause)[0];
        assert_eq!(
            graph.literal(catch, Predicate::CatchKind),
            Some(&Literal::string("exit"))
        );
        assert_eq!(graph.targets(ROOT, Predicate::AfterBody).len(), 1);
        assert!(graph.targets(ROOT, Predicate::ElseClause).is_empty());
    }

    #[test]
    fn test_raise_and_reraise() {
        let graph = compile(&Ast::call("raise", vec![Ast::string("boom")]));
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::RaiseExpression));
        assert_eq!(graph.literal(ROOT, Predicate::IsReraise), Some(&Literal::boolean(false)));
        assert_eq!(graph.targets(ROOT, Predicate::Message).len(), 1);

        let graph = compile(&Ast::call(
            "raise",
            vec![
                Ast::aliases(&["KeyError"]),
                Ast::keyword(vec![("key", Ast::atom("a"))]),
            ],
        ));
        assert_eq!(graph.targets(ROOT, Predicate::Exception).len(), 1);
        assert_eq!(graph.targets(ROOT, Predicate::ExceptionAttributes).len(), 1);

        let graph = compile(&Ast::call(
            "reraise",
            vec![Ast::var("e"), Ast::var("__STACKTRACE__")],
        ));
        assert_eq!(graph.literal(ROOT, Predicate::IsReraise), Some(&Literal::boolean(true)));
        assert_eq!(graph.targets(ROOT, Predicate::Exception).len(), 1);
        assert_eq!(graph.targets(ROOT, Predicate::Stacktrace).len(), 1);
    }

    #[test]
    fn test_receive_after_zero_is_non_blocking() {
        let ast = Ast::call(
            "receive",
            vec![Ast::keyword(vec![
                ("do", Ast::list(vec![arrow(vec![Ast::var("msg")], Ast::var("msg"))])),
                ("after", Ast::list(vec![arrow(vec![Ast::int(0)], Ast::atom("timeout"))])),
            ])],
        );
        let graph = compile(&ast);
        assert_eq!(graph.targets(ROOT, Predicate::Clause).len(), 1);
        assert_eq!(graph.targets(ROOT, Predicate::AfterTimeout).len(), 1);
        assert_eq!(
            graph.literal(ROOT, Predicate::IsNonBlocking),
            Some(&Literal::boolean(true))
        );
    }

    #[test]
    fn test_receive_with_empty_do_block() {
        // receive do after 0 -> :timeout end
        let ast = Ast::call(
            "receive",
            vec![Ast::keyword(vec![
                ("do", Ast::block(vec![])),
                ("after", Ast::list(vec![arrow(vec![Ast::int(0)], Ast::atom("timeout"))])),
            ])],
        );
        let graph = compile(&ast);
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::ReceiveExpression));
        assert!(graph.targets(ROOT, Predicate::Clause).is_empty());
        assert!(graph.nodes_of_kind(ExprKind::UnknownExpression).is_empty());
        assert_eq!(
            graph.literal(ROOT, Predicate::IsNonBlocking),
            Some(&Literal::boolean(true))
        );
        assert_eq!(graph.targets(ROOT, Predicate::AfterBody).len(), 1);
    }

    #[test]
    fn test_empty_else_block_adds_no_clauses() {
        // with a <- x do a else end
        let ast = Ast::call(
            "with",
            vec![
                Ast::op("<-", Ast::var("a"), Ast::var("x")),
                Ast::keyword(vec![("do", Ast::var("a")), ("else", Ast::block(vec![]))]),
            ],
        );
        let graph = compile(&ast);
        assert!(graph.targets(ROOT, Predicate::ElseClause).is_empty());
        assert!(graph.nodes_of_kind(ExprKind::UnknownExpression).is_empty());
    }

    #[test]
    fn test_fn_captures_free_variable() {
        // fn x -> x + y end
        let ast = Ast::call(
            "fn",
            vec![arrow(vec![Ast::var("x")], Ast::op("+", Ast::var("x"), Ast::var("y")))],
        );
        let graph = compile(&ast);
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::AnonymousFunction));
        assert_eq!(graph.literal(ROOT, Predicate::Arity), Some(&Literal::count(1)));
        assert_eq!(graph.literal(ROOT, Predicate::IsClosure), Some(&Literal::boolean(true)));

        let captured = graph.targets(ROOT, Predicate::Captures);
        assert_eq!(captured.len(), 1);
        assert_eq!(
            graph.literal(captured[0], Predicate::VariableName),
            Some(&Literal::string("y"))
        );
        assert_eq!(
            graph.literal(captured[0], Predicate::ReferenceCount),
            Some(&Literal::count(1))
        );
    }

    #[test]
    fn test_capture_forms() {
        // &String.upcase/1
        let named = Ast::call(
            "&",
            vec![Ast::op(
                "/",
                Ast::form(
                    Ast::call(".", vec![Ast::aliases(&["String"]), Ast::atom("upcase")]),
                    crate::shared::models::Args::List(vec![]),
                ),
                Ast::int(1),
            )],
        );
        let graph = compile(&named);
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::FunctionCapture));
        assert_eq!(
            graph.literal(ROOT, Predicate::RefersToModule),
            Some(&Literal::string("String"))
        );
        assert_eq!(graph.literal(ROOT, Predicate::Arity), Some(&Literal::integer(1)));

        // &(&1 + &3)
        let placeholder = |n| Ast::call("&", vec![Ast::int(n)]);
        let shorthand = Ast::call("&", vec![Ast::op("+", placeholder(1), placeholder(3))]);
        let graph = compile(&shorthand);
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::CaptureExpression));
        assert_eq!(graph.literal(ROOT, Predicate::Arity), Some(&Literal::count(3)));
        assert_eq!(
            graph.literal(ROOT, Predicate::MissingPlaceholder),
            Some(&Literal::count(2))
        );
        assert_eq!(graph.nodes_of_kind(ExprKind::CapturePlaceholder).len(), 2);

        let graph = compile(&placeholder(0));
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::UnknownExpression));
    }

    #[test]
    fn test_out_of_range_placeholder_falls_back() {
        let placeholder = |n| Ast::call("&", vec![Ast::int(n)]);

        let graph = compile(&placeholder(i64::MAX));
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::UnknownExpression));
        assert_eq!(
            graph.literal(ROOT, Predicate::Diagnostic),
            Some(&Literal::string("placeholder position out of range"))
        );

        // &f(&2000000)
        let shorthand = Ast::call("&", vec![Ast::call("f", vec![placeholder(2_000_000)])]);
        let graph = compile(&shorthand);
        assert_eq!(graph.kind_of(ROOT), Some(ExprKind::CaptureExpression));
        assert_eq!(graph.literal(ROOT, Predicate::Arity), Some(&Literal::count(0)));
        assert!(graph.literal(ROOT, Predicate::MissingPlaceholder).is_none());
        assert_eq!(graph.nodes_of_kind(ExprKind::UnknownExpression).len(), 1);
        assert!(graph.len() < 20);
    }
}
