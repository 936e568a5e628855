//! Variables, module references and calls

use super::dispatcher::ExpressionCompiler;
use crate::features::closure_analysis::infrastructure::is_ignored_name;
use crate::features::expression_builder::domain::{Built, CompileContext};
use crate::shared::models::{Ast, ExprKind, Literal, Predicate};

impl ExpressionCompiler {
    pub(crate) fn compile_variable(
        &self,
        ast: &Ast,
        name: &str,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::Variable, ctx);
        node.literal(Predicate::VariableName, Literal::string(name));
        if is_ignored_name(name) {
            node.literal(Predicate::IsIgnored, Literal::boolean(true));
        }
        node
    }

    /// `_` outside a pattern still compiles, as a wildcard
    pub(crate) fn compile_wildcard(&self, ast: &Ast, ctx: &mut CompileContext) -> Built {
        self.node(ast, ExprKind::WildcardPattern, ctx)
    }

    /// `^x` reads an existing binding
    pub(crate) fn compile_pin(&self, ast: &Ast, pinned: &Ast, ctx: &mut CompileContext) -> Built {
        let mut node = self.node(ast, ExprKind::PinPattern, ctx);
        match pinned.var_name() {
            Some(name) => node.literal(Predicate::PinnedVariable, Literal::string(name)),
            None => {
                let operand = self.compile_expr(pinned, ctx);
                node.child(Predicate::Operand, operand);
            }
        }
        node
    }

    pub(crate) fn compile_module_alias(
        &self,
        ast: &Ast,
        module: String,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::ModuleReference, ctx);
        node.literal(Predicate::RefersToModule, Literal::string(module));
        node
    }

    /// `@name` (read) or `@name value` (definition)
    pub(crate) fn compile_module_attribute(
        &self,
        ast: &Ast,
        attribute: &Ast,
        ctx: &mut CompileContext,
    ) -> Built {
        let Some((name, args)) = attribute
            .var_name()
            .map(|name| (name, &[][..]))
            .or_else(|| attribute.call_parts())
        else {
            return self.unknown(ast, "module attribute without a name", ctx);
        };

        let mut node = self.node(ast, ExprKind::ModuleAttribute, ctx);
        node.literal(Predicate::AttributeName, Literal::string(name));
        self.children(&mut node, Predicate::Argument, args, ctx);
        node
    }

    pub(crate) fn compile_block(
        &self,
        ast: &Ast,
        stmts: &[Ast],
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::Block, ctx);
        self.children(&mut node, Predicate::Statement, stmts, ctx);
        node
    }

    pub(crate) fn compile_local_call(
        &self,
        ast: &Ast,
        name: &str,
        args: &[Ast],
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::LocalCall, ctx);
        node.literal(Predicate::RefersToFunction, Literal::string(name));
        node.literal(Predicate::Arity, Literal::count(args.len()));
        self.children(&mut node, Predicate::Argument, args, ctx);
        node
    }

    /// `Mod.fun(args)` records the module; `expr.fun(args)` links the receiver
    pub(crate) fn compile_remote_call(
        &self,
        ast: &Ast,
        receiver: &Ast,
        function: &str,
        args: &[Ast],
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::RemoteCall, ctx);
        match static_module(receiver) {
            Some(module) => node.literal(Predicate::RefersToModule, Literal::string(module)),
            None => {
                let receiver = self.compile_expr(receiver, ctx);
                node.child(Predicate::Receiver, receiver);
            }
        }
        node.literal(Predicate::RefersToFunction, Literal::string(function));
        node.literal(Predicate::Arity, Literal::count(args.len()));
        self.children(&mut node, Predicate::Argument, args, ctx);
        node
    }

    /// `fun.(args)`
    pub(crate) fn compile_anonymous_call(
        &self,
        ast: &Ast,
        callee: &Ast,
        args: &[Ast],
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::AnonymousCall, ctx);
        let callee = self.compile_expr(callee, ctx);
        node.child(Predicate::Callee, callee);
        node.literal(Predicate::Arity, Literal::count(args.len()));
        self.children(&mut node, Predicate::Argument, args, ctx);
        node
    }
}

/// Module name when the receiver is an alias (`Enum`) or an atom (`:lists`)
pub(crate) fn static_module(receiver: &Ast) -> Option<String> {
    match receiver {
        Ast::Atom(name) if !matches!(name.as_str(), "nil" | "true" | "false") => Some(name.clone()),
        Ast::Form(_) => receiver
            .call_args("__aliases__")
            .and_then(|_| receiver.module_name()),
        _ => None,
    }
}
