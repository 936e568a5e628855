//! Operator Compiler
//!
//! Every operator shares one shape: a node typed with its operator class, an
//! `operator-symbol` literal and `left-operand` / `right-operand` (binary) or
//! `operand` (unary) edges. The left side of `=` is a pattern.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::dispatcher::ExpressionCompiler;
use crate::features::expression_builder::domain::{Built, CompileContext};
use crate::shared::models::{Ast, ExprKind, Literal, Predicate};

/// Class of a binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorClass {
    pub kind: ExprKind,
    /// `&&` / `||` evaluate the right side lazily on any truthy value
    pub short_circuit: bool,
}

impl OperatorClass {
    const fn of(kind: ExprKind) -> Self {
        Self {
            kind,
            short_circuit: false,
        }
    }
}

static BINARY_OPERATORS: Lazy<FxHashMap<&'static str, OperatorClass>> = Lazy::new(|| {
    let mut table = FxHashMap::default();
    for symbol in ["+", "-", "*", "/", "**"] {
        table.insert(symbol, OperatorClass::of(ExprKind::ArithmeticOperator));
    }
    for symbol in ["==", "!=", "===", "!==", "<", ">", "<=", ">=", "=~"] {
        table.insert(symbol, OperatorClass::of(ExprKind::ComparisonOperator));
    }
    for symbol in ["and", "or"] {
        table.insert(symbol, OperatorClass::of(ExprKind::LogicalOperator));
    }
    for symbol in ["&&", "||"] {
        table.insert(
            symbol,
            OperatorClass {
                kind: ExprKind::LogicalOperator,
                short_circuit: true,
            },
        );
    }
    table.insert("|>", OperatorClass::of(ExprKind::PipeOperator));
    table.insert("=", OperatorClass::of(ExprKind::MatchOperator));
    table.insert("<>", OperatorClass::of(ExprKind::StringConcatOperator));
    for symbol in ["++", "--"] {
        table.insert(symbol, OperatorClass::of(ExprKind::ListOperator));
    }
    table.insert("in", OperatorClass::of(ExprKind::InOperator));
    table.insert("\\\\", OperatorClass::of(ExprKind::DefaultArgumentOperator));
    table
});

/// Class of a binary operator symbol, `None` if it is not one
pub fn operator_class(symbol: &str) -> Option<OperatorClass> {
    BINARY_OPERATORS.get(symbol).copied()
}

impl ExpressionCompiler {
    pub(crate) fn compile_binary_op(
        &self,
        ast: &Ast,
        class: OperatorClass,
        symbol: &str,
        left: &Ast,
        right: &Ast,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, class.kind, ctx);
        node.literal(Predicate::OperatorSymbol, Literal::string(symbol));
        if class.kind == ExprKind::LogicalOperator {
            node.literal(Predicate::IsShortCircuit, Literal::boolean(class.short_circuit));
        }

        let left = if class.kind == ExprKind::MatchOperator {
            self.compile_pattern(left, ctx)
        } else {
            self.compile_expr(left, ctx)
        };
        node.child(Predicate::LeftOperand, left);
        let right = self.compile_expr(right, ctx);
        node.child(Predicate::RightOperand, right);
        node
    }

    /// `not(a in b)`, emitted as one membership node
    pub(crate) fn compile_not_in(
        &self,
        ast: &Ast,
        left: &Ast,
        right: &Ast,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::InOperator, ctx);
        node.literal(Predicate::OperatorSymbol, Literal::string("not in"));
        let left = self.compile_expr(left, ctx);
        node.child(Predicate::LeftOperand, left);
        let right = self.compile_expr(right, ctx);
        node.child(Predicate::RightOperand, right);
        node
    }

    pub(crate) fn compile_unary_op(
        &self,
        ast: &Ast,
        symbol: &str,
        operand: &Ast,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::UnaryOperator, ctx);
        node.literal(Predicate::OperatorSymbol, Literal::string(symbol));
        let operand = self.compile_expr(operand, ctx);
        node.child(Predicate::Operand, operand);
        node
    }
}
