//! AST fixtures
//!
//! Builders for the quoted forms the integration tests compile.

use exgraph_ir::shared::models::{Args, Ast};
use exgraph_ir::{CompileContext, ExpressionCompiler, ExpressionBuilderTrait, FileKind, Outcome};

pub const BASE: &str = "https://example.org/app/lib/a.ex#";

/// Root id of the first node compiled in a fresh context
pub fn root() -> String {
    format!("{BASE}expr/0")
}

pub fn project_ctx() -> CompileContext {
    CompileContext::new(BASE, FileKind::Project, true)
}

pub fn compile(ast: &Ast) -> Outcome {
    let mut ctx = project_ctx();
    ExpressionCompiler::new().build(Some(ast), &mut ctx)
}

/// `heads -> body`
pub fn arrow(heads: Vec<Ast>, body: Ast) -> Ast {
    Ast::call("->", vec![Ast::list(heads), body])
}

/// `fn clause1; clause2 end`
pub fn fn_literal(clauses: Vec<Ast>) -> Ast {
    Ast::call("fn", clauses)
}

/// `&N`
pub fn placeholder(n: i64) -> Ast {
    Ast::call("&", vec![Ast::int(n)])
}

/// `fun.(args)`
pub fn anonymous_call(callee: Ast, args: Vec<Ast>) -> Ast {
    Ast::form(Ast::call(".", vec![callee]), Args::List(args))
}

/// `fn x -> y; y -> x end` style two-clause literal
pub fn crossed_clauses() -> Ast {
    fn_literal(vec![
        arrow(vec![Ast::var("x")], Ast::op("+", Ast::var("x"), Ast::var("y"))),
        arrow(vec![Ast::var("y")], Ast::op("*", Ast::var("y"), Ast::var("x"))),
    ])
}

/// `case value do {:ok, v} -> v; {:error, _} -> nil; _ -> :other end`
pub fn three_clause_case() -> Ast {
    Ast::call(
        "case",
        vec![
            Ast::var("value"),
            Ast::keyword(vec![(
                "do",
                Ast::list(vec![
                    arrow(vec![Ast::pair(Ast::atom("ok"), Ast::var("v"))], Ast::var("v")),
                    arrow(
                        vec![Ast::pair(Ast::atom("error"), Ast::var("_"))],
                        Ast::atom("nil"),
                    ),
                    arrow(vec![Ast::var("_")], Ast::atom("other")),
                ]),
            )]),
        ],
    )
}

/// A module-sized expression touching most constructs
pub fn kitchen_sink() -> Ast {
    Ast::block(vec![
        Ast::op(
            "=",
            Ast::pair(Ast::atom("ok"), Ast::var("list")),
            Ast::remote(Ast::aliases(&["Repo"]), "all", vec![Ast::var("query")]),
        ),
        Ast::op(
            "|>",
            Ast::var("list"),
            Ast::remote(
                Ast::aliases(&["Enum"]),
                "map",
                vec![Ast::call("&", vec![Ast::op("*", placeholder(1), Ast::var("factor"))])],
            ),
        ),
        three_clause_case(),
        Ast::call(
            "..//",
            vec![Ast::int(1), Ast::int(10), Ast::int(2)],
        ),
        crossed_clauses(),
        Ast::call("%{}", vec![Ast::pair(Ast::atom("a"), Ast::list(vec![]))]),
    ])
}
