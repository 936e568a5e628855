//! Literal Compiler
//!
//! Scalars carry a single `value` literal. Composite literals link their
//! children:
//!
//! | Kind         | Children                                                   |
//! |--------------|------------------------------------------------------------|
//! | list         | `element` (+ `element-index`), `list-tail` for `[h \| t]`  |
//! | tuple        | `element` per slot                                         |
//! | map / struct | `entry-value` per entry, key as `entry-key` on the value   |
//! | keyword list | `element` per entry, duplicates kept in order              |
//! | range        | `range-start`, `range-end`, optional `range-step`          |

use super::dispatcher::{decode_charlist, ExpressionCompiler};
use crate::features::expression_builder::domain::{Built, CompileContext};
use crate::shared::models::{Ast, ExprKind, Literal, Predicate};

/// Literal form of a map key that needs no compilation
pub(crate) fn literal_key(key: &Ast) -> Option<Literal> {
    match key {
        Ast::Atom(name) => Some(Literal::string(name.as_str())),
        Ast::String(text) => Some(Literal::string(text.as_str())),
        Ast::Integer(value) => Some(Literal::integer(*value)),
        Ast::BigInteger(digits) => Some(Literal::integer_text(digits.as_str())),
        Ast::Float(value) => Some(Literal::double(*value)),
        _ => None,
    }
}

/// Split a trailing `h | t` cons cell off list items
pub(crate) fn split_tail(items: &[Ast]) -> (Vec<&Ast>, Option<&Ast>) {
    match items.split_last() {
        Some((last, rest)) => match last.call_args("|") {
            Some([head, tail]) => {
                let mut heads: Vec<&Ast> = rest.iter().collect();
                heads.push(head);
                (heads, Some(tail))
            }
            _ => (items.iter().collect(), None),
        },
        None => (Vec::new(), None),
    }
}

impl ExpressionCompiler {
    pub(crate) fn compile_list(&self, ast: &Ast, items: &[Ast], ctx: &mut CompileContext) -> Built {
        let mut node = self.node(ast, ExprKind::ListLiteral, ctx);
        let (heads, tail) = split_tail(items);
        for (index, item) in heads.into_iter().enumerate() {
            let child = self.compile_expr(item, ctx);
            node.child_at(Predicate::Element, child, index);
        }
        if let Some(tail) = tail {
            let tail = self.compile_expr(tail, ctx);
            node.child(Predicate::ListTail, tail);
        }
        node
    }

    pub(crate) fn compile_tuple(
        &self,
        ast: &Ast,
        items: &[&Ast],
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::TupleLiteral, ctx);
        for (index, item) in items.iter().enumerate() {
            let child = self.compile_expr(item, ctx);
            node.child_at(Predicate::Element, child, index);
        }
        node
    }

    /// Entries keep their order; duplicate keys are not merged
    pub(crate) fn compile_keyword_list(
        &self,
        ast: &Ast,
        entries: &[Ast],
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::KeywordListLiteral, ctx);
        for (index, entry) in entries.iter().enumerate() {
            let child = match entry {
                Ast::Pair(key, value) => {
                    let mut child = self.compile_expr(value, ctx);
                    if let Some(key) = literal_key(key) {
                        child.literal(Predicate::EntryKey, key);
                    }
                    child
                }
                other => self.compile_expr(other, ctx),
            };
            node.child_at(Predicate::Element, child, index);
        }
        node
    }

    pub(crate) fn compile_map(
        &self,
        ast: &Ast,
        kind: ExprKind,
        entries: &[Ast],
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, kind, ctx);
        self.map_entries(&mut node, entries, ctx);
        node
    }

    /// `%Mod{...}`: module reference plus the map body
    pub(crate) fn compile_struct(
        &self,
        ast: &Ast,
        module: &Ast,
        body: &Ast,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::StructLiteral, ctx);
        match module.module_name() {
            Some(name) => node.literal(Predicate::RefersToModule, Literal::string(name)),
            None => {
                let receiver = self.compile_expr(module, ctx);
                node.child(Predicate::Receiver, receiver);
            }
        }
        let entries = body.call_args("%{}").unwrap_or_default();
        self.map_entries(&mut node, entries, ctx);
        node
    }

    /// Entries of `%{...}`, including the `%{base | ...}` update form
    fn map_entries(&self, node: &mut Built, entries: &[Ast], ctx: &mut CompileContext) {
        let entries = match entries {
            [single] => match single.call_args("|") {
                Some([base, updates]) => {
                    let base = self.compile_expr(base, ctx);
                    node.child(Predicate::MapUpdateBase, base);
                    match updates {
                        Ast::List(items) => items.as_slice(),
                        other => std::slice::from_ref(other),
                    }
                }
                _ => entries,
            },
            _ => entries,
        };

        for (index, entry) in entries.iter().enumerate() {
            let child = match entry {
                Ast::Pair(key, value) => {
                    let mut child = self.compile_expr(value, ctx);
                    match literal_key(key) {
                        Some(key) => child.literal(Predicate::EntryKey, key),
                        None => {
                            let key = self.compile_expr(key, ctx);
                            child.child(Predicate::EntryKeyExpression, key);
                        }
                    }
                    child
                }
                other => self.compile_expr(other, ctx),
            };
            node.child_at(Predicate::EntryValue, child, index);
        }
    }

    /// `~r/.../i`: letter, content when free of interpolation, modifiers
    pub(crate) fn compile_sigil(
        &self,
        ast: &Ast,
        letter: &str,
        content: &Ast,
        modifiers: &Ast,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::SigilLiteral, ctx);
        node.literal(Predicate::SigilChar, Literal::string(letter));

        let text: Option<String> = content.call_args("<<>>").and_then(|parts| {
            parts
                .iter()
                .map(|part| match part {
                    Ast::String(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        });
        if let Some(text) = text {
            node.literal(Predicate::SigilContent, Literal::string(text));
        }

        if let Ast::List(codes) = modifiers {
            if let Some(flags) = decode_charlist(codes).filter(|f| !f.is_empty()) {
                node.literal(Predicate::SigilModifiers, Literal::string(flags));
            }
        }
        node
    }

    pub(crate) fn compile_range(
        &self,
        ast: &Ast,
        start: Option<&Ast>,
        end: Option<&Ast>,
        step: Option<&Ast>,
        ctx: &mut CompileContext,
    ) -> Built {
        let mut node = self.node(ast, ExprKind::RangeLiteral, ctx);
        let bounds = [
            (Predicate::RangeStart, start),
            (Predicate::RangeEnd, end),
            (Predicate::RangeStep, step),
        ];
        for (predicate, bound) in bounds {
            if let Some(bound) = bound {
                let child = self.compile_expr(bound, ctx);
                node.child(predicate, child);
            }
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::FileKind;

    fn compile(ast: &Ast) -> (Built, CompileContext) {
        let mut ctx = CompileContext::new("urn:t#", FileKind::Project, true);
        let built = ExpressionCompiler::new().compile_expr(ast, &mut ctx);
        (built, ctx)
    }

    #[test]
    fn test_list_with_tail() {
        // [a, b | rest]
        let list = Ast::list(vec![
            Ast::var("a"),
            Ast::call("|", vec![Ast::var("b"), Ast::var("rest")]),
        ]);
        let (built, _) = compile(&list);
        let graph = built.into_graph();
        assert_eq!(graph.targets("urn:t#expr/0", Predicate::Element).len(), 2);
        assert_eq!(graph.targets("urn:t#expr/0", Predicate::ListTail).len(), 1);
    }

    #[test]
    fn test_map_keys_and_update() {
        // %{state | "k" => 1, count: n}
        let map = Ast::call(
            "%{}",
            vec![Ast::call(
                "|",
                vec![
                    Ast::var("state"),
                    Ast::list(vec![
                        Ast::pair(Ast::string("k"), Ast::int(1)),
                        Ast::pair(Ast::atom("count"), Ast::var("n")),
                    ]),
                ],
            )],
        );
        let (built, _) = compile(&map);
        let root = built.id.clone();
        let graph = built.into_graph();
        assert_eq!(graph.targets(&root, Predicate::MapUpdateBase).len(), 1);
        let values = graph.targets(&root, Predicate::EntryValue);
        assert_eq!(values.len(), 2);
        assert_eq!(
            graph.literal(values[1], Predicate::EntryKey),
            Some(&Literal::string("count"))
        );
    }

    #[test]
    fn test_expression_map_key() {
        let map = Ast::call("%{}", vec![Ast::pair(Ast::var("key"), Ast::int(1))]);
        let (built, _) = compile(&map);
        let root = built.id.clone();
        let graph = built.into_graph();
        let value = graph.targets(&root, Predicate::EntryValue)[0].to_string();
        let key = graph.targets(&value, Predicate::EntryKeyExpression);
        assert_eq!(key.len(), 1);
        assert_eq!(graph.kind_of(key[0]), Some(ExprKind::Variable));
    }

    #[test]
    fn test_sigil() {
        // ~r/ab+c/i
        let sigil = Ast::call(
            "sigil_r",
            vec![
                Ast::call("<<>>", vec![Ast::string("ab+c")]),
                Ast::list(vec![Ast::int(105)]),
            ],
        );
        let (built, _) = compile(&sigil);
        let graph = built.into_graph();
        let root = "urn:t#expr/0";
        assert_eq!(graph.kind_of(root), Some(ExprKind::SigilLiteral));
        assert_eq!(graph.literal(root, Predicate::SigilChar), Some(&Literal::string("r")));
        assert_eq!(
            graph.literal(root, Predicate::SigilContent),
            Some(&Literal::string("ab+c"))
        );
        assert_eq!(
            graph.literal(root, Predicate::SigilModifiers),
            Some(&Literal::string("i"))
        );
    }

    #[test]
    fn test_keyword_duplicates_preserved() {
        let kw = Ast::keyword(vec![("a", Ast::int(1)), ("a", Ast::int(2))]);
        let (built, ctx) = compile(&kw);
        assert_eq!(ctx.ids_allocated(), 3);
        let graph = built.into_graph();
        assert_eq!(graph.targets("urn:t#expr/0", Predicate::Element).len(), 2);
    }

    #[test]
    fn test_struct_refers_to_module() {
        let user = Ast::call(
            "%",
            vec![
                Ast::aliases(&["App", "User"]),
                Ast::call("%{}", vec![Ast::pair(Ast::atom("name"), Ast::string("jo"))]),
            ],
        );
        let (built, _) = compile(&user);
        let graph = built.into_graph();
        assert_eq!(
            graph.literal("urn:t#expr/0", Predicate::RefersToModule),
            Some(&Literal::string("App.User"))
        );
        assert_eq!(graph.targets("urn:t#expr/0", Predicate::EntryValue).len(), 1);
    }
}
