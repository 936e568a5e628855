//! Quoted AST - the input shape handed over by the (external) parser
//!
//! Mirrors the quoted form of the source language:
//! - literals stand for themselves (atoms, numbers, strings, lists, 2-tuples)
//! - everything else is a three-element form `{head, meta, args}` where `args`
//!   is either an argument list (a call) or a context atom (a variable)
//!
//! ```text
//! a + 1      →  Form { head: :+, args: [Form { head: :a, args: Context }, 1] }
//! {:ok, x}   →  Pair(:ok, Form { head: :x, args: Context })
//! {1, 2, 3}  →  Form { head: :{}, args: [1, 2, 3] }
//! ```
//!
//! Integers are arbitrary precision in the source language. Values outside
//! `i64` decode to [`Ast::BigInteger`] holding their decimal text, from a JSON
//! number or from a decimal string (`{"t": "integer", "v": "1844..."}`). JSON
//! numbers beyond `u64` arrive as floats, so exact digits past 2^53 need the
//! string form.

use std::fmt;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::span::SourceLocation;

/// Quoted expression tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "t", content = "v", rename_all = "snake_case")]
pub enum Ast {
    /// `:ok`, `nil`, `true` (booleans and nil are atoms in quoted form)
    Atom(String),
    Integer(i64),
    /// Integer outside `i64`, as normalized decimal text (`-?[1-9][0-9]*`)
    BigInteger(String),
    Float(f64),
    /// Binary string literal without interpolation
    String(String),
    /// `[a, b]`, also keyword lists and charlists
    List(Vec<Ast>),
    /// Two-element tuple, the only tuple that is its own literal
    Pair(Box<Ast>, Box<Ast>),
    /// `{head, meta, args}`
    Form(Box<Form>),
}

impl<'de> Deserialize<'de> for Ast {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        AstRepr::deserialize(deserializer).map(Ast::from)
    }
}

/// Wire shape of [`Ast`]; `integer` also accepts values outside `i64`
#[derive(Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "snake_case")]
enum AstRepr {
    Atom(String),
    Integer(IntegerRepr),
    BigInteger(IntegerRepr),
    Float(f64),
    String(String),
    List(Vec<Ast>),
    Pair(Box<Ast>, Box<Ast>),
    Form(Box<Form>),
}

impl From<AstRepr> for Ast {
    fn from(repr: AstRepr) -> Self {
        match repr {
            AstRepr::Atom(name) => Ast::Atom(name),
            AstRepr::Integer(value) | AstRepr::BigInteger(value) => value.into(),
            AstRepr::Float(value) => Ast::Float(value),
            AstRepr::String(text) => Ast::String(text),
            AstRepr::List(items) => Ast::List(items),
            AstRepr::Pair(left, right) => Ast::Pair(left, right),
            AstRepr::Form(form) => Ast::Form(form),
        }
    }
}

enum IntegerRepr {
    Small(i64),
    Big(String),
}

impl From<IntegerRepr> for Ast {
    fn from(value: IntegerRepr) -> Self {
        match value {
            IntegerRepr::Small(n) => Ast::Integer(n),
            IntegerRepr::Big(digits) => Ast::BigInteger(digits),
        }
    }
}

impl<'de> Deserialize<'de> for IntegerRepr {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(IntegerVisitor)
    }
}

struct IntegerVisitor;

impl<'de> Visitor<'de> for IntegerVisitor {
    type Value = IntegerRepr;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or its decimal text")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Self::Value, E> {
        Ok(IntegerRepr::Small(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Self::Value, E> {
        Ok(i64::try_from(value)
            .map(IntegerRepr::Small)
            .unwrap_or_else(|_| IntegerRepr::Big(value.to_string())))
    }

    /// Only integral floats: numbers too large for `u64` are parsed as `f64`
    fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Self::Value, E> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(E::invalid_type(Unexpected::Float(value), &self));
        }
        self.visit_str(&format!("{:.0}", value))
    }

    fn visit_str<E: de::Error>(self, text: &str) -> std::result::Result<Self::Value, E> {
        if let Ok(value) = text.parse::<i64>() {
            return Ok(IntegerRepr::Small(value));
        }
        let (sign, digits) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", text),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(E::invalid_value(Unexpected::Str(text), &self));
        }
        // Out of i64 range, so at least one non-zero digit remains
        let digits = digits.trim_start_matches('0');
        Ok(IntegerRepr::Big(format!("{}{}", sign, digits)))
    }
}

/// Three-element quoted form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub head: Ast,
    #[serde(default)]
    pub meta: Meta,
    pub args: Args,
}

/// Third element of a quoted form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Args {
    /// Call arguments
    List(Vec<Ast>),
    /// Variable context (`nil` or the defining module)
    Context(Option<String>),
}

/// Node metadata (only positions are consumed)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Meta {
    pub fn at(line: u32, column: u32) -> Self {
        Self {
            line: Some(line),
            column: Some(column),
        }
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.line.map(|line| SourceLocation::new(line, self.column))
    }
}

impl Ast {
    /// Decode an AST from its JSON interchange form
    pub fn from_json(json: &str) -> Result<Ast> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Constructors
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    pub fn atom(name: impl Into<String>) -> Ast {
        Ast::Atom(name.into())
    }

    pub fn int(value: i64) -> Ast {
        Ast::Integer(value)
    }

    pub fn float(value: f64) -> Ast {
        Ast::Float(value)
    }

    pub fn string(value: impl Into<String>) -> Ast {
        Ast::String(value.into())
    }

    pub fn list(items: Vec<Ast>) -> Ast {
        Ast::List(items)
    }

    pub fn pair(left: Ast, right: Ast) -> Ast {
        Ast::Pair(Box::new(left), Box::new(right))
    }

    /// Raw three-element form
    pub fn form(head: Ast, args: Args) -> Ast {
        Ast::Form(Box::new(Form {
            head,
            meta: Meta::default(),
            args,
        }))
    }

    /// Variable reference `name`
    pub fn var(name: impl Into<String>) -> Ast {
        Ast::form(Ast::atom(name), Args::Context(None))
    }

    /// Local call or special form `name(args...)`
    pub fn call(name: impl Into<String>, args: Vec<Ast>) -> Ast {
        Ast::form(Ast::atom(name), Args::List(args))
    }

    /// Binary operator `left op right`
    pub fn op(symbol: &str, left: Ast, right: Ast) -> Ast {
        Ast::call(symbol, vec![left, right])
    }

    /// Tuple of any size (2-tuples stay literal)
    pub fn tuple(mut items: Vec<Ast>) -> Ast {
        if items.len() == 2 {
            let right = items.pop().unwrap_or(Ast::atom("nil"));
            let left = items.pop().unwrap_or(Ast::atom("nil"));
            Ast::pair(left, right)
        } else {
            Ast::call("{}", items)
        }
    }

    /// Module alias `Foo.Bar`
    pub fn aliases(segments: &[&str]) -> Ast {
        Ast::call("__aliases__", segments.iter().map(|s| Ast::atom(*s)).collect())
    }

    /// Remote call `module.fun(args...)`
    pub fn remote(module: Ast, fun: &str, args: Vec<Ast>) -> Ast {
        Ast::form(
            Ast::call(".", vec![module, Ast::atom(fun)]),
            Args::List(args),
        )
    }

    /// Keyword list `[k: v, ...]`
    pub fn keyword(entries: Vec<(&str, Ast)>) -> Ast {
        Ast::List(
            entries
                .into_iter()
                .map(|(k, v)| Ast::pair(Ast::atom(k), v))
                .collect(),
        )
    }

    /// Multi-expression block
    pub fn block(stmts: Vec<Ast>) -> Ast {
        Ast::call("__block__", stmts)
    }

    /// Attach a position (no-op for literals, which carry no metadata)
    pub fn at(mut self, line: u32, column: u32) -> Ast {
        if let Ast::Form(form) = &mut self {
            form.meta = Meta::at(line, column);
        }
        self
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Accessors
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Ast::Atom(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&Form> {
        match self {
            Ast::Form(form) => Some(form),
            _ => None,
        }
    }

    /// `(name, args)` for a form whose head is an atom and whose args are a list
    pub fn call_parts(&self) -> Option<(&str, &[Ast])> {
        let form = self.as_form()?;
        match (&form.head, &form.args) {
            (Ast::Atom(name), Args::List(args)) => Some((name.as_str(), args.as_slice())),
            _ => None,
        }
    }

    /// Like [`call_parts`](Self::call_parts) but only for the given head
    pub fn call_args(&self, name: &str) -> Option<&[Ast]> {
        self.call_parts()
            .filter(|(head, _)| *head == name)
            .map(|(_, args)| args)
    }

    /// Variable name when this node is `{name, meta, context}`
    pub fn var_name(&self) -> Option<&str> {
        let form = self.as_form()?;
        match (&form.head, &form.args) {
            (Ast::Atom(name), Args::Context(_)) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.as_form().map(|f| &f.meta)
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.meta().and_then(Meta::location)
    }

    /// Items when this node is a non-empty keyword list
    pub fn as_keyword_list(&self) -> Option<&[Ast]> {
        match self {
            Ast::List(items) if !items.is_empty() && items.iter().all(is_keyword_entry) => {
                Some(items)
            }
            _ => None,
        }
    }

    /// Dotted module name of an alias or atom module reference
    pub fn module_name(&self) -> Option<String> {
        match self {
            Ast::Atom(name) => Some(name.clone()),
            _ => {
                let segments = self.call_args("__aliases__")?;
                let parts: Option<Vec<&str>> = segments.iter().map(Ast::as_atom).collect();
                parts.map(|p| p.join("."))
            }
        }
    }
}

fn is_keyword_entry(item: &Ast) -> bool {
    matches!(item, Ast::Pair(key, _) if key.as_atom().is_some())
}

/// Look up `key` in a keyword list (first occurrence wins)
pub fn keyword_get<'a>(list: &'a Ast, key: &str) -> Option<&'a Ast> {
    list.as_keyword_list()?.iter().find_map(|item| match item {
        Ast::Pair(k, v) if k.as_atom() == Some(key) => Some(v.as_ref()),
        _ => None,
    })
}

/// Split trailing `[do: ..., else: ...]` options from a special form's arguments
pub fn split_block_options(args: &[Ast]) -> (&[Ast], Option<&Ast>) {
    match args.split_last() {
        Some((last, rest)) if keyword_get(last, "do").is_some() => (rest, Some(last)),
        _ => (args, None),
    }
}

/// One `heads -> body` clause, guard split off
#[derive(Debug, Clone, Copy)]
pub struct ArrowClause<'a> {
    /// Parameters / patterns left of `->` (without the guard)
    pub heads: &'a [Ast],
    pub guard: Option<&'a Ast>,
    pub body: &'a Ast,
    pub meta: &'a Meta,
}

impl<'a> ArrowClause<'a> {
    /// Split `{:->, meta, [heads, body]}`
    ///
    /// A guarded clause arrives as a single `when` head whose last argument is
    /// the guard: `[{:when, _, [p1, p2, guard]}]`.
    pub fn from_ast(ast: &'a Ast) -> Option<Self> {
        let form = ast.as_form()?;
        let args = ast.call_args("->")?;
        let [heads, body] = args else {
            return None;
        };
        let heads: &'a [Ast] = match heads {
            Ast::List(items) => items.as_slice(),
            _ => return None,
        };

        if let [single] = heads {
            if let Some(when_args) = single.call_args("when") {
                if let Some((guard, params)) = when_args.split_last() {
                    return Some(Self {
                        heads: params,
                        guard: Some(guard),
                        body,
                        meta: &form.meta,
                    });
                }
            }
        }

        Some(Self {
            heads,
            guard: None,
            body,
            meta: &form.meta,
        })
    }

    /// The single head of a one-pattern clause (case, receive, ...)
    pub fn single_head(&self) -> Option<&'a Ast> {
        match self.heads {
            [head] => Some(head),
            _ => None,
        }
    }
}

/// Every `->` clause of a clause list; `None` if any item is not a clause
///
/// An empty `do end` quotes as `{:__block__, [], []}` and holds no clauses.
pub fn arrow_clauses(ast: &Ast) -> Option<Vec<ArrowClause<'_>>> {
    match ast {
        Ast::List(items) => items.iter().map(ArrowClause::from_ast).collect(),
        _ if ast.call_args("__block__").is_some_and(<[Ast]>::is_empty) => Some(Vec::new()),
        _ => None,
    }
}

/// Flatten a `__block__` into its statements (a single expression is a block of one)
pub fn block_statements(ast: &Ast) -> &[Ast] {
    match ast.call_args("__block__") {
        Some(stmts) => stmts,
        None => std::slice::from_ref(ast),
    }
}
