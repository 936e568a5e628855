//! Dispatcher - quoted AST → Shape → compiler branch
//!
//! Several raw shapes overlap, so [`classify`] resolves them in a fixed order:
//!
//! 1. `_` before variables, variables (context args) before zero-arg calls
//! 2. `%Mod{}` structs before `%{}` maps
//! 3. keyword lists before plain lists and before the empty charlist
//! 4. ranges before generic calls
//! 5. charlist iff every element is a valid Unicode scalar value
//!
//! Anything left over becomes one `UnknownExpression` node carrying a
//! diagnostic; compilation never fails.

use tracing::debug;
#[cfg(feature = "trace")]
use tracing::trace;

use super::mode::ModeController;
use super::operators::{operator_class, OperatorClass};
use crate::features::closure_analysis::{ClosureAnalyzer, PlaceholderAnalyzer};
use crate::features::expression_builder::domain::{
    Built, CompileContext, ExpressionBuilderTrait, Outcome,
};
use crate::shared::constants::literals::{MAX_BYTE, MAX_CODEPOINT};
use crate::shared::models::{Args, Ast, ExprKind, ExpressionNode, Literal, Predicate};

/// Special forms with their own clause structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlForm {
    If,
    Unless,
    Cond,
    Case,
    With,
    For,
    Try,
    Receive,
    Raise,
    Reraise,
    Throw,
    Exit,
}

impl ControlForm {
    fn from_call(name: &str, arity: usize) -> Option<Self> {
        let form = match (name, arity) {
            ("if", _) => ControlForm::If,
            ("unless", _) => ControlForm::Unless,
            ("cond", _) => ControlForm::Cond,
            ("case", _) => ControlForm::Case,
            ("with", _) => ControlForm::With,
            ("for", _) => ControlForm::For,
            ("try", _) => ControlForm::Try,
            ("receive", _) => ControlForm::Receive,
            ("raise", 1 | 2) => ControlForm::Raise,
            ("reraise", 2 | 3) => ControlForm::Reraise,
            ("throw", 1) => ControlForm::Throw,
            ("exit", 1) => ControlForm::Exit,
            _ => return None,
        };
        Some(form)
    }
}

/// Closed classification of one AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'a> {
    Wildcard,
    Variable(&'a str),
    Nil,
    Boolean(bool),
    Atom(&'a str),
    Integer(i64),
    BigInteger(&'a str),
    Float(f64),
    String(&'a str),
    Charlist(String),
    KeywordList(&'a [Ast]),
    List(&'a [Ast]),
    Tuple(Vec<&'a Ast>),
    Struct {
        module: &'a Ast,
        body: &'a Ast,
    },
    Map(&'a [Ast]),
    Binary(Vec<u8>),
    Sigil {
        letter: &'a str,
        content: &'a Ast,
        modifiers: &'a Ast,
    },
    Range {
        start: Option<&'a Ast>,
        end: Option<&'a Ast>,
        step: Option<&'a Ast>,
    },
    BinaryOp {
        class: OperatorClass,
        symbol: &'a str,
        left: &'a Ast,
        right: &'a Ast,
    },
    NotIn {
        left: &'a Ast,
        right: &'a Ast,
    },
    UnaryOp {
        symbol: &'a str,
        operand: &'a Ast,
    },
    Pin(&'a Ast),
    Capture(&'a Ast),
    ModuleAlias(String),
    ModuleAttribute(&'a Ast),
    Block(&'a [Ast]),
    Control(ControlForm, &'a [Ast]),
    Fn,
    RemoteCall {
        receiver: &'a Ast,
        function: &'a str,
        args: &'a [Ast],
    },
    AnonymousCall {
        callee: &'a Ast,
        args: &'a [Ast],
    },
    LocalCall {
        name: &'a str,
        args: &'a [Ast],
    },
    Unknown(&'static str),
}

/// Classify one node; first matching rule wins
pub fn classify(ast: &Ast) -> Shape<'_> {
    match ast {
        Ast::Atom(name) => match name.as_str() {
            "nil" => Shape::Nil,
            "true" => Shape::Boolean(true),
            "false" => Shape::Boolean(false),
            other => Shape::Atom(other),
        },
        Ast::Integer(value) => Shape::Integer(*value),
        Ast::BigInteger(digits) => Shape::BigInteger(digits),
        Ast::Float(value) => Shape::Float(*value),
        Ast::String(value) => Shape::String(value),
        Ast::Pair(left, right) => Shape::Tuple(vec![left.as_ref(), right.as_ref()]),
        Ast::List(items) => classify_list(items),
        Ast::Form(form) => match (&form.head, &form.args) {
            (Ast::Atom(name), Args::Context(_)) if name == "_" => Shape::Wildcard,
            (Ast::Atom(name), Args::Context(_)) => Shape::Variable(name),
            (Ast::Atom(name), Args::List(args)) => classify_call(name, args),
            (head, Args::List(args)) => classify_dynamic_call(head, args),
            (_, Args::Context(_)) => Shape::Unknown("context form with non-atom head"),
        },
    }
}

fn classify_list(items: &[Ast]) -> Shape<'_> {
    if ast_is_keyword_list(items) {
        return Shape::KeywordList(items);
    }
    if let Some(text) = decode_charlist(items) {
        return Shape::Charlist(text);
    }
    Shape::List(items)
}

fn ast_is_keyword_list(items: &[Ast]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|item| matches!(item, Ast::Pair(key, _) if key.as_atom().is_some()))
}

/// Text of a list whose every element is a Unicode scalar value
///
/// Vacuously true for `[]`, which therefore compiles as an empty charlist.
pub fn decode_charlist(items: &[Ast]) -> Option<String> {
    items
        .iter()
        .map(|item| match item {
            Ast::Integer(code) if (0..=MAX_CODEPOINT).contains(code) => {
                u32::try_from(*code).ok().and_then(char::from_u32)
            }
            _ => None,
        })
        .collect()
}

/// Bytes of `<<...>>` when every segment is a plain integer 0..=255
fn literal_bytes(segments: &[Ast]) -> Option<Vec<u8>> {
    segments
        .iter()
        .map(|segment| match segment {
            Ast::Integer(byte) if (0..=MAX_BYTE).contains(byte) => u8::try_from(*byte).ok(),
            _ => None,
        })
        .collect()
}

fn classify_call<'a>(name: &'a str, args: &'a [Ast]) -> Shape<'a> {
    match (name, args) {
        ("{}", items) => Shape::Tuple(items.iter().collect()),
        ("%", [module, body]) if body.call_args("%{}").is_some() => Shape::Struct { module, body },
        ("%", _) => Shape::Unknown("malformed struct"),
        ("%{}", entries) => Shape::Map(entries),
        ("<<>>", segments) => match literal_bytes(segments) {
            Some(bytes) => Shape::Binary(bytes),
            None => Shape::Unknown("non-literal binary"),
        },
        ("..", []) => Shape::Range {
            start: None,
            end: None,
            step: None,
        },
        ("..", [start, end]) => Shape::Range {
            start: Some(start),
            end: Some(end),
            step: None,
        },
        ("..//", [start, end, step]) => Shape::Range {
            start: Some(start),
            end: Some(end),
            step: Some(step),
        },
        ("not", [inner]) => match inner.call_args("in") {
            Some([left, right]) => Shape::NotIn { left, right },
            _ => Shape::UnaryOp {
                symbol: name,
                operand: inner,
            },
        },
        ("-" | "+" | "!", [operand]) => Shape::UnaryOp {
            symbol: name,
            operand,
        },
        ("^", [pinned]) => Shape::Pin(pinned),
        ("&", [inner]) => Shape::Capture(inner),
        ("@", [attribute]) => Shape::ModuleAttribute(attribute),
        ("__aliases__", segments) => {
            let parts: Option<Vec<&str>> = segments.iter().map(Ast::as_atom).collect();
            match parts {
                Some(parts) => Shape::ModuleAlias(parts.join(".")),
                None => Shape::Unknown("dynamic alias"),
            }
        }
        ("__block__", stmts) => Shape::Block(stmts),
        ("fn", _) => Shape::Fn,
        _ => classify_named_call(name, args),
    }
}

/// Operators, sigils, special forms and finally local calls
fn classify_named_call<'a>(name: &'a str, args: &'a [Ast]) -> Shape<'a> {
    if let [left, right] = args {
        if let Some(class) = operator_class(name) {
            return Shape::BinaryOp {
                class,
                symbol: name,
                left,
                right,
            };
        }
        if let Some(letter) = name.strip_prefix("sigil_").filter(|l| !l.is_empty()) {
            return Shape::Sigil {
                letter,
                content: left,
                modifiers: right,
            };
        }
    }
    match ControlForm::from_call(name, args.len()) {
        Some(form) => Shape::Control(form, args),
        None => Shape::LocalCall { name, args },
    }
}

/// `{{:., _, [receiver, fun]}, _, args}` and `{{:., _, [fun]}, _, args}`
fn classify_dynamic_call<'a>(head: &'a Ast, args: &'a [Ast]) -> Shape<'a> {
    match head.call_args(".") {
        Some([receiver, Ast::Atom(function)]) => Shape::RemoteCall {
            receiver,
            function,
            args,
        },
        Some([callee]) => Shape::AnonymousCall { callee, args },
        _ => Shape::Unknown("unsupported call head"),
    }
}

/// Compiles expression subtrees into graph triples
///
/// Stateless; all per-file state lives in the [`CompileContext`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpressionCompiler {
    pub(super) closures: ClosureAnalyzer,
    pub(super) placeholders: PlaceholderAnalyzer,
}

impl ExpressionCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile one subtree; `Skip` for absent input or light mode
    pub fn compile(&self, ast: Option<&Ast>, ctx: &mut CompileContext) -> Outcome {
        let Some(ast) = ast else {
            return Outcome::Skip;
        };
        if !ModeController::should_compile(ctx) {
            debug!(
                file = ctx.file_path.as_deref().unwrap_or("<unknown>"),
                kind = %ctx.file_kind,
                full_mode = ctx.full_mode,
                "expression compilation skipped (light mode)"
            );
            return Outcome::Skip;
        }

        let built = self.compile_expr(ast, ctx);
        Outcome::Compiled {
            root: built.id.clone(),
            graph: built.into_graph(),
        }
    }

    /// Route one node to its compiler branch
    pub(crate) fn compile_expr(&self, ast: &Ast, ctx: &mut CompileContext) -> Built {
        let shape = classify(ast);

        #[cfg(feature = "trace")]
        trace!(shape = ?std::mem::discriminant(&shape), "compile");

        match shape {
            Shape::Wildcard => self.compile_wildcard(ast, ctx),
            Shape::Variable(name) => self.compile_variable(ast, name, ctx),
            Shape::Nil => self.scalar(ast, ExprKind::NilLiteral, Literal::string("nil"), ctx),
            Shape::Boolean(value) => {
                self.scalar(ast, ExprKind::BooleanLiteral, Literal::boolean(value), ctx)
            }
            Shape::Atom(name) => {
                self.scalar(ast, ExprKind::AtomLiteral, Literal::string(name), ctx)
            }
            Shape::Integer(value) => {
                self.scalar(ast, ExprKind::IntegerLiteral, Literal::integer(value), ctx)
            }
            Shape::BigInteger(digits) => {
                self.scalar(ast, ExprKind::IntegerLiteral, Literal::integer_text(digits), ctx)
            }
            Shape::Float(value) => {
                self.scalar(ast, ExprKind::FloatLiteral, Literal::double(value), ctx)
            }
            Shape::String(text) => {
                self.scalar(ast, ExprKind::StringLiteral, Literal::string(text), ctx)
            }
            Shape::Charlist(text) => {
                self.scalar(ast, ExprKind::CharlistLiteral, Literal::string(text), ctx)
            }
            Shape::Binary(bytes) => {
                self.scalar(ast, ExprKind::BinaryLiteral, Literal::hex_binary(&bytes), ctx)
            }
            Shape::KeywordList(entries) => self.compile_keyword_list(ast, entries, ctx),
            Shape::List(items) => self.compile_list(ast, items, ctx),
            Shape::Tuple(items) => self.compile_tuple(ast, &items, ctx),
            Shape::Struct { module, body } => self.compile_struct(ast, module, body, ctx),
            Shape::Map(entries) => self.compile_map(ast, ExprKind::MapLiteral, entries, ctx),
            Shape::Sigil {
                letter,
                content,
                modifiers,
            } => self.compile_sigil(ast, letter, content, modifiers, ctx),
            Shape::Range { start, end, step } => self.compile_range(ast, start, end, step, ctx),
            Shape::BinaryOp {
                class,
                symbol,
                left,
                right,
            } => self.compile_binary_op(ast, class, symbol, left, right, ctx),
            Shape::NotIn { left, right } => self.compile_not_in(ast, left, right, ctx),
            Shape::UnaryOp { symbol, operand } => self.compile_unary_op(ast, symbol, operand, ctx),
            Shape::Pin(pinned) => self.compile_pin(ast, pinned, ctx),
            Shape::Capture(inner) => self.compile_capture(ast, inner, ctx),
            Shape::ModuleAlias(module) => self.compile_module_alias(ast, module, ctx),
            Shape::ModuleAttribute(attribute) => self.compile_module_attribute(ast, attribute, ctx),
            Shape::Block(stmts) => self.compile_block(ast, stmts, ctx),
            Shape::Control(form, args) => self.compile_control(ast, form, args, ctx),
            Shape::Fn => self.compile_fn(ast, ctx),
            Shape::RemoteCall {
                receiver,
                function,
                args,
            } => self.compile_remote_call(ast, receiver, function, args, ctx),
            Shape::AnonymousCall { callee, args } => {
                self.compile_anonymous_call(ast, callee, args, ctx)
            }
            Shape::LocalCall { name, args } => self.compile_local_call(ast, name, args, ctx),
            Shape::Unknown(reason) => self.unknown(ast, reason, ctx),
        }
    }

    /// Allocate this node's id and type it
    pub(crate) fn node(&self, ast: &Ast, kind: ExprKind, ctx: &mut CompileContext) -> Built {
        Built::new(ExpressionNode::new(ctx.next_id(), kind).with_location(ast.location()))
    }

    /// Leaf node with a value literal
    pub(crate) fn scalar(
        &self,
        ast: &Ast,
        kind: ExprKind,
        value: Literal,
        ctx: &mut CompileContext,
    ) -> Built {
        Built::new(
            ExpressionNode::new(ctx.next_id(), kind)
                .with_payload(value)
                .with_location(ast.location()),
        )
    }

    /// Fallback for anything not classified
    pub(crate) fn unknown(&self, ast: &Ast, reason: &str, ctx: &mut CompileContext) -> Built {
        debug!(
            file = ctx.file_path.as_deref().unwrap_or("<unknown>"),
            reason,
            "unrecognized expression shape"
        );
        let mut node = self.node(ast, ExprKind::UnknownExpression, ctx);
        node.literal(Predicate::Diagnostic, Literal::string(reason));
        node
    }

    /// Ordered `predicate` edges with `element-index`
    pub(crate) fn children(
        &self,
        parent: &mut Built,
        predicate: Predicate,
        items: &[Ast],
        ctx: &mut CompileContext,
    ) {
        for (index, item) in items.iter().enumerate() {
            let child = self.compile_expr(item, ctx);
            parent.child_at(predicate, child, index);
        }
    }
}

impl ExpressionBuilderTrait for ExpressionCompiler {
    fn build(&self, ast: Option<&Ast>, ctx: &mut CompileContext) -> Outcome {
        self.compile(ast, ctx)
    }
}
