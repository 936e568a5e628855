//! Expression graph vocabulary
//!
//! Closed sets of node classes ([`ExprKind`]) and relations ([`Predicate`]),
//! typed literal values, and the [`ExpressionNode`] record every compiler
//! branch produces for its own node.

use serde::{Deserialize, Serialize};

use super::span::SourceLocation;
use super::triple::{Object, Triple};
use crate::shared::constants::vocabulary::{EXPR_NS, RDF_TYPE, XSD_NS};

/// Node identifier (IRI, unique within one compilation context)
pub type NodeId = String;

/// Defines a closed vocabulary enum with its wire name
macro_rules! vocabulary {
    ($(#[$doc:meta])* $name:ident { $($(#[$vdoc:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vdoc])* $variant),+
        }

        impl $name {
            /// Local name inside the vocabulary namespace
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub fn all() -> &'static [$name] {
                &[$(Self::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Node class of a compiled expression
    ExprKind {
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // Literals
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        AtomLiteral => "AtomLiteral",
        BooleanLiteral => "BooleanLiteral",
        NilLiteral => "NilLiteral",
        IntegerLiteral => "IntegerLiteral",
        FloatLiteral => "FloatLiteral",
        StringLiteral => "StringLiteral",
        CharlistLiteral => "CharlistLiteral",
        BinaryLiteral => "BinaryLiteral",
        ListLiteral => "ListLiteral",
        TupleLiteral => "TupleLiteral",
        MapLiteral => "MapLiteral",
        StructLiteral => "StructLiteral",
        KeywordListLiteral => "KeywordListLiteral",
        SigilLiteral => "SigilLiteral",
        RangeLiteral => "RangeLiteral",

        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // Operators
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        ArithmeticOperator => "ArithmeticOperator",
        ComparisonOperator => "ComparisonOperator",
        LogicalOperator => "LogicalOperator",
        PipeOperator => "PipeOperator",
        MatchOperator => "MatchOperator",
        StringConcatOperator => "StringConcatOperator",
        ListOperator => "ListOperator",
        InOperator => "InOperator",
        DefaultArgumentOperator => "DefaultArgumentOperator",
        UnaryOperator => "UnaryOperator",

        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // References and calls
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        Variable => "Variable",
        ModuleReference => "ModuleReference",
        ModuleAttribute => "ModuleAttribute",
        LocalCall => "LocalCall",
        RemoteCall => "RemoteCall",
        AnonymousCall => "AnonymousCall",
        Block => "Block",

        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // Control flow
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        IfExpression => "IfExpression",
        UnlessExpression => "UnlessExpression",
        CondExpression => "CondExpression",
        CondClause => "CondClause",
        CaseExpression => "CaseExpression",
        MatchClause => "MatchClause",
        WithExpression => "WithExpression",
        WithClause => "WithClause",
        ForComprehension => "ForComprehension",
        Generator => "Generator",
        TryExpression => "TryExpression",
        RescueClause => "RescueClause",
        CatchClause => "CatchClause",
        RaiseExpression => "RaiseExpression",
        ThrowExpression => "ThrowExpression",
        ExitExpression => "ExitExpression",
        ReceiveExpression => "ReceiveExpression",
        Guard => "Guard",

        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // Functions and captures
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        AnonymousFunction => "AnonymousFunction",
        FunctionClause => "FunctionClause",
        CapturedVariable => "CapturedVariable",
        FunctionCapture => "FunctionCapture",
        CaptureExpression => "CaptureExpression",
        CapturePlaceholder => "CapturePlaceholder",

        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // Patterns
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        LiteralPattern => "LiteralPattern",
        VariablePattern => "VariablePattern",
        WildcardPattern => "WildcardPattern",
        PinPattern => "PinPattern",
        TuplePattern => "TuplePattern",
        ListPattern => "ListPattern",
        MapPattern => "MapPattern",
        StructPattern => "StructPattern",
        BinaryPattern => "BinaryPattern",
        BinarySegment => "BinarySegment",
        AsPattern => "AsPattern",
        StringPrefixPattern => "StringPrefixPattern",

        /// Fallback for unrecognized shapes
        UnknownExpression => "UnknownExpression",
    }
}

impl ExprKind {
    pub fn iri(&self) -> String {
        format!("{}{}", EXPR_NS, self.as_str())
    }

    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            ExprKind::LiteralPattern
                | ExprKind::VariablePattern
                | ExprKind::WildcardPattern
                | ExprKind::PinPattern
                | ExprKind::TuplePattern
                | ExprKind::ListPattern
                | ExprKind::MapPattern
                | ExprKind::StructPattern
                | ExprKind::BinaryPattern
                | ExprKind::AsPattern
                | ExprKind::StringPrefixPattern
        )
    }
}

vocabulary! {
    /// Relation between a node and another node or a literal
    Predicate {
        Type => "type",
        Value => "value",
        Diagnostic => "diagnostic",
        StartLine => "start-line",
        StartColumn => "start-column",

        // operators
        OperatorSymbol => "operator-symbol",
        LeftOperand => "left-operand",
        RightOperand => "right-operand",
        Operand => "operand",
        IsShortCircuit => "is-short-circuit",

        // composite literals
        Element => "element",
        ElementIndex => "element-index",
        ListTail => "list-tail",
        EntryValue => "entry-value",
        EntryKey => "entry-key",
        EntryKeyExpression => "entry-key-expression",
        MapUpdateBase => "map-update-base",
        SigilChar => "sigil-char",
        SigilContent => "sigil-content",
        SigilModifiers => "sigil-modifiers",
        RangeStart => "range-start",
        RangeEnd => "range-end",
        RangeStep => "range-step",

        // references and calls
        VariableName => "variable-name",
        IsIgnored => "is-ignored",
        RefersToModule => "refers-to-module",
        RefersToFunction => "refers-to-function",
        AttributeName => "attribute-name",
        Argument => "argument",
        Arity => "arity",
        Callee => "callee",
        Receiver => "receiver",
        Statement => "statement",

        // clauses and control flow
        Subject => "subject",
        Condition => "condition",
        ThenBranch => "then-branch",
        ElseBranch => "else-branch",
        Clause => "clause",
        ClauseOrder => "clause-order",
        ElseClause => "else-clause",
        Pattern => "pattern",
        Guard => "guard",
        GuardExpression => "guard-expression",
        Body => "body",
        Source => "source",
        Filter => "filter",
        IntoTarget => "into-target",
        ReduceInitial => "reduce-initial",
        IsUnique => "is-unique",
        RescueClause => "rescue-clause",
        CatchClause => "catch-clause",
        CatchKind => "catch-kind",
        AfterBody => "after-body",
        RescuedException => "rescued-exception",
        Exception => "exception",
        Message => "message",
        ExceptionAttributes => "exception-attributes",
        IsReraise => "is-reraise",
        Stacktrace => "stacktrace",
        ThrownValue => "thrown-value",
        ExitReason => "exit-reason",
        AfterTimeout => "after-timeout",
        IsNonBlocking => "is-non-blocking",

        // patterns
        BindsVariable => "binds-variable",
        PinnedVariable => "pinned-variable",
        SegmentValue => "segment-value",
        SegmentSpec => "segment-spec",
        SegmentSize => "segment-size",
        StringPrefix => "string-prefix",

        // functions and closures
        IsClosure => "is-closure",
        Captures => "captures",
        ReferenceCount => "reference-count",
        PlaceholderPosition => "placeholder-position",
        HasPlaceholderGaps => "has-placeholder-gaps",
        MissingPlaceholder => "missing-placeholder",
        PlaceholderUsages => "placeholder-usages",
    }
}

impl Predicate {
    pub fn iri(&self) -> String {
        match self {
            Predicate::Type => RDF_TYPE.to_string(),
            other => format!("{}{}", EXPR_NS, other.as_str()),
        }
    }
}

/// Literal datatype (XML Schema names)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Datatype {
    String,
    Integer,
    Double,
    Boolean,
    HexBinary,
}

impl Datatype {
    pub fn iri(&self) -> String {
        let local = match self {
            Datatype::String => "string",
            Datatype::Integer => "integer",
            Datatype::Double => "double",
            Datatype::Boolean => "boolean",
            Datatype::HexBinary => "hexBinary",
        };
        format!("{}{}", XSD_NS, local)
    }
}

/// Typed literal in lexical form, hashable so triples deduplicate
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Datatype,
}

impl Literal {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            lexical: value.into(),
            datatype: Datatype::String,
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            lexical: value.to_string(),
            datatype: Datatype::Integer,
        }
    }

    /// Integer already in decimal text, for values outside `i64`
    pub fn integer_text(digits: impl Into<String>) -> Self {
        Self {
            lexical: digits.into(),
            datatype: Datatype::Integer,
        }
    }

    /// `usize` counts and positions
    pub fn count(value: usize) -> Self {
        Self {
            lexical: value.to_string(),
            datatype: Datatype::Integer,
        }
    }

    /// Floats keep Rust's shortest round-trip representation
    pub fn double(value: f64) -> Self {
        Self {
            lexical: format!("{:?}", value),
            datatype: Datatype::Double,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            lexical: value.to_string(),
            datatype: Datatype::Boolean,
        }
    }

    pub fn hex_binary(bytes: &[u8]) -> Self {
        Self {
            lexical: bytes.iter().map(|b| format!("{:02X}", b)).collect(),
            datatype: Datatype::HexBinary,
        }
    }
}

/// One compiled expression node
///
/// Append-only: built once by the compiler branch that allocated its id and
/// lowered to triples immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionNode {
    pub id: NodeId,
    pub kind: ExprKind,
    pub literal_payload: Option<Literal>,
    pub location: Option<SourceLocation>,
}

impl ExpressionNode {
    pub fn new(id: NodeId, kind: ExprKind) -> Self {
        Self {
            id,
            kind,
            literal_payload: None,
            location: None,
        }
    }

    pub fn with_payload(mut self, payload: Literal) -> Self {
        self.literal_payload = Some(payload);
        self
    }

    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// Type triple, value triple (literals) and position triples
    pub fn into_triples(self) -> Vec<Triple> {
        let mut triples = Vec::with_capacity(4);
        triples.push(Triple::new(
            self.id.clone(),
            Predicate::Type,
            Object::Class(self.kind),
        ));
        if let Some(payload) = self.literal_payload {
            triples.push(Triple::literal(self.id.clone(), Predicate::Value, payload));
        }
        if let Some(loc) = self.location {
            triples.push(Triple::literal(
                self.id.clone(),
                Predicate::StartLine,
                Literal::count(loc.line as usize),
            ));
            if let Some(col) = loc.column {
                triples.push(Triple::literal(
                    self.id,
                    Predicate::StartColumn,
                    Literal::count(col as usize),
                ));
            }
        }
        triples
    }
}
