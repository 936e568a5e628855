//! Shared models

pub mod ast;
mod error;
pub mod expression;
mod file_kind;
mod span;
pub mod triple;

pub use ast::{
    arrow_clauses, block_statements, keyword_get, split_block_options, Args, ArrowClause, Ast,
    Form, Meta,
};
pub use error::{ErrorKind, ExgraphError, Result};
pub use file_kind::FileKind;
pub use expression::{Datatype, ExprKind, ExpressionNode, Literal, NodeId, Predicate};
pub use span::SourceLocation;
pub use triple::{Graph, Object, Triple};
