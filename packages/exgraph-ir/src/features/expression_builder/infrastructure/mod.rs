//! Expression Builder Infrastructure - per-construct compilers
//!
//! `dispatcher` classifies a node and hands it to one of the construct
//! modules; all of them extend [`ExpressionCompiler`].

pub mod control_flow;
pub mod dispatcher;
pub mod literals;
pub mod mode;
pub mod operators;
pub mod patterns;
pub mod references;

pub use dispatcher::{classify, decode_charlist, ControlForm, ExpressionCompiler, Shape};
pub use mode::ModeController;
pub use operators::{operator_class, OperatorClass};
