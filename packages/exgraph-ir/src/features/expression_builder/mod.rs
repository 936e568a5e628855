//! Expression Builder - quoted AST → expression graph
//!
//! Design:
//! - Closed shape classification with a fixed precedence order
//! - One node per expression, ids allocated parent-first
//! - Per-file compile context (no shared counters)
//! - Unknown shapes degrade to a fallback node, compilation never fails
//!
//! ## Architecture
//!
//! ```text
//! quoted AST
//!       ↓
//! ModeController (full mode + project file?)
//!       ↓
//! Dispatcher (Shape) ──▶ literal / operator / pattern / control-flow compilers
//!       ↓                          │
//!       ↓                  ClosureAnalyzer (fn, &capture)
//! Graph (triples)
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export application layer
pub use application::{
    CompilationUnit, ExpressionBuilderUseCase, ExpressionBuilderUseCaseImpl, FileGraph,
};

pub use domain::{Built, CompileContext, ExpressionBuilderTrait, Outcome};

// Re-export infrastructure (prefer the application layer for batches)
pub use infrastructure::{ExpressionCompiler, ModeController};
