/*
 * exgraph IR - Expression Graph Compiler
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Ast, ExprKind, Triple, Graph)
 * - features/    : Vertical slices (expression_builder, closure_analysis)
 * - config/      : Presets and YAML configuration
 *
 * Compilation is per file and single-threaded; batches of files are
 * compiled in parallel with Rayon.
 */

#![allow(clippy::too_many_arguments)] // Compiler branches carry the node plus its parts
#![allow(clippy::module_inception)] // Module naming intentional

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{ExpressionConfig, Preset};
pub use features::closure_analysis::{
    ClosureAnalyzer, FreeVariableAnalysis, FunctionLiteral, PlaceholderAnalysis,
    PlaceholderAnalyzer,
};
pub use features::expression_builder::{
    CompilationUnit, CompileContext, ExpressionBuilderTrait, ExpressionBuilderUseCase,
    ExpressionBuilderUseCaseImpl, ExpressionCompiler, FileGraph, Outcome,
};
pub use shared::models::{
    Ast, ExgraphError, ExprKind, FileKind, Graph, Literal, Predicate, Result, Triple,
};

/// Compile one expression with a fresh context
///
/// Convenience entry point for a single subtree; batches should go through
/// [`ExpressionBuilderUseCaseImpl`].
pub fn compile_expression(
    ast: Option<&Ast>,
    base_iri: &str,
    file_kind: FileKind,
    full_mode: bool,
) -> Outcome {
    let mut ctx = CompileContext::new(base_iri, file_kind, full_mode);
    ExpressionCompiler::new().build(ast, &mut ctx)
}
