//! Expression Builder UseCase
//!
//! Files are independent: each gets its own [`CompileContext`], so they can be
//! compiled on any thread in any order and still mint the same ids.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info};
#[cfg(feature = "parallel")]
use tracing::warn;

use crate::config::ExpressionConfig;
use crate::features::expression_builder::domain::{
    CompileContext, ExpressionBuilderTrait, Outcome,
};
use crate::features::expression_builder::infrastructure::ExpressionCompiler;
#[cfg(feature = "parallel")]
use crate::shared::constants::thread_pool::{CPU_UTILIZATION_PERCENT, MIN_THREADS};
use crate::shared::models::{Ast, Graph, Result};

/// One file's top-level expression
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub path: String,
    pub ast: Ast,
}

impl CompilationUnit {
    pub fn new(path: impl Into<String>, ast: Ast) -> Self {
        Self {
            path: path.into(),
            ast,
        }
    }

    /// Decode a JSON-encoded AST; the path is attached to decode errors
    pub fn from_json(path: impl Into<String>, json: &str) -> Result<Self> {
        let path = path.into();
        let ast = Ast::from_json(json).map_err(|e| e.with_file(path.as_str()))?;
        Ok(Self { path, ast })
    }
}

/// Compilation result of one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileGraph {
    pub path: String,
    pub outcome: Outcome,
}

impl FileGraph {
    pub fn triple_count(&self) -> usize {
        self.outcome.graph().map_or(0, Graph::len)
    }
}

/// Expression Builder UseCase Trait
pub trait ExpressionBuilderUseCase: Send + Sync {
    /// Compile a single file
    fn compile_unit(&self, unit: &CompilationUnit) -> FileGraph;

    /// Compile many files; results keep the input order
    fn compile_units(&self, units: Vec<CompilationUnit>) -> Vec<FileGraph>;

    /// Union of every compiled file's graph
    fn merge(&self, graphs: &[FileGraph]) -> Graph {
        let mut merged = Graph::new();
        for file in graphs {
            if let Some(graph) = file.outcome.graph() {
                merged.extend(graph.triples().iter().cloned());
            }
        }
        merged
    }
}

/// Expression Builder UseCase Implementation
#[derive(Debug, Clone, Default)]
pub struct ExpressionBuilderUseCaseImpl {
    config: ExpressionConfig,
    compiler: ExpressionCompiler,
}

impl ExpressionBuilderUseCaseImpl {
    pub fn new(config: ExpressionConfig) -> Self {
        Self {
            config,
            compiler: ExpressionCompiler::new(),
        }
    }

    pub fn config(&self) -> &ExpressionConfig {
        &self.config
    }

    /// Configured thread count, else a share of the available cores
    #[cfg(feature = "parallel")]
    fn thread_count(&self) -> usize {
        self.config.parallelism.unwrap_or_else(|| {
            let cores = num_cpus::get();
            ((cores as f64 * CPU_UTILIZATION_PERCENT) as usize).max(MIN_THREADS)
        })
    }

    #[cfg(feature = "parallel")]
    fn compile_all(&self, units: &[CompilationUnit]) -> Vec<FileGraph> {
        let threads = self.thread_count();
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => {
                debug!(threads, files = units.len(), "Compiling files in parallel");
                pool.install(|| units.par_iter().map(|u| self.compile_unit(u)).collect())
            }
            Err(e) => {
                warn!(error = %e, "Thread pool unavailable, compiling sequentially");
                units.iter().map(|u| self.compile_unit(u)).collect()
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn compile_all(&self, units: &[CompilationUnit]) -> Vec<FileGraph> {
        units.iter().map(|u| self.compile_unit(u)).collect()
    }
}

impl ExpressionBuilderUseCase for ExpressionBuilderUseCaseImpl {
    fn compile_unit(&self, unit: &CompilationUnit) -> FileGraph {
        let mut ctx = CompileContext::for_file(&self.config, &unit.path);
        let outcome = self.compiler.build(Some(&unit.ast), &mut ctx);
        debug!(
            path = %unit.path,
            nodes = ctx.ids_allocated(),
            skipped = outcome.is_skip(),
            "Compiled file"
        );
        FileGraph {
            path: unit.path.clone(),
            outcome,
        }
    }

    fn compile_units(&self, units: Vec<CompilationUnit>) -> Vec<FileGraph> {
        let results = self.compile_all(&units);

        let skipped = results.iter().filter(|r| r.outcome.is_skip()).count();
        let triples: usize = results.iter().map(FileGraph::triple_count).sum();
        info!(
            files = results.len(),
            skipped,
            triples,
            "Expression compilation finished"
        );
        results
    }
}
