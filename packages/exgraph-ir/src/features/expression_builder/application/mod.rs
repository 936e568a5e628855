//! Application layer - batch compilation across files

mod expression_usecase;

pub use expression_usecase::{
    CompilationUnit, ExpressionBuilderUseCase, ExpressionBuilderUseCaseImpl, FileGraph,
};
