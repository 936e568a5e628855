//! Feature modules - each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/         - Pure types and ports (traits)
//! - application/    - Use cases
//! - infrastructure/ - Implementations

pub mod closure_analysis;
pub mod expression_builder;
