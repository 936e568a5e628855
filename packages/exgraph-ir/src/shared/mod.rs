//! Shared module - Common types and utilities
//!
//! Types shared by every feature slice. No feature depends on another
//! feature's internals; they meet here.

pub mod constants;
pub mod models;
pub mod utils;

// Re-exports for convenience
pub use models::*;
pub use utils::id_generator::IdGenerator;
pub use utils::scope_chain::ScopeChain;
