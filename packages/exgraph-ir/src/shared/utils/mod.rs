//! Utility modules shared across features
//!
//! - `id_generator`: per-context node id allocation
//! - `scope_chain`: persistent binding frames for free-variable analysis

pub mod id_generator;
pub mod scope_chain;
