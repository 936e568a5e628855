//! Closure Analysis Infrastructure

pub mod bindings;
pub mod free_variables;
pub mod placeholders;

pub use bindings::{is_ignored_name, PatternBindings, Reference};
pub use free_variables::ClosureAnalyzer;
pub use placeholders::{placeholder_position, PlaceholderAnalyzer};
