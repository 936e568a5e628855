//! Closure Analysis - free variables and capture placeholders
//!
//! ## Architecture
//!
//! ```text
//! fn ... end ──▶ FunctionLiteral ──▶ ClosureAnalyzer ──▶ FreeVariableAnalysis
//! &(... &N ...) ─────────────────▶ PlaceholderAnalyzer ─▶ PlaceholderAnalysis
//! ```
//!
//! Both analyses are pure: same tree in, same result out.

pub mod domain;
pub mod infrastructure;

pub use domain::{
    CapturePlaceholder, FnClause, FreeVariable, FreeVariableAnalysis, FunctionLiteral,
    PlaceholderAnalysis,
};
pub use infrastructure::{ClosureAnalyzer, PatternBindings, PlaceholderAnalyzer};
