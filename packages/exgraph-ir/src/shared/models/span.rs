//! Source location types
//!
//! The quoted AST only carries a start position per node (`line:`/`column:`
//! metadata), so locations are points, not ranges.

use serde::{Deserialize, Serialize};

/// Start position of an AST node in its source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: Option<u32>,
}

impl SourceLocation {
    pub fn new(line: u32, column: Option<u32>) -> Self {
        Self { line, column }
    }

    /// Location with line only (parsers run without `columns: true`)
    pub fn line(line: u32) -> Self {
        Self { line, column: None }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.column {
            Some(col) => write!(f, "{}:{}", self.line, col),
            None => write!(f, "{}", self.line),
        }
    }
}
