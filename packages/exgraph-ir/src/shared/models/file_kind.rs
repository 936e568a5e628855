//! File classification

use serde::{Deserialize, Serialize};

/// Whether a file belongs to the analyzed project or to an external dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    Project,
    Dependency,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Project => "project",
            FileKind::Dependency => "dependency",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
