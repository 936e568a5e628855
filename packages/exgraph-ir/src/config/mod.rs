//! Configuration System
//!
//! Two tiers:
//! - Level 1: Preset (`light` / `full`)
//! - Level 2: YAML v1 file or builder overrides
//!
//! The compiler itself only consumes `include_expressions` (through the mode
//! controller); the rest feeds id generation, file classification and batch
//! scheduling.

pub mod error;
pub mod expression_config;
pub mod io;
pub mod preset;
pub mod validation;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use expression_config::{ExpressionConfig, DEFAULT_BASE_IRI};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
pub use validation::Validatable;
