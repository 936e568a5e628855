//! Configuration I/O (YAML loading)
//!
//! Defines the YAML schema types. Loading/saving lives on
//! [`ExpressionConfig`](super::ExpressionConfig).

use serde::{Deserialize, Serialize};

/// Supported schema versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
///
/// ```yaml
/// version: 1
/// preset: full
/// overrides:
///   base_iri: "https://example.org/my_app/"
///   dependency_markers: ["deps/", "_build/", "vendor/"]
///   parallelism: 4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1); optional so a missing key gets a
    /// dedicated error instead of a generic YAML one
    #[serde(default)]
    pub version: Option<u32>,

    /// Base preset
    pub preset: String,

    /// Fine-grained overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    /// Force full expression extraction on or off regardless of preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_expressions: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_iri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_markers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<usize>,
}
