//! Expression extraction configuration
//!
//! Builder-style: start from a [`Preset`], override what differs.
//!
//! ```rust,ignore
//! let config = ExpressionConfig::preset(Preset::Full)
//!     .base_iri("https://example.org/my_app/")
//!     .parallelism(4);
//! config.validate()?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, ConfigOverrides, SUPPORTED_VERSIONS};
use super::preset::Preset;
use super::validation::{validate_base_iri, validate_markers, validate_parallelism, Validatable};
use crate::shared::constants::classification::DEFAULT_DEPENDENCY_MARKERS;
use crate::shared::models::FileKind;

/// Default base IRI for generated node ids
pub const DEFAULT_BASE_IRI: &str = "https://w3id.org/exgraph/code/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionConfig {
    /// Preset this configuration started from
    pub preset: Preset,

    /// Full expression extraction switch (the only flag the compiler reads)
    pub include_expressions: bool,

    /// Prefix of every node id
    pub base_iri: String,

    /// Path fragments marking external dependency files
    pub dependency_markers: Vec<String>,

    /// Batch compilation threads (`None` = derived from CPU count)
    pub parallelism: Option<usize>,
}

impl ExpressionConfig {
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            include_expressions: preset.include_expressions(),
            base_iri: DEFAULT_BASE_IRI.to_string(),
            dependency_markers: DEFAULT_DEPENDENCY_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            parallelism: None,
        }
    }

    pub fn include_expressions(mut self, enabled: bool) -> Self {
        self.include_expressions = enabled;
        self
    }

    pub fn base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = base_iri.into();
        self
    }

    pub fn dependency_markers(mut self, markers: Vec<String>) -> Self {
        self.dependency_markers = markers;
        self
    }

    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Classify a file path by the configured dependency markers
    ///
    /// Separators are normalized so Windows paths match `deps/` too.
    pub fn classify_path(&self, path: &str) -> FileKind {
        let normalized = path.replace('\\', "/");
        let is_dependency = self.dependency_markers.iter().any(|marker| {
            normalized.starts_with(marker.as_str())
                || normalized.contains(&format!("/{}", marker))
        });
        if is_dependency {
            FileKind::Dependency
        } else {
            FileKind::Project
        }
    }

    /// Load and validate a YAML v1 configuration file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let mut config = Self::preset(Preset::parse(&export.preset)?);

        if let Some(overrides) = export.overrides {
            if let Some(enabled) = overrides.include_expressions {
                config.include_expressions = enabled;
            }
            if let Some(base_iri) = overrides.base_iri {
                config.base_iri = base_iri;
            }
            if let Some(markers) = overrides.dependency_markers {
                config.dependency_markers = markers;
            }
            if let Some(threads) = overrides.parallelism {
                config.parallelism = Some(threads);
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            preset: self.preset.to_string(),
            overrides: Some(ConfigOverrides {
                include_expressions: Some(self.include_expressions),
                base_iri: Some(self.base_iri.clone()),
                dependency_markers: Some(self.dependency_markers.clone()),
                parallelism: self.parallelism,
            }),
        };

        serde_yaml::to_string(&export).map_err(ConfigError::Yaml)
    }

    /// Human-readable one-line summary
    pub fn describe(&self) -> String {
        format!(
            "preset={} expressions={} base_iri={} markers=[{}]",
            self.preset,
            if self.include_expressions { "full" } else { "light" },
            self.base_iri,
            self.dependency_markers.join(", ")
        )
    }
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

impl Validatable for ExpressionConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_base_iri(&self.base_iri)?;
        validate_markers(&self.dependency_markers)?;
        if let Some(threads) = self.parallelism {
            validate_parallelism(threads)?;
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "ExpressionConfig"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(!ExpressionConfig::default().include_expressions);
        assert!(ExpressionConfig::preset(Preset::Full).include_expressions);
        assert!(ExpressionConfig::preset(Preset::Full).validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ExpressionConfig::preset(Preset::Light)
            .include_expressions(true)
            .base_iri("urn:x#")
            .parallelism(8);
        assert!(config.include_expressions);
        assert_eq!(config.base_iri, "urn:x#");
        assert_eq!(config.parallelism, Some(8));
    }

    #[test]
    fn test_classify_path() {
        let config = ExpressionConfig::default();
        assert_eq!(config.classify_path("lib/app/user.ex"), FileKind::Project);
        assert_eq!(
            config.classify_path("deps/jason/lib/jason.ex"),
            FileKind::Dependency
        );
        assert_eq!(
            config.classify_path("/home/me/app/_build/dev/lib/x.ex"),
            FileKind::Dependency
        );
        assert_eq!(
            config.classify_path("C:\\app\\deps\\plug\\lib\\plug.ex"),
            FileKind::Dependency
        );
        // marker must be a path segment, not a suffix of one
        assert_eq!(config.classify_path("lib/mydeps/x.ex"), FileKind::Project);
    }

    #[test]
    fn test_describe() {
        let text = ExpressionConfig::preset(Preset::Full).describe();
        assert!(text.contains("expressions=full"));
    }
}
