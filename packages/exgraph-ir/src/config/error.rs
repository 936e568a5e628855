//! Errors raised while loading or validating an expression config

use std::ops::RangeInclusive;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Numeric setting outside its accepted bounds
    #[error(
        "expression config: `{field}` = {value} is outside {}..={} ({hint})",
        allowed.start(),
        allowed.end()
    )]
    OutOfRange {
        field: &'static str,
        value: usize,
        allowed: RangeInclusive<usize>,
        hint: &'static str,
    },

    #[error("expression config: invalid `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("expression config has no `version` key; start the file with `version: 1`")]
    MissingVersion,

    #[error(
        "expression config version {found} is not readable by this build (reads: {})",
        supported.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
    )]
    UnsupportedVersion { found: u32, supported: Vec<u32> },

    #[error("no expression preset named `{0}` (expected `light` or `full`)")]
    UnknownPreset(String),

    #[error("cannot read expression config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed expression config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub fn out_of_range(
        field: &'static str,
        value: usize,
        allowed: RangeInclusive<usize>,
        hint: &'static str,
    ) -> Self {
        Self::OutOfRange {
            field,
            value,
            allowed,
            hint,
        }
    }

    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
