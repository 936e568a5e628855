//! Configuration validation

use super::error::{ConfigError, ConfigResult};
use crate::shared::constants::thread_pool::{MAX_THREADS, MIN_THREADS};

/// Trait for validatable configuration objects
///
/// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;

    /// Configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Base IRIs must end in a separator so `expr/N` can be appended
pub fn validate_base_iri(value: &str) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(ConfigError::invalid_value("base_iri", "must not be empty"));
    }
    if !(value.ends_with('/') || value.ends_with('#')) {
        return Err(ConfigError::invalid_value(
            "base_iri",
            format!("'{}' must end with '/' or '#'", value),
        ));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid_value(
            "base_iri",
            "must not contain whitespace",
        ));
    }
    Ok(())
}

pub fn validate_parallelism(value: usize) -> ConfigResult<()> {
    if !(MIN_THREADS..=MAX_THREADS).contains(&value) {
        return Err(ConfigError::out_of_range(
            "parallelism",
            value,
            MIN_THREADS..=MAX_THREADS,
            "leave unset to size the pool from the CPU count",
        ));
    }
    Ok(())
}

pub fn validate_markers(markers: &[String]) -> ConfigResult<()> {
    if let Some(blank) = markers.iter().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::invalid_value(
            "dependency_markers",
            format!("blank marker {:?} would classify every file as a dependency", blank),
        ));
    }
    Ok(())
}
