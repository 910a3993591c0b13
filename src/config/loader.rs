//! Configuration loading with defaults

use std::path::Path;

use crate::errors::{ParcoursError, Result};
use crate::fs;
use crate::schemas::Config;

/// Load configuration for a data root, falling back to defaults.
///
/// If config.json exists, it will be read and merged with defaults.
/// If it doesn't exist, default configuration is returned.
///
/// # Errors
/// * `InvalidJson` - If config.json cannot be parsed
/// * `ConfigError` - If a value is out of range
pub fn load_config(root: &Path) -> Result<Config> {
    let config = fs::read_config(root)?;
    validate_config(&config)?;
    Ok(config)
}

/// Reject values the services cannot run with.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.case_status.endpoint.trim().is_empty() {
        return Err(ParcoursError::ConfigError(
            "case_status.endpoint must not be empty".to_string(),
        ));
    }
    if config.case_status.timeout_seconds == 0 {
        return Err(ParcoursError::ConfigError(
            "case_status.timeout_seconds must be at least 1".to_string(),
        ));
    }
    if !config.case_status.dossier_url_template.contains("{number}") {
        return Err(ParcoursError::ConfigError(
            "case_status.dossier_url_template must contain {number}".to_string(),
        ));
    }
    if config.sync.interval_seconds == 0 {
        return Err(ParcoursError::ConfigError(
            "sync.interval_seconds must be at least 1".to_string(),
        ));
    }
    Ok(())
}
