//! Configuration loading and management
//!
//! This module handles loading configuration from files and environment variables.

use std::path::Path;

use tracing::{debug, info};

use super::types::Config;
use crate::error::ConfigError;

/// Load configuration from a JSON file
///
/// # Arguments
///
/// * `path` - Path to the configuration file
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    debug!("Loading configuration from {:?}", path);

    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let contents = std::fs::read_to_string(path)?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| {
        ConfigError::ParseError(format!("Failed to parse JSON: {e} at {path:?}"))
    })?;

    config.validate()?;

    info!(
        "Configuration loaded: {} zone policies, max_connections={}, offload={}",
        config.zones.len(),
        config.table.max_connections,
        config.offload.enabled
    );

    Ok(config)
}

/// Load configuration from a JSON string
///
/// # Errors
///
/// Returns `ConfigError` if parsing or validation fails.
pub fn load_config_str(json: &str) -> Result<Config, ConfigError> {
    let config: Config =
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.validate()?;

    Ok(config)
}

/// Load configuration with environment variable overrides
///
/// Environment variables:
/// - `CONNTRACK_LOG_LEVEL`: Override log level
/// - `CONNTRACK_MAX_CONNECTIONS`: Override connection limit
/// - `CONNTRACK_OFFLOAD_ENABLED`: Override hardware sync (`true`/`false`)
///
/// # Errors
///
/// Returns `ConfigError` if loading or parsing fails.
pub fn load_config_with_env(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let mut config = load_config(path)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    Ok(config)
}

/// Apply overrides from a variable source and re-validate.
pub(crate) fn apply_env_overrides<F>(config: &mut Config, var: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = var("CONNTRACK_LOG_LEVEL") {
        config.log.level = level;
        debug!("Log level overridden to {}", config.log.level);
    }

    if let Some(max) = var("CONNTRACK_MAX_CONNECTIONS") {
        config.table.max_connections = max.parse().map_err(|_| {
            ConfigError::env("CONNTRACK_MAX_CONNECTIONS", format!("Invalid number: {max}"))
        })?;
        debug!(
            "Max connections overridden to {}",
            config.table.max_connections
        );
    }

    if let Some(enabled) = var("CONNTRACK_OFFLOAD_ENABLED") {
        config.offload.enabled = enabled.parse().map_err(|_| {
            ConfigError::env("CONNTRACK_OFFLOAD_ENABLED", format!("Invalid boolean: {enabled}"))
        })?;
        debug!("Offload overridden to {}", config.offload.enabled);
    }

    // Re-validate after overrides
    config.validate()
}

/// Create a default configuration file at the given path
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be written.
pub fn create_default_config(path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let config = Config::default_config();
    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| ConfigError::ParseError(format!("Failed to serialize config: {e}")))?;

    std::fs::write(path, json)?;
    Ok(())
}
