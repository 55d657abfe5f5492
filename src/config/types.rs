//! Configuration types for conntrack-other
//!
//! This module defines all configuration structures used by the tracker.
//! Configuration is loaded from JSON files and validated at startup.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::timeout::{TimeoutClass, MAX_TIMEOUT_SECS};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Global timeout policy in seconds, keyed by class name
    #[serde(default = "default_timeouts")]
    pub timeouts: BTreeMap<TimeoutClass, u64>,

    /// Per-zone timeout overrides
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,

    /// Connection table limits
    #[serde(default)]
    pub table: TableConfig,

    /// Hardware offload synchronization
    #[serde(default)]
    pub offload: OffloadConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timeouts("global", &self.timeouts)?;

        let mut seen = HashSet::new();
        for zone in &self.zones {
            if !seen.insert(zone.zone) {
                return Err(ConfigError::validation(format!(
                    "Duplicate timeout policy for zone {}",
                    zone.zone
                )));
            }
            validate_timeouts(&format!("zone {}", zone.zone), &zone.timeouts)?;
        }

        self.table.validate()?;
        self.offload.validate()?;
        self.log.validate()?;

        Ok(())
    }

    /// Create a minimal default configuration
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            timeouts: default_timeouts(),
            zones: Vec::new(),
            table: TableConfig::default(),
            offload: OffloadConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

fn validate_timeouts(scope: &str, timeouts: &BTreeMap<TimeoutClass, u64>) -> Result<(), ConfigError> {
    for (class, &secs) in timeouts {
        if secs == 0 || secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::validation(format!(
                "{scope} timeout {class} must be between 1 and {MAX_TIMEOUT_SECS} seconds, got {secs}"
            )));
        }
    }
    Ok(())
}

/// Timeout overrides for one zone
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneConfig {
    /// Zone identifier
    pub zone: u16,

    /// Overridden classes; unlisted classes inherit the global policy
    #[serde(default)]
    pub timeouts: BTreeMap<TimeoutClass, u64>,
}

/// Connection table configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableConfig {
    /// Maximum tracked connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl TableConfig {
    /// Validate table configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::validation("max_connections must be greater than 0"));
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

/// Hardware offload synchronization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OffloadConfig {
    /// Emit hardware sync events and expose the state sync entry point
    #[serde(default)]
    pub enabled: bool,

    /// Capacity of the sync event channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl OffloadConfig {
    /// Validate offload configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if enabled with no channel capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.channel_capacity == 0 {
            return Err(ConfigError::validation(
                "offload channel_capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "json" or "text"
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Include target (module path)
    #[serde(default = "default_true")]
    pub target: bool,
}

impl LogConfig {
    /// Validate logging configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` for unknown levels or formats.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(
            self.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::validation(format!(
                "Unknown log level: {}",
                self.level
            )));
        }
        if !matches!(self.format.as_str(), "json" | "text") {
            return Err(ConfigError::validation(format!(
                "Unknown log format: {}",
                self.format
            )));
        }
        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: true,
        }
    }
}

// Default value functions for serde
const fn default_true() -> bool {
    true
}

fn default_timeouts() -> BTreeMap<TimeoutClass, u64> {
    TimeoutClass::ALL
        .into_iter()
        .map(|class| (class, class.default_secs()))
        .collect()
}

const fn default_max_connections() -> usize {
    3_000_000
}

const fn default_channel_capacity() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}
