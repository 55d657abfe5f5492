//! Configuration module for conntrack-other
//!
//! This module provides configuration types and loading utilities.
//!
//! # Example
//!
//! ```no_run
//! use conntrack_other::config::load_config;
//!
//! let config = load_config("/etc/conntrack/other.json").unwrap();
//! println!("Zone policies: {}", config.zones.len());
//! ```

mod loader;
mod types;

pub use loader::{create_default_config, load_config, load_config_str, load_config_with_env};
pub use types::{Config, LogConfig, OffloadConfig, TableConfig, ZoneConfig};
