//! Tracing subscriber setup
//!
//! Embedding engines usually install their own subscriber; this helper is for
//! standalone tools and tests that only have a [`LogConfig`].

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;
use crate::error::ConntrackError;

/// Map a configured level name to a tracing level, defaulting to `INFO`.
#[must_use]
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install a global fmt subscriber.
///
/// `RUST_LOG` directives are honored on top of the configured level.
///
/// # Errors
///
/// Returns `ConntrackError::Logging` if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<(), ConntrackError> {
    let filter = EnvFilter::from_default_env().add_directive(parse_level(&config.level).into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.target);

    let result = if config.format == "json" {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    result.map_err(|e| ConntrackError::Logging(e.to_string()))
}
