//! Error types for conntrack-other
//!
//! The state machine itself never fails: updates are always valid and new
//! connections are always admissible. Errors come from the surrounding glue
//! (configuration, table capacity, allocation) and from the best-effort
//! hardware sync channel, which callers are expected to ignore.

use std::io;

use thiserror::Error;

/// Top-level error type for conntrack-other
#[derive(Debug, Error)]
pub enum ConntrackError {
    /// Configuration errors (file parsing, validation)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Allocation of a new connection record failed
    #[error("Out of memory while creating connection")]
    OutOfMemory,

    /// Connection limit reached
    #[error("Connection table full ({current}/{max})")]
    TableFull { current: usize, max: usize },

    /// The handler refused to start tracking a packet
    #[error("Packet is not a valid start of a connection for IP protocol {0}")]
    InvalidNew(u8),

    /// No tracked connection for the given key
    #[error("Connection not found")]
    NotFound,

    /// The handler was not configured with the hardware sync capability
    #[error("State sync is not supported by the handler for IP protocol {0}")]
    SyncUnsupported(u8),

    /// Hardware sync event delivery error
    #[error("Offload error: {0}")]
    Offload(#[from] OffloadError),

    /// Tracing subscriber could not be installed
    #[error("Logging initialization failed: {0}")]
    Logging(String),

    /// I/O errors not covered by other categories
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConntrackError {
    /// Check if this error is recoverable (the packet may be retried later)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(e) => e.is_recoverable(),
            Self::OutOfMemory => true,
            Self::TableFull { .. } => true,
            Self::InvalidNew(_) => false,
            Self::NotFound => false,
            Self::SyncUnsupported(_) => false,
            Self::Offload(e) => e.is_recoverable(),
            Self::Logging(_) => false,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
            ),
        }
    }

    pub fn table_full(current: usize, max: usize) -> Self {
        Self::TableFull { current, max }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found or inaccessible
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Validation error (invalid values, missing required fields)
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// Environment variable error
    #[error("Environment variable error: {name}: {reason}")]
    EnvError { name: String, reason: String },

    /// I/O error while reading config
    #[error("I/O error reading configuration: {0}")]
    IoError(#[from] io::Error),
}

impl ConfigError {
    /// Config errors are generally not recoverable without user intervention
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn env(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvError {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Hardware sync channel errors
///
/// These never fail a state update; the software state is committed before
/// the event is emitted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OffloadError {
    /// Event channel is at capacity
    #[error("Hardware sync channel full, event dropped")]
    ChannelFull,

    /// Event consumer has gone away
    #[error("Hardware sync channel closed")]
    ChannelClosed,
}

impl OffloadError {
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::ChannelFull => true,
            Self::ChannelClosed => false,
        }
    }
}

/// Result type alias for conntrack operations
pub type Result<T> = std::result::Result<T, ConntrackError>;
