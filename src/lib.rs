//! conntrack-other: connection tracking for generic IP protocols
//!
//! This crate provides the per-connection state machine a connection-tracking
//! engine uses for IP protocols without a dedicated tracker, together with
//! the glue it plugs into: timeout policies, expiration, protocol dispatch,
//! a connection table and hardware offload synchronization.
//!
//! # Features
//!
//! - **Direction-based state machine**: `FIRST -> MULTIPLE -> BIDIR`, never regressing
//! - **Timeout policies**: global defaults with per-zone overrides
//! - **Protocol dispatch**: 256-slot handler table, generic handler by default
//! - **Hardware sync**: optional event hook and hardware state replay
//!
//! # Architecture
//!
//! ```text
//! Packet + FlowKey → ConnTable → ProtoRegistry → OtherProto
//!                                                    ↓
//!                                     Expiration (TimeoutPolicyTable)
//!                                                    ↓
//!                                          HwSyncHook (optional)
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use conntrack_other::config::load_config;
//! use conntrack_other::connection::{ConnTable, FlowKey};
//! use std::net::{IpAddr, Ipv4Addr};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("/etc/conntrack-other/config.json")?;
//! let (table, _events) = ConnTable::from_config(&config)?;
//!
//! let key = FlowKey::new(
//!     IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
//!     IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
//!     47,
//!     0,
//! );
//! table.process(key, false, None, 0)?;
//! table.process(key, true, None, 10)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration types and loading
//! - [`connection`]: State machine, dispatch and connection table
//! - [`error`]: Error types
//! - [`logging`]: Tracing subscriber setup
//! - [`offload`]: Hardware sync events and hooks
//! - [`packet`]: Opaque packet buffer
//! - [`timeout`]: Timeout classes and policies

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod offload;
pub mod packet;
pub mod timeout;

// Re-export commonly used types at the crate root
pub use config::{Config, LogConfig, OffloadConfig, TableConfig, ZoneConfig};
pub use connection::{
    Conn, ConnTable, Expiration, FlowKey, L4Proto, L4StateSync, OtherConn, OtherProto,
    OtherState, PolicyExpiration, ProtoConn, ProtoRegistry, UpdateResult,
};
pub use error::{ConfigError, ConntrackError, OffloadError};
pub use offload::{ChannelHook, CtState, HwSyncEvent, HwSyncHook};
pub use packet::Packet;
pub use timeout::{TimeoutClass, TimeoutPolicy, TimeoutPolicyTable};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
