//! Connection tracking
//!
//! This module provides:
//! - Connection records and flow keys
//! - The protocol handler descriptor and dispatch table
//! - The generic "other" protocol state machine
//! - Expiration deadlines driven by timeout policies
//! - A connection table with statistics

pub mod conn;
pub mod expiration;
pub mod key;
pub mod other;
pub mod proto;
mod stats;
mod table;

pub use conn::{Conn, OffloadMeta, ProtoConn};
pub use expiration::{deadline_ms, Expiration, PolicyExpiration};
pub use key::FlowKey;
pub use other::{OtherConn, OtherProto, OtherState};
pub use proto::{L4Proto, L4StateSync, ProtoRegistry, UpdateResult};
pub use stats::{TableStats, TableStatsSnapshot};
pub use table::ConnTable;
