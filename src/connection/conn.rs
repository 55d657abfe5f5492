//! Connection records
//!
//! A record is the engine-owned base (key, deadline, offload metadata) plus a
//! protocol payload. Each handler matches on its own [`ProtoConn`] variant.

use super::key::FlowKey;
use super::other::OtherConn;

/// Offload bookkeeping shared with the hardware sync path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OffloadMeta {
    /// Sequence number stamped on hardware sync events
    pub seq: u32,
}

/// Protocol-specific connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProtoConn {
    /// Generic IP protocol tracked by direction only
    Other(OtherConn),
}

/// A tracked connection.
#[derive(Debug, Clone)]
pub struct Conn {
    /// Connection identity
    pub key: FlowKey,
    /// Expiration deadline in milliseconds
    pub expiration_ms: u64,
    /// Offload metadata
    pub offload: OffloadMeta,
    /// Protocol payload
    pub proto: ProtoConn,
}

impl Conn {
    /// Record with a zero deadline; the creating handler sets it.
    #[must_use]
    pub const fn new(key: FlowKey, proto: ProtoConn) -> Self {
        Self {
            key,
            expiration_ms: 0,
            offload: OffloadMeta { seq: 0 },
            proto,
        }
    }

    /// Whether the deadline has passed.
    #[must_use]
    pub const fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expiration_ms
    }

    /// Generic-protocol payload, if this is such a connection.
    #[must_use]
    pub const fn as_other(&self) -> Option<&OtherConn> {
        match &self.proto {
            ProtoConn::Other(other) => Some(other),
        }
    }
}
