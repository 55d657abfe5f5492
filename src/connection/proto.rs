//! Protocol handler descriptors and dispatch
//!
//! Every IP protocol number maps to exactly one [`L4Proto`]. The table starts
//! with the generic handler in every slot; protocol-specific handlers are
//! registered over individual numbers.

use std::fmt;
use std::sync::Arc;

use super::conn::Conn;
use super::expiration::Expiration;
use super::key::FlowKey;
use crate::error::Result;
use crate::packet::Packet;

/// IP protocol numbers with dedicated trackers in a full engine.
pub const IPPROTO_ICMP: u8 = 1;
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;
pub const IPPROTO_ICMPV6: u8 = 58;

/// Outcome of feeding a packet to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// Packet does not fit the connection state
    Invalid,
    /// Packet accepted
    Valid,
    /// Packet starts a new connection
    New,
    /// Packet accepted and the old connection should be replaced by a new one
    ValidNew,
}

impl UpdateResult {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

/// Connection tracking handler for one protocol class.
///
/// All methods run with the connection lock held by the caller and do no
/// locking of their own.
pub trait L4Proto: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Build a record for the first packet of a flow.
    ///
    /// # Errors
    ///
    /// Returns `ConntrackError::OutOfMemory` if the record cannot be allocated.
    fn new_conn(
        &self,
        expiration: &dyn Expiration,
        key: FlowKey,
        pkt: Option<&Packet>,
        now_ms: u64,
    ) -> Result<Conn>;

    /// Whether a packet may start a new connection.
    fn valid_new(&self, pkt: Option<&Packet>) -> bool;

    /// Feed a packet of an existing connection.
    fn conn_update(
        &self,
        expiration: &dyn Expiration,
        conn: &mut Conn,
        pkt: Option<&Packet>,
        reply: bool,
        now_ms: u64,
    ) -> UpdateResult;

    /// Hardware state sync capability, if configured.
    fn state_sync(&self) -> Option<&dyn L4StateSync> {
        None
    }
}

/// Replays hardware-observed activity into software state.
pub trait L4StateSync: Send + Sync {
    /// Apply the same transition as a packet update, without a packet, using
    /// the hardware's last-used timestamp as the current time.
    fn conn_state_sync(
        &self,
        expiration: &dyn Expiration,
        conn: &mut Conn,
        reply: bool,
        hw_last_used_ms: u64,
    );
}

/// Dispatch table indexed by IP protocol number.
#[derive(Clone)]
pub struct ProtoRegistry {
    handlers: Vec<Arc<dyn L4Proto>>,
}

impl ProtoRegistry {
    /// Create a table with `default` in every slot.
    #[must_use]
    pub fn new(default: Arc<dyn L4Proto>) -> Self {
        Self {
            handlers: vec![default; usize::from(u8::MAX) + 1],
        }
    }

    /// Register a handler for one protocol number.
    pub fn register(&mut self, nw_proto: u8, handler: Arc<dyn L4Proto>) -> &mut Self {
        self.handlers[usize::from(nw_proto)] = handler;
        self
    }

    /// Handler for a protocol number.
    #[must_use]
    pub fn get(&self, nw_proto: u8) -> &Arc<dyn L4Proto> {
        &self.handlers[usize::from(nw_proto)]
    }
}

impl fmt::Debug for ProtoRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtoRegistry")
            .field("tcp", &self.get(IPPROTO_TCP).name())
            .field("udp", &self.get(IPPROTO_UDP).name())
            .field("icmp", &self.get(IPPROTO_ICMP).name())
            .field("default", &self.get(0).name())
            .finish()
    }
}
