//! Tracking for generic IP protocols
//!
//! Protocols without a dedicated tracker are classified purely by direction:
//!
//! ```text
//!            reply               reply / original
//!   First ----------> Bidir <-----------------+
//!     |                 ^                     |
//!     | original        | reply               |
//!     v                 |                     |
//!   Multiple -----------+       Bidir --------+
//!     ^   |
//!     +---+ original
//! ```
//!
//! Every update is valid and pushes the deadline to `now + timeout(state)`.
//! The state only ever moves forward.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::conn::{Conn, ProtoConn};
use super::expiration::Expiration;
use super::key::FlowKey;
use super::proto::{L4Proto, L4StateSync, UpdateResult};
use crate::error::Result;
use crate::offload::{CtState, HwSyncEvent, HwSyncHook};
use crate::packet::Packet;
use crate::timeout::TimeoutClass;

/// Directional classification of a generic connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum OtherState {
    /// One packet seen in the original direction
    #[default]
    First = 0,
    /// More packets in the original direction, no reply yet
    Multiple = 1,
    /// Packets seen in both directions
    Bidir = 2,
}

/// Timeout class of each state, indexed by discriminant.
const OTHER_TIMEOUTS: [TimeoutClass; 3] = [
    TimeoutClass::OtherFirst,
    TimeoutClass::OtherMultiple,
    TimeoutClass::OtherBidir,
];

impl OtherState {
    /// Timeout class that applies in this state.
    #[must_use]
    pub const fn timeout_class(self) -> TimeoutClass {
        OTHER_TIMEOUTS[self as usize]
    }

    /// State after a packet in the given direction.
    #[must_use]
    pub const fn next(self, reply: bool) -> Self {
        if reply && !matches!(self, Self::Bidir) {
            Self::Bidir
        } else if matches!(self, Self::First) {
            Self::Multiple
        } else {
            self
        }
    }

    /// Wire value reported to the hardware sync path.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for OtherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "FIRST",
            Self::Multiple => "MULTIPLE",
            Self::Bidir => "BIDIR",
        })
    }
}

/// Protocol payload of a generic connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OtherConn {
    pub state: OtherState,
}

/// Handler for every IP protocol without a dedicated tracker.
#[derive(Default)]
pub struct OtherProto {
    hook: Option<Arc<dyn HwSyncHook>>,
}

impl OtherProto {
    /// Handler without hardware offload support.
    #[must_use]
    pub fn new() -> Self {
        Self { hook: None }
    }

    /// Handler that publishes sync events and accepts hardware state sync.
    #[must_use]
    pub fn with_hook(hook: Arc<dyn HwSyncHook>) -> Self {
        Self { hook: Some(hook) }
    }

    #[must_use]
    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    fn update(
        &self,
        expiration: &dyn Expiration,
        conn: &mut Conn,
        pkt: Option<&Packet>,
        reply: bool,
        now_ms: u64,
    ) -> UpdateResult {
        let ProtoConn::Other(other) = &mut conn.proto;
        let prev = other.state;
        other.state = prev.next(reply);
        let state = other.state;

        expiration.update_expiration(conn, state.timeout_class(), now_ms);

        trace!(
            key = %conn.key,
            reply,
            from = %prev,
            to = %state,
            expiration_ms = conn.expiration_ms,
            "other connection updated"
        );

        if let (Some(hook), Some(pkt)) = (&self.hook, pkt) {
            let event = HwSyncEvent {
                packet: pkt.clone(),
                zone: conn.key.zone,
                ct_state: CtState::ESTABLISHED | CtState::TRACKED,
                protocol_state: state.as_u8(),
                seq: conn.offload.seq,
            };
            // Software state is already committed; a lost event is tolerated.
            if let Err(e) = hook.run(event) {
                debug!(key = %conn.key, error = %e, "hardware sync event not delivered");
            }
        }

        UpdateResult::Valid
    }
}

impl fmt::Debug for OtherProto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtherProto")
            .field("hook", &self.has_hook())
            .finish()
    }
}

impl L4Proto for OtherProto {
    fn name(&self) -> &'static str {
        "other"
    }

    fn new_conn(
        &self,
        expiration: &dyn Expiration,
        key: FlowKey,
        _pkt: Option<&Packet>,
        now_ms: u64,
    ) -> Result<Conn> {
        let state = OtherState::First;
        let mut conn = Conn::new(key, ProtoConn::Other(OtherConn { state }));

        expiration.init_expiration(&mut conn, state.timeout_class(), now_ms);

        debug!(key = %conn.key, expiration_ms = conn.expiration_ms, "other connection created");

        Ok(conn)
    }

    fn valid_new(&self, _pkt: Option<&Packet>) -> bool {
        true
    }

    fn conn_update(
        &self,
        expiration: &dyn Expiration,
        conn: &mut Conn,
        pkt: Option<&Packet>,
        reply: bool,
        now_ms: u64,
    ) -> UpdateResult {
        self.update(expiration, conn, pkt, reply, now_ms)
    }

    fn state_sync(&self) -> Option<&dyn L4StateSync> {
        self.hook.as_ref().map(|_| self as &dyn L4StateSync)
    }
}

impl L4StateSync for OtherProto {
    fn conn_state_sync(
        &self,
        expiration: &dyn Expiration,
        conn: &mut Conn,
        reply: bool,
        hw_last_used_ms: u64,
    ) {
        self.update(expiration, conn, None, reply, hw_last_used_ms);
    }
}
