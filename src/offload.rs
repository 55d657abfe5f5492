//! Hardware offload synchronization
//!
//! When flows are mirrored into hardware, every software state decision is
//! published as a [`HwSyncEvent`] so the hardware side can follow along, and
//! hardware activity is replayed into software through the handlers' state
//! sync entry point.
//!
//! # Design
//!
//! The hook is an injected capability: handlers built without one never emit
//! events and expose no sync entry point. Delivery is best-effort and never
//! blocks the packet path:
//!
//! ```text
//! conn_update
//!     |
//!     | try_send (non-blocking)
//!     v
//! +------------------+
//! | mpsc Channel     | ---- Full? ----> Event dropped (counter incremented)
//! +------------------+
//!     |
//!     v
//! hardware sync consumer
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::error::OffloadError;
use crate::packet::Packet;

bitflags! {
    /// Connection status bits reported alongside a tracked packet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CtState: u32 {
        const NEW = 0x01;
        const ESTABLISHED = 0x02;
        const RELATED = 0x04;
        const REPLY_DIR = 0x08;
        const INVALID = 0x10;
        const TRACKED = 0x20;
        const SRC_NAT = 0x40;
        const DST_NAT = 0x80;
    }
}

/// A software state decision to be mirrored into hardware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwSyncEvent {
    /// Packet that triggered the update
    pub packet: Packet,
    /// Zone of the connection
    pub zone: u16,
    /// Status flags of the connection
    pub ct_state: CtState,
    /// Protocol-specific state after the update
    pub protocol_state: u8,
    /// Offload sequence number of the connection
    pub seq: u32,
}

/// Receiver of hardware sync events.
pub trait HwSyncHook: Send + Sync {
    /// Publish an event without blocking.
    ///
    /// # Errors
    ///
    /// Returns `OffloadError` if the event could not be delivered. Callers
    /// treat this as non-fatal.
    fn run(&self, event: HwSyncEvent) -> Result<(), OffloadError>;
}

/// Hook backed by a bounded channel.
#[derive(Debug)]
pub struct ChannelHook {
    sender: mpsc::Sender<HwSyncEvent>,
    sent: AtomicU64,
    dropped: AtomicU64,
}

impl ChannelHook {
    /// Create a hook and the receiving end of its channel.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration validation rejects that.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<HwSyncEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let hook = Self {
            sender,
            sent: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        };
        (hook, receiver)
    }

    /// Events accepted by the channel.
    #[must_use]
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    /// Events dropped because the channel was full or closed.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl HwSyncHook for ChannelHook {
    fn run(&self, event: HwSyncEvent) -> Result<(), OffloadError> {
        match self.sender.try_send(event) {
            Ok(()) => {
                self.sent.fetch_add(1, Ordering::Relaxed);
                trace!("Hardware sync event submitted");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Hardware sync channel full, event dropped");
                Err(OffloadError::ChannelFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!("Hardware sync channel closed");
                Err(OffloadError::ChannelClosed)
            }
        }
    }
}
