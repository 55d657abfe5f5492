//! Flow keys
//!
//! The key is produced by the engine's canonicalization; whether a packet
//! travels in the reply direction is decided there and passed to the
//! handlers as a plain flag.

use std::fmt;
use std::net::IpAddr;

/// Identity of a tracked connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    /// Source address of the original direction
    pub src: IpAddr,
    /// Destination address of the original direction
    pub dst: IpAddr,
    /// IP protocol number
    pub nw_proto: u8,
    /// Isolation zone
    pub zone: u16,
}

impl FlowKey {
    #[must_use]
    pub const fn new(src: IpAddr, dst: IpAddr, nw_proto: u8, zone: u16) -> Self {
        Self {
            src,
            dst,
            nw_proto,
            zone,
        }
    }

    /// Key as seen from the reply direction.
    #[must_use]
    pub const fn reverse(&self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
            nw_proto: self.nw_proto,
            zone: self.zone,
        }
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "proto={} {} -> {} zone={}",
            self.nw_proto, self.src, self.dst, self.zone
        )
    }
}
