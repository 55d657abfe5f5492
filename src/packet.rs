//! Opaque packet handle
//!
//! Connection tracking for generic protocols never looks inside the packet.
//! The buffer is only carried through to hardware sync events, so it is a
//! cheaply clonable [`Bytes`].

use bytes::Bytes;

/// A packet buffer as seen by the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    data: Bytes,
}

impl Packet {
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Packet with no payload.
    #[must_use]
    pub const fn empty() -> Self {
        Self { data: Bytes::new() }
    }

    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Bytes> for Packet {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for Packet {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}
