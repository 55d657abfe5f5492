//! Expiration deadlines
//!
//! Handlers never compute durations themselves; they name a timeout class
//! and let the expiration subsystem resolve it against the zone's policy and
//! write the deadline. A reaper may additionally reorder connections by
//! deadline behind this trait.

use std::sync::Arc;
use std::time::Duration;

use super::conn::Conn;
use crate::timeout::{TimeoutClass, TimeoutPolicyTable};

/// Deadline writer used by protocol handlers.
pub trait Expiration: Send + Sync {
    /// Set the deadline of a freshly created connection.
    fn init_expiration(&self, conn: &mut Conn, class: TimeoutClass, now_ms: u64);

    /// Push the deadline of an existing connection.
    fn update_expiration(&self, conn: &mut Conn, class: TimeoutClass, now_ms: u64);
}

/// Expiration backed by a timeout policy table.
#[derive(Debug, Clone)]
pub struct PolicyExpiration {
    policies: Arc<TimeoutPolicyTable>,
}

impl PolicyExpiration {
    #[must_use]
    pub fn new(policies: Arc<TimeoutPolicyTable>) -> Self {
        Self { policies }
    }

    #[must_use]
    pub fn policies(&self) -> &TimeoutPolicyTable {
        &self.policies
    }

    /// Deadline for a class in a zone.
    #[must_use]
    pub fn deadline(&self, zone: u16, class: TimeoutClass, now_ms: u64) -> u64 {
        deadline_ms(now_ms, self.policies.lookup(zone, class))
    }
}

impl Expiration for PolicyExpiration {
    fn init_expiration(&self, conn: &mut Conn, class: TimeoutClass, now_ms: u64) {
        conn.expiration_ms = self.deadline(conn.key.zone, class, now_ms);
    }

    fn update_expiration(&self, conn: &mut Conn, class: TimeoutClass, now_ms: u64) {
        conn.expiration_ms = self.deadline(conn.key.zone, class, now_ms);
    }
}

/// `now + timeout` in milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn deadline_ms(now_ms: u64, timeout: Duration) -> u64 {
    let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    now_ms.saturating_add(timeout_ms)
}
