//! Connection table
//!
//! Minimal engine glue around the protocol handlers: look a flow up, feed the
//! packet to its handler under the connection lock, or create it.
//!
//! # Locking
//!
//! The map is behind a `RwLock`; each connection has its own `Mutex`.
//! Lookups take the read lock only long enough to clone the connection's
//! `Arc`, so updates of distinct connections never contend. Creation takes
//! the write lock and re-checks for a concurrent insert before allocating.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use super::conn::Conn;
use super::expiration::{Expiration, PolicyExpiration};
use super::key::FlowKey;
use super::other::OtherProto;
use super::proto::{L4Proto, ProtoRegistry, UpdateResult};
use super::stats::TableStats;
use crate::config::Config;
use crate::error::{ConntrackError, Result};
use crate::offload::{ChannelHook, HwSyncEvent};
use crate::packet::Packet;
use crate::timeout::TimeoutPolicyTable;

type Entries = HashMap<FlowKey, Arc<Mutex<Conn>>>;

/// Table of tracked connections.
pub struct ConnTable {
    entries: RwLock<Entries>,
    registry: ProtoRegistry,
    expiration: Arc<dyn Expiration>,
    max_connections: usize,
    stats: TableStats,
}

impl ConnTable {
    #[must_use]
    pub fn new(
        max_connections: usize,
        registry: ProtoRegistry,
        expiration: Arc<dyn Expiration>,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            registry,
            expiration,
            max_connections,
            stats: TableStats::new(),
        }
    }

    /// Build a table from configuration.
    ///
    /// Every protocol number is served by the generic handler. When offload
    /// is enabled the handler publishes into a bounded channel whose receiver
    /// is handed back to the caller.
    ///
    /// # Errors
    ///
    /// Returns `ConntrackError::Config` if the configuration is invalid.
    pub fn from_config(config: &Config) -> Result<(Self, Option<mpsc::Receiver<HwSyncEvent>>)> {
        config.validate()?;

        let policies = Arc::new(TimeoutPolicyTable::from_config(config));
        let expiration = Arc::new(PolicyExpiration::new(policies));

        let (other, receiver) = if config.offload.enabled {
            let (hook, rx) = ChannelHook::new(config.offload.channel_capacity);
            (OtherProto::with_hook(Arc::new(hook)), Some(rx))
        } else {
            (OtherProto::new(), None)
        };

        info!(
            max_connections = config.table.max_connections,
            zones = config.zones.len(),
            offload = config.offload.enabled,
            "Connection table configured"
        );

        let table = Self::new(
            config.table.max_connections,
            ProtoRegistry::new(Arc::new(other)),
            expiration,
        );
        Ok((table, receiver))
    }

    /// Feed a packet to the connection identified by `key`.
    ///
    /// `reply` tells whether the packet travels in the reply direction of an
    /// existing connection. A packet without a connection always opens one in
    /// its own original direction and yields `UpdateResult::New`.
    ///
    /// # Errors
    ///
    /// - `InvalidNew` if the handler refuses to start a connection
    /// - `TableFull` if the connection limit is reached
    /// - `OutOfMemory` if the record cannot be allocated
    pub fn process(
        &self,
        key: FlowKey,
        reply: bool,
        pkt: Option<&Packet>,
        now_ms: u64,
    ) -> Result<UpdateResult> {
        let handler = self.registry.get(key.nw_proto);

        if let Some(conn) = self.lookup(&key) {
            return Ok(self.update_conn(handler.as_ref(), &conn, pkt, reply, now_ms));
        }

        if !handler.valid_new(pkt) {
            self.stats.record_invalid_new();
            trace!(key = %key, proto = handler.name(), "packet cannot start a connection");
            return Err(ConntrackError::InvalidNew(key.nw_proto));
        }

        let mut entries = self.entries.write();

        // Inserted concurrently while we were unlocked
        if let Some(conn) = entries.get(&key).cloned() {
            drop(entries);
            return Ok(self.update_conn(handler.as_ref(), &conn, pkt, reply, now_ms));
        }

        if entries.len() >= self.max_connections {
            self.stats.record_rejected_full();
            warn!(
                current = entries.len(),
                max = self.max_connections,
                "Connection table full, rejecting new connection"
            );
            return Err(ConntrackError::table_full(entries.len(), self.max_connections));
        }

        if entries.try_reserve(1).is_err() {
            self.stats.record_alloc_failed();
            warn!(key = %key, "failed to reserve connection slot");
            return Err(ConntrackError::OutOfMemory);
        }

        let conn = match handler.new_conn(self.expiration.as_ref(), key, pkt, now_ms) {
            Ok(conn) => conn,
            Err(e) => {
                self.stats.record_alloc_failed();
                return Err(e);
            }
        };

        entries.insert(key, Arc::new(Mutex::new(conn)));
        self.stats.record_created();

        Ok(UpdateResult::New)
    }

    /// Replay hardware-observed activity into a tracked connection.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the connection is not tracked
    /// - `SyncUnsupported` if the protocol handler has no sync capability
    pub fn state_sync(&self, key: &FlowKey, reply: bool, hw_last_used_ms: u64) -> Result<()> {
        let conn = self.lookup(key).ok_or(ConntrackError::NotFound)?;
        let sync = self
            .registry
            .get(key.nw_proto)
            .state_sync()
            .ok_or(ConntrackError::SyncUnsupported(key.nw_proto))?;

        sync.conn_state_sync(self.expiration.as_ref(), &mut conn.lock(), reply, hw_last_used_ms);
        self.stats.record_synced();

        Ok(())
    }

    /// Snapshot of a tracked connection.
    #[must_use]
    pub fn get(&self, key: &FlowKey) -> Option<Conn> {
        self.lookup(key).map(|conn| conn.lock().clone())
    }

    /// Stop tracking a connection. Returns whether it was present.
    pub fn remove(&self, key: &FlowKey) -> bool {
        let removed = self.entries.write().remove(key).is_some();
        if removed {
            self.stats.record_removed();
            debug!(key = %key, "connection removed");
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    #[must_use]
    pub fn stats(&self) -> &TableStats {
        &self.stats
    }

    #[must_use]
    pub fn registry(&self) -> &ProtoRegistry {
        &self.registry
    }

    fn lookup(&self, key: &FlowKey) -> Option<Arc<Mutex<Conn>>> {
        self.entries.read().get(key).cloned()
    }

    fn update_conn(
        &self,
        handler: &dyn L4Proto,
        conn: &Mutex<Conn>,
        pkt: Option<&Packet>,
        reply: bool,
        now_ms: u64,
    ) -> UpdateResult {
        let result = handler.conn_update(
            self.expiration.as_ref(),
            &mut conn.lock(),
            pkt,
            reply,
            now_ms,
        );
        self.stats.record_updated();
        result
    }
}

impl fmt::Debug for ConnTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnTable")
            .field("len", &self.len())
            .field("max_connections", &self.max_connections)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
