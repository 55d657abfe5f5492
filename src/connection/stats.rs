//! Connection table statistics

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters for table activity
#[derive(Debug, Default)]
pub struct TableStats {
    /// Connections created
    created: AtomicU64,
    /// Packets applied to existing connections
    updated: AtomicU64,
    /// Hardware state syncs applied
    synced: AtomicU64,
    /// Creations refused because the table was full
    rejected_full: AtomicU64,
    /// Creations that failed to allocate
    alloc_failed: AtomicU64,
    /// Packets refused by `valid_new`
    invalid_new: AtomicU64,
    /// Connections removed
    removed: AtomicU64,
    /// Connections currently in the table
    active: AtomicU64,
}

impl TableStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_updated(&self) {
        self.updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_synced(&self) {
        self.synced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_full(&self) {
        self.rejected_full.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alloc_failed(&self) {
        self.alloc_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_new(&self) {
        self.invalid_new.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_removed(&self) {
        self.removed.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_sub(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn updated(&self) -> u64 {
        self.updated.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn synced(&self) -> u64 {
        self.synced.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn rejected_full(&self) -> u64 {
        self.rejected_full.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn alloc_failed(&self) -> u64 {
        self.alloc_failed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn invalid_new(&self) -> u64 {
        self.invalid_new.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn removed(&self) -> u64 {
        self.removed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn active(&self) -> u64 {
        self.active.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters
    #[must_use]
    pub fn snapshot(&self) -> TableStatsSnapshot {
        TableStatsSnapshot {
            created: self.created(),
            updated: self.updated(),
            synced: self.synced(),
            rejected_full: self.rejected_full(),
            alloc_failed: self.alloc_failed(),
            invalid_new: self.invalid_new(),
            removed: self.removed(),
            active: self.active(),
            timestamp_ms: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
        }
    }

    /// Reset the event counters. `active` mirrors table occupancy and is kept.
    pub fn reset(&self) {
        self.created.store(0, Ordering::Relaxed);
        self.updated.store(0, Ordering::Relaxed);
        self.synced.store(0, Ordering::Relaxed);
        self.rejected_full.store(0, Ordering::Relaxed);
        self.alloc_failed.store(0, Ordering::Relaxed);
        self.invalid_new.store(0, Ordering::Relaxed);
        self.removed.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of table statistics at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatsSnapshot {
    pub created: u64,
    pub updated: u64,
    pub synced: u64,
    pub rejected_full: u64,
    pub alloc_failed: u64,
    pub invalid_new: u64,
    pub removed: u64,
    pub active: u64,
    /// Timestamp in milliseconds
    pub timestamp_ms: u64,
}

impl TableStatsSnapshot {
    /// Creation attempts that did not produce a connection
    #[must_use]
    pub fn failed_creations(&self) -> u64 {
        self.rejected_full + self.alloc_failed + self.invalid_new
    }
}
