//! Per-DID mutation locks.
//!
//! Mutations of the same DID are serialized; different DIDs proceed in
//! parallel. Entries are created on first use and pruned when the last
//! guard or waiter for a DID goes away.

use std::sync::Arc;

use dashmap::DashMap;
use didvault_core::DidValue;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Table of async mutexes keyed by DID.
#[derive(Debug, Default)]
pub struct DidLocks {
    table: DashMap<String, Arc<Mutex<()>>>,
}

impl DidLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `did`.
    pub async fn lock(&self, did: &DidValue) -> DidGuard<'_> {
        let key = did.as_str().to_string();
        let mutex = self.table.entry(key.clone()).or_default().clone();
        let guard = mutex.lock_owned().await;

        DidGuard {
            locks: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of DIDs with a live lock entry.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Exclusive access to one DID. Released on drop.
#[derive(Debug)]
pub struct DidGuard<'a> {
    locks: &'a DidLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DidGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The table's own reference is the only one left: nobody holds or
        // waits for this DID.
        self.locks
            .table
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
