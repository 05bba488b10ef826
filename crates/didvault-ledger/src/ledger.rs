//! Ledger client trait.
//!
//! A lookup returns whatever the ledger publishes for a DID. Absent fields
//! are not errors: a DID may have a NYM (verkey) but no endpoint attribute,
//! or be unknown altogether.

use async_trait::async_trait;
use didvault_core::{DidValue, Endpoint};

use crate::error::Result;

/// What the ledger publishes for a DID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerEntry {
    /// The published verkey, full or abbreviated relative to the DID.
    pub verkey: Option<String>,
    /// The published endpoint attribute.
    pub endpoint: Option<Endpoint>,
}

impl LedgerEntry {
    pub fn is_empty(&self) -> bool {
        self.verkey.is_none() && self.endpoint.is_none()
    }
}

/// Ledger client.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Fetch the entry for `did`. Unknown DIDs yield an empty entry.
    async fn lookup(&self, did: &DidValue) -> Result<LedgerEntry>;
}

#[async_trait]
impl<L: Ledger + ?Sized> Ledger for std::sync::Arc<L> {
    async fn lookup(&self, did: &DidValue) -> Result<LedgerEntry> {
        (**self).lookup(did).await
    }
}

/// A simple in-memory ledger for testing.
///
/// Can be taken offline, made slow, or told to fail a number of upcoming
/// requests, and counts every lookup it receives.
pub mod memory {
    use super::*;
    use crate::error::LedgerError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::RwLock;

    /// In-memory ledger implementation.
    #[derive(Debug)]
    pub struct MemoryLedger {
        entries: RwLock<HashMap<String, LedgerEntry>>,
        online: AtomicBool,
        failures_pending: AtomicUsize,
        lookups: AtomicUsize,
        latency: Option<Duration>,
    }

    impl MemoryLedger {
        /// Create an empty, online ledger.
        pub fn new() -> Self {
            Self {
                entries: RwLock::new(HashMap::new()),
                online: AtomicBool::new(true),
                failures_pending: AtomicUsize::new(0),
                lookups: AtomicUsize::new(0),
                latency: None,
            }
        }

        /// Delay every lookup by `latency`.
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Publish (or replace) the verkey of `did`.
        pub async fn publish_nym(&self, did: &DidValue, verkey: impl Into<String>) {
            let mut entries = self.entries.write().await;
            entries.entry(did.to_string()).or_default().verkey = Some(verkey.into());
        }

        /// Publish (or replace) the endpoint attribute of `did`.
        pub async fn publish_endpoint(&self, did: &DidValue, endpoint: Endpoint) {
            let mut entries = self.entries.write().await;
            entries.entry(did.to_string()).or_default().endpoint = Some(endpoint);
        }

        /// Take the ledger offline (`false`) or bring it back.
        pub fn set_online(&self, online: bool) {
            self.online.store(online, Ordering::SeqCst);
        }

        /// Fail the next `n` lookups with `Unavailable`.
        pub fn fail_next(&self, n: usize) {
            self.failures_pending.store(n, Ordering::SeqCst);
        }

        /// Number of lookups received, including failed ones.
        pub fn lookup_count(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }

        fn take_failure(&self) -> bool {
            self.failures_pending
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    impl Default for MemoryLedger {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Ledger for MemoryLedger {
        async fn lookup(&self, did: &DidValue) -> Result<LedgerEntry> {
            self.lookups.fetch_add(1, Ordering::SeqCst);

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            if !self.online.load(Ordering::SeqCst) {
                return Err(LedgerError::Unavailable("ledger offline".into()));
            }
            if self.take_failure() {
                return Err(LedgerError::Unavailable("injected failure".into()));
            }

            let entries = self.entries.read().await;
            Ok(entries.get(did.as_str()).cloned().unwrap_or_default())
        }
    }
}
