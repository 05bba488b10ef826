//! The DID manager.
//!
//! [`DidManager`] owns the collaborators (store, ledger, crypto provider)
//! and the per-DID lock table. Its operations are spread over the
//! `registry`, `rotation`, `peers`, `endpoints` and `resolver` modules.

use std::sync::Arc;

use didvault_core::{CryptoProvider, DidRecord, DidValue, Ed25519Provider, KeyRecord, Verkey};
use didvault_ledger::Ledger;
use didvault_store::{RecordKind, SecureStore, StoreExt};

use crate::config::ManagerConfig;
use crate::error::{ErrorContext, Result, VaultError};
use crate::locks::DidLocks;

/// The main manager struct.
///
/// Provides a unified API for:
/// - Creating owned DIDs and rotating their keys
/// - Recording peer DIDs
/// - Resolving keys and endpoints, locally or through the ledger
pub struct DidManager<S, L> {
    pub(crate) store: Arc<S>,
    pub(crate) ledger: Arc<L>,
    pub(crate) crypto: Arc<dyn CryptoProvider>,
    pub(crate) locks: DidLocks,
    pub(crate) config: ManagerConfig,
}

impl<S: SecureStore, L: Ledger> DidManager<S, L> {
    /// Create a new manager.
    pub fn new(store: S, ledger: L, config: ManagerConfig) -> Self {
        Self::with_shared(Arc::new(store), Arc::new(ledger), config)
    }

    /// Create a manager over collaborators the caller keeps handles to.
    pub fn with_shared(store: Arc<S>, ledger: Arc<L>, config: ManagerConfig) -> Self {
        Self {
            store,
            ledger,
            crypto: Arc::new(Ed25519Provider),
            locks: DidLocks::new(),
            config,
        }
    }

    /// Replace the key generation provider.
    pub fn with_crypto(mut self, crypto: Arc<dyn CryptoProvider>) -> Self {
        self.crypto = crypto;
        self
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the ledger reference.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record access shared by the operation modules
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) async fn find_my_did(&self, did: &DidValue) -> Result<Option<DidRecord>> {
        self.store
            .get_record::<DidRecord>(RecordKind::Did, did.as_str())
            .await
            .context(|| format!("loading DID {}", did))
    }

    pub(crate) async fn load_my_did(&self, did: &DidValue) -> Result<DidRecord> {
        self.find_my_did(did)
            .await?
            .ok_or_else(|| VaultError::not_found("DID", did))
    }

    pub(crate) async fn save_my_did(&self, record: &DidRecord) -> Result<()> {
        self.store
            .put_record(RecordKind::Did, record.did.as_str(), record)
            .await
            .context(|| format!("saving DID {}", record.did))
    }

    pub(crate) async fn save_key(&self, record: &KeyRecord) -> Result<()> {
        self.store
            .put_record(RecordKind::Key, record.verkey.as_str(), record)
            .await
            .context(|| format!("saving key {}", record.verkey))
    }

    pub(crate) async fn load_key(&self, verkey: &Verkey) -> Result<KeyRecord> {
        self.store
            .get_record::<KeyRecord>(RecordKind::Key, verkey.as_str())
            .await
            .context(|| format!("loading key {}", verkey))?
            .ok_or_else(|| VaultError::not_found("key", verkey))
    }
}

/// Current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Parse a caller-supplied DID.
pub(crate) fn parse_did(did: &str) -> Result<DidValue> {
    Ok(DidValue::parse(did)?)
}
