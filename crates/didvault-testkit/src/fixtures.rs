//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use didvault::{DidManager, DidSpec, Dispatcher, ManagerConfig};
use didvault_core::{DidValue, Verkey};
use didvault_ledger::memory::MemoryLedger;
use didvault_store::{MemoryStore, RecordKind, SecureStore, SqliteStore, StoreError};

use crate::vectors::{KnownDid, STEWARD};

/// Install a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A manager over an in-process ledger, with handles to its collaborators.
pub struct TestVault<S = MemoryStore> {
    pub manager: Arc<DidManager<S, MemoryLedger>>,
    pub store: Arc<S>,
    pub ledger: Arc<MemoryLedger>,
    dir: Option<TempDir>,
}

impl TestVault<MemoryStore> {
    /// A vault over a memory store with default configuration.
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self::over(MemoryStore::new(), config, None)
    }
}

impl Default for TestVault<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl TestVault<SqliteStore> {
    /// A vault over a SQLite file in a fresh temporary directory.
    pub fn sqlite() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = SqliteStore::open(dir.path().join("vault.db")).expect("open sqlite store");
        Self::over(store, ManagerConfig::default(), Some(dir))
    }

    /// Path of the database file.
    pub fn db_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.path().join("vault.db"))
    }
}

impl<S: SecureStore + 'static> TestVault<S> {
    /// A vault over any store.
    pub fn over(store: S, config: ManagerConfig, dir: Option<TempDir>) -> Self {
        let store = Arc::new(store);
        let ledger = Arc::new(MemoryLedger::new());
        let manager = Arc::new(DidManager::with_shared(store.clone(), ledger.clone(), config));
        Self {
            manager,
            store,
            ledger,
            dir,
        }
    }

    /// Create the Steward identity.
    pub async fn steward(&self) -> (DidValue, Verkey) {
        self.create_known(&STEWARD).await
    }

    /// Create the identity of a known vector.
    pub async fn create_known(&self, vector: &KnownDid) -> (DidValue, Verkey) {
        self.manager
            .create_and_store_my_did(&DidSpec::from_seed(vector.seed))
            .await
            .expect("create known DID")
    }

    /// Publish a known identity's verkey on the ledger.
    pub async fn publish(&self, vector: &KnownDid) {
        let did = DidValue::parse(vector.did).expect("known DID parses");
        self.ledger.publish_nym(&did, vector.verkey).await;
    }

    pub fn dispatcher(&self) -> Dispatcher<S, MemoryLedger> {
        Dispatcher::new(self.manager.clone())
    }
}

/// A memory store whose reads or writes can be made to fail.
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failing_kind: Mutex<Option<RecordKind>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail writes of one record kind only; `None` clears it.
    pub fn fail_writes_to(&self, kind: Option<RecordKind>) {
        if let Ok(mut failing) = self.failing_kind.lock() {
            *failing = kind;
        }
    }

    fn check_kind(&self, kind: RecordKind) -> didvault_store::Result<()> {
        let failing = self
            .failing_kind
            .lock()
            .map(|failing| *failing == Some(kind))
            .unwrap_or(false);
        if failing {
            return Err(StoreError::Task(format!(
                "injected {} write failure",
                kind.as_str()
            )));
        }
        Ok(())
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> didvault_store::Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Task(format!("injected {} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl SecureStore for FaultyStore {
    async fn put(&self, kind: RecordKind, key: &str, value: &[u8]) -> didvault_store::Result<()> {
        self.check(&self.fail_writes, "write")?;
        self.check_kind(kind)?;
        self.inner.put(kind, key, value).await
    }

    async fn get(&self, kind: RecordKind, key: &str) -> didvault_store::Result<Option<Vec<u8>>> {
        self.check(&self.fail_reads, "read")?;
        self.inner.get(kind, key).await
    }

    async fn list(&self, kind: RecordKind) -> didvault_store::Result<Vec<(String, Vec<u8>)>> {
        self.check(&self.fail_reads, "read")?;
        self.inner.list(kind).await
    }
}
