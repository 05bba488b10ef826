//! End-to-end identity lifecycle: creation, re-keying, rotation, metadata,
//! persisted through SQLite and the encrypted store wrapper.

use std::sync::Arc;

use didvault::ledger::memory::MemoryLedger;
use didvault::store::{EncryptedStore, MemoryStore, SqliteStore, StoreKey};
use didvault::{DidManager, DidSpec, KeySpec, ManagerConfig, VaultError};

const STEWARD_SEED: &str = "000000000000000000000000Steward1";
const STEWARD_DID: &str = "Th7MpTaRZVRYnPiabds81Y";
const STEWARD_VERKEY: &str = "FYmoFw55GeQH7SRFa37dkx1d2dZ3zUF8ckg7wmL7ofN4";

fn memory_manager() -> DidManager<MemoryStore, MemoryLedger> {
    DidManager::new(MemoryStore::new(), MemoryLedger::new(), ManagerConfig::default())
}

#[tokio::test]
async fn steward_seed_then_explicit_rekey() {
    let manager = memory_manager();

    let (did, verkey) = manager
        .create_and_store_my_did(&DidSpec::from_seed(STEWARD_SEED))
        .await
        .unwrap();
    assert_eq!(did.as_str(), STEWARD_DID);
    assert_eq!(verkey.as_str(), STEWARD_VERKEY);

    let (same_did, new_verkey) = manager
        .create_and_store_my_did(&DidSpec {
            did: Some(STEWARD_DID.into()),
            ..DidSpec::default()
        })
        .await
        .unwrap();
    assert_eq!(same_did.as_str(), STEWARD_DID);
    assert_ne!(new_verkey.as_str(), STEWARD_VERKEY);

    assert_eq!(
        manager.key_for_local_did(STEWARD_DID).await.unwrap(),
        new_verkey.as_str()
    );
}

#[tokio::test]
async fn rotation_keeps_did_and_swaps_key() {
    let manager = memory_manager();
    let (did, old) = manager
        .create_and_store_my_did(&DidSpec::default())
        .await
        .unwrap();

    let new = manager
        .replace_keys_start(did.as_str(), &KeySpec::default())
        .await
        .unwrap();
    assert_eq!(manager.key_for_local_did(did.as_str()).await.unwrap(), old.as_str());

    manager.replace_keys_apply(did.as_str()).await.unwrap();
    manager.replace_keys_apply(did.as_str()).await.unwrap();

    let meta = manager.get_my_did_with_meta(did.as_str()).await.unwrap();
    assert_eq!(meta.did, did);
    assert_eq!(meta.verkey, new);
    assert!(meta.pending_verkey.is_none());
}

#[tokio::test]
async fn with_meta_serializes_to_json() {
    let manager = memory_manager();
    let (did, _) = manager
        .create_and_store_my_did(&DidSpec::from_seed(STEWARD_SEED))
        .await
        .unwrap();
    manager
        .replace_keys_start(did.as_str(), &KeySpec::default())
        .await
        .unwrap();
    manager.set_did_metadata(did.as_str(), "{\"role\":\"steward\"}").await.unwrap();

    let listed = manager.list_my_dids_with_meta().await.unwrap();
    let json = serde_json::to_value(&listed).unwrap();

    assert_eq!(json[0]["did"], STEWARD_DID);
    assert_eq!(json[0]["verkey"], STEWARD_VERKEY);
    assert!(json[0]["tempVerkey"].is_string());
    assert_eq!(json[0]["metadata"], "{\"role\":\"steward\"}");
}

#[tokio::test]
async fn sqlite_vault_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vault.db");
    let key = StoreKey::derive("vault passphrase");

    let pending = {
        let store = EncryptedStore::new(SqliteStore::open(&path).unwrap(), &key);
        let manager = DidManager::new(store, MemoryLedger::new(), ManagerConfig::default());

        manager
            .create_and_store_my_did(&DidSpec::from_seed(STEWARD_SEED))
            .await
            .unwrap();
        manager.set_did_metadata(STEWARD_DID, "persisted").await.unwrap();
        manager
            .replace_keys_start(STEWARD_DID, &KeySpec::default())
            .await
            .unwrap()
    };

    let store = EncryptedStore::new(SqliteStore::open(&path).unwrap(), &key);
    let manager = DidManager::new(store, MemoryLedger::new(), ManagerConfig::default());

    let meta = manager.get_my_did_with_meta(STEWARD_DID).await.unwrap();
    assert_eq!(meta.verkey.as_str(), STEWARD_VERKEY);
    assert_eq!(meta.pending_verkey, Some(pending.clone()));
    assert_eq!(meta.metadata.as_deref(), Some("persisted"));

    manager.replace_keys_apply(STEWARD_DID).await.unwrap();
    let signature = manager.sign(STEWARD_DID, b"hello").await.unwrap();
    assert!(manager.verify(pending.as_str(), b"hello", &signature).unwrap());
}

#[tokio::test]
async fn wrong_passphrase_is_a_storage_error() {
    let sqlite = SqliteStore::open_memory().unwrap();
    {
        let manager = DidManager::new(
            EncryptedStore::new(sqlite.clone(), &StoreKey::derive("right")),
            MemoryLedger::new(),
            ManagerConfig::default(),
        );
        manager
            .create_and_store_my_did(&DidSpec::from_seed(STEWARD_SEED))
            .await
            .unwrap();
    }

    let manager = DidManager::with_shared(
        Arc::new(EncryptedStore::new(sqlite, &StoreKey::derive("wrong"))),
        Arc::new(MemoryLedger::new()),
        ManagerConfig::default(),
    );
    assert!(matches!(
        manager.get_my_did_with_meta(STEWARD_DID).await,
        Err(VaultError::Storage { .. })
    ));
}
