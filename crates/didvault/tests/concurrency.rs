//! Concurrent operations through the manager and the dispatcher.

use std::sync::Arc;
use std::time::Duration;

use didvault::ledger::memory::MemoryLedger;
use didvault::store::MemoryStore;
use didvault::{
    Command, DidManager, DidSpec, DidValue, Dispatcher, KeySpec, ManagerConfig, PeerIdentity,
    Reply,
};

fn manager(pool: usize) -> Arc<DidManager<MemoryStore, MemoryLedger>> {
    Arc::new(DidManager::new(
        MemoryStore::new(),
        MemoryLedger::new(),
        ManagerConfig::default().with_worker_pool_size(pool),
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rotations_leave_one_consistent_record() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let manager = manager(8);
    let (did, _) = manager
        .create_and_store_my_did(&DidSpec::default())
        .await
        .unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let manager = manager.clone();
            let did = did.to_string();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    manager
                        .replace_keys_start(&did, &KeySpec::default())
                        .await
                        .map(|_| ())
                } else {
                    manager.replace_keys_apply(&did).await
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    manager.replace_keys_apply(did.as_str()).await.unwrap();
    let meta = manager.get_my_did_with_meta(did.as_str()).await.unwrap();
    assert_eq!(meta.did, did);
    assert!(meta.pending_verkey.is_none());
    assert_eq!(
        manager.key_for_local_did(did.as_str()).await.unwrap(),
        meta.verkey.as_str()
    );
    assert!(manager.list_my_dids_with_meta().await.unwrap().len() == 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn metadata_and_rotation_on_one_did_both_persist() {
    let manager = manager(8);
    let (did, _) = manager
        .create_and_store_my_did(&DidSpec::default())
        .await
        .unwrap();

    for round in 0..50 {
        let metadata = format!("round-{}", round);

        let setter = {
            let manager = manager.clone();
            let did = did.to_string();
            let metadata = metadata.clone();
            tokio::spawn(async move { manager.set_did_metadata(&did, &metadata).await })
        };
        let rotator = {
            let manager = manager.clone();
            let did = did.to_string();
            tokio::spawn(async move { manager.replace_keys_start(&did, &KeySpec::default()).await })
        };

        setter.await.unwrap().unwrap();
        let pending = rotator.await.unwrap().unwrap();

        let meta = manager.get_my_did_with_meta(did.as_str()).await.unwrap();
        assert_eq!(meta.metadata.as_deref(), Some(metadata.as_str()), "round {}", round);
        assert_eq!(meta.pending_verkey.as_ref(), Some(&pending), "round {}", round);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn slow_ledger_does_not_block_mutations() {
    const PEER_DID: &str = "V4SGRU86Z58d6TV7PBUe6f";
    const PEER_VERKEY: &str = "GJ1SzoWzavQYfNL9XkaJdrQejfztN4XqdsiV4ct3LXKL";

    let manager = Arc::new(DidManager::new(
        MemoryStore::new(),
        MemoryLedger::new().with_latency(Duration::from_millis(500)),
        ManagerConfig::default(),
    ));
    manager
        .ledger()
        .publish_nym(&DidValue::parse(PEER_DID).unwrap(), PEER_VERKEY)
        .await;

    let resolution = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.key_for_did(PEER_DID).await })
    };
    while manager.ledger().lookup_count() == 0 {
        tokio::task::yield_now().await;
    }

    tokio::time::timeout(
        Duration::from_millis(200),
        manager.store_their_did(&PeerIdentity {
            did: PEER_DID.into(),
            verkey: None,
        }),
    )
    .await
    .expect("peer update waited for the ledger")
    .unwrap();
    assert!(!resolution.is_finished());

    assert_eq!(resolution.await.unwrap().unwrap(), PEER_VERKEY);
    assert_eq!(
        manager.key_for_local_did(PEER_DID).await.unwrap(),
        PEER_VERKEY
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dispatcher_runs_independent_dids_in_parallel() {
    let dispatcher = Dispatcher::new(manager(4));

    let completions: Vec<_> = (0..32)
        .map(|_| dispatcher.submit(Command::CreateAndStoreMyDid(DidSpec::default())))
        .collect();

    let mut dids = Vec::new();
    for completion in completions {
        match completion.await.unwrap() {
            Reply::Created { did, .. } => dids.push(did),
            other => panic!("unexpected reply: {:?}", other),
        }
    }
    dids.sort();
    dids.dedup();
    assert_eq!(dids.len(), 32);

    for did in &dids {
        let reply = dispatcher
            .call(Command::SetDidMetadata {
                did: did.clone(),
                metadata: "tagged".into(),
            })
            .await
            .unwrap();
        assert_eq!(reply, Reply::Done);
    }

    let reply = dispatcher.call(Command::ListMyDidsWithMeta).await.unwrap();
    match reply {
        Reply::Dids(all) => {
            assert_eq!(all.len(), 32);
            assert!(all.iter().all(|d| d.metadata.as_deref() == Some("tagged")));
        }
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_peer_updates_keep_single_entry() {
    let manager = manager(8);
    let keys = [
        "FYmoFw55GeQH7SRFa37dkx1d2dZ3zUF8ckg7wmL7ofN4",
        "GJ1SzoWzavQYfNL9XkaJdrQejfztN4XqdsiV4ct3LXKL",
    ];

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let manager = manager.clone();
            let verkey = keys[i % 2].to_string();
            tokio::spawn(async move {
                manager
                    .store_their_did(&PeerIdentity {
                        did: "V4SGRU86Z58d6TV7PBUe6f".into(),
                        verkey: Some(verkey),
                    })
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let resolved = manager
        .key_for_local_did("V4SGRU86Z58d6TV7PBUe6f")
        .await
        .unwrap();
    assert!(keys.contains(&resolved.as_str()));
    assert!(manager.store().count(didvault::store::RecordKind::TheirDid).unwrap() == 1);
}
