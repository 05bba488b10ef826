//! In-memory implementation of the SecureStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::traits::{RecordKind, SecureStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<(RecordKind, String), Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of a kind.
    pub fn count(&self, kind: RecordKind) -> Result<usize> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.keys().filter(|(k, _)| *k == kind).count())
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

#[async_trait]
impl SecureStore for MemoryStore {
    async fn put(&self, kind: RecordKind, key: &str, value: &[u8]) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        records.insert((kind, key.to_string()), value.to_vec());
        Ok(())
    }

    async fn get(&self, kind: RecordKind, key: &str) -> Result<Option<Vec<u8>>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.get(&(kind, key.to_string())).cloned())
    }

    async fn list(&self, kind: RecordKind) -> Result<Vec<(String, Vec<u8>)>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|((_, key), value)| (key.clone(), value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
        version: u32,
    }

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let store = MemoryStore::new();
        assert_eq!(store.get(RecordKind::Did, "a").await.unwrap(), None);

        store.put(RecordKind::Did, "a", b"one").await.unwrap();
        store.put(RecordKind::Did, "a", b"two").await.unwrap();

        assert_eq!(store.get(RecordKind::Did, "a").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.count(RecordKind::Did).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_kinds_are_separate_namespaces() {
        let store = MemoryStore::new();
        store.put(RecordKind::Did, "x", b"mine").await.unwrap();
        store.put(RecordKind::TheirDid, "x", b"theirs").await.unwrap();

        assert_eq!(store.get(RecordKind::Did, "x").await.unwrap(), Some(b"mine".to_vec()));
        assert_eq!(
            store.get(RecordKind::TheirDid, "x").await.unwrap(),
            Some(b"theirs".to_vec())
        );
        assert_eq!(store.get(RecordKind::Endpoint, "x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_by_kind_ordered() {
        let store = MemoryStore::new();
        store.put(RecordKind::Key, "b", b"2").await.unwrap();
        store.put(RecordKind::Key, "a", b"1").await.unwrap();
        store.put(RecordKind::Did, "c", b"3").await.unwrap();

        let keys: Vec<String> = store
            .list(RecordKind::Key)
            .await
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_typed_records() {
        let store = MemoryStore::new();
        let note = Note { text: "hello".into(), version: 3 };

        store.put_record(RecordKind::Did, "n", &note).await.unwrap();
        let back: Option<Note> = store.get_record(RecordKind::Did, "n").await.unwrap();
        assert_eq!(back, Some(note));

        let all: Vec<Note> = store.list_records(RecordKind::Did).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_typed_decode_failure() {
        let store = MemoryStore::new();
        store.put(RecordKind::Did, "junk", &[0xff, 0x00]).await.unwrap();

        let result: Result<Option<Note>> = store.get_record(RecordKind::Did, "junk").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
