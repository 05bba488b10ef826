//! SecureStore trait: the abstract interface for record persistence.
//!
//! Backends only move bytes. Typed records are layered on top by
//! [`StoreExt`], so the encrypted wrapper and the SQLite backend never see
//! record structure.

use std::future::Future;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// Namespace of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    /// An owned identity (`DidRecord`), keyed by DID.
    Did,
    /// Secret key material (`KeyRecord`), keyed by verkey.
    Key,
    /// A peer identity (`PeerRecord`), keyed by DID.
    TheirDid,
    /// An endpoint (`EndpointRecord`), keyed by DID.
    Endpoint,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Did,
        RecordKind::Key,
        RecordKind::TheirDid,
        RecordKind::Endpoint,
    ];

    /// Stable name used as the storage column value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Did => "did",
            RecordKind::Key => "key",
            RecordKind::TheirDid => "their_did",
            RecordKind::Endpoint => "endpoint",
        }
    }
}

/// The SecureStore trait: async interface for record persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, `spawn_blocking` is used internally to avoid blocking the
/// runtime.
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Insert or overwrite the value at (kind, key).
    async fn put(&self, kind: RecordKind, key: &str, value: &[u8]) -> Result<()>;

    /// Get the value at (kind, key).
    async fn get(&self, kind: RecordKind, key: &str) -> Result<Option<Vec<u8>>>;

    /// All (key, value) pairs of a kind, ordered by key.
    async fn list(&self, kind: RecordKind) -> Result<Vec<(String, Vec<u8>)>>;
}

/// Typed record access over any [`SecureStore`].
pub trait StoreExt: SecureStore {
    /// Encode `record` as CBOR and store it.
    fn put_record<T: Serialize + Sync>(
        &self,
        kind: RecordKind,
        key: &str,
        record: &T,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetch and decode a record.
    fn get_record<T: DeserializeOwned + Send>(
        &self,
        kind: RecordKind,
        key: &str,
    ) -> impl Future<Output = Result<Option<T>>> + Send;

    /// Fetch and decode every record of a kind.
    fn list_records<T: DeserializeOwned + Send>(
        &self,
        kind: RecordKind,
    ) -> impl Future<Output = Result<Vec<T>>> + Send;
}

impl<S: SecureStore + ?Sized> StoreExt for S {
    async fn put_record<T: Serialize + Sync>(
        &self,
        kind: RecordKind,
        key: &str,
        record: &T,
    ) -> Result<()> {
        let bytes = encode(record)?;
        self.put(kind, key, &bytes).await
    }

    async fn get_record<T: DeserializeOwned + Send>(
        &self,
        kind: RecordKind,
        key: &str,
    ) -> Result<Option<T>> {
        match self.get(kind, key).await? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn list_records<T: DeserializeOwned + Send>(&self, kind: RecordKind) -> Result<Vec<T>> {
        self.list(kind)
            .await?
            .iter()
            .map(|(_, bytes)| decode(bytes))
            .collect()
    }
}

fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(record, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}
