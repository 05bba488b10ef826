//! Cached resolution of peer keys and endpoints.
//!
//! One strategy serves both lookups:
//!
//! 1. An owned DID answers from its own record, never stale.
//! 2. A cache entry younger than the freshness TTL is returned.
//! 3. Otherwise the ledger is asked; a reply refreshes the cache.
//! 4. If the ledger is unreachable, any cached value is returned however
//!    old; with nothing cached the lookup fails `ResolutionUnavailable`.
//!
//! The ledger is queried without holding the DID's lock. Only the cache
//! write takes it, so concurrent resolutions of one DID may each query the
//! ledger but leave a single cache entry.

use async_trait::async_trait;
use didvault_core::{
    codec, DidRecord, DidValue, Endpoint, EndpointRecord, EndpointSource, PeerRecord, Verkey,
};
use didvault_ledger::{Ledger, LedgerEntry, LedgerError};
use didvault_store::{RecordKind, SecureStore, StoreExt};

use crate::config::FreshnessPolicy;
use crate::error::{ErrorContext, Result, VaultError};
use crate::locks::DidLocks;
use crate::manager::{now_millis, parse_did, DidManager};

/// A cached value and when it was last resolved (Unix ms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<V> {
    pub value: V,
    pub resolved_at: i64,
}

/// The parts of resolution that differ between keys and endpoints.
#[async_trait]
pub trait ResolveKind: Send + Sync {
    type Value: Clone + Send + Sync;

    /// Name used in errors and logs.
    const NAME: &'static str;

    /// The authoritative value for a DID the vault owns.
    async fn owned(&self, store: &dyn SecureStore, did: &DidValue) -> Result<Option<Self::Value>>;

    async fn cached(
        &self,
        store: &dyn SecureStore,
        did: &DidValue,
    ) -> Result<Option<Cached<Self::Value>>>;

    /// Pick this kind's value out of a ledger reply.
    fn extract(&self, did: &DidValue, entry: LedgerEntry) -> Result<Option<Self::Value>>;

    /// Overwrite the cache entry.
    async fn refill(
        &self,
        store: &dyn SecureStore,
        did: &DidValue,
        value: &Self::Value,
        now: i64,
    ) -> Result<()>;
}

/// Resolution strategy over a store, a ledger and a lock table.
pub struct CachedResolver<'a, K> {
    pub kind: K,
    pub store: &'a dyn SecureStore,
    pub ledger: &'a dyn Ledger,
    pub locks: &'a DidLocks,
    pub policy: FreshnessPolicy,
}

impl<K: ResolveKind> CachedResolver<'_, K> {
    /// Owned record, then fresh cache, then ledger, then stale cache.
    pub async fn resolve(&self, did: &DidValue) -> Result<K::Value> {
        if let Some(value) = self.kind.owned(self.store, did).await? {
            tracing::trace!(did = %did, kind = K::NAME, "resolved from owned record");
            return Ok(value);
        }

        let cached = self.kind.cached(self.store, did).await?;
        if let Some(entry) = &cached {
            if self.policy.is_fresh(entry.resolved_at, now_millis()) {
                tracing::trace!(did = %did, kind = K::NAME, "cache hit");
                return Ok(entry.value.clone());
            }
        }

        match self.ledger.lookup(did).await {
            Ok(entry) => match self.kind.extract(did, entry)? {
                Some(value) => {
                    let _guard = self.locks.lock(did).await;
                    self.kind.refill(self.store, did, &value, now_millis()).await?;
                    tracing::debug!(did = %did, kind = K::NAME, "refreshed from ledger");
                    Ok(value)
                }
                None => match cached {
                    Some(entry) => {
                        tracing::debug!(did = %did, kind = K::NAME, "ledger has no value, keeping cached one");
                        Ok(entry.value)
                    }
                    None => Err(VaultError::not_found(K::NAME, did)),
                },
            },
            Err(LedgerError::Malformed(reason)) => Err(VaultError::InvalidStructure(format!(
                "ledger reply for {}: {}",
                did, reason
            ))),
            Err(e) => match cached {
                Some(entry) => {
                    tracing::warn!(
                        did = %did,
                        kind = K::NAME,
                        resolved_at = entry.resolved_at,
                        error = %e,
                        "ledger unavailable, serving stale cache entry"
                    );
                    Ok(entry.value)
                }
                None => Err(VaultError::ResolutionUnavailable {
                    did: did.to_string(),
                    reason: e,
                }),
            },
        }
    }

    /// Owned record or any cached value, without touching the ledger.
    pub async fn resolve_local_only(&self, did: &DidValue) -> Result<K::Value> {
        if let Some(value) = self.kind.owned(self.store, did).await? {
            return Ok(value);
        }
        match self.kind.cached(self.store, did).await? {
            Some(entry) => Ok(entry.value),
            None => Err(VaultError::not_found(K::NAME, did)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Verkeys
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves a DID's current verkey.
///
/// A peer stored without a verkey resolves to its DID string.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyLookup;

#[async_trait]
impl ResolveKind for KeyLookup {
    type Value = String;
    const NAME: &'static str = "verkey";

    async fn owned(&self, store: &dyn SecureStore, did: &DidValue) -> Result<Option<String>> {
        let record = store
            .get_record::<DidRecord>(RecordKind::Did, did.as_str())
            .await
            .context(|| format!("loading DID {}", did))?;
        Ok(record.map(|r| r.verkey().to_string()))
    }

    async fn cached(
        &self,
        store: &dyn SecureStore,
        did: &DidValue,
    ) -> Result<Option<Cached<String>>> {
        let record = store
            .get_record::<PeerRecord>(RecordKind::TheirDid, did.as_str())
            .await
            .context(|| format!("loading peer {}", did))?;
        Ok(record.map(|r| Cached {
            value: r.effective_verkey(),
            resolved_at: r.last_resolved_at,
        }))
    }

    fn extract(&self, did: &DidValue, entry: LedgerEntry) -> Result<Option<String>> {
        let Some(published) = entry.verkey else {
            return Ok(None);
        };
        let full = codec::expand(did.as_str(), &published)?;
        Ok(Some(Verkey::parse(&full)?.to_string()))
    }

    async fn refill(
        &self,
        store: &dyn SecureStore,
        did: &DidValue,
        value: &String,
        now: i64,
    ) -> Result<()> {
        let record = PeerRecord {
            did: did.clone(),
            verkey: Some(Verkey::parse(value)?),
            last_resolved_at: now,
        };
        store
            .put_record(RecordKind::TheirDid, did.as_str(), &record)
            .await
            .context(|| format!("caching verkey of {}", did))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves a DID's transport endpoint.
///
/// For an owned DID a locally set endpoint is authoritative. Without one the
/// owned DID resolves like any other, and a ledger copy cached for it stays
/// subject to the freshness policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointLookup;

async fn load_endpoint(store: &dyn SecureStore, did: &DidValue) -> Result<Option<EndpointRecord>> {
    store
        .get_record::<EndpointRecord>(RecordKind::Endpoint, did.as_str())
        .await
        .context(|| format!("loading endpoint of {}", did))
}

#[async_trait]
impl ResolveKind for EndpointLookup {
    type Value = Endpoint;
    const NAME: &'static str = "endpoint";

    async fn owned(&self, store: &dyn SecureStore, did: &DidValue) -> Result<Option<Endpoint>> {
        let owned = store
            .get(RecordKind::Did, did.as_str())
            .await
            .context(|| format!("loading DID {}", did))?
            .is_some();
        if !owned {
            return Ok(None);
        }
        Ok(load_endpoint(store, did)
            .await?
            .filter(|r| r.source == EndpointSource::Local)
            .map(|r| r.endpoint))
    }

    async fn cached(
        &self,
        store: &dyn SecureStore,
        did: &DidValue,
    ) -> Result<Option<Cached<Endpoint>>> {
        Ok(load_endpoint(store, did).await?.map(|r| Cached {
            value: r.endpoint,
            resolved_at: r.last_resolved_at,
        }))
    }

    fn extract(&self, _did: &DidValue, entry: LedgerEntry) -> Result<Option<Endpoint>> {
        if let Some(endpoint) = &entry.endpoint {
            if let Some(key) = &endpoint.transport_verkey {
                codec::validate_verkey(key)?;
            }
        }
        Ok(entry.endpoint)
    }

    async fn refill(
        &self,
        store: &dyn SecureStore,
        did: &DidValue,
        value: &Endpoint,
        now: i64,
    ) -> Result<()> {
        // The owner may have set an endpoint while the ledger was queried.
        if self.owned(store, did).await?.is_some() {
            return Ok(());
        }
        let record = EndpointRecord {
            did: did.clone(),
            endpoint: value.clone(),
            source: EndpointSource::Ledger,
            last_resolved_at: now,
        };
        store
            .put_record(RecordKind::Endpoint, did.as_str(), &record)
            .await
            .context(|| format!("caching endpoint of {}", did))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Manager operations
// ─────────────────────────────────────────────────────────────────────────────

impl<S: SecureStore, L: Ledger> DidManager<S, L> {
    pub(crate) fn resolver<K: ResolveKind>(&self, kind: K) -> CachedResolver<'_, K> {
        CachedResolver {
            kind,
            store: &*self.store,
            ledger: &*self.ledger,
            locks: &self.locks,
            policy: self.config.freshness,
        }
    }

    /// The current verkey of any DID, consulting the ledger when the cached
    /// value is missing or stale.
    pub async fn key_for_did(&self, did: &str) -> Result<String> {
        let did = parse_did(did)?;
        self.resolver(KeyLookup).resolve(&did).await
    }

    /// The current verkey of a DID from local records only.
    pub async fn key_for_local_did(&self, did: &str) -> Result<String> {
        let did = parse_did(did)?;
        self.resolver(KeyLookup).resolve_local_only(&did).await
    }

    /// Abbreviate `verkey` relative to `did`.
    pub fn abbreviate_verkey(&self, did: &str, verkey: &str) -> Result<String> {
        Ok(codec::abbreviate(did, verkey)?)
    }
}
