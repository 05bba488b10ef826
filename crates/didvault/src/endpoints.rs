//! Endpoint directory.

use didvault_core::{codec, Endpoint, EndpointRecord, EndpointSource};
use didvault_ledger::Ledger;
use didvault_store::{RecordKind, SecureStore, StoreExt};

use crate::error::{ErrorContext, Result};
use crate::manager::{now_millis, parse_did, DidManager};
use crate::resolver::EndpointLookup;

impl<S: SecureStore, L: Ledger> DidManager<S, L> {
    /// Set the endpoint of a DID. `address` is opaque.
    pub async fn set_endpoint_for_did(
        &self,
        did: &str,
        address: &str,
        transport_verkey: Option<&str>,
    ) -> Result<()> {
        let did = parse_did(did)?;
        if let Some(key) = transport_verkey {
            codec::validate_verkey(key)?;
        }

        let _guard = self.locks.lock(&did).await;
        let record = EndpointRecord {
            did: did.clone(),
            endpoint: Endpoint {
                address: address.to_string(),
                transport_verkey: transport_verkey.map(str::to_string),
            },
            source: EndpointSource::Local,
            last_resolved_at: now_millis(),
        };
        self.store
            .put_record(RecordKind::Endpoint, did.as_str(), &record)
            .await
            .context(|| format!("saving endpoint of {}", did))?;

        tracing::debug!(did = %did, address, "stored endpoint");
        Ok(())
    }

    /// The endpoint of a DID, consulting the ledger when needed.
    pub async fn get_endpoint_for_did(&self, did: &str) -> Result<Endpoint> {
        let did = parse_did(did)?;
        self.resolver(EndpointLookup).resolve(&did).await
    }
}
