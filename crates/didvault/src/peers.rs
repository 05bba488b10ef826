//! Pairwise peer store: DIDs belonging to other parties.

use didvault_core::{codec, PeerRecord, Verkey};
use didvault_ledger::Ledger;
use didvault_store::{RecordKind, SecureStore, StoreExt};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, Result};
use crate::manager::{now_millis, parse_did, DidManager};

/// A peer's DID and, optionally, its verkey (full or abbreviated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerIdentity {
    pub did: String,
    pub verkey: Option<String>,
}

impl<S: SecureStore, L: Ledger> DidManager<S, L> {
    /// Record (or replace) a peer DID.
    ///
    /// Abbreviated verkeys are expanded before storage. Without a verkey the
    /// DID itself is used as the peer's key reference. No proof of key
    /// ownership is checked.
    pub async fn store_their_did(&self, identity: &PeerIdentity) -> Result<()> {
        let did = parse_did(&identity.did)?;
        let verkey = match identity.verkey.as_deref() {
            Some(verkey) => {
                codec::validate_verkey(verkey)?;
                Some(Verkey::parse(&codec::expand(did.as_str(), verkey)?)?)
            }
            None => None,
        };

        let _guard = self.locks.lock(&did).await;
        let record = PeerRecord {
            did: did.clone(),
            verkey,
            last_resolved_at: now_millis(),
        };
        self.store
            .put_record(RecordKind::TheirDid, did.as_str(), &record)
            .await
            .context(|| format!("saving peer {}", did))?;

        tracing::debug!(did = %did, has_verkey = record.verkey.is_some(), "stored peer DID");
        Ok(())
    }
}
