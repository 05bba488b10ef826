//! Two-phase key rotation and signing with owned keys.
//!
//! `replace_keys_start` stages a new key next to the active one;
//! `replace_keys_apply` promotes it. Until apply, the DID keeps signing and
//! resolving with its old key, so the new key can be published first.

use didvault_core::{KeyRecord, Signature, Verkey};
use didvault_ledger::Ledger;
use didvault_store::SecureStore;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, Result};
use crate::manager::{parse_did, DidManager};
use crate::registry::{parse_crypto_type, parse_seed};

/// Parameters of `replace_keys_start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySpec {
    pub seed: Option<String>,
    pub crypto_type: Option<String>,
}

impl<S: SecureStore, L: Ledger> DidManager<S, L> {
    /// Generate a new key for an owned DID and stage it as pending.
    ///
    /// Replaces any key staged by an earlier call. Returns the new verkey.
    pub async fn replace_keys_start(&self, did: &str, spec: &KeySpec) -> Result<Verkey> {
        let did = parse_did(did)?;
        let crypto_type = parse_crypto_type(spec.crypto_type.as_deref())?;
        let seed = parse_seed(spec.seed.as_deref())?;

        let _guard = self.locks.lock(&did).await;
        let mut record = self.load_my_did(&did).await?;

        let keypair = self
            .crypto
            .generate_key_pair(seed.as_ref(), crypto_type)
            .context(|| format!("generating next key for {}", did))?;
        let pending = keypair.verkey();
        // Key first: a DID record never names a key that is not stored.
        // Key records are never deleted, superseded pending ones included.
        self.save_key(&KeyRecord::from_keypair(&keypair)).await?;

        record.start_rotation(pending.clone());
        self.save_my_did(&record).await?;

        tracing::debug!(did = %did, pending = %pending, "started key rotation");
        Ok(pending)
    }

    /// Promote the pending key of an owned DID. A no-op when nothing is
    /// pending.
    pub async fn replace_keys_apply(&self, did: &str) -> Result<()> {
        let did = parse_did(did)?;

        let _guard = self.locks.lock(&did).await;
        let mut record = self.load_my_did(&did).await?;

        if !record.apply_rotation() {
            tracing::debug!(did = %did, "no pending key, nothing to apply");
            return Ok(());
        }
        self.save_my_did(&record).await?;

        tracing::debug!(did = %did, verkey = %record.verkey(), "applied key rotation");
        Ok(())
    }

    /// Sign `message` with the active key of an owned DID.
    pub async fn sign(&self, did: &str, message: &[u8]) -> Result<Signature> {
        let did = parse_did(did)?;
        let record = self.load_my_did(&did).await?;
        let key = self.load_key(record.verkey()).await?;
        Ok(key.keypair().sign(message))
    }

    /// Check a signature against a full verkey.
    ///
    /// Returns `Ok(false)` for a well-formed but wrong signature.
    pub fn verify(&self, verkey: &str, message: &[u8], signature: &Signature) -> Result<bool> {
        let verkey = Verkey::parse(verkey)?;
        match didvault_core::verify(&verkey, message, signature) {
            Ok(()) => Ok(true),
            Err(didvault_core::CoreError::InvalidSignature) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
