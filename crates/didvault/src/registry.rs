//! Identity registry: DIDs the caller controls.

use didvault_core::{
    CryptoType, DidRecord, DidValue, DidWithMeta, KeyRecord, Seed, Verkey,
};
use didvault_ledger::Ledger;
use didvault_store::{RecordKind, SecureStore, StoreExt};
use serde::{Deserialize, Serialize};

use crate::config::DidCollisionPolicy;
use crate::error::{ErrorContext, Result, VaultError};
use crate::manager::{parse_did, DidManager};

/// Parameters of `create_and_store_my_did`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidSpec {
    /// Use this DID verbatim instead of deriving one (import / re-keying).
    pub did: Option<String>,
    /// 32 raw bytes or 64 hex characters; random keys when absent.
    pub seed: Option<String>,
    pub crypto_type: Option<String>,
    /// Derive the DID from the full verkey instead of its first 16 bytes.
    pub cid: Option<bool>,
    /// Qualify the derived DID as `did:<method>:<id>`.
    pub method_name: Option<String>,
}

impl DidSpec {
    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: Some(seed.into()),
            ..Self::default()
        }
    }
}

/// Parse an optional crypto type name, defaulting to Ed25519.
pub(crate) fn parse_crypto_type(name: Option<&str>) -> Result<CryptoType> {
    match name {
        Some(name) => name
            .parse::<CryptoType>()
            .context(|| "parsing crypto type".to_string()),
        None => Ok(CryptoType::default()),
    }
}

pub(crate) fn parse_seed(seed: Option<&str>) -> Result<Option<Seed>> {
    seed.map(Seed::parse)
        .transpose()
        .context(|| "parsing seed".to_string())
}

impl<S: SecureStore, L: Ledger> DidManager<S, L> {
    // ─────────────────────────────────────────────────────────────────────────
    // Owned DIDs
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a key pair and an owned DID for it.
    ///
    /// With `spec.did` the given DID is (re-)bound to the new key, subject to
    /// the configured [`DidCollisionPolicy`]. Returns the DID and its verkey.
    pub async fn create_and_store_my_did(&self, spec: &DidSpec) -> Result<(DidValue, Verkey)> {
        let crypto_type = parse_crypto_type(spec.crypto_type.as_deref())?;
        let seed = parse_seed(spec.seed.as_deref())?;
        let explicit = spec.did.as_deref().map(parse_did).transpose()?;

        let keypair = self
            .crypto
            .generate_key_pair(seed.as_ref(), crypto_type)
            .context(|| match &explicit {
                Some(did) => format!("generating key for {}", did),
                None => "generating key for a new DID".to_string(),
            })?;
        let verkey = keypair.verkey();

        let did = match explicit {
            Some(did) => did,
            None => DidValue::from_verkey(
                &verkey,
                spec.cid.unwrap_or(false),
                spec.method_name.as_deref(),
            )?,
        };

        let _guard = self.locks.lock(&did).await;

        let record = match self.find_my_did(&did).await? {
            None => DidRecord::new(did.clone(), verkey.clone(), crypto_type),
            Some(existing) if existing.verkey() == &verkey => {
                tracing::debug!(did = %did, "DID already bound to this key");
                self.save_key(&KeyRecord::from_keypair(&keypair)).await?;
                return Ok((did, verkey));
            }
            Some(mut existing) => {
                if self.config.collision_policy == DidCollisionPolicy::Reject {
                    return Err(VaultError::AlreadyExists(did.to_string()));
                }
                tracing::debug!(did = %did, old = %existing.verkey(), new = %verkey, "re-keying DID");
                existing.rekey(verkey.clone(), crypto_type);
                existing
            }
        };

        // Key first, as in `replace_keys_start`.
        self.save_key(&KeyRecord::from_keypair(&keypair)).await?;
        self.save_my_did(&record).await?;

        tracing::debug!(did = %did, verkey = %verkey, "stored DID");
        Ok((did, verkey))
    }

    /// Get an owned DID with its keys and metadata.
    pub async fn get_my_did_with_meta(&self, did: &str) -> Result<DidWithMeta> {
        let did = parse_did(did)?;
        Ok(self.load_my_did(&did).await?.with_meta())
    }

    /// List every owned DID, in no particular order.
    pub async fn list_my_dids_with_meta(&self) -> Result<Vec<DidWithMeta>> {
        let records: Vec<DidRecord> = self
            .store
            .list_records(RecordKind::Did)
            .await
            .context(|| "listing DIDs".to_string())?;
        Ok(records.iter().map(DidRecord::with_meta).collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Metadata
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach (or replace) opaque metadata on an owned DID.
    pub async fn set_did_metadata(&self, did: &str, metadata: &str) -> Result<()> {
        let did = parse_did(did)?;
        let _guard = self.locks.lock(&did).await;

        let mut record = self.load_my_did(&did).await?;
        record.metadata = Some(metadata.to_string());
        self.save_my_did(&record).await
    }

    /// Metadata of an owned DID; `None` when never set.
    pub async fn get_did_metadata(&self, did: &str) -> Result<Option<String>> {
        let did = parse_did(did)?;
        Ok(self.load_my_did(&did).await?.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManagerConfig;
    use crate::manager::testing::*;
    use didvault_core::{CoreError, KeyState};

    #[tokio::test]
    async fn test_seeded_did_matches_known_vector() {
        let manager = manager();
        let (did, verkey) = manager
            .create_and_store_my_did(&DidSpec::from_seed(STEWARD_SEED))
            .await
            .unwrap();

        assert_eq!(did.as_str(), STEWARD_DID);
        assert_eq!(verkey.as_str(), STEWARD_VERKEY);

        let meta = manager.get_my_did_with_meta(STEWARD_DID).await.unwrap();
        assert_eq!(meta.verkey.as_str(), STEWARD_VERKEY);
        assert_eq!(meta.pending_verkey, None);
        assert_eq!(meta.metadata, None);
    }

    #[tokio::test]
    async fn test_cid_and_method_name() {
        let manager = manager();
        let (did, verkey) = manager
            .create_and_store_my_did(&DidSpec {
                seed: Some(STEWARD_SEED.into()),
                cid: Some(true),
                ..DidSpec::default()
            })
            .await
            .unwrap();
        assert_eq!(did.as_str(), verkey.as_str());

        let (qualified, _) = manager
            .create_and_store_my_did(&DidSpec {
                seed: Some(STEWARD_SEED.into()),
                method_name: Some("sov".into()),
                ..DidSpec::default()
            })
            .await
            .unwrap();
        assert_eq!(qualified.as_str(), format!("did:sov:{}", STEWARD_DID));
    }

    #[tokio::test]
    async fn test_explicit_did_rekeys_and_keeps_metadata() {
        let manager = manager();
        let (did, first) = manager
            .create_and_store_my_did(&DidSpec::from_seed(STEWARD_SEED))
            .await
            .unwrap();
        manager.set_did_metadata(did.as_str(), "steward").await.unwrap();

        let (same, second) = manager
            .create_and_store_my_did(&DidSpec {
                did: Some(did.to_string()),
                ..DidSpec::default()
            })
            .await
            .unwrap();

        assert_eq!(same, did);
        assert_ne!(second, first);

        let meta = manager.get_my_did_with_meta(did.as_str()).await.unwrap();
        assert_eq!(meta.verkey, second);
        assert_eq!(meta.metadata.as_deref(), Some("steward"));
        assert_eq!(manager.list_my_dids_with_meta().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_key_is_idempotent() {
        let manager = manager_with(
            ManagerConfig::default().with_collision_policy(DidCollisionPolicy::Reject),
        );
        let spec = DidSpec::from_seed(STEWARD_SEED);

        let first = manager.create_and_store_my_did(&spec).await.unwrap();
        let second = manager.create_and_store_my_did(&spec).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_reject_policy() {
        let manager = manager_with(
            ManagerConfig::default().with_collision_policy(DidCollisionPolicy::Reject),
        );
        let (did, verkey) = manager
            .create_and_store_my_did(&DidSpec::from_seed(STEWARD_SEED))
            .await
            .unwrap();

        let err = manager
            .create_and_store_my_did(&DidSpec {
                did: Some(did.to_string()),
                ..DidSpec::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::AlreadyExists(_)));

        let record = manager.load_my_did(&did).await.unwrap();
        assert_eq!(record.keys, KeyState::Stable { verkey });
    }

    #[tokio::test]
    async fn test_invalid_inputs_touch_nothing() {
        let manager = manager();

        let bad_seed = manager
            .create_and_store_my_did(&DidSpec::from_seed("too short"))
            .await;
        assert!(matches!(
            bad_seed,
            Err(VaultError::Crypto {
                source: CoreError::InvalidSeed(_),
                ..
            })
        ));

        let bad_type = manager
            .create_and_store_my_did(&DidSpec {
                crypto_type: Some("secp256k1".into()),
                ..DidSpec::default()
            })
            .await;
        assert!(matches!(
            bad_type,
            Err(VaultError::Crypto {
                source: CoreError::UnsupportedCryptoType(_),
                ..
            })
        ));

        let bad_did = manager
            .create_and_store_my_did(&DidSpec {
                did: Some("not-a-did!".into()),
                ..DidSpec::default()
            })
            .await;
        assert!(matches!(bad_did, Err(VaultError::InvalidStructure(_))));

        assert!(manager.list_my_dids_with_meta().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metadata() {
        let manager = manager();
        let (did, _) = manager
            .create_and_store_my_did(&DidSpec::default())
            .await
            .unwrap();

        assert_eq!(manager.get_did_metadata(did.as_str()).await.unwrap(), None);
        manager.set_did_metadata(did.as_str(), "v1").await.unwrap();
        manager.set_did_metadata(did.as_str(), "v2").await.unwrap();
        assert_eq!(
            manager.get_did_metadata(did.as_str()).await.unwrap().as_deref(),
            Some("v2")
        );
    }

    #[tokio::test]
    async fn test_unknown_did() {
        let manager = manager();
        assert!(matches!(
            manager.get_my_did_with_meta(STEWARD_DID).await,
            Err(VaultError::DoesNotExist { .. })
        ));
        assert!(matches!(
            manager.set_did_metadata(STEWARD_DID, "x").await,
            Err(VaultError::DoesNotExist { .. })
        ));
        assert!(matches!(
            manager.get_did_metadata(STEWARD_DID).await,
            Err(VaultError::DoesNotExist { .. })
        ));
    }

    #[test]
    fn test_spec_from_json() {
        let spec: DidSpec =
            serde_json::from_str(r#"{"seed":"000000000000000000000000Steward1","methodName":"sov"}"#)
                .unwrap();
        assert_eq!(spec.seed.as_deref(), Some(STEWARD_SEED));
        assert_eq!(spec.method_name.as_deref(), Some("sov"));
        assert_eq!(spec.cid, None);
    }
}
