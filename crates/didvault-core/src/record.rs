//! Records persisted by the identity manager.
//!
//! These are plain data: the manager decides when they are written, the
//! store decides how.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{CryptoType, Keypair};
use crate::did::{DidValue, Verkey};

/// Key state of an owned identity.
///
/// The two-phase rotation lives here: `replace_keys_start` moves a record to
/// `PendingRotation`, `replace_keys_apply` promotes the pending key and moves
/// it back to `Stable`. There is no way to hold two pending keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    Stable { verkey: Verkey },
    PendingRotation { verkey: Verkey, pending: Verkey },
}

impl KeyState {
    /// The active signing key.
    pub fn active(&self) -> &Verkey {
        match self {
            KeyState::Stable { verkey } | KeyState::PendingRotation { verkey, .. } => verkey,
        }
    }

    /// The key waiting to be promoted, if a rotation is in progress.
    pub fn pending(&self) -> Option<&Verkey> {
        match self {
            KeyState::Stable { .. } => None,
            KeyState::PendingRotation { pending, .. } => Some(pending),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, KeyState::PendingRotation { .. })
    }
}

/// An identity the caller controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidRecord {
    pub did: DidValue,
    pub keys: KeyState,
    pub crypto_type: CryptoType,
    pub metadata: Option<String>,
}

impl DidRecord {
    /// A fresh record in the `Stable` state.
    pub fn new(did: DidValue, verkey: Verkey, crypto_type: CryptoType) -> Self {
        Self {
            did,
            keys: KeyState::Stable { verkey },
            crypto_type,
            metadata: None,
        }
    }

    pub fn verkey(&self) -> &Verkey {
        self.keys.active()
    }

    pub fn pending_verkey(&self) -> Option<&Verkey> {
        self.keys.pending()
    }

    /// Stage `pending` as the next key, replacing any previously staged one.
    pub fn start_rotation(&mut self, pending: Verkey) {
        let verkey = self.keys.active().clone();
        self.keys = KeyState::PendingRotation { verkey, pending };
    }

    /// Promote the pending key. Returns false (and changes nothing) when no
    /// rotation is in progress.
    pub fn apply_rotation(&mut self) -> bool {
        let promoted = match &self.keys {
            KeyState::PendingRotation { pending, .. } => pending.clone(),
            KeyState::Stable { .. } => return false,
        };
        self.keys = KeyState::Stable { verkey: promoted };
        true
    }

    /// Replace the active key outright, discarding any pending rotation.
    pub fn rekey(&mut self, verkey: Verkey, crypto_type: CryptoType) {
        self.keys = KeyState::Stable { verkey };
        self.crypto_type = crypto_type;
    }

    pub fn with_meta(&self) -> DidWithMeta {
        DidWithMeta {
            did: self.did.clone(),
            verkey: self.verkey().clone(),
            pending_verkey: self.pending_verkey().cloned(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Public view of an owned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidWithMeta {
    pub did: DidValue,
    pub verkey: Verkey,
    #[serde(rename = "tempVerkey")]
    pub pending_verkey: Option<Verkey>,
    pub metadata: Option<String>,
}

/// Secret key material for a generated verkey.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyRecord {
    pub verkey: Verkey,
    pub signkey: [u8; 32],
    pub crypto_type: CryptoType,
}

impl KeyRecord {
    pub fn from_keypair(keypair: &Keypair) -> Self {
        Self {
            verkey: keypair.verkey(),
            signkey: keypair.seed(),
            crypto_type: keypair.crypto_type(),
        }
    }

    pub fn keypair(&self) -> Keypair {
        Keypair::from_seed(&self.signkey)
    }
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("verkey", &self.verkey)
            .field("crypto_type", &self.crypto_type)
            .finish_non_exhaustive()
    }
}

/// A DID belonging to another party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    pub did: DidValue,
    /// Absent when only the DID is known (cryptonym convention).
    pub verkey: Option<Verkey>,
    /// Unix ms of the last store or ledger refill.
    pub last_resolved_at: i64,
}

impl PeerRecord {
    /// The key to use for this peer.
    ///
    /// Without an explicit verkey the DID string itself serves as the key
    /// reference: its decoded bytes are the key's identifying prefix.
    pub fn effective_verkey(&self) -> String {
        match &self.verkey {
            Some(verkey) => verkey.to_string(),
            None => self.did.unqualified().to_string(),
        }
    }
}

/// Transport endpoint of a DID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Opaque transport locator (host:port, URL, ...).
    pub address: String,
    pub transport_verkey: Option<String>,
}

/// Where an endpoint record came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointSource {
    /// Set by the caller through `set_endpoint_for_did`.
    #[default]
    Local,
    /// Copied from a ledger reply; subject to the freshness policy.
    Ledger,
}

/// A cached or locally set endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub did: DidValue,
    pub endpoint: Endpoint,
    #[serde(default)]
    pub source: EndpointSource,
    pub last_resolved_at: i64,
}
