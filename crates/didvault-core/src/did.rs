//! Strong types for identifiers and verification keys.
//!
//! Both types are validated on construction and on deserialization, so a
//! value held by the rest of the system always decodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec::{decode_base58, split_crypto_suffix};
use crate::crypto::CryptoType;
use crate::error::{CoreError, Result};

/// Prefix of a method-qualified DID.
pub const QUALIFIED_PREFIX: &str = "did:";

/// Decoded length of a DID derived from the first half of a verkey.
pub const SHORT_DID_LEN: usize = 16;

/// Decoded length of a full Ed25519 verification key (and of a `cid` DID).
pub const VERKEY_LEN: usize = 32;

/// Methods whose identifiers follow the cryptonym convention.
const ABBREVIATABLE_METHODS: &[&str] = &["sov"];

/// A decentralized identifier.
///
/// Either bare (`Th7MpTaRZVRYnPiabds81Y`) or method-qualified
/// (`did:sov:Th7MpTaRZVRYnPiabds81Y`). The method-specific part is base58
/// and decodes to 16 or 32 bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DidValue(String);

impl DidValue {
    /// Parse and validate a DID string.
    pub fn parse(s: &str) -> Result<Self> {
        let id = match s.strip_prefix(QUALIFIED_PREFIX) {
            Some(rest) => {
                let (method, id) = rest.split_once(':').ok_or_else(|| {
                    CoreError::InvalidStructure(format!("qualified DID without method: {}", s))
                })?;
                validate_method(method)?;
                id
            }
            None => s,
        };

        let bytes = decode_base58(id, "DID")?;
        if bytes.len() != SHORT_DID_LEN && bytes.len() != VERKEY_LEN {
            return Err(CoreError::InvalidStructure(format!(
                "DID must decode to {} or {} bytes, got {}",
                SHORT_DID_LEN,
                VERKEY_LEN,
                bytes.len()
            )));
        }

        Ok(Self(s.to_string()))
    }

    /// Derive a DID from a verification key.
    ///
    /// With `cid == false` the DID is the base58 of the first 16 key bytes;
    /// with `cid == true` it is the full key. `method` qualifies the result.
    pub fn from_verkey(verkey: &Verkey, cid: bool, method: Option<&str>) -> Result<Self> {
        let bytes = verkey.to_bytes()?;
        let id = if cid {
            bs58::encode(&bytes).into_string()
        } else {
            bs58::encode(&bytes[..SHORT_DID_LEN]).into_string()
        };

        match method {
            Some(method) => {
                validate_method(method)?;
                Ok(Self(format!("{}{}:{}", QUALIFIED_PREFIX, method, id)))
            }
            None => Ok(Self(id)),
        }
    }

    /// The DID method, if qualified.
    pub fn method(&self) -> Option<&str> {
        self.0
            .strip_prefix(QUALIFIED_PREFIX)
            .and_then(|rest| rest.split_once(':'))
            .map(|(method, _)| method)
    }

    /// The method-specific identifier.
    pub fn unqualified(&self) -> &str {
        self.0
            .strip_prefix(QUALIFIED_PREFIX)
            .and_then(|rest| rest.split_once(':'))
            .map(|(_, id)| id)
            .unwrap_or(&self.0)
    }

    /// Whether verkeys for this DID may be abbreviated.
    pub fn is_abbreviatable(&self) -> bool {
        match self.method() {
            None => true,
            Some(method) => ABBREVIATABLE_METHODS.contains(&method),
        }
    }

    /// Decoded bytes of the method-specific identifier.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        decode_base58(self.unqualified(), "DID")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_method(method: &str) -> Result<()> {
    if method.is_empty()
        || !method
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(CoreError::InvalidStructure(format!(
            "invalid DID method: {:?}",
            method
        )));
    }
    Ok(())
}

impl fmt::Debug for DidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Did({})", self.0)
    }
}

impl fmt::Display for DidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DidValue {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DidValue {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<DidValue> for String {
    fn from(did: DidValue) -> Self {
        did.0
    }
}

impl AsRef<str> for DidValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A full-form verification key: base58 of 32 key bytes, optionally
/// followed by a `:<crypto_type>` suffix.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Verkey(String);

impl Verkey {
    /// Parse a full-form verkey. Abbreviated (`~`) forms are rejected; use
    /// [`crate::codec::expand`] first.
    pub fn parse(s: &str) -> Result<Self> {
        let (key, suffix) = split_crypto_suffix(s);
        if let Some(suffix) = suffix {
            suffix.parse::<CryptoType>()?;
        }

        let bytes = decode_base58(key, "verkey")?;
        if bytes.len() != VERKEY_LEN {
            return Err(CoreError::InvalidStructure(format!(
                "verkey must decode to {} bytes, got {}",
                VERKEY_LEN,
                bytes.len()
            )));
        }

        Ok(Self(s.to_string()))
    }

    /// Encode raw key bytes.
    pub fn from_bytes(bytes: &[u8; VERKEY_LEN]) -> Self {
        Self(bs58::encode(bytes).into_string())
    }

    /// Decode the key bytes, ignoring any crypto-type suffix.
    pub fn to_bytes(&self) -> Result<[u8; VERKEY_LEN]> {
        let bytes = decode_base58(self.key_part(), "verkey")?;
        bytes
            .try_into()
            .map_err(|_| CoreError::InvalidStructure("verkey length changed".into()))
    }

    /// The base58 key without its crypto-type suffix.
    pub fn key_part(&self) -> &str {
        split_crypto_suffix(&self.0).0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Verkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Verkey({})", self.0)
    }
}

impl fmt::Display for Verkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Verkey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Verkey {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Verkey> for String {
    fn from(verkey: Verkey) -> Self {
        verkey.0
    }
}

impl AsRef<str> for Verkey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
