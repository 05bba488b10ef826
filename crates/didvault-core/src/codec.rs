//! Verkey codec: abbreviation and expansion of verification keys.
//!
//! A cryptonym DID is the base58 encoding of the first 16 bytes of its
//! verkey. Given the DID, a verkey is therefore fully described by its last
//! 16 bytes. The abbreviated form is `~` followed by the base58 of those
//! bytes:
//!
//! ```text
//! did     = b58(vk[0..16])
//! abbrev  = "~" || b58(vk[16..32])
//! expand  = b58(b58decode(did) || b58decode(abbrev[1..]))
//! ```
//!
//! A verkey that does not start with the DID's bytes has no abbreviation and
//! is returned unchanged. Both functions are pure.

use crate::did::{DidValue, Verkey, SHORT_DID_LEN, VERKEY_LEN};
use crate::error::{CoreError, Result};

/// Marker prefix of an abbreviated verkey.
pub const ABBREVIATION_MARKER: char = '~';

/// Abbreviate `verkey` relative to `did`.
///
/// Returns `~<tail>` when the verkey's first 16 bytes equal the decoded DID,
/// otherwise the verkey unchanged. A crypto-type suffix is carried over.
pub fn abbreviate(did: &str, verkey: &str) -> Result<String> {
    let did = DidValue::parse(did)?;
    let full = Verkey::parse(verkey)?;

    if !did.is_abbreviatable() {
        return Ok(verkey.to_string());
    }

    let did_bytes = did.to_bytes()?;
    let key_bytes = full.to_bytes()?;
    let (head, tail) = key_bytes.split_at(SHORT_DID_LEN);

    if head != did_bytes.as_slice() {
        return Ok(verkey.to_string());
    }

    let (_, suffix) = split_crypto_suffix(verkey);
    Ok(with_suffix(
        format!("{}{}", ABBREVIATION_MARKER, bs58::encode(tail).into_string()),
        suffix,
    ))
}

/// Expand a possibly abbreviated verkey relative to `did`.
///
/// Full-form keys are validated and returned unchanged.
pub fn expand(did: &str, verkey: &str) -> Result<String> {
    let did = DidValue::parse(did)?;

    let Some(abbreviated) = verkey.strip_prefix(ABBREVIATION_MARKER) else {
        Verkey::parse(verkey)?;
        return Ok(verkey.to_string());
    };

    let (tail, suffix) = split_crypto_suffix(abbreviated);
    let tail = decode_base58(tail, "abbreviated verkey")?;
    if tail.len() != VERKEY_LEN - SHORT_DID_LEN {
        return Err(CoreError::InvalidStructure(format!(
            "abbreviated verkey must decode to {} bytes, got {}",
            VERKEY_LEN - SHORT_DID_LEN,
            tail.len()
        )));
    }

    let mut bytes = did.to_bytes()?;
    if bytes.len() != SHORT_DID_LEN {
        return Err(CoreError::InvalidStructure(format!(
            "DID {} is not a 16-byte cryptonym, cannot expand abbreviated verkey",
            did
        )));
    }
    bytes.extend_from_slice(&tail);

    Ok(with_suffix(bs58::encode(bytes).into_string(), suffix))
}

/// Check that `verkey` is a well-formed full or abbreviated key.
pub fn validate_verkey(verkey: &str) -> Result<()> {
    match verkey.strip_prefix(ABBREVIATION_MARKER) {
        Some(abbreviated) => {
            let (tail, _) = split_crypto_suffix(abbreviated);
            let bytes = decode_base58(tail, "abbreviated verkey")?;
            if bytes.len() != VERKEY_LEN - SHORT_DID_LEN {
                return Err(CoreError::InvalidStructure(format!(
                    "abbreviated verkey must decode to {} bytes, got {}",
                    VERKEY_LEN - SHORT_DID_LEN,
                    bytes.len()
                )));
            }
            Ok(())
        }
        None => Verkey::parse(verkey).map(|_| ()),
    }
}

/// Split `key:crypto_type` into its parts.
pub fn split_crypto_suffix(verkey: &str) -> (&str, Option<&str>) {
    match verkey.split_once(':') {
        Some((key, suffix)) => (key, Some(suffix)),
        None => (verkey, None),
    }
}

/// Decode base58, naming the offending field on failure.
pub fn decode_base58(s: &str, what: &str) -> Result<Vec<u8>> {
    if s.is_empty() {
        return Err(CoreError::InvalidStructure(format!("empty {}", what)));
    }
    bs58::decode(s)
        .into_vec()
        .map_err(|e| CoreError::InvalidStructure(format!("{} is not valid base58: {}", what, e)))
}

fn with_suffix(key: String, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{}:{}", key, suffix),
        None => key,
    }
}
