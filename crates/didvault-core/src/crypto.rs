//! Cryptographic primitives for didvault.
//!
//! Wraps Ed25519 key generation and signing with strong types, and defines
//! the [`CryptoProvider`] seam the manager generates keys through.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::did::Verkey;
use crate::error::{CoreError, Result};

/// Supported key algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CryptoType {
    #[default]
    #[serde(rename = "ed25519")]
    Ed25519,
}

impl CryptoType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CryptoType::Ed25519 => "ed25519",
        }
    }
}

impl fmt::Display for CryptoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CryptoType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ed25519" => Ok(CryptoType::Ed25519),
            other => Err(CoreError::UnsupportedCryptoType(other.to_string())),
        }
    }
}

/// A 32-byte key generation seed.
///
/// Accepts either exactly 32 bytes of UTF-8 or 64 hex characters.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed([u8; 32]);

impl Seed {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a seed string.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = match s.len() {
            32 => s.as_bytes().to_vec(),
            64 => hex::decode(s)
                .map_err(|e| CoreError::InvalidSeed(format!("64-char seed is not hex: {}", e)))?,
            n => {
                return Err(CoreError::InvalidSeed(format!(
                    "seed must be 32 bytes or 64 hex characters, got {} bytes",
                    n
                )))
            }
        };

        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

/// A signing keypair.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
    crypto_type: CryptoType,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
            crypto_type: CryptoType::Ed25519,
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
            crypto_type: CryptoType::Ed25519,
        }
    }

    /// The verification key, base58 encoded.
    pub fn verkey(&self) -> Verkey {
        Verkey::from_bytes(&self.signing_key.verifying_key().to_bytes())
    }

    pub fn crypto_type(&self) -> CryptoType {
        self.crypto_type
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.verkey())
    }
}

/// Verify `signature` over `message` against a full verkey.
pub fn verify(verkey: &Verkey, message: &[u8], signature: &Signature) -> Result<()> {
    let bytes = verkey.to_bytes()?;
    let verifying_key = VerifyingKey::from_bytes(&bytes).map_err(|_| CoreError::InvalidPublicKey)?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

    verifying_key
        .verify(message, &sig)
        .map_err(|_| CoreError::InvalidSignature)
}

/// Key generation capability.
pub trait CryptoProvider: Send + Sync {
    /// Generate a keypair, deterministically when `seed` is given.
    fn generate_key_pair(&self, seed: Option<&Seed>, crypto_type: CryptoType) -> Result<Keypair>;
}

/// The default provider backed by ed25519-dalek.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Provider;

impl CryptoProvider for Ed25519Provider {
    fn generate_key_pair(&self, seed: Option<&Seed>, crypto_type: CryptoType) -> Result<Keypair> {
        match crypto_type {
            CryptoType::Ed25519 => Ok(match seed {
                Some(seed) => Keypair::from_seed(seed.as_bytes()),
                None => Keypair::generate(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEWARD_SEED: &str = "000000000000000000000000Steward1";

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let message = b"hello world";
        let signature = keypair.sign(message);

        verify(&keypair.verkey(), message, &signature).expect("valid signature should verify");
        assert_eq!(
            verify(&keypair.verkey(), b"hello worlD", &signature),
            Err(CoreError::InvalidSignature)
        );
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let seed = Seed::parse(STEWARD_SEED).unwrap();
        let kp1 = Ed25519Provider
            .generate_key_pair(Some(&seed), CryptoType::Ed25519)
            .unwrap();
        let kp2 = Ed25519Provider
            .generate_key_pair(Some(&seed), CryptoType::Ed25519)
            .unwrap();
        assert_eq!(kp1.verkey(), kp2.verkey());
        assert_eq!(kp1.seed(), *seed.as_bytes());
    }

    #[test]
    fn test_random_generation_differs() {
        let kp1 = Ed25519Provider.generate_key_pair(None, CryptoType::Ed25519).unwrap();
        let kp2 = Ed25519Provider.generate_key_pair(None, CryptoType::Ed25519).unwrap();
        assert_ne!(kp1.verkey(), kp2.verkey());
    }

    #[test]
    fn test_seed_parsing() {
        assert!(Seed::parse(STEWARD_SEED).is_ok());
        assert!(Seed::parse(&"ab".repeat(32)).is_ok());
        assert!(matches!(Seed::parse("short"), Err(CoreError::InvalidSeed(_))));
        assert!(matches!(
            Seed::parse(&"zz".repeat(32)),
            Err(CoreError::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_seed_debug_redacted() {
        let seed = Seed::parse(STEWARD_SEED).unwrap();
        assert!(!format!("{:?}", seed).contains("Steward"));
    }

    #[test]
    fn test_crypto_type_parse() {
        assert_eq!("ed25519".parse::<CryptoType>().unwrap(), CryptoType::Ed25519);
        assert!(matches!(
            "secp256k1".parse::<CryptoType>(),
            Err(CoreError::UnsupportedCryptoType(_))
        ));
    }
}
