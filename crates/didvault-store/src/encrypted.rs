//! Encryption at rest for any [`SecureStore`].
//!
//! Each value is sealed with ChaCha20-Poly1305 under a store key. The stored
//! bytes are `nonce (12) || ciphertext || tag (16)`. The record's kind and key
//! are bound as associated data, so a sealed value copied to another slot
//! fails to open.

use std::fmt;

use async_trait::async_trait;
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;

use crate::error::{Result, StoreError};
use crate::traits::{RecordKind, SecureStore};

/// BLAKE3 key-derivation context for store keys.
const KEY_CONTEXT: &str = "didvault 2026-01-01 store encryption key v1";

const NONCE_LEN: usize = 12;

/// A 256-bit symmetric key for sealing records.
#[derive(Clone)]
pub struct StoreKey([u8; 32]);

impl StoreKey {
    /// Derive a key from a passphrase.
    pub fn derive(passphrase: &str) -> Self {
        Self(blake3::derive_key(KEY_CONTEXT, passphrase.as_bytes()))
    }

    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreKey(<redacted>)")
    }
}

/// A store wrapper that seals every value before handing it to `inner`.
pub struct EncryptedStore<S> {
    inner: S,
    cipher: ChaCha20Poly1305,
}

impl<S: SecureStore> EncryptedStore<S> {
    pub fn new(inner: S, key: &StoreKey) -> Self {
        Self {
            inner,
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key.0)),
        }
    }

    /// The wrapped store. Values read through it are sealed.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn seal(&self, kind: RecordKind, key: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let aad = associated_data(kind, key);
        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|e| StoreError::Encryption(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn open(&self, kind: RecordKind, key: &str, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_LEN {
            return Err(StoreError::Encryption(format!(
                "sealed {} record {} is truncated",
                kind.as_str(),
                key
            )));
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

        let aad = associated_data(kind, key);
        self.cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|_| {
                StoreError::Encryption(format!(
                    "cannot open {} record {}: wrong key or tampered value",
                    kind.as_str(),
                    key
                ))
            })
    }
}

fn associated_data(kind: RecordKind, key: &str) -> Vec<u8> {
    let mut aad = Vec::with_capacity(kind.as_str().len() + 1 + key.len());
    aad.extend_from_slice(kind.as_str().as_bytes());
    aad.push(0);
    aad.extend_from_slice(key.as_bytes());
    aad
}

impl<S> fmt::Debug for EncryptedStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl<S: SecureStore> SecureStore for EncryptedStore<S> {
    async fn put(&self, kind: RecordKind, key: &str, value: &[u8]) -> Result<()> {
        let sealed = self.seal(kind, key, value)?;
        self.inner.put(kind, key, &sealed).await
    }

    async fn get(&self, kind: RecordKind, key: &str) -> Result<Option<Vec<u8>>> {
        match self.inner.get(kind, key).await? {
            Some(sealed) => self.open(kind, key, &sealed).map(Some),
            None => Ok(None),
        }
    }

    async fn list(&self, kind: RecordKind) -> Result<Vec<(String, Vec<u8>)>> {
        self.inner
            .list(kind)
            .await?
            .into_iter()
            .map(|(key, sealed)| {
                let value = self.open(kind, &key, &sealed)?;
                Ok((key, value))
            })
            .collect()
    }
}
