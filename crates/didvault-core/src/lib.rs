//! # didvault Core
//!
//! Pure primitives for didvault: identifiers, verification keys, the verkey
//! codec, and the record types persisted by the manager.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`DidValue`] - A validated DID, qualified (`did:sov:...`) or bare
//! - [`Verkey`] - A full base58 Ed25519 verification key
//! - [`KeyState`] - Active key plus optional pending rotation key
//! - [`DidRecord`] - An identity the caller controls
//! - [`Keypair`] / [`CryptoProvider`] - Key generation and signing
//!
//! ## Verkey Codec
//!
//! A DID is the base58 encoding of the first 16 bytes of its verkey. The
//! codec exploits that relationship to abbreviate verkeys. See [`codec`].

pub mod codec;
pub mod crypto;
pub mod did;
pub mod error;
pub mod record;

pub use codec::{abbreviate, expand, ABBREVIATION_MARKER};
pub use crypto::{verify, CryptoProvider, CryptoType, Ed25519Provider, Keypair, Seed, Signature};
pub use did::{DidValue, Verkey};
pub use error::{CoreError, Result};
pub use record::{
    DidRecord, DidWithMeta, Endpoint, EndpointRecord, EndpointSource, KeyRecord, KeyState,
    PeerRecord,
};
