//! Proptest generators for property-based testing.

use proptest::prelude::*;

use didvault::DidSpec;
use didvault_core::{DidValue, Keypair, Verkey};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random verkey.
pub fn verkey() -> impl Strategy<Value = Verkey> {
    any::<[u8; 32]>().prop_map(|bytes| Verkey::from_bytes(&bytes))
}

/// Generate a verkey together with the 16-byte DID derived from it.
pub fn verkey_with_did() -> impl Strategy<Value = (DidValue, Verkey)> {
    verkey().prop_map(|verkey| {
        let did = DidValue::from_verkey(&verkey, false, None)
            .expect("a generated verkey always yields a DID");
        (did, verkey)
    })
}

/// Generate a bare 16-byte DID.
pub fn short_did() -> impl Strategy<Value = String> {
    any::<[u8; 16]>().prop_map(|bytes| bs58::encode(bytes).into_string())
}

/// Generate a seed in its 64-character hex form.
pub fn hex_seed() -> impl Strategy<Value = String> {
    any::<[u8; 32]>().prop_map(hex::encode)
}

/// Generate a DID method name.
pub fn method_name() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("sov".to_string())),
        "[a-z][a-z0-9]{0,7}".prop_map(Some),
    ]
}

/// Generate a seeded creation request with random DID derivation options.
pub fn did_spec() -> impl Strategy<Value = DidSpec> {
    (hex_seed(), any::<Option<bool>>(), method_name()).prop_map(|(seed, cid, method_name)| {
        DidSpec {
            seed: Some(seed),
            cid,
            method_name,
            ..DidSpec::default()
        }
    })
}

/// Generate strings that are never valid base58.
pub fn non_base58() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]{0,10}[0OIl][A-Za-z0-9]{0,10}"
}
