//! Known seeds with their expected DIDs and verkeys.
//!
//! These are the well-known development identities of Indy-style ledgers,
//! so values produced here can be checked against other implementations.

/// A seed and the identity it must produce.
#[derive(Debug, Clone, Copy)]
pub struct KnownDid {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// 32-character seed.
    pub seed: &'static str,
    /// Expected DID (first 16 verkey bytes, base58).
    pub did: &'static str,
    /// Expected verkey (base58).
    pub verkey: &'static str,
}

pub const STEWARD: KnownDid = KnownDid {
    name: "Steward1",
    seed: "000000000000000000000000Steward1",
    did: "Th7MpTaRZVRYnPiabds81Y",
    verkey: "FYmoFw55GeQH7SRFa37dkx1d2dZ3zUF8ckg7wmL7ofN4",
};

pub const TRUSTEE: KnownDid = KnownDid {
    name: "Trustee1",
    seed: "000000000000000000000000Trustee1",
    did: "V4SGRU86Z58d6TV7PBUe6f",
    verkey: "GJ1SzoWzavQYfNL9XkaJdrQejfztN4XqdsiV4ct3LXKL",
};

/// A peer DID known only by its identifier.
pub const CRYPTONYM_DID: &str = "8wZcEriaNLNKtteJvx7f8i";

/// Get all known vectors.
pub fn all_vectors() -> Vec<KnownDid> {
    vec![STEWARD, TRUSTEE]
}
