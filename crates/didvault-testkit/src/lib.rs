//! # didvault Testkit
//!
//! Testing utilities for didvault.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Known vectors**: seeds with their expected DIDs and verkeys
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Ready-made vaults over memory or SQLite storage, and a
//!   store that fails on demand
//!
//! ## Known Vectors
//!
//! ```rust
//! use didvault_testkit::vectors::all_vectors;
//! use didvault_core::{Keypair, Seed};
//!
//! for vector in all_vectors() {
//!     let seed = Seed::parse(vector.seed).unwrap();
//!     let keypair = Keypair::from_seed(seed.as_bytes());
//!     assert_eq!(keypair.verkey().as_str(), vector.verkey);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use didvault_testkit::generators::verkey_with_did;
//!
//! proptest! {
//!     #[test]
//!     fn abbreviation_round_trips((did, verkey) in verkey_with_did()) {
//!         let abbr = didvault_core::abbreviate(did.as_str(), verkey.as_str()).unwrap();
//!         prop_assert_eq!(didvault_core::expand(did.as_str(), &abbr).unwrap(), verkey.as_str());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use didvault_testkit::fixtures::TestVault;
//!
//! async fn example() {
//!     let vault = TestVault::new();
//!     let (did, verkey) = vault.steward().await;
//!     assert_eq!(vault.manager.key_for_local_did(did.as_str()).await.unwrap(), verkey.as_str());
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{init_tracing, FaultyStore, TestVault};
pub use vectors::{all_vectors, KnownDid, STEWARD, TRUSTEE};
