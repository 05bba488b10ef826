//! # didvault
//!
//! Manages decentralized identifiers and their key material for an
//! identity owner. Owned records live in a secure store; peers' keys and
//! endpoints are resolved against a ledger with local caching.
//!
//! ## Overview
//!
//! - **Identity registry**: create owned DIDs from seeded or random keys,
//!   attach metadata, list them
//! - **Key rotation**: stage a new key, then promote it; the DID never changes
//! - **Peer store**: remember other parties' DIDs and verkeys
//! - **Resolution**: owned records are authoritative, cached peer data is
//!   refreshed from the ledger when stale and served stale when the ledger
//!   is down
//! - **Endpoints**: transport addresses per DID, resolved the same way
//!
//! ## Usage
//!
//! ```rust,no_run
//! use didvault::{DidManager, DidSpec, KeySpec, ManagerConfig};
//! use didvault::ledger::memory::MemoryLedger;
//! use didvault::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("vault.db").unwrap();
//!     let manager = DidManager::new(store, MemoryLedger::new(), ManagerConfig::default());
//!
//!     let (did, _verkey) = manager
//!         .create_and_store_my_did(&DidSpec::from_seed("000000000000000000000000Steward1"))
//!         .await
//!         .unwrap();
//!
//!     let pending = manager
//!         .replace_keys_start(did.as_str(), &KeySpec::default())
//!         .await
//!         .unwrap();
//!     manager.replace_keys_apply(did.as_str()).await.unwrap();
//!     assert_eq!(manager.key_for_local_did(did.as_str()).await.unwrap(), pending.as_str());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `didvault::core` - DIDs, verkeys, the verkey codec, records
//! - `didvault::store` - Storage abstraction, SQLite and encryption
//! - `didvault::ledger` - Ledger client abstraction

pub mod config;
pub mod dispatch;
pub mod endpoints;
pub mod error;
pub mod locks;
pub mod manager;
pub mod peers;
pub mod registry;
pub mod resolver;
pub mod rotation;

// Re-export component crates
pub use didvault_core as core;
pub use didvault_ledger as ledger;
pub use didvault_store as store;

// Re-export main types for convenience
pub use config::{DidCollisionPolicy, FreshnessPolicy, ManagerConfig};
pub use dispatch::{Command, Completion, Dispatcher, Reply};
pub use error::{Result, VaultError};
pub use locks::{DidGuard, DidLocks};
pub use manager::DidManager;
pub use peers::PeerIdentity;
pub use registry::DidSpec;
pub use resolver::{Cached, CachedResolver, EndpointLookup, KeyLookup, ResolveKind};
pub use rotation::KeySpec;

pub use didvault_core::{DidValue, DidWithMeta, Endpoint, Signature, Verkey};
