//! # didvault Store
//!
//! Storage abstraction for didvault. Records are opaque byte values keyed by
//! a [`RecordKind`] and a string key; typed access goes through
//! [`StoreExt`], which encodes records as CBOR.
//!
//! ## Key Types
//!
//! - [`SecureStore`] - The async trait every backend implements
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`EncryptedStore`] - Seals values of any inner store with ChaCha20-Poly1305
//!
//! ## Usage
//!
//! ```rust,no_run
//! use didvault_store::{EncryptedStore, RecordKind, SecureStore, SqliteStore, StoreKey};
//!
//! async fn example() {
//!     let store = SqliteStore::open("vault.db").unwrap();
//!     let store = EncryptedStore::new(store, &StoreKey::derive("correct horse"));
//!
//!     store.put(RecordKind::Did, "Th7MpTaRZVRYnPiabds81Y", b"...").await.unwrap();
//!     let value = store.get(RecordKind::Did, "Th7MpTaRZVRYnPiabds81Y").await.unwrap();
//!     assert!(value.is_some());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Upserts**: `put` overwrites; there is exactly one value per (kind, key).
//! - **No deletes**: records are never removed.

pub mod encrypted;
pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use encrypted::{EncryptedStore, StoreKey};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{RecordKind, SecureStore, StoreExt};
