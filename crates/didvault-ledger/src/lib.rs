//! # didvault Ledger
//!
//! The ledger is the public source of truth for identities the vault does
//! not own. This crate defines the [`Ledger`] client trait the resolver
//! queries, plus two implementations:
//!
//! - [`memory::MemoryLedger`] - an in-process ledger with outage simulation
//! - [`RetryingLedger`] - wraps any client with per-attempt timeouts and
//!   exponential backoff
//!
//! Consensus and wire protocols are out of scope; a network client is just
//! another [`Ledger`] implementation.

pub mod error;
pub mod ledger;
pub mod retry;

pub use error::{LedgerError, Result};
pub use ledger::{memory, Ledger, LedgerEntry};
pub use retry::{RetryConfig, RetryingLedger};
