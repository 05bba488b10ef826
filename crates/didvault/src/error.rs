//! Error types for the manager.

use didvault_core::CoreError;
use didvault_ledger::LedgerError;
use didvault_store::StoreError;
use thiserror::Error;

/// Errors that can occur during manager operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Malformed DID, verkey or other encoded input.
    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    /// The requested record is absent.
    #[error("{kind} not found: {did}")]
    DoesNotExist { kind: &'static str, did: String },

    /// Key generation or signing failed (bad seed, unsupported crypto type).
    #[error("crypto error while {context}: {source}")]
    Crypto {
        context: String,
        #[source]
        source: CoreError,
    },

    /// The secure store failed.
    #[error("storage error while {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: StoreError,
    },

    /// The ledger could not be reached and nothing was cached.
    #[error("cannot resolve {did}: {reason}")]
    ResolutionUnavailable {
        did: String,
        #[source]
        reason: LedgerError,
    },

    /// The DID is already owned with a different key.
    #[error("DID already exists: {0}")]
    AlreadyExists(String),

    /// The dispatcher stopped accepting work.
    #[error("worker pool closed")]
    WorkerPoolClosed,

    /// A dispatched request was dropped before it completed.
    #[error("request cancelled before completion")]
    Cancelled,
}

impl VaultError {
    pub(crate) fn not_found(kind: &'static str, did: impl ToString) -> Self {
        VaultError::DoesNotExist {
            kind,
            did: did.to_string(),
        }
    }
}

impl From<CoreError> for VaultError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidStructure(msg) => VaultError::InvalidStructure(msg),
            source => VaultError::Crypto {
                context: "validating input".to_string(),
                source,
            },
        }
    }
}

/// Attach operation context to collaborator failures.
pub(crate) trait ErrorContext<T> {
    fn context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T> ErrorContext<T> for std::result::Result<T, StoreError> {
    fn context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|source| VaultError::Storage {
            context: f(),
            source,
        })
    }
}

impl<T> ErrorContext<T> for std::result::Result<T, CoreError> {
    fn context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|source| match source {
            CoreError::InvalidStructure(msg) => {
                VaultError::InvalidStructure(format!("{}: {}", f(), msg))
            }
            source => VaultError::Crypto {
                context: f(),
                source,
            },
        })
    }
}

/// Result type for manager operations.
pub type Result<T> = std::result::Result<T, VaultError>;
