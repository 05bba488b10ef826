//! Error types for ledger clients.

use std::time::Duration;

use thiserror::Error;

/// Errors a ledger lookup can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger could not be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// A single attempt exceeded its deadline.
    #[error("ledger request timed out after {0:?}")]
    Timeout(Duration),

    /// The ledger answered with data that does not decode.
    #[error("malformed ledger reply: {0}")]
    Malformed(String),
}

impl LedgerError {
    /// Whether retrying the request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Unavailable(_) | LedgerError::Timeout(_))
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
