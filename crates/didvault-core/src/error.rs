//! Error types for didvault core.

use thiserror::Error;

/// Errors raised by identifier parsing, the verkey codec and key handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Malformed encoding: bad base58, wrong decoded length, bad DID shape.
    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    #[error("unsupported crypto type: {0}")]
    UnsupportedCryptoType(String),

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,
}

impl CoreError {
    /// True for errors caused by malformed encodings rather than key material.
    pub fn is_structural(&self) -> bool {
        matches!(self, CoreError::InvalidStructure(_))
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
