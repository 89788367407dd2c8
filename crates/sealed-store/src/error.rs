//! Error types for sealed-store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store error types
///
/// A key that is not present is never an error; reads report it as `None`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The underlying raw store rejected the operation (quota, host API unavailable, I/O)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Encryption or decryption failed (bad key, tampered or corrupted ciphertext)
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("Index {index} out of range for store of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this error came from the cipher rather than the store or marshaling
    pub fn is_crypto(&self) -> bool {
        matches!(self, StoreError::Crypto(_))
    }
}
