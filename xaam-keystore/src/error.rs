//! Key storage error types.

use thiserror::Error;

/// Result type for key storage operations.
pub type KeyStoreResult<T> = Result<T, KeyStoreError>;

/// Errors from a private key store.
///
/// A missing key is not an error: lookups return `Ok(None)`. Everything here
/// means the backend could not answer.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("key storage is not configured")]
    Unconfigured,

    #[error("invalid owner id: {0:?}")]
    InvalidOwner(String),

    #[error("key storage I/O failed ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("key storage lock poisoned")]
    Poisoned,
}
