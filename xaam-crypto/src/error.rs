//! Error types for envelope encryption.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Broad classification of a [`CryptoError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something invalid (no recipients, bad key).
    Input,
    /// The supplied data does not decrypt: wrong key, tampering or corruption.
    Integrity,
    /// Failure inside the crypto stack itself.
    Internal,
}

/// Errors that can occur during key generation, encryption and decryption.
///
/// Messages never contain key material or plaintext.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("no recipients given; the ciphertext would be unrecoverable")]
    NoRecipients,

    #[error("invalid key for {recipient}: {reason}")]
    InvalidKey { recipient: String, reason: String },

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("private key does not match the wrapped key")]
    KeyMismatch,

    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("encryption failed: {0}")]
    Encryption(String),
}

impl CryptoError {
    /// Returns whether this is a caller error, an integrity error or an
    /// internal failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoRecipients | Self::InvalidKey { .. } | Self::Serialization(_) => {
                ErrorKind::Input
            }
            Self::KeyMismatch
            | Self::CorruptPayload(_)
            | Self::MalformedEnvelope(_)
            | Self::Deserialization(_) => ErrorKind::Integrity,
            Self::KeyGeneration(_) | Self::Encryption(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid_key(recipient: &str, reason: impl ToString) -> Self {
        Self::InvalidKey {
            recipient: recipient.to_string(),
            reason: reason.to_string(),
        }
    }
}
