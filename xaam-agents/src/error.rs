//! Agent and key management error types.

use crate::agent::AgentId;
use thiserror::Error;
use xaam_crypto::CryptoError;
use xaam_keystore::KeyStoreError;

/// Result type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent not found: {0}")]
    NotFound(AgentId),

    #[error("agent already exists: {0}")]
    AlreadyExists(AgentId),

    #[error("agent {0} has no public key")]
    MissingPublicKey(AgentId),

    #[error("agent {0} has no stored private key")]
    MissingPrivateKey(AgentId),

    #[error("agent {0} is not a recipient of this payload")]
    NotARecipient(AgentId),

    #[error("agent {0} is not a judge")]
    NotAJudge(AgentId),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("key storage error: {0}")]
    KeyStore(#[from] KeyStoreError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
