//! Private key storage for XAAM agents.
//!
//! Private keys are stored per owner and never leave the owning process.
//! Consumers depend on `Arc<dyn PrivateKeyStore>` and never see where the
//! keys live. `FileKeyStore` keeps one 0600 PEM file per owner;
//! `MemoryKeyStore` serves tests and non-filesystem deployments;
//! `DisabledKeyStore` stands in when no storage is configured.
//!
//! Writes for different owners never contend. Concurrent writes for the same
//! owner race and the last writer wins.

mod config;
mod error;
mod file;
mod memory;

pub use config::{KeyStoreConfig, open_key_store};
pub use error::{KeyStoreError, KeyStoreResult};
pub use file::FileKeyStore;
pub use memory::MemoryKeyStore;

use tracing::error;
use xaam_crypto::PrivateKeyPem;

/// Owner-keyed storage for private keys.
pub trait PrivateKeyStore: Send + Sync {
    /// Stores `private_key` for `owner_id`, replacing any previous key.
    fn store_private_key(
        &self,
        owner_id: &str,
        private_key: &PrivateKeyPem,
    ) -> KeyStoreResult<()>;

    /// Returns the stored key, or `None` if the owner has no key yet.
    fn retrieve_private_key(&self, owner_id: &str) -> KeyStoreResult<Option<PrivateKeyPem>>;

    /// Deletes the owner's key. Returns whether a key existed.
    fn delete_private_key(&self, owner_id: &str) -> KeyStoreResult<bool>;

    /// Whether the backend is reachable.
    fn is_available(&self) -> bool;
}

/// Store used when no backend is configured. Every operation fails with
/// [`KeyStoreError::Unconfigured`] so callers never mistake it for "no key".
pub struct DisabledKeyStore;

impl PrivateKeyStore for DisabledKeyStore {
    fn store_private_key(
        &self,
        owner_id: &str,
        _private_key: &PrivateKeyPem,
    ) -> KeyStoreResult<()> {
        Err(storage_failure(owner_id, KeyStoreError::Unconfigured))
    }

    fn retrieve_private_key(&self, owner_id: &str) -> KeyStoreResult<Option<PrivateKeyPem>> {
        Err(storage_failure(owner_id, KeyStoreError::Unconfigured))
    }

    fn delete_private_key(&self, owner_id: &str) -> KeyStoreResult<bool> {
        Err(storage_failure(owner_id, KeyStoreError::Unconfigured))
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Logs a failed key store operation for `owner_id` and hands the error back.
pub(crate) fn storage_failure(owner_id: &str, err: KeyStoreError) -> KeyStoreError {
    error!(owner = owner_id, error = %err, "private key storage failed");
    err
}

/// Owner ids become file names, so only `[A-Za-z0-9_-]` is allowed.
pub(crate) fn validate_owner(owner_id: &str) -> KeyStoreResult<()> {
    let valid = !owner_id.is_empty()
        && owner_id.len() <= 128
        && owner_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(storage_failure(
            owner_id,
            KeyStoreError::InvalidOwner(owner_id.to_string()),
        ))
    }
}
