//! In-memory private key store.

use crate::error::{KeyStoreError, KeyStoreResult};
use crate::{PrivateKeyStore, storage_failure, validate_owner};
use std::collections::HashMap;
use std::sync::RwLock;
use xaam_crypto::PrivateKeyPem;

/// Process-local key store. Keys are zeroized when removed or dropped.
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<String, PrivateKeyPem>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.keys.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PrivateKeyStore for MemoryKeyStore {
    fn store_private_key(
        &self,
        owner_id: &str,
        private_key: &PrivateKeyPem,
    ) -> KeyStoreResult<()> {
        validate_owner(owner_id)?;
        self.keys
            .write()
            .map_err(|_| storage_failure(owner_id, KeyStoreError::Poisoned))?
            .insert(owner_id.to_string(), private_key.clone());
        Ok(())
    }

    fn retrieve_private_key(&self, owner_id: &str) -> KeyStoreResult<Option<PrivateKeyPem>> {
        validate_owner(owner_id)?;
        Ok(self
            .keys
            .read()
            .map_err(|_| storage_failure(owner_id, KeyStoreError::Poisoned))?
            .get(owner_id)
            .cloned())
    }

    fn delete_private_key(&self, owner_id: &str) -> KeyStoreResult<bool> {
        validate_owner(owner_id)?;
        Ok(self
            .keys
            .write()
            .map_err(|_| storage_failure(owner_id, KeyStoreError::Poisoned))?
            .remove(owner_id)
            .is_some())
    }

    fn is_available(&self) -> bool {
        !self.keys.is_poisoned()
    }
}
