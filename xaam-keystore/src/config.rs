//! Key storage configuration.

use crate::error::KeyStoreResult;
use crate::{DisabledKeyStore, FileKeyStore, PrivateKeyStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Where private keys live.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStoreConfig {
    /// Directory for per-owner key files. `None` disables key storage.
    pub key_storage_dir: Option<PathBuf>,
}

impl KeyStoreConfig {
    /// Environment variable naming the key directory.
    pub const ENV_VAR: &'static str = "KEY_STORAGE_DIR";

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            key_storage_dir: Some(dir.into()),
        }
    }

    /// Reads `KEY_STORAGE_DIR`; unset or empty leaves storage disabled.
    pub fn from_env() -> Self {
        let key_storage_dir = std::env::var_os(Self::ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self { key_storage_dir }
    }
}

/// Builds the store described by `config`.
pub fn open_key_store(config: &KeyStoreConfig) -> KeyStoreResult<Arc<dyn PrivateKeyStore>> {
    match &config.key_storage_dir {
        Some(dir) => Ok(Arc::new(FileKeyStore::open(dir)?)),
        None => {
            warn!("no key storage directory configured; private keys cannot be persisted");
            Ok(Arc::new(DisabledKeyStore))
        }
    }
}
