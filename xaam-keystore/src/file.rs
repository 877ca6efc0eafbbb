//! Filesystem-backed private key store.
//!
//! Layout: `<dir>/<owner_id>_private.pem`, mode 0600, directory mode 0700.
//! Writes go to a temp file in the same directory and are renamed over the
//! target, so readers never observe a partially written key.

use crate::error::{KeyStoreError, KeyStoreResult};
use crate::{PrivateKeyStore, validate_owner};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error};
use xaam_crypto::PrivateKeyPem;

const KEY_FILE_SUFFIX: &str = "_private.pem";

/// Key store keeping one PEM file per owner in a single directory.
pub struct FileKeyStore {
    dir: PathBuf,
}

impl FileKeyStore {
    /// Opens (and creates if needed) a key directory.
    pub fn open(dir: impl Into<PathBuf>) -> KeyStoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_failure("create key directory", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o700))
                .map_err(|e| io_failure("restrict key directory", e))?;
        }

        debug!(dir = %dir.display(), "opened file key store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, owner_id: &str) -> KeyStoreResult<PathBuf> {
        validate_owner(owner_id)?;
        Ok(self.dir.join(format!("{owner_id}{KEY_FILE_SUFFIX}")))
    }
}

impl PrivateKeyStore for FileKeyStore {
    fn store_private_key(
        &self,
        owner_id: &str,
        private_key: &PrivateKeyPem,
    ) -> KeyStoreResult<()> {
        let path = self.key_path(owner_id)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| io_failure(&format!("create temp key file for {owner_id}"), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))
                .map_err(|e| io_failure(&format!("restrict key file for {owner_id}"), e))?;
        }

        tmp.write_all(private_key.as_str().as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| io_failure(&format!("write key for {owner_id}"), e))?;

        tmp.persist(&path)
            .map_err(|e| io_failure(&format!("persist key for {owner_id}"), e.error))?;

        debug!(owner = owner_id, "stored private key");
        Ok(())
    }

    fn retrieve_private_key(&self, owner_id: &str) -> KeyStoreResult<Option<PrivateKeyPem>> {
        let path = self.key_path(owner_id)?;
        // A vanished directory is an unreachable backend, not a missing key.
        if !self.dir.is_dir() {
            return Err(io_failure(
                &format!("read key for {owner_id}"),
                io::Error::new(io::ErrorKind::NotFound, "key directory is missing"),
            ));
        }
        match fs::read_to_string(&path) {
            Ok(pem) => Ok(Some(PrivateKeyPem::new(pem))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_failure(&format!("read key for {owner_id}"), e)),
        }
    }

    fn delete_private_key(&self, owner_id: &str) -> KeyStoreResult<bool> {
        let path = self.key_path(owner_id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(owner = owner_id, "deleted private key");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_failure(&format!("delete key for {owner_id}"), e)),
        }
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

fn io_failure(context: &str, source: io::Error) -> KeyStoreError {
    error!(context, error = %source, "key storage I/O failed");
    KeyStoreError::Io {
        context: context.to_string(),
        source,
    }
}
