//! Configured entry point for key generation and envelope encryption.
//!
//! Construct one `EnvelopeEngine` at startup and hand clones to whatever
//! needs it. The engine holds configuration only; every call is independent
//! and safe to run concurrently.

use crate::cipher::CipherSuite;
use crate::envelope::{self, EncryptedEnvelope, RecipientKeys, SealedPayload, WrappedKey};
use crate::error::CryptoResult;
use crate::keypair::{self, DEFAULT_KEY_BITS, KeyPair, PrivateKeyPem, PublicKeyPem};
use crate::sealed;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cipher used for new encryptions. Decryption follows the envelope.
    pub cipher: CipherSuite,

    /// RSA modulus size for generated key pairs.
    pub key_bits: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cipher: CipherSuite::Aes256Gcm,
            key_bits: DEFAULT_KEY_BITS,
        }
    }
}

/// Key generation and envelope encryption under one [`EngineConfig`].
#[derive(Clone, Debug, Default)]
pub struct EnvelopeEngine {
    config: EngineConfig,
}

impl EnvelopeEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generates a key pair with the configured modulus size.
    pub fn generate_key_pair(&self) -> CryptoResult<KeyPair> {
        keypair::generate_key_pair(self.config.key_bits)
    }

    pub fn encrypt_for_recipients<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        recipients: &RecipientKeys,
    ) -> CryptoResult<SealedPayload> {
        envelope::encrypt_for_recipients(self.config.cipher, payload, recipients)
    }

    pub fn decrypt_for_recipient<T: DeserializeOwned>(
        &self,
        envelope: &EncryptedEnvelope,
        wrapped_key: &WrappedKey,
        private_key: &PrivateKeyPem,
    ) -> CryptoResult<T> {
        envelope::decrypt_for_recipient(envelope, wrapped_key, private_key)
    }

    pub fn encrypt_with_public_key(
        &self,
        public_key: &PublicKeyPem,
        data: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        sealed::encrypt_with_public_key(self.config.cipher, public_key, data)
    }

    pub fn decrypt_with_private_key(
        &self,
        private_key: &PrivateKeyPem,
        blob: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        sealed::decrypt_with_private_key(private_key, blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_authenticated_cipher() {
        let config = EngineConfig::default();
        assert_eq!(config.cipher, CipherSuite::Aes256Gcm);
        assert_eq!(config.key_bits, 2048);
    }

    #[test]
    fn config_fills_missing_fields() {
        let config: EngineConfig = serde_json::from_str(r#"{"cipher":"aes256cbc"}"#).unwrap();
        assert_eq!(config.cipher, CipherSuite::Aes256Cbc);
        assert_eq!(config.key_bits, DEFAULT_KEY_BITS);
    }
}
