//! RSA key pairs for per-agent key wrapping.
//!
//! Public keys travel as SubjectPublicKeyInfo PEM and live in the shared
//! agent record. Private keys are PKCS#8 PEM and only ever reach the
//! owner's key store. PKCS#1 PEM is accepted on input so keys exported by
//! older tooling keep working.

use crate::error::{CryptoError, CryptoResult};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Default RSA modulus size in bits.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Smallest modulus `generate_key_pair` will produce.
pub const MIN_KEY_BITS: usize = 2048;

/// PEM-encoded RSA public key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKeyPem(String);

impl PublicKeyPem {
    pub fn new(pem: impl Into<String>) -> Self {
        Self(pem.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks that the PEM decodes to an RSA public key.
    pub fn validate(&self) -> CryptoResult<()> {
        self.decode().map(|_| ()).map_err(|reason| CryptoError::invalid_key("public key", reason))
    }

    /// Modulus size of the key in bits.
    pub fn bits(&self) -> CryptoResult<usize> {
        self.decode()
            .map(|key| key.size() * 8)
            .map_err(|reason| CryptoError::invalid_key("public key", reason))
    }

    pub(crate) fn decode(&self) -> Result<RsaPublicKey, String> {
        let pem = self.0.trim();
        RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|_| "not a PEM-encoded RSA public key".to_string())
    }
}

impl fmt::Display for PublicKeyPem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// PEM-encoded RSA private key. Zeroized on drop, redacted in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKeyPem(Zeroizing<String>);

impl PrivateKeyPem {
    pub fn new(pem: impl Into<String>) -> Self {
        Self(Zeroizing::new(pem.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the matching public key.
    pub fn public_key(&self) -> CryptoResult<PublicKeyPem> {
        let private = self
            .decode()
            .map_err(|reason| CryptoError::invalid_key("private key", reason))?;
        encode_public(&private.to_public_key())
    }

    pub(crate) fn decode(&self) -> Result<RsaPrivateKey, String> {
        let pem = self.0.trim();
        RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|_| "not a PEM-encoded RSA private key".to_string())
    }
}

impl fmt::Debug for PrivateKeyPem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyPem(<redacted>)")
    }
}

/// A public/private key pair, always generated together.
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub public_key: PublicKeyPem,
    pub private_key: PrivateKeyPem,
}

impl KeyPair {
    pub fn into_parts(self) -> (PublicKeyPem, PrivateKeyPem) {
        (self.public_key, self.private_key)
    }
}

/// Generates a fresh RSA key pair with a `bits`-bit modulus.
pub fn generate_key_pair(bits: usize) -> CryptoResult<KeyPair> {
    if bits < MIN_KEY_BITS {
        return Err(CryptoError::KeyGeneration(format!(
            "{bits}-bit modulus is below the {MIN_KEY_BITS}-bit minimum"
        )));
    }

    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| CryptoError::KeyGeneration(format!("PKCS#8 encoding failed: {e}")))?;
    let public_key = encode_public(&private.to_public_key())?;

    Ok(KeyPair {
        public_key,
        private_key: PrivateKeyPem(Zeroizing::new(private_pem.to_string())),
    })
}

fn encode_public(key: &RsaPublicKey) -> CryptoResult<PublicKeyPem> {
    key.to_public_key_pem(LineEnding::LF)
        .map(PublicKeyPem)
        .map_err(|e| CryptoError::KeyGeneration(format!("SPKI encoding failed: {e}")))
}
