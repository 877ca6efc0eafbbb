//! Symmetric bulk encryption under a per-call random key.
//!
//! Two suites are supported:
//!
//! - `Aes256Gcm`: AES-256 in Galois/Counter Mode (12-byte nonce, 16-byte tag).
//!   Authenticated; any modification of the ciphertext is rejected.
//! - `Aes256Cbc`: AES-256-CBC with PKCS#7 padding (16-byte IV). This is the
//!   format of older XAAM task records. It has no integrity tag, so
//!   tampering is only caught when it breaks the padding or the payload
//!   framing.

use crate::error::{CryptoError, CryptoResult};
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Size of the per-encryption symmetric key (256 bits).
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// AES block size, also the CBC IV size.
pub const AES_BLOCK_SIZE: usize = 16;

/// AES-GCM nonce size.
pub const GCM_NONCE_SIZE: usize = 12;

/// Symmetric cipher used for the bulk payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherSuite {
    /// AES-256-CBC + PKCS#7, unauthenticated.
    Aes256Cbc,
    /// AES-256-GCM, authenticated.
    #[default]
    Aes256Gcm,
}

impl CipherSuite {
    /// Length of the IV/nonce this suite expects.
    pub fn iv_len(self) -> usize {
        match self {
            Self::Aes256Cbc => AES_BLOCK_SIZE,
            Self::Aes256Gcm => GCM_NONCE_SIZE,
        }
    }

    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Aes256Gcm)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aes256Cbc => "aes256cbc",
            Self::Aes256Gcm => "aes256gcm",
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CipherSuite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aes256cbc" | "aes-256-cbc" | "cbc" => Ok(Self::Aes256Cbc),
            "aes256gcm" | "aes-256-gcm" | "gcm" => Ok(Self::Aes256Gcm),
            other => Err(format!("unknown cipher suite: {other}")),
        }
    }
}

/// Random 256-bit key used for exactly one encryption. Zeroized on drop.
pub(crate) struct SymmetricKey(Zeroizing<[u8; SYMMETRIC_KEY_SIZE]>);

impl SymmetricKey {
    pub(crate) fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; SYMMETRIC_KEY_SIZE]);
        OsRng.fill_bytes(&mut key[..]);
        Self(key)
    }

    /// Rebuilds a key from unwrapped bytes; `None` on a length mismatch.
    pub(crate) fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != SYMMETRIC_KEY_SIZE {
            return None;
        }
        let mut key = Zeroizing::new([0u8; SYMMETRIC_KEY_SIZE]);
        key.copy_from_slice(bytes);
        Some(Self(key))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

/// Encrypts `plaintext` under `key` with a fresh IV. Returns `(iv, ciphertext)`.
pub(crate) fn seal(
    suite: CipherSuite,
    key: &SymmetricKey,
    plaintext: &[u8],
) -> CryptoResult<(Vec<u8>, Vec<u8>)> {
    let mut iv = vec![0u8; suite.iv_len()];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = match suite {
        CipherSuite::Aes256Cbc => Aes256CbcEnc::new_from_slices(key.as_bytes(), &iv)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        CipherSuite::Aes256Gcm => Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?
            .encrypt(Nonce::from_slice(&iv), plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?,
    };

    Ok((iv, ciphertext))
}

/// Decrypts a `(iv, ciphertext)` pair produced by [`seal`].
pub(crate) fn open(
    suite: CipherSuite,
    key: &SymmetricKey,
    iv: &[u8],
    ciphertext: &[u8],
) -> CryptoResult<Vec<u8>> {
    if iv.len() != suite.iv_len() {
        return Err(CryptoError::MalformedEnvelope(format!(
            "{suite} expects a {}-byte IV, got {}",
            suite.iv_len(),
            iv.len()
        )));
    }

    match suite {
        CipherSuite::Aes256Cbc => {
            if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_SIZE != 0 {
                return Err(CryptoError::CorruptPayload(format!(
                    "ciphertext length {} is not a positive multiple of the block size",
                    ciphertext.len()
                )));
            }
            Aes256CbcDec::new_from_slices(key.as_bytes(), iv)
                .map_err(|e| CryptoError::Encryption(e.to_string()))?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| CryptoError::CorruptPayload("invalid padding".to_string()))
        }
        CipherSuite::Aes256Gcm => Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| {
                CryptoError::CorruptPayload("authentication tag mismatch".to_string())
            }),
    }
}
