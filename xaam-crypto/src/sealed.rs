//! Single-recipient hybrid encryption of raw bytes.
//!
//! Same scheme as [`crate::envelope`] with exactly one wrapped key, embedded
//! in the returned blob. The blob is base64 text of a JSON object holding
//! `iv`, `encrypted_key` and `encrypted_data`.

use crate::cipher::{self, CipherSuite, SymmetricKey};
use crate::encoding;
use crate::envelope::{self, EncryptedEnvelope, WrappedKey};
use crate::error::{CryptoError, CryptoResult};
use crate::keypair::{PrivateKeyPem, PublicKeyPem};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct SealedBlob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cipher: Option<CipherSuite>,
    iv: String,
    encrypted_key: String,
    encrypted_data: String,
}

/// Encrypts arbitrary bytes for the holder of `public_key`.
pub fn encrypt_with_public_key(
    suite: CipherSuite,
    public_key: &PublicKeyPem,
    data: &[u8],
) -> CryptoResult<Vec<u8>> {
    let public = public_key
        .decode()
        .map_err(|reason| CryptoError::invalid_key("public key", reason))?;

    let key = SymmetricKey::generate();
    let (iv, ciphertext) = cipher::seal(suite, &key, data)?;
    let wrapped = envelope::wrap_key(&public, &key)
        .map_err(|reason| CryptoError::invalid_key("public key", reason))?;

    let blob = SealedBlob {
        cipher: (suite != CipherSuite::Aes256Cbc).then_some(suite),
        iv: encoding::encode(&iv),
        encrypted_key: wrapped.to_base64(),
        encrypted_data: encoding::encode(&ciphertext),
    };
    let json = serde_json::to_vec(&blob).map_err(|e| CryptoError::Serialization(e.to_string()))?;

    debug!(cipher = %suite, bytes = data.len(), "sealed blob for single recipient");
    Ok(encoding::encode(json).into_bytes())
}

/// Decrypts a blob produced by [`encrypt_with_public_key`].
pub fn decrypt_with_private_key(private_key: &PrivateKeyPem, blob: &[u8]) -> CryptoResult<Vec<u8>> {
    let private = private_key
        .decode()
        .map_err(|reason| CryptoError::invalid_key("private key", reason))?;

    let text = std::str::from_utf8(blob)
        .map_err(|_| CryptoError::MalformedEnvelope("sealed blob is not base64 text".into()))?;
    let json = encoding::decode(text, "sealed blob")?;
    let parsed: SealedBlob = serde_json::from_slice(&json).map_err(|e| {
        CryptoError::MalformedEnvelope(format!("sealed blob is not valid JSON: {e}"))
    })?;

    let envelope = EncryptedEnvelope {
        cipher: parsed.cipher.unwrap_or(CipherSuite::Aes256Cbc),
        iv: encoding::decode(&parsed.iv, "iv")?,
        ciphertext: encoding::decode(&parsed.encrypted_data, "encrypted_data")?,
    };
    let wrapped = WrappedKey::from_base64(&parsed.encrypted_key)?;

    envelope::open_envelope(&envelope, &wrapped, &private)
        .map(|plaintext| plaintext.to_vec())
        .map_err(envelope::audit)
}
