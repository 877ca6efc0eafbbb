//! Multi-recipient envelope encryption for task payloads and deliverables.
//!
//! A payload is serialized to JSON and encrypted once under a fresh random
//! 256-bit key. That key is then wrapped separately for every recipient with
//! RSA-OAEP (SHA-256), so each judge can recover the payload with nothing but
//! the shared envelope, their own wrapped key and their own private key.
//!
//! The recipient set is closed at encryption time: [`WrappedKeyMap`] has no
//! insertion API. Adding or revoking a recipient means encrypting again.

use crate::cipher::{self, CipherSuite, SymmetricKey};
use crate::encoding::{self, base64_bytes};
use crate::error::{CryptoError, CryptoResult};
use crate::keypair::{PrivateKeyPem, PublicKeyPem};
use rand::rngs::OsRng;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Recipient id -> PEM public key, as resolved from the agent directory.
pub type RecipientKeys = BTreeMap<String, PublicKeyPem>;

/// Symmetric ciphertext of one payload plus the IV it was produced with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// Records written before the cipher tag existed are CBC.
    #[serde(default = "legacy_cipher")]
    pub cipher: CipherSuite,
    #[serde(with = "base64_bytes")]
    pub iv: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
}

fn legacy_cipher() -> CipherSuite {
    CipherSuite::Aes256Cbc
}

/// Layout of the encoded "payload URL" string kept on task and
/// deliverable records.
#[derive(Deserialize)]
struct StoredEnvelope {
    #[serde(default)]
    cipher: Option<CipherSuite>,
    iv: String,
    encrypted_data: String,
}

impl EncryptedEnvelope {
    /// Encodes the envelope as the base64 JSON package stored on records.
    ///
    /// CBC envelopes produce exactly the package layout older records use.
    pub fn to_encoded(&self) -> String {
        let mut stored = serde_json::Map::new();
        if self.cipher != CipherSuite::Aes256Cbc {
            stored.insert("cipher".into(), self.cipher.as_str().into());
        }
        stored.insert("iv".into(), encoding::encode(&self.iv).into());
        stored.insert("encrypted_data".into(), encoding::encode(&self.ciphertext).into());
        encoding::encode(serde_json::Value::Object(stored).to_string())
    }

    /// Parses an envelope previously produced by [`to_encoded`](Self::to_encoded).
    pub fn from_encoded(encoded: &str) -> CryptoResult<Self> {
        let json = encoding::decode(encoded, "envelope package")?;
        let stored: StoredEnvelope = serde_json::from_slice(&json).map_err(|e| {
            CryptoError::MalformedEnvelope(format!("envelope package is not valid JSON: {e}"))
        })?;

        Ok(Self {
            cipher: stored.cipher.unwrap_or(CipherSuite::Aes256Cbc),
            iv: encoding::decode(&stored.iv, "iv")?,
            ciphertext: encoding::decode(&stored.encrypted_data, "encrypted_data")?,
        })
    }
}

/// A symmetric key encrypted under one recipient's public key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrappedKey(#[serde(with = "base64_bytes")] Vec<u8>);

impl WrappedKey {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_base64(text: &str) -> CryptoResult<Self> {
        encoding::decode(text, "wrapped key").map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        encoding::encode(&self.0)
    }
}

impl fmt::Debug for WrappedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WrappedKey({} bytes)", self.0.len())
    }
}

/// Recipient id -> wrapped key, fixed at encryption time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrappedKeyMap(BTreeMap<String, WrappedKey>);

impl WrappedKeyMap {
    pub fn get(&self, recipient_id: &str) -> Option<&WrappedKey> {
        self.0.get(recipient_id)
    }

    pub fn contains(&self, recipient_id: &str) -> bool {
        self.0.contains_key(recipient_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recipient ids in sorted order.
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WrappedKey)> {
        self.0.iter().map(|(id, key)| (id.as_str(), key))
    }
}

/// Output of [`encrypt_for_recipients`]: one envelope, one wrapped key per recipient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPayload {
    pub envelope: EncryptedEnvelope,
    pub wrapped_keys: WrappedKeyMap,
}

/// Encrypts `payload` once and wraps the key for every recipient.
///
/// All public keys are validated and every wrap must succeed before a result
/// is returned; a single bad key fails the whole call.
pub fn encrypt_for_recipients<T: Serialize + ?Sized>(
    suite: CipherSuite,
    payload: &T,
    recipients: &RecipientKeys,
) -> CryptoResult<SealedPayload> {
    if recipients.is_empty() {
        return Err(CryptoError::NoRecipients);
    }

    let public_keys = recipients
        .iter()
        .map(|(id, pem)| {
            pem.decode()
                .map(|key| (id, key))
                .map_err(|reason| CryptoError::invalid_key(id, reason))
        })
        .collect::<CryptoResult<Vec<_>>>()?;

    let plaintext = Zeroizing::new(
        serde_json::to_vec(payload).map_err(|e| CryptoError::Serialization(e.to_string()))?,
    );

    let key = SymmetricKey::generate();
    let (iv, ciphertext) = cipher::seal(suite, &key, &plaintext)?;

    let mut wrapped = BTreeMap::new();
    for (id, public_key) in public_keys {
        let wrapped_key =
            wrap_key(&public_key, &key).map_err(|reason| CryptoError::invalid_key(id, reason))?;
        wrapped.insert(id.clone(), wrapped_key);
    }

    debug!(
        recipients = wrapped.len(),
        cipher = %suite,
        bytes = ciphertext.len(),
        "encrypted payload for recipients"
    );

    Ok(SealedPayload {
        envelope: EncryptedEnvelope {
            cipher: suite,
            iv,
            ciphertext,
        },
        wrapped_keys: WrappedKeyMap(wrapped),
    })
}

/// Recovers the payload of `envelope` for the holder of `private_key`.
pub fn decrypt_for_recipient<T: DeserializeOwned>(
    envelope: &EncryptedEnvelope,
    wrapped_key: &WrappedKey,
    private_key: &PrivateKeyPem,
) -> CryptoResult<T> {
    let private = private_key
        .decode()
        .map_err(|reason| CryptoError::invalid_key("private key", reason))?;

    let plaintext = open_envelope(envelope, wrapped_key, &private).map_err(audit)?;

    serde_json::from_slice(&plaintext).map_err(|e| {
        audit(CryptoError::Deserialization(format!(
            "{:?} error at line {}, column {}",
            e.classify(),
            e.line(),
            e.column()
        )))
    })
}

/// Unwraps the symmetric key and decrypts the envelope to raw bytes.
pub(crate) fn open_envelope(
    envelope: &EncryptedEnvelope,
    wrapped_key: &WrappedKey,
    private_key: &RsaPrivateKey,
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let key = unwrap_key(private_key, wrapped_key)?;
    cipher::open(envelope.cipher, &key, &envelope.iv, &envelope.ciphertext).map(Zeroizing::new)
}

pub(crate) fn wrap_key(public_key: &RsaPublicKey, key: &SymmetricKey) -> Result<WrappedKey, String> {
    public_key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), key.as_bytes())
        .map(WrappedKey)
        .map_err(|e| format!("OAEP wrap failed: {e}"))
}

pub(crate) fn unwrap_key(
    private_key: &RsaPrivateKey,
    wrapped_key: &WrappedKey,
) -> CryptoResult<SymmetricKey> {
    let bytes = private_key
        .decrypt(Oaep::new::<Sha256>(), wrapped_key.as_bytes())
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::KeyMismatch)?;
    SymmetricKey::from_slice(&bytes).ok_or(CryptoError::KeyMismatch)
}

/// Integrity failures may indicate tampering; leave a trace without details.
pub(crate) fn audit(err: CryptoError) -> CryptoError {
    if err.kind() == crate::ErrorKind::Integrity {
        warn!(error = %err, "envelope failed integrity check");
    }
    err
}
