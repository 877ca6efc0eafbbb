//! Encryption layer for XAAM task payloads and deliverables.
//!
//! Provides hybrid envelope encryption using:
//! - RSA (2048-bit by default) key pairs, PEM-encoded
//! - RSA-OAEP with SHA-256 for wrapping per-payload keys
//! - AES-256-GCM (or AES-256-CBC for older records) for the payload itself
//!
//! # Architecture
//!
//! 1. **Agent key pair**: generated once per agent. The public key is
//!    published in the agent record; the private key stays in the owner's
//!    key store.
//!
//! 2. **Payload key**: a random 256-bit key generated for every encryption
//!    and never reused. It encrypts the payload once and is wrapped under
//!    each recipient's public key.
//!
//! Every recipient decrypts independently with only their own private key.

mod cipher;
mod encoding;
pub mod engine;
pub mod envelope;
mod error;
pub mod keypair;
pub mod sealed;

pub use cipher::{AES_BLOCK_SIZE, CipherSuite, GCM_NONCE_SIZE, SYMMETRIC_KEY_SIZE};
pub use engine::{EngineConfig, EnvelopeEngine};
pub use envelope::{
    EncryptedEnvelope, RecipientKeys, SealedPayload, WrappedKey, WrappedKeyMap,
    decrypt_for_recipient, encrypt_for_recipients,
};
pub use error::{CryptoError, CryptoResult, ErrorKind};
pub use keypair::{
    DEFAULT_KEY_BITS, KeyPair, MIN_KEY_BITS, PrivateKeyPem, PublicKeyPem, generate_key_pair,
};
pub use sealed::{decrypt_with_private_key, encrypt_with_public_key};
