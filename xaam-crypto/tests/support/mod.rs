//! Shared fixtures for crypto integration tests.
//!
//! RSA key generation dominates test runtime, so each test binary builds a
//! small pool of key pairs once and hands out references.

#![allow(dead_code)]

use std::sync::OnceLock;
use xaam_crypto::{KeyPair, RecipientKeys, generate_key_pair};

const POOL_SIZE: usize = 3;

static POOL: OnceLock<Vec<KeyPair>> = OnceLock::new();

/// Returns the `index`-th cached 2048-bit key pair.
pub fn key_pair(index: usize) -> &'static KeyPair {
    let pool = POOL.get_or_init(|| {
        (0..POOL_SIZE)
            .map(|_| generate_key_pair(2048).expect("key generation must succeed"))
            .collect()
    });
    &pool[index % POOL_SIZE]
}

/// Builds a recipient map from `(recipient_id, pool_index)` pairs.
pub fn recipients(entries: &[(&str, usize)]) -> RecipientKeys {
    entries
        .iter()
        .map(|(id, index)| (id.to_string(), key_pair(*index).public_key.clone()))
        .collect()
}
