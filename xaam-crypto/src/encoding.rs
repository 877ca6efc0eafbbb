//! Base64 text encoding for byte fields that cross storage boundaries.

use crate::error::{CryptoError, CryptoResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

pub(crate) fn encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

pub(crate) fn decode(text: &str, what: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| CryptoError::MalformedEnvelope(format!("{what} is not valid base64: {e}")))
}

/// `#[serde(with = "...")]` adapter storing `Vec<u8>` as a base64 string.
pub(crate) mod base64_bytes {
    use super::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.trim())
            .map_err(serde::de::Error::custom)
    }
}
