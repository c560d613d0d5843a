//! SHA-256 digests, bearer tokens and constant-time comparison.

use {
    base64::Engine,
    sha2::{Digest, Sha256},
};

use crate::{error::CryptoError, rng};

/// Random bytes behind every bearer token.
const TOKEN_BYTES: usize = 32;

/// Lowercase hex SHA-256 of the UTF-8 bytes of `input`.
pub fn digest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A fresh unguessable token: 32 random bytes, URL-safe base64, no padding.
pub fn create_token() -> Result<String, CryptoError> {
    let bytes = rng::random_array::<TOKEN_BYTES>()?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Compare two byte strings without short-circuiting on the first mismatch.
///
/// Only the length is allowed to leak.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a
        .iter()
        .zip(b)
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}
