//! Fixed-length key material.

use std::{fmt, str::FromStr};

use {base64::Engine, zeroize::Zeroizing};

use crate::error::CryptoError;

/// Key length for AES-256 and XChaCha20-Poly1305.
pub const KEY_LEN: usize = 32;

/// How a configured key string maps to key bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    /// One byte per character, every character ≤ U+00FF. This is how the
    /// existing deployments store `ENCRYPTION_KEY`.
    #[default]
    Latin1,
    /// 64 hex characters.
    Hex,
    /// Standard base64 of 32 bytes.
    Base64,
}

impl fmt::Display for KeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Latin1 => "latin1",
            Self::Hex => "hex",
            Self::Base64 => "base64",
        })
    }
}

impl FromStr for KeyEncoding {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latin1" | "raw" => Ok(Self::Latin1),
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            other => Err(CryptoError::InvalidKeyEncoding(format!(
                "unknown key encoding: {other}"
            ))),
        }
    }
}

/// A 256-bit symmetric key, zeroized on drop.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<[u8; KEY_LEN]>);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Copy key bytes out of a slice, which must be exactly [`KEY_LEN`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                found: bytes.len(),
            });
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Decode a legacy single-byte-per-character key.
    ///
    /// Characters above U+00FF are rejected instead of being truncated.
    pub fn from_latin1(key: &str) -> Result<Self, CryptoError> {
        let bytes = key
            .chars()
            .map(|c| {
                u8::try_from(u32::from(c)).map_err(|_| {
                    CryptoError::InvalidKeyEncoding(format!(
                        "character U+{:04X} is outside latin1",
                        u32::from(c)
                    ))
                })
            })
            .collect::<Result<Vec<u8>, _>>()?;
        Self::from_slice(&Zeroizing::new(bytes))
    }

    pub fn from_hex(key: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(
            hex::decode(key.trim()).map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?,
        );
        Self::from_slice(&bytes)
    }

    pub fn from_base64(key: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(
            base64::engine::general_purpose::STANDARD
                .decode(key.trim())
                .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?,
        );
        Self::from_slice(&bytes)
    }

    /// Decode `key` with the given encoding.
    pub fn decode(key: &str, encoding: KeyEncoding) -> Result<Self, CryptoError> {
        match encoding {
            KeyEncoding::Latin1 => Self::from_latin1(key),
            KeyEncoding::Hex => Self::from_hex(key),
            KeyEncoding::Base64 => Self::from_base64(key),
        }
    }

    /// Generate a fresh random key.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        crate::rng::fill_random(&mut key[..])?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Hex form of the key, for printing a freshly generated key once.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.as_bytes()))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}
