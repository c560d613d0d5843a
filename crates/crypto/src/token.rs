//! Text form of encrypted secrets.
//!
//! Two layouts are stored side by side in the database:
//!
//! - `<ivHex>:<cipherHex>`: legacy AES-256-CBC, 16-byte IV.
//! - `xc20p1:<nonceHex>:<cipherHex>`: XChaCha20-Poly1305, 24-byte nonce,
//!   ciphertext carries the Poly1305 tag.
//!
//! The legacy IV is always hex, so the `xc20p1` prefix cannot collide with it.

use std::{fmt, str::FromStr};

use crate::error::CryptoError;

/// Prefix identifying XChaCha20-Poly1305 tokens.
pub const XCHACHA20_PREFIX: &str = "xc20p1";

/// Cipher used to produce an [`EncryptedSecret`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Scheme {
    /// AES-256-CBC with PKCS#7 padding, no authentication.
    #[serde(rename = "aes-256-cbc")]
    Aes256Cbc,
    /// XChaCha20-Poly1305 AEAD.
    #[default]
    #[serde(rename = "xchacha20-poly1305")]
    XChaCha20Poly1305,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aes256Cbc => "aes-256-cbc",
            Self::XChaCha20Poly1305 => "xchacha20-poly1305",
        }
    }

    /// Length of the IV or nonce this scheme stores in front of the ciphertext.
    pub fn nonce_len(&self) -> usize {
        match self {
            Self::Aes256Cbc => 16,
            Self::XChaCha20Poly1305 => 24,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aes-256-cbc" | "aes256" | "cbc" => Ok(Self::Aes256Cbc),
            "xchacha20-poly1305" | "xchacha20" | XCHACHA20_PREFIX => Ok(Self::XChaCha20Poly1305),
            other => Err(CryptoError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// A parsed encrypted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedSecret {
    pub scheme: Scheme,
    /// IV (CBC) or nonce (AEAD).
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl EncryptedSecret {
    pub fn new(scheme: Scheme, nonce: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self {
            scheme,
            nonce,
            ciphertext,
        }
    }

    /// Scheme of a token string, without decoding its hex payload.
    pub fn scheme_of(token: &str) -> Scheme {
        if token
            .strip_prefix(XCHACHA20_PREFIX)
            .is_some_and(|rest| rest.starts_with(':'))
        {
            Scheme::XChaCha20Poly1305
        } else {
            Scheme::Aes256Cbc
        }
    }
}

impl fmt::Display for EncryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scheme == Scheme::XChaCha20Poly1305 {
            write!(f, "{XCHACHA20_PREFIX}:")?;
        }
        write!(
            f,
            "{}:{}",
            hex::encode(&self.nonce),
            hex::encode(&self.ciphertext)
        )
    }
}

impl FromStr for EncryptedSecret {
    type Err = CryptoError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let scheme = Self::scheme_of(token);
        let body = match scheme {
            Scheme::XChaCha20Poly1305 => &token[XCHACHA20_PREFIX.len() + 1..],
            Scheme::Aes256Cbc => token,
        };

        // Only the IV is delimited; any further colon belongs to the
        // ciphertext half and fails hex decoding below.
        let (nonce_hex, cipher_hex) = body
            .split_once(':')
            .ok_or_else(|| CryptoError::MalformedToken("missing ':' separator".into()))?;

        let nonce = hex::decode(nonce_hex)
            .map_err(|e| CryptoError::MalformedToken(format!("iv is not hex: {e}")))?;
        if nonce.len() != scheme.nonce_len() {
            return Err(CryptoError::MalformedToken(format!(
                "iv must be {} bytes, got {}",
                scheme.nonce_len(),
                nonce.len()
            )));
        }

        let ciphertext = hex::decode(cipher_hex)
            .map_err(|e| CryptoError::MalformedToken(format!("ciphertext is not hex: {e}")))?;

        Ok(Self {
            scheme,
            nonce,
            ciphertext,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    const CBC_TOKEN: &str = "000102030405060708090a0b0c0d0e0f:a1314678ca91c2309c8fccff169998e6";

    #[test]
    fn parses_legacy_token() {
        let secret: EncryptedSecret = CBC_TOKEN.parse().unwrap();
        assert_eq!(secret.scheme, Scheme::Aes256Cbc);
        assert_eq!(secret.nonce, (0u8..16).collect::<Vec<_>>());
        assert_eq!(secret.ciphertext.len(), 16);
        assert_eq!(secret.to_string(), CBC_TOKEN);
    }

    #[test]
    fn parses_prefixed_token() {
        let token = format!("xc20p1:{}:{}", "11".repeat(24), "22".repeat(20));
        let secret: EncryptedSecret = token.parse().unwrap();
        assert_eq!(secret.scheme, Scheme::XChaCha20Poly1305);
        assert_eq!(secret.nonce, vec![0x11; 24]);
        assert_eq!(secret.to_string(), token);
    }

    #[rstest]
    #[case::no_separator("000102030405060708090a0b0c0d0e0f")]
    #[case::empty("")]
    #[case::non_hex_iv("zz0102030405060708090a0b0c0d0e0f:00")]
    #[case::short_iv("0001:a1314678ca91c2309c8fccff169998e6")]
    #[case::extra_colon("000102030405060708090a0b0c0d0e0f:a131:4678")]
    #[case::prefixed_without_payload_separator("xc20p1:abcdef")]
    fn rejects_malformed(#[case] token: &str) {
        let err = token.parse::<EncryptedSecret>().unwrap_err();
        assert!(matches!(err, CryptoError::MalformedToken(_)), "{token}: {err}");
    }

    #[test]
    fn prefix_needs_separator_to_count() {
        assert_eq!(EncryptedSecret::scheme_of("xc20p1"), Scheme::Aes256Cbc);
        assert_eq!(EncryptedSecret::scheme_of("xc20p1:"), Scheme::XChaCha20Poly1305);
    }

    #[test]
    fn scheme_round_trips_through_serde_and_str() {
        for scheme in [Scheme::Aes256Cbc, Scheme::XChaCha20Poly1305] {
            let json = serde_json::to_string(&scheme).unwrap();
            assert_eq!(json, format!("\"{}\"", scheme.as_str()));
            assert_eq!(scheme.as_str().parse::<Scheme>().unwrap(), scheme);
        }
        assert!("rot13".parse::<Scheme>().is_err());
    }
}
