//! Config schema types (secrets, logging).

use {
    captable_crypto::{KeyEncoding, Scheme, ScryptParams, SecretBox, SecretKey, api_key},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use crate::error::ConfigError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptableConfig {
    pub secrets: SecretsConfig,
    pub logging: LoggingConfig,
}

/// Encryption and hashing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Key for stored secrets. Usually `"${ENCRYPTION_KEY}"` rather than a
    /// literal.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub encryption_key: Option<Secret<String>>,
    /// How `encryption_key` maps to 32 key bytes.
    pub key_encoding: KeyEncoding,
    /// Scheme for newly encrypted values. Both schemes are always readable.
    pub scheme: Scheme,
    /// Prefix for issued API keys.
    pub api_key_prefix: String,
    /// scrypt cost for salted hashes. Changing it invalidates existing hashes.
    pub scrypt: ScryptParams,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            encryption_key: None,
            key_encoding: KeyEncoding::default(),
            scheme: Scheme::default(),
            api_key_prefix: api_key::DEFAULT_PREFIX.into(),
            scrypt: ScryptParams::default(),
        }
    }
}

impl SecretsConfig {
    /// Decode the configured key.
    pub fn secret_key(&self) -> Result<SecretKey, ConfigError> {
        let raw = self
            .encryption_key
            .as_ref()
            .filter(|k| !k.expose_secret().is_empty())
            .ok_or(ConfigError::MissingEncryptionKey)?;
        Ok(SecretKey::decode(raw.expose_secret(), self.key_encoding)?)
    }

    /// A [`SecretBox`] for the configured key and write scheme.
    pub fn secret_box(&self) -> Result<SecretBox, ConfigError> {
        Ok(SecretBox::with_scheme(self.secret_key()?, self.scheme))
    }
}

/// Log settings. `RUST_LOG` and `--log-level` take precedence over `level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = CaptableConfig::default();
        assert!(cfg.secrets.encryption_key.is_none());
        assert_eq!(cfg.secrets.key_encoding, KeyEncoding::Latin1);
        assert_eq!(cfg.secrets.scheme, Scheme::XChaCha20Poly1305);
        assert_eq!(cfg.secrets.api_key_prefix, "cap");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn parses_partial_toml() {
        let cfg: CaptableConfig = toml::from_str(
            r#"
            [secrets]
            encryption_key = "0123456789abcdef0123456789abcdef"
            scheme = "aes-256-cbc"

            [secrets.scrypt]
            log_n = 15
            "#,
        )
        .unwrap();
        assert_eq!(cfg.secrets.scheme, Scheme::Aes256Cbc);
        assert_eq!(cfg.secrets.scrypt.log_n, 15);
        assert_eq!(cfg.secrets.scrypt.r, 8);
        assert_eq!(cfg.logging.level, "info");

        let sb = cfg.secrets.secret_box().unwrap();
        assert_eq!(sb.scheme(), Scheme::Aes256Cbc);
    }

    #[test]
    fn missing_key_is_reported() {
        let err = SecretsConfig::default().secret_key().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEncryptionKey));

        let empty = SecretsConfig {
            encryption_key: Some(Secret::new(String::new())),
            ..SecretsConfig::default()
        };
        assert!(matches!(
            empty.secret_key().unwrap_err(),
            ConfigError::MissingEncryptionKey
        ));
    }

    #[test]
    fn wrong_length_key_surfaces_crypto_error() {
        let cfg = SecretsConfig {
            encryption_key: Some(Secret::new("short".into())),
            ..SecretsConfig::default()
        };
        assert!(matches!(
            cfg.secret_key().unwrap_err(),
            ConfigError::Crypto(captable_crypto::CryptoError::InvalidKeyLength { .. })
        ));
    }

    #[test]
    fn hex_encoded_key() {
        let cfg = SecretsConfig {
            encryption_key: Some(Secret::new("00".repeat(32))),
            key_encoding: KeyEncoding::Hex,
            ..SecretsConfig::default()
        };
        assert_eq!(cfg.secret_key().unwrap().as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn key_survives_serialization_round_trip() {
        let cfg = SecretsConfig {
            encryption_key: Some(Secret::new("k".repeat(32))),
            ..SecretsConfig::default()
        };
        let rendered = toml::to_string(&cfg).unwrap();
        let parsed: SecretsConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(
            parsed.encryption_key.unwrap().expose_secret(),
            &"k".repeat(32)
        );
    }
}
