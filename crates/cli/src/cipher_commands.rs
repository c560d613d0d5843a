use {
    anyhow::{Context, Result, bail},
    base64::Engine,
    captable_config::CaptableConfig,
    captable_crypto::{KeyEncoding, Scheme, SecretBox, SecretKey},
    tracing::debug,
};

/// Box for the configured key, writing `scheme` or the configured scheme.
fn configured_box(config: &CaptableConfig, scheme: Option<Scheme>) -> Result<SecretBox> {
    let key = config
        .secrets
        .secret_key()
        .context("cannot load encryption key")?;
    Ok(SecretBox::with_scheme(
        key,
        scheme.unwrap_or(config.secrets.scheme),
    ))
}

pub fn encrypt(config: &CaptableConfig, value: &str, scheme: Option<Scheme>) -> Result<String> {
    let sb = configured_box(config, scheme)?;
    debug!(scheme = %sb.scheme(), "encrypting value");
    Ok(sb.encrypt_string(value)?)
}

pub fn decrypt(config: &CaptableConfig, token: &str) -> Result<String> {
    let sb = configured_box(config, None)?;
    Ok(sb.decrypt_string(token.trim())?)
}

/// Target of a re-encryption. Unset fields fall back to the configured key,
/// encoding and scheme.
#[derive(Debug, Default)]
pub struct ReencryptTarget {
    pub key: Option<String>,
    pub key_encoding: Option<KeyEncoding>,
    pub scheme: Option<Scheme>,
}

pub fn reencrypt(config: &CaptableConfig, token: &str, target: ReencryptTarget) -> Result<String> {
    let source = configured_box(config, None)?;
    let scheme = target.scheme.unwrap_or(config.secrets.scheme);

    let rewrapped = match target.key {
        Some(raw) => {
            let encoding = target.key_encoding.unwrap_or(config.secrets.key_encoding);
            let key = SecretKey::decode(&raw, encoding).context("cannot decode target key")?;
            source.reencrypt_to(token.trim(), &SecretBox::with_scheme(key, scheme))?
        },
        None => source.reencrypt_to(
            token.trim(),
            &configured_box(config, Some(scheme))?,
        )?,
    };
    Ok(rewrapped)
}

/// A fresh random key in `encoding`.
pub fn generate_key(encoding: KeyEncoding) -> Result<String> {
    let key = SecretKey::generate()?;
    match encoding {
        KeyEncoding::Hex => Ok(key.to_hex().to_string()),
        KeyEncoding::Base64 => {
            Ok(base64::engine::general_purpose::STANDARD.encode(key.as_bytes()))
        },
        KeyEncoding::Latin1 => {
            bail!("random keys are not printable as latin1; use --encoding hex or base64")
        },
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret};

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn config() -> CaptableConfig {
        let mut cfg = CaptableConfig::default();
        cfg.secrets.encryption_key = Some(Secret::new(KEY.into()));
        cfg
    }

    #[test]
    fn encrypt_then_decrypt() {
        let cfg = config();
        let token = encrypt(&cfg, "plaid secret", None).unwrap();
        assert!(token.starts_with("xc20p1:"));
        assert_eq!(decrypt(&cfg, &token).unwrap(), "plaid secret");
    }

    #[test]
    fn scheme_flag_overrides_config() {
        let cfg = config();
        let token = encrypt(&cfg, "v", Some(Scheme::Aes256Cbc)).unwrap();
        assert!(!token.starts_with("xc20p1:"));
        assert_eq!(decrypt(&cfg, &format!("{token}\n")).unwrap(), "v");
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = encrypt(&CaptableConfig::default(), "v", None).unwrap_err();
        assert!(err.to_string().contains("encryption key"));
    }

    #[test]
    fn reencrypt_upgrades_in_place() {
        let cfg = config();
        let legacy = "000102030405060708090a0b0c0d0e0f:a1314678ca91c2309c8fccff169998e6";
        let upgraded = reencrypt(&cfg, legacy, ReencryptTarget::default()).unwrap();
        assert!(upgraded.starts_with("xc20p1:"));
        assert_eq!(decrypt(&cfg, &upgraded).unwrap(), "hello world");
    }

    #[test]
    fn reencrypt_rotates_to_new_key() {
        let cfg = config();
        let new_key = generate_key(KeyEncoding::Hex).unwrap();
        let token = encrypt(&cfg, "rotate", None).unwrap();

        let rotated = reencrypt(&cfg, &token, ReencryptTarget {
            key: Some(new_key.clone()),
            key_encoding: Some(KeyEncoding::Hex),
            scheme: None,
        })
        .unwrap();

        assert!(decrypt(&cfg, &rotated).is_err());
        let mut new_cfg = CaptableConfig::default();
        new_cfg.secrets.encryption_key = Some(Secret::new(new_key));
        new_cfg.secrets.key_encoding = KeyEncoding::Hex;
        assert_eq!(decrypt(&new_cfg, &rotated).unwrap(), "rotate");
    }

    #[test]
    fn generated_keys_decode() {
        let hex = generate_key(KeyEncoding::Hex).unwrap();
        assert_eq!(hex.len(), 64);
        assert!(SecretKey::decode(&hex, KeyEncoding::Hex).is_ok());

        let b64 = generate_key(KeyEncoding::Base64).unwrap();
        assert!(SecretKey::decode(&b64, KeyEncoding::Base64).is_ok());

        assert!(generate_key(KeyEncoding::Latin1).is_err());
    }
}
