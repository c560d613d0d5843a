use {
    anyhow::{Context, Result},
    captable_config::CaptableConfig,
    captable_crypto::{IssuedApiKey, create_token, hash_secret_with, issue_api_key, verify_secret_with},
};

pub fn digest(value: &str) -> String {
    captable_crypto::digest(value)
}

pub fn token() -> Result<String> {
    Ok(create_token()?)
}

/// Salted scrypt hash of `secret` with the configured cost.
pub fn hash(config: &CaptableConfig, secret: &str) -> Result<String> {
    Ok(hash_secret_with(secret, &config.secrets.scrypt)?)
}

pub fn verify(config: &CaptableConfig, secret: &str, stored: &str) -> Result<bool> {
    verify_secret_with(secret, stored.trim(), &config.secrets.scrypt)
        .context("stored hash is not in <salt>:<key> form")
}

pub fn api_key(config: &CaptableConfig, prefix: Option<&str>) -> Result<IssuedApiKey> {
    let prefix = prefix.unwrap_or(&config.secrets.api_key_prefix);
    Ok(issue_api_key(prefix)?)
}
