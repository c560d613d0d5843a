use std::path::{Path, PathBuf};

use {secrecy::Secret, tracing::debug};

use crate::{env_subst::substitute_env, error::ConfigError, schema::CaptableConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "captable.toml",
    "captable.yaml",
    "captable.yml",
    "captable.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<CaptableConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations, then apply
/// `CAPTABLE_*` env overrides.
///
/// Search order:
/// 1. `./captable.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/captable/captable.{toml,yaml,yml,json}` (user-global)
///
/// Uses `CaptableConfig::default()` when no file exists. A file that exists
/// but fails to load, or an invalid override, is an error.
pub fn discover_and_load() -> Result<CaptableConfig, ConfigError> {
    load_effective(None)
}

/// Load `explicit` if given, otherwise discover as [`discover_and_load`]
/// does, then apply `CAPTABLE_*` env overrides.
pub fn load_effective(explicit: Option<&Path>) -> Result<CaptableConfig, ConfigError> {
    let path = explicit.map(Path::to_path_buf).or_else(find_config_file);
    load_effective_with(path.as_deref(), |name| std::env::var(name).ok())
}

/// Load `path` (or defaults when `None`) and apply overrides from `lookup`.
pub fn load_effective_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<CaptableConfig, ConfigError> {
    let cfg = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(path)?
        },
        None => {
            debug!("no config file found, using defaults");
            CaptableConfig::default()
        },
    };
    apply_env_overrides_with(cfg, lookup)
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/captable/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "captable").map(|d| d.config_dir().to_path_buf())
}

/// Parse already-substituted config text; the format follows the extension.
pub fn parse_config(raw: &str, path: &Path) -> Result<CaptableConfig, ConfigError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| parse_err(e.to_string())),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| parse_err(e.to_string())),
        "json" => serde_json::from_str(raw).map_err(|e| parse_err(e.to_string())),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Apply `CAPTABLE_*` overrides from the process environment.
pub fn apply_env_overrides(cfg: CaptableConfig) -> Result<CaptableConfig, ConfigError> {
    apply_env_overrides_with(cfg, |name| std::env::var(name).ok())
}

/// Apply overrides using `lookup` to read variables. Empty values are
/// ignored.
pub fn apply_env_overrides_with(
    mut cfg: CaptableConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<CaptableConfig, ConfigError> {
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(key) = get("CAPTABLE_ENCRYPTION_KEY") {
        cfg.secrets.encryption_key = Some(Secret::new(key));
    }
    if let Some(v) = get("CAPTABLE_KEY_ENCODING") {
        cfg.secrets.key_encoding = v.parse().map_err(|e| invalid("secrets.key_encoding", e))?;
    }
    if let Some(v) = get("CAPTABLE_SECRET_SCHEME") {
        cfg.secrets.scheme = v.parse().map_err(|e| invalid("secrets.scheme", e))?;
    }
    if let Some(v) = get("CAPTABLE_LOG_LEVEL") {
        cfg.logging.level = v;
    }

    Ok(cfg)
}

fn invalid(field: &'static str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        message: err.to_string(),
    }
}
