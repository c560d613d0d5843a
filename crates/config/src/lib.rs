//! Configuration loading, validation and env substitution.
//!
//! Config files: `captable.toml`, `captable.yaml` or `captable.json`.
//! Searched in `./` then `~/.config/captable/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in all
//! string values, and `CAPTABLE_*` environment overrides on top.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::ConfigError,
    loader::{
        apply_env_overrides, apply_env_overrides_with, config_dir, discover_and_load,
        find_config_file, load_config, load_effective, load_effective_with, parse_config,
    },
    schema::{CaptableConfig, LoggingConfig, SecretsConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate, validate_str},
};
