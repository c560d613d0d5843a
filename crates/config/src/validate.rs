//! Configuration validation engine.
//!
//! Checks a config file against the known schema, detects unknown or
//! misspelled fields, and reports key and cipher misconfiguration before
//! anything is encrypted with it.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use captable_crypto::Scheme;

use crate::{
    env_subst::substitute_env_with,
    loader::{apply_env_overrides_with, parse_config},
    schema::CaptableConfig,
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "secrets",
    /// "security", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "secrets.scheme"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

enum KnownKeys {
    Struct(HashMap<&'static str, KnownKeys>),
    Leaf,
}

/// Mirrors every field in `schema.rs`.
fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Struct};

    let scrypt = Struct(HashMap::from([("log_n", Leaf), ("r", Leaf), ("p", Leaf)]));

    Struct(HashMap::from([
        (
            "secrets",
            Struct(HashMap::from([
                ("encryption_key", Leaf),
                ("key_encoding", Leaf),
                ("scheme", Leaf),
                ("api_key_prefix", Leaf),
                ("scrypt", scrypt),
            ])),
        ),
        (
            "logging",
            Struct(HashMap::from([("level", Leaf)])),
        ),
    ]))
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Below this scrypt cost, stored hashes are cheap to brute-force.
const MIN_RECOMMENDED_LOG_N: u8 = 14;

// ── Levenshtein distance ────────────────────────────────────────────────────

fn levenshtein(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

/// Closest candidate within `max_distance` edits, if any.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&c| (c, levenshtein(needle, c)))
        .filter(|&(_, d)| d > 0 && d <= max_distance)
        .min_by_key(|&(_, d)| d)
        .map(|(c, _)| c)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => crate::loader::find_config_file(),
    };

    let Some(actual_path) = config_path else {
        let mut result = validate_str("", "toml");
        result.diagnostics.insert(0, Diagnostic {
            severity: Severity::Info,
            category: "file-ref",
            path: String::new(),
            message: "no config file found; using defaults".into(),
        });
        return result;
    };

    let format = actual_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("toml")
        .to_string();

    let mut result = match std::fs::read_to_string(&actual_path) {
        Ok(content) => validate_str(&content, &format),
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Error,
                category: "file-ref",
                path: String::new(),
                message: format!("failed to read config file: {e}"),
            }],
            config_path: None,
        },
    };
    result.config_path = Some(actual_path);
    result
}

/// Validate config text in `format` (`toml`, `yaml`, `yml` or `json`),
/// resolving `${VAR}` and `CAPTABLE_*` overrides from the process env.
#[must_use]
pub fn validate_str(raw: &str, format: &str) -> ValidationResult {
    validate_str_with(raw, format, |name| std::env::var(name).ok())
}

/// Same as [`validate_str`] with a custom env lookup.
#[must_use]
pub fn validate_str_with(
    raw: &str,
    format: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> ValidationResult {
    let mut diagnostics = Vec::new();
    let done = |diagnostics| ValidationResult {
        diagnostics,
        config_path: None,
    };

    // 1. Syntax, on the text as written
    let value = match parse_value(raw, format) {
        Ok(v) => v,
        Err(message) => {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message,
            });
            return done(diagnostics);
        },
    };

    // 2. Unknown fields
    check_unknown_fields(&value, &build_schema_map(), "", &mut diagnostics);

    // 3. Literal secrets, before substitution hides where they came from
    check_literal_key(&value, &mut diagnostics);

    // 4. Types, after substitution
    let substituted = substitute_env_with(raw, &lookup);
    let virtual_path = PathBuf::from(format!("captable.{format}"));
    let config = match parse_config(&substituted, &virtual_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "type-error",
                path: String::new(),
                message: e.to_string(),
            });
            return done(diagnostics);
        },
    };

    // 5. Semantics, on the effective config
    match apply_env_overrides_with(config, &lookup) {
        Ok(config) => check_semantic_warnings(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "type-error",
            path: String::new(),
            message: format!("environment override: {e}"),
        }),
    }

    done(diagnostics)
}

fn parse_value(raw: &str, format: &str) -> Result<serde_json::Value, String> {
    match format {
        "toml" => {
            let v: toml::Value =
                toml::from_str(raw).map_err(|e| format!("TOML syntax error: {e}"))?;
            serde_json::to_value(v).map_err(|e| e.to_string())
        },
        "yaml" | "yml" => {
            // An empty YAML document is null; treat it as an empty table.
            let v: Option<serde_yaml::Value> =
                serde_yaml::from_str(raw).map_err(|e| format!("YAML syntax error: {e}"))?;
            match v {
                Some(v) => serde_json::to_value(v).map_err(|e| e.to_string()),
                None => Ok(serde_json::Value::Object(serde_json::Map::new())),
            }
        },
        "json" => serde_json::from_str(raw).map_err(|e| format!("JSON syntax error: {e}")),
        other => Err(format!("unsupported config format: .{other}")),
    }
}

/// Walk the value tree against the schema tree and flag unknown keys.
fn check_unknown_fields(
    value: &serde_json::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (serde_json::Value::Object(table), KnownKeys::Struct(fields)) = (value, schema) else {
        // Leaf or type mismatch; type errors are reported later
        return;
    };

    let known_keys: Vec<&str> = fields.keys().copied().collect();
    for (key, child_value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(child_schema) = fields.get(key.as_str()) {
            check_unknown_fields(child_value, child_schema, &path, diagnostics);
            continue;
        }

        let level = if prefix.is_empty() {
            " at top level"
        } else {
            ""
        };
        let message = match suggest(key, &known_keys, 3) {
            Some(s) => format!("unknown field{level} (did you mean \"{s}\"?)"),
            None => format!("unknown field{level}"),
        };
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "unknown-field",
            path,
            message,
        });
    }
}

fn check_literal_key(value: &serde_json::Value, diagnostics: &mut Vec<Diagnostic>) {
    let literal = value
        .pointer("/secrets/encryption_key")
        .and_then(|v| v.as_str())
        .is_some_and(|k| !k.is_empty() && !k.contains("${"));
    if literal {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "security",
            path: "secrets.encryption_key".into(),
            message: "encryption key is written literally in the config file; use \
                      \"${ENCRYPTION_KEY}\" or CAPTABLE_ENCRYPTION_KEY instead"
                .into(),
        });
    }
}

/// Run semantic checks on a successfully parsed config.
fn check_semantic_warnings(config: &CaptableConfig, diagnostics: &mut Vec<Diagnostic>) {
    let secrets = &config.secrets;

    match secrets.secret_key() {
        Ok(_) => {},
        Err(crate::ConfigError::MissingEncryptionKey) => diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "secrets",
            path: "secrets.encryption_key".into(),
            message: "no encryption key configured; encrypt and decrypt will fail".into(),
        }),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "secrets",
            path: "secrets.encryption_key".into(),
            message: format!("{e} (key_encoding = \"{}\")", secrets.key_encoding),
        }),
    }

    if secrets.scheme == Scheme::Aes256Cbc {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "security",
            path: "secrets.scheme".into(),
            message: format!(
                "{} tokens are not authenticated; prefer \"{}\"",
                Scheme::Aes256Cbc,
                Scheme::XChaCha20Poly1305
            ),
        });
    }

    if let Err(e) = secrets.scrypt.validate() {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "secrets",
            path: "secrets.scrypt".into(),
            message: e.to_string(),
        });
    } else if secrets.scrypt.log_n < MIN_RECOMMENDED_LOG_N {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "security",
            path: "secrets.scrypt.log_n".into(),
            message: format!(
                "scrypt cost 2^{} is below the recommended 2^{MIN_RECOMMENDED_LOG_N}",
                secrets.scrypt.log_n
            ),
        });
    }

    if secrets.api_key_prefix.is_empty()
        || !secrets
            .api_key_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "secrets",
            path: "secrets.api_key_prefix".into(),
            message: "api key prefix should be non-empty and alphanumeric".into(),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        let message = match suggest(&level, LOG_LEVELS, 3) {
            Some(s) => format!("unknown log level (did you mean \"{s}\"?)"),
            None => format!("unknown log level, expected one of {}", LOG_LEVELS.join(", ")),
        };
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "type-error",
            path: "logging.level".into(),
            message,
        });
    }
}
