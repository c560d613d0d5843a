mod cipher_commands;
mod config_commands;
mod hash_commands;
mod input;

use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result, bail},
    captable_config::CaptableConfig,
    captable_crypto::{KeyEncoding, Scheme},
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{
        EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
    },
};

use crate::{cipher_commands::ReencryptTarget, input::read_arg};

#[derive(Parser)]
#[command(
    name = "captable-secrets",
    version,
    about = "Encrypt, hash and verify Captable secrets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Defaults to
    /// `logging.level` from the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false, env = "CAPTABLE_LOG_JSON")]
    json_logs: bool,

    /// Config file (overrides discovery of ./captable.toml and
    /// ~/.config/captable/).
    #[arg(long, global = true, env = "CAPTABLE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a value with the configured key. Pass `-` to read stdin.
    Encrypt {
        value: String,
        /// Scheme for the token (defaults to `secrets.scheme`).
        #[arg(long)]
        scheme: Option<Scheme>,
    },
    /// Decrypt a token of any supported scheme.
    Decrypt { token: String },
    /// Re-encrypt a token, upgrading its scheme and optionally its key.
    Reencrypt {
        token: String,
        /// New key to encrypt under (defaults to the configured key).
        #[arg(long, env = "CAPTABLE_NEW_ENCRYPTION_KEY", hide_env_values = true)]
        to_key: Option<String>,
        /// Encoding of `--to-key` (defaults to `secrets.key_encoding`).
        #[arg(long)]
        to_key_encoding: Option<KeyEncoding>,
        /// Scheme for the new token (defaults to `secrets.scheme`).
        #[arg(long)]
        scheme: Option<Scheme>,
    },
    /// Print a new random 32-byte encryption key.
    GenerateKey {
        #[arg(long, default_value = "hex")]
        encoding: KeyEncoding,
    },
    /// SHA-256 hex digest of a value.
    Digest { value: String },
    /// Random URL-safe token.
    Token,
    /// Salted scrypt hash of a secret.
    Hash { secret: String },
    /// Check a secret against a salted hash. Exits 1 on mismatch.
    Verify { secret: String, hash: String },
    /// Issue an API key and print its raw value, display prefix and digest.
    ApiKey {
        /// Key prefix (defaults to `secrets.api_key_prefix`).
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Configuration inspection.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

type LogFilterHandle = reload::Handle<EnvFilter, Registry>;

/// Initialise tracing on stderr; stdout carries command output.
///
/// `RUST_LOG` wins over `level`. When neither is set, logging starts at
/// `info` and the returned handle lets `logging.level` from the config file
/// replace the filter once it is loaded.
fn init_telemetry(level: Option<&str>, json: bool) -> Option<LogFilterHandle> {
    let (filter, from_config) = match (EnvFilter::try_from_default_env(), level) {
        (Ok(filter), _) => (filter, false),
        (Err(_), Some(level)) => (EnvFilter::new(level), false),
        (Err(_), None) => (EnvFilter::new("info"), true),
    };
    let (filter, handle) = reload::Layer::new(filter);

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    from_config.then_some(handle)
}

/// Where the config comes from. Loaded only by subcommands that need it, so
/// `config check` can diagnose a file that does not load.
pub(crate) struct ConfigSource {
    path: Option<PathBuf>,
    log_filter: Option<LogFilterHandle>,
}

impl ConfigSource {
    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the file (explicit or discovered) with env overrides applied.
    pub(crate) fn load(&self) -> Result<CaptableConfig> {
        let config = captable_config::load_effective(self.path())
            .context("failed to load config (run `captable-secrets config check` for details)")?;
        if let Some(handle) = &self.log_filter {
            handle
                .reload(EnvFilter::new(&config.logging.level))
                .context("failed to apply logging.level")?;
        }
        debug!(level = %config.logging.level, scheme = %config.secrets.scheme, "config loaded");
        Ok(config)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let Cli {
        command,
        log_level,
        json_logs,
        config,
    } = Cli::parse();

    let log_filter = init_telemetry(log_level.as_deref(), json_logs);

    debug!(version = env!("CARGO_PKG_VERSION"), "captable-secrets starting");

    let source = ConfigSource {
        path: config,
        log_filter,
    };
    run(command, &source)
}

fn run(command: Commands, source: &ConfigSource) -> Result<()> {
    match command {
        Commands::Encrypt { value, scheme } => {
            let config = source.load()?;
            println!(
                "{}",
                cipher_commands::encrypt(&config, &read_arg(&value)?, scheme)?
            );
        },
        Commands::Decrypt { token } => {
            let config = source.load()?;
            println!("{}", cipher_commands::decrypt(&config, &read_arg(&token)?)?);
        },
        Commands::Reencrypt {
            token,
            to_key,
            to_key_encoding,
            scheme,
        } => {
            let config = source.load()?;
            let target = ReencryptTarget {
                key: to_key,
                key_encoding: to_key_encoding,
                scheme,
            };
            println!(
                "{}",
                cipher_commands::reencrypt(&config, &read_arg(&token)?, target)?
            );
        },
        Commands::GenerateKey { encoding } => {
            println!("{}", cipher_commands::generate_key(encoding)?);
        },
        Commands::Digest { value } => println!("{}", hash_commands::digest(&read_arg(&value)?)),
        Commands::Token => println!("{}", hash_commands::token()?),
        Commands::Hash { secret } => {
            let config = source.load()?;
            println!("{}", hash_commands::hash(&config, &read_arg(&secret)?)?);
        },
        Commands::Verify { secret, hash } => {
            if secret == "-" && hash == "-" {
                bail!("only one of <SECRET> and <HASH> can be read from stdin");
            }
            let config = source.load()?;
            if hash_commands::verify(&config, &read_arg(&secret)?, &read_arg(&hash)?)? {
                println!("ok");
            } else {
                eprintln!("secret does not match");
                std::process::exit(1);
            }
        },
        Commands::ApiKey { prefix } => {
            let config = source.load()?;
            let issued = hash_commands::api_key(&config, prefix.as_deref())?;
            println!("key:    {}", issued.raw);
            println!("prefix: {}", issued.display_prefix);
            println!("hash:   {}", issued.hash);
        },
        Commands::Config { action } => config_commands::handle_config(action, source)?,
    }

    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, clap::CommandFactory};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scheme_and_encoding() {
        let cli = Cli::try_parse_from([
            "captable-secrets",
            "encrypt",
            "--scheme",
            "aes-256-cbc",
            "value",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Encrypt {
            scheme: Some(Scheme::Aes256Cbc),
            ..
        }));

        let cli = Cli::try_parse_from(["captable-secrets", "generate-key"]).unwrap();
        assert!(matches!(cli.command, Commands::GenerateKey {
            encoding: KeyEncoding::Hex
        }));
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(
            Cli::try_parse_from(["captable-secrets", "encrypt", "--scheme", "rot13", "v"]).is_err()
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "captable-secrets",
            "token",
            "--log-level",
            "debug",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.json_logs);
    }

    fn source(path: &Path) -> ConfigSource {
        ConfigSource {
            path: Some(path.to_path_buf()),
            log_filter: None,
        }
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

        let config = source(&path).load().unwrap();
        assert_eq!(config.logging.level, "warn");

        assert!(source(&dir.path().join("missing.toml")).load().is_err());
    }

    #[test]
    fn broken_config_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("captable.toml");
        std::fs::write(
            &path,
            "[secrets\nencryption_key = \"0123456789abcdef0123456789abcdef\"\n",
        )
        .unwrap();

        let err = source(&path).load().unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"), "{err:#}");
    }

    #[test]
    fn commands_without_key_ignore_broken_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("captable.toml");
        std::fs::write(&path, "[secrets\n").unwrap();

        run(Commands::Token, &source(&path)).unwrap();
        run(
            Commands::Digest {
                value: "abc".into(),
            },
            &source(&path),
        )
        .unwrap();
        run(
            Commands::Config {
                action: config_commands::ConfigAction::Path,
            },
            &source(&path),
        )
        .unwrap();
    }
}
