use std::fmt::Write;

use {
    anyhow::{Context, Result},
    captable_config::{
        CaptableConfig,
        validate::{self, Severity, ValidationResult},
    },
    clap::Subcommand,
    secrecy::Secret,
};

use crate::ConfigSource;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Print the effective configuration with the key redacted.
    Show,
    /// Print the path of the config file in use.
    Path,
}

/// `check` and `path` never load the config, so they work on files that
/// fail to parse or on a bad `CAPTABLE_*` override.
pub fn handle_config(action: ConfigAction, source: &ConfigSource) -> Result<()> {
    match action {
        ConfigAction::Check { verbose } => {
            let result = validate::validate(source.path());
            eprint!("{}", render_report(&result, verbose));
            if result.has_errors() {
                std::process::exit(1);
            }
            Ok(())
        },
        ConfigAction::Show => {
            print!("{}", show(&source.load()?)?);
            Ok(())
        },
        ConfigAction::Path => {
            match source
                .path()
                .map(std::path::Path::to_path_buf)
                .or_else(captable_config::find_config_file)
            {
                Some(path) => println!("{}", path.display()),
                None => eprintln!("No config file found."),
            }
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn render_report(result: &ValidationResult, verbose: bool) -> String {
    let mut out = String::new();

    match result.config_path {
        Some(ref path) => _ = writeln!(out, "Checking {}\n", path.display()),
        None => out.push_str("No config file found; checking defaults.\n\n"),
    }

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let color = match d.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Info => CYAN,
        };

        if d.path.is_empty() {
            _ = writeln!(out, "  {BOLD}{color}{}{RESET} {}", d.severity, d.message);
        } else {
            _ = writeln!(
                out,
                "  {BOLD}{color}{}{RESET} {}: {}",
                d.severity, d.path, d.message
            );
        }
        shown += 1;
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        out.push('\n');
    }

    if errors == 0 && warnings == 0 {
        out.push_str("No issues found.\n");
    } else {
        _ = writeln!(out, "{errors} error(s), {warnings} warning(s)");
    }

    out
}

fn show(config: &CaptableConfig) -> Result<String> {
    let mut redacted = config.clone();
    if redacted.secrets.encryption_key.is_some() {
        redacted.secrets.encryption_key = Some(Secret::new("[REDACTED]".into()));
    }
    toml::to_string_pretty(&redacted).context("failed to serialize config")
}
