//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::Path;

use clap::Parser;

use crate::config::Variables;
use crate::errors::Result;
use crate::lookup::ParameterMode;

/// vault-lookup CLI: read secrets from HashiCorp Vault.
#[derive(Parser)]
#[command(
    name = "vault-lookup",
    about = "Read secrets from HashiCorp Vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Caller variable, e.g. vault_addr=https://vault:8200 (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var, global = true)]
    pub vars: Vec<(String, String)>,

    /// TOML file of caller variables (flat table)
    #[arg(long, value_name = "PATH", global = true)]
    pub vars_file: Option<String>,

    /// Fail on malformed name=value parameters instead of ignoring them
    #[arg(long, global = true)]
    pub strict_params: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Look up a secret: "<path> [name=value ...]" and an optional field
    Lookup {
        /// Vault path, optionally followed by name=value write parameters
        term: String,
        /// Field to extract from the secret's data
        field: Option<String>,
        /// Print a single string result without JSON quoting
        #[arg(long)]
        raw: bool,
    },

    /// Show the resolved connection settings (tokens are never printed)
    Config,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Build the caller variable bag: `--vars-file` first, then `--var`
/// entries on top.
pub fn variables(cli: &Cli) -> Result<Variables> {
    let mut vars = match &cli.vars_file {
        Some(path) => Variables::load(Path::new(path))?,
        None => Variables::new(),
    };
    vars.extend(cli.vars.iter().cloned().collect());
    Ok(vars)
}

/// Parameter handling selected on the command line.
pub fn parameter_mode(cli: &Cli) -> ParameterMode {
    if cli.strict_params {
        ParameterMode::Strict
    } else {
        ParameterMode::Lenient
    }
}

/// Parse a `NAME=VALUE` flag. The value may itself contain `=`.
fn parse_var(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}
