use clap::Parser;
use tracing_subscriber::EnvFilter;
use vault_lookup::cli::{Cli, Commands};

/// Log filter variable, e.g. `VAULT_LOOKUP_LOG=debug`.
const LOG_ENV: &str = "VAULT_LOOKUP_LOG";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Lookup {
            ref term,
            ref field,
            raw,
        } => vault_lookup::cli::commands::lookup::execute(&cli, term, field.as_deref(), raw),
        Commands::Config => vault_lookup::cli::commands::config_cmd::execute(&cli),
        Commands::Completions { shell } => vault_lookup::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        vault_lookup::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
