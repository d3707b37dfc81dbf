//! `vault-lookup config` — print the settings a lookup would use.

use crate::cli::{output, variables, Cli};
use crate::config::{resolve_credential, ConnectionConfig, SystemEnv};
use crate::errors::Result;
use crate::vault::ResultCache;

/// Execute the `config` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vars = variables(cli)?;
    let env = SystemEnv;

    let config = ConnectionConfig::resolve(&env, &vars)?;
    let credential = resolve_credential(&env)?;
    let cache = ResultCache::from_env(&env);

    let show = |p: &Option<std::path::PathBuf>| {
        p.as_ref()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string())
    };

    output::field("address", &config.address);
    output::field("ca file", &show(&config.ca_file));
    output::field("ca path", &show(&config.ca_path));
    output::field("verify host", if config.verify_host { "yes" } else { "no" });
    output::field("credential", credential.kind());
    output::field("cache", if cache.is_enabled() { "enabled" } else { "disabled" });

    if !config.has_custom_ca() && !config.verify_host {
        output::warning("host verification can only be relaxed together with a custom CA");
    }

    Ok(())
}
