use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::env::ReadEnv;
use crate::errors::{Result, VaultLookupError};
use crate::vault::Credential;

// ── Variable names ───────────────────────────────────────────────────

pub const ENV_ADDR: &str = "VAULT_ADDR";
pub const ENV_CACERT: &str = "VAULT_CACERT";
pub const ENV_CAPATH: &str = "VAULT_CAPATH";
pub const ENV_CAHOSTVERIFY: &str = "VAULT_CAHOSTVERIFY";
pub const ENV_TOKEN: &str = "VAULT_TOKEN";
pub const ENV_GITHUB_TOKEN: &str = "VAULT_GITHUB_API_TOKEN";
pub const ENV_HOME: &str = "HOME";

pub const VAR_ADDR: &str = "vault_addr";
pub const VAR_CACERT: &str = "vault_cacert";
pub const VAR_CAPATH: &str = "vault_capath";
pub const VAR_CAHOSTVERIFY: &str = "vault_cahostverify";

/// Token file looked up under `$HOME` when no token env var is set.
pub const TOKEN_FILE_NAME: &str = ".vault-token";

// ── Caller variables ─────────────────────────────────────────────────

/// Variable bag supplied by the caller alongside the lookup terms.
///
/// Environment variables always win over entries here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    vars: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Value for `key`, with empty strings treated as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Merge `other` into `self`; entries in `other` win.
    pub fn extend(&mut self, other: Variables) {
        self.vars.extend(other.vars);
    }

    /// Load a flat TOML table of variables.
    ///
    /// Strings, integers, floats and booleans are accepted and kept in
    /// their textual form. Nested tables and arrays are rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VaultLookupError::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;

        let table: toml::Table = toml::from_str(&contents).map_err(|e| {
            VaultLookupError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        let mut vars = Self::new();
        for (key, value) in table {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => (if b { "yes" } else { "no" }).to_string(),
                other => {
                    return Err(VaultLookupError::ConfigError(format!(
                        "Variable '{key}' in {} must be a scalar, found {}",
                        path.display(),
                        other.type_str()
                    )))
                }
            };
            vars.insert(key, text);
        }
        Ok(vars)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ── Connection config ────────────────────────────────────────────────

/// Where Vault lives and how to verify its TLS certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Base URL without a trailing slash, e.g. `https://vault:8200`.
    pub address: String,
    pub ca_file: Option<PathBuf>,
    pub ca_path: Option<PathBuf>,
    /// Only consulted when a custom CA is configured.
    pub verify_host: bool,
}

impl ConnectionConfig {
    /// Resolve the connection settings.
    ///
    /// Each setting comes from its environment variable if set, else from
    /// the caller's variables.
    pub fn resolve(env: &impl ReadEnv, vars: &Variables) -> Result<Self> {
        let address = pick(env, ENV_ADDR, vars, VAR_ADDR).ok_or_else(|| {
            VaultLookupError::ConfigError(format!(
                "Vault address not set. Specify with {ENV_ADDR} environment variable \
                 or {VAR_ADDR} variable"
            ))
        })?;

        if !(address.starts_with("https://") || address.starts_with("http://")) {
            return Err(VaultLookupError::ConfigError(format!(
                "Vault address '{address}' must start with https:// or http://"
            )));
        }

        let ca_file = pick(env, ENV_CACERT, vars, VAR_CACERT).map(PathBuf::from);
        let ca_path = pick(env, ENV_CAPATH, vars, VAR_CAPATH).map(PathBuf::from);
        let verify_host = pick(env, ENV_CAHOSTVERIFY, vars, VAR_CAHOSTVERIFY)
            .map_or(true, |v| v != "no");

        Ok(Self {
            address: address.trim_end_matches('/').to_string(),
            ca_file,
            ca_path,
            verify_host,
        })
    }

    /// Whether a CA file or directory overrides the platform roots.
    pub fn has_custom_ca(&self) -> bool {
        self.ca_file.is_some() || self.ca_path.is_some()
    }

    /// Build an API URL: `{address}/v1/{path}`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.address, path.trim_start_matches('/'))
    }
}

fn pick(env: &impl ReadEnv, env_key: &str, vars: &Variables, var_key: &str) -> Option<String> {
    env.non_empty(env_key)
        .or_else(|| vars.get(var_key).map(str::to_string))
}

// ── Credential ───────────────────────────────────────────────────────

/// Resolve the credential for this invocation.
///
/// Order:
/// 1. `VAULT_TOKEN` (static Vault token)
/// 2. `VAULT_GITHUB_API_TOKEN` (exchanged for a Vault token)
/// 3. `$HOME/.vault-token`, only read when neither env var is set
///
/// Tokens are deliberately never taken from caller variables.
pub fn resolve_credential(env: &impl ReadEnv) -> Result<Credential> {
    if let Some(token) = env.non_empty(ENV_TOKEN) {
        return Ok(Credential::vault(token));
    }
    if let Some(token) = env.non_empty(ENV_GITHUB_TOKEN) {
        return Ok(Credential::github(token));
    }

    let home = env.non_empty(ENV_HOME).ok_or_else(|| {
        VaultLookupError::ConfigError(format!(
            "Vault or GitHub authentication token missing and $HOME is not set. \
             Specify with {ENV_TOKEN}/{ENV_GITHUB_TOKEN} environment variable"
        ))
    })?;

    match read_token_file(&token_file_path(&home))? {
        Some(token) => Ok(Credential::vault(token)),
        None => Err(VaultLookupError::ConfigError(format!(
            "Vault or GitHub authentication token missing. Specify with \
             {ENV_TOKEN}/{ENV_GITHUB_TOKEN} environment variable or in $HOME/{TOKEN_FILE_NAME} \
             (Current $HOME value is {home})"
        ))),
    }
}

/// `<home>/.vault-token`
pub fn token_file_path(home: &str) -> PathBuf {
    Path::new(home).join(TOKEN_FILE_NAME)
}

/// Read and trim the token file.
///
/// A missing file (or one holding only whitespace) means "no token";
/// any other I/O failure is a config error.
fn read_token_file(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let token = contents.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(VaultLookupError::ConfigError(format!(
            "Error occurred when opening {}: {e}",
            path.display()
        ))),
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::MapEnv;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn env_address_wins_over_variable() {
        let env = MapEnv::new().with(ENV_ADDR, "https://env:8200");
        let vars: Variables = [(VAR_ADDR, "https://var:8200")].into_iter().collect();

        let cfg = ConnectionConfig::resolve(&env, &vars).unwrap();
        assert_eq!(cfg.address, "https://env:8200");
    }

    #[test]
    fn variable_address_used_when_env_missing() {
        let vars: Variables = [(VAR_ADDR, "https://var:8200/")].into_iter().collect();

        let cfg = ConnectionConfig::resolve(&MapEnv::new(), &vars).unwrap();
        assert_eq!(cfg.address, "https://var:8200");
    }

    #[test]
    fn empty_env_address_falls_through() {
        let env = MapEnv::new().with(ENV_ADDR, "");
        let vars: Variables = [(VAR_ADDR, "https://var:8200")].into_iter().collect();

        let cfg = ConnectionConfig::resolve(&env, &vars).unwrap();
        assert_eq!(cfg.address, "https://var:8200");
    }

    #[test]
    fn missing_address_is_config_error() {
        let err = ConnectionConfig::resolve(&MapEnv::new(), &Variables::new()).unwrap_err();
        assert!(matches!(err, VaultLookupError::ConfigError(_)));
        assert!(err.to_string().contains("Vault address not set"));
    }

    #[test]
    fn address_without_scheme_is_rejected() {
        let env = MapEnv::new().with(ENV_ADDR, "vault.example.com:8200");
        let err = ConnectionConfig::resolve(&env, &Variables::new()).unwrap_err();
        assert!(matches!(err, VaultLookupError::ConfigError(_)));
    }

    #[test]
    fn host_verification_defaults_on() {
        let env = MapEnv::new().with(ENV_ADDR, "https://vault");
        let cfg = ConnectionConfig::resolve(&env, &Variables::new()).unwrap();
        assert!(cfg.verify_host);
        assert!(!cfg.has_custom_ca());
    }

    #[test]
    fn ca_settings_resolve_from_env_and_variables() {
        let env = MapEnv::new()
            .with(ENV_ADDR, "https://vault")
            .with(ENV_CACERT, "/etc/ca.pem")
            .with(ENV_CAHOSTVERIFY, "no");
        let vars: Variables = [
            (VAR_CAPATH, "/etc/certs"),
            (VAR_CAHOSTVERIFY, "yes"),
        ]
        .into_iter()
        .collect();

        let cfg = ConnectionConfig::resolve(&env, &vars).unwrap();
        assert_eq!(cfg.ca_file, Some(PathBuf::from("/etc/ca.pem")));
        assert_eq!(cfg.ca_path, Some(PathBuf::from("/etc/certs")));
        assert!(!cfg.verify_host);
        assert!(cfg.has_custom_ca());
    }

    #[test]
    fn api_url_joins_cleanly() {
        let env = MapEnv::new().with(ENV_ADDR, "https://vault:8200/");
        let cfg = ConnectionConfig::resolve(&env, &Variables::new()).unwrap();
        assert_eq!(cfg.api_url("secret/foo"), "https://vault:8200/v1/secret/foo");
        assert_eq!(cfg.api_url("/secret/foo"), "https://vault:8200/v1/secret/foo");
    }

    #[test]
    fn vault_token_env_wins_over_github_token() {
        let env = MapEnv::new()
            .with(ENV_TOKEN, "s.vault")
            .with(ENV_GITHUB_TOKEN, "ghp_x");
        let cred = resolve_credential(&env).unwrap();
        assert!(matches!(cred, Credential::StaticVaultToken(ref t) if t.expose() == "s.vault"));
    }

    #[test]
    fn github_token_env_skips_token_file() {
        let home = TempDir::new().unwrap();
        fs::write(home.path().join(TOKEN_FILE_NAME), "s.from-file").unwrap();
        let env = MapEnv::new()
            .with(ENV_GITHUB_TOKEN, "ghp_x")
            .with(ENV_HOME, home.path().to_str().unwrap());

        let cred = resolve_credential(&env).unwrap();
        assert!(matches!(cred, Credential::GithubToken(ref t) if t.as_str() == "ghp_x"));
    }

    #[test]
    fn token_file_is_read_and_trimmed() {
        let home = TempDir::new().unwrap();
        fs::write(home.path().join(TOKEN_FILE_NAME), "  s.from-file\n").unwrap();
        let env = MapEnv::new().with(ENV_HOME, home.path().to_str().unwrap());

        let cred = resolve_credential(&env).unwrap();
        assert!(matches!(cred, Credential::StaticVaultToken(ref t) if t.expose() == "s.from-file"));
    }

    #[test]
    fn missing_token_file_is_config_error_naming_home() {
        let home = TempDir::new().unwrap();
        let home_str = home.path().to_str().unwrap();
        let env = MapEnv::new().with(ENV_HOME, home_str);

        let err = resolve_credential(&env).unwrap_err();
        assert!(matches!(err, VaultLookupError::ConfigError(_)));
        assert!(err.to_string().contains(home_str));
    }

    #[test]
    fn unreadable_token_file_is_config_error() {
        // A directory where the file should be: not "not found", so fatal.
        let home = TempDir::new().unwrap();
        fs::create_dir(home.path().join(TOKEN_FILE_NAME)).unwrap();
        let env = MapEnv::new().with(ENV_HOME, home.path().to_str().unwrap());

        let err = resolve_credential(&env).unwrap_err();
        assert!(err.to_string().contains("Error occurred when opening"));
    }

    #[test]
    fn missing_home_is_config_error() {
        let err = resolve_credential(&MapEnv::new()).unwrap_err();
        assert!(matches!(err, VaultLookupError::ConfigError(_)));
    }

    #[test]
    fn load_variables_from_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vars.toml");
        fs::write(
            &path,
            r#"
vault_addr = "https://vault:8200"
vault_cahostverify = false
retries = 3
"#,
        )
        .unwrap();

        let vars = Variables::load(&path).unwrap();
        assert_eq!(vars.get(VAR_ADDR), Some("https://vault:8200"));
        assert_eq!(vars.get(VAR_CAHOSTVERIFY), Some("no"));
        assert_eq!(vars.get("retries"), Some("3"));
    }

    #[test]
    fn load_variables_rejects_nested_tables() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vars.toml");
        fs::write(&path, "[vault]\naddr = \"x\"\n").unwrap();

        let err = Variables::load(&path).unwrap_err();
        assert!(matches!(err, VaultLookupError::ConfigError(_)));
    }

    #[test]
    fn load_variables_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vars.toml");
        fs::write(&path, "not valid {{toml").unwrap();
        assert!(Variables::load(&path).is_err());
    }
}
