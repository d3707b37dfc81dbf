//! Lookup entry point — turns terms plus caller variables into values.
//!
//! One call resolves config and credential, consults the cache, fetches
//! on a miss (exchanging a GitHub token first when needed) and projects
//! the requested field.

pub mod terms;

use serde_json::Value;

use crate::config::{resolve_credential, ConnectionConfig, ReadEnv, SystemEnv, Variables};
use crate::errors::{Result, VaultLookupError};
use crate::vault::{Credential, HttpBackend, ResultCache, SecretResult, VaultBackend, VaultToken};

pub use terms::{LookupRequest, ParameterMode, Parameters};

/// A lookup context: backend, environment and the cache it owns.
pub struct Lookup<B = HttpBackend, E = SystemEnv> {
    backend: B,
    env: E,
    cache: ResultCache,
    mode: ParameterMode,
}

impl Lookup {
    /// Production setup: real HTTP, process environment, and a cache whose
    /// enable flag is read from the environment now.
    pub fn from_env() -> Self {
        let env = SystemEnv;
        let cache = ResultCache::from_env(&env);
        Self::new(HttpBackend::new(), env, cache)
    }
}

impl<B: VaultBackend, E: ReadEnv> Lookup<B, E> {
    pub fn new(backend: B, env: E, cache: ResultCache) -> Self {
        Self {
            backend,
            env,
            cache,
            mode: ParameterMode::default(),
        }
    }

    pub fn with_parameter_mode(mut self, mode: ParameterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Run one lookup.
    ///
    /// Returns a single-element list: the requested field's value, or the
    /// whole `data` object when no field was given.
    pub fn run<S: AsRef<str>>(&self, terms: &[S], variables: &Variables) -> Result<Vec<Value>> {
        let request = LookupRequest::parse(terms, self.mode)?;

        // Resolved up front so a missing credential fails even on a cache hit.
        let config = ConnectionConfig::resolve(&self.env, variables)?;
        let credential = resolve_credential(&self.env)?;

        let result = match self.cache.get(&request.key) {
            Some(cached) => {
                tracing::debug!(key = %request.key, "serving secret from cache");
                cached
            }
            None => {
                let fetched = self.fetch(&request, &credential, &config)?;
                self.cache.put(&request.key, fetched.clone());
                fetched
            }
        };

        project(&request, &result).map(|value| vec![value])
    }

    fn fetch(
        &self,
        request: &LookupRequest,
        credential: &Credential,
        config: &ConnectionConfig,
    ) -> Result<SecretResult> {
        let exchanged: VaultToken;
        let token = match credential {
            Credential::StaticVaultToken(token) => token,
            Credential::GithubToken(github) => {
                exchanged = self.backend.fetch_token(github, config)?;
                &exchanged
            }
        };

        let body = request.parameters.to_json_body()?;
        self.backend
            .fetch_secret(&request.key, body.as_deref(), token, config)
    }
}

fn project(request: &LookupRequest, result: &SecretResult) -> Result<Value> {
    match &request.field {
        None => Ok(result.to_value()),
        Some(field) => result
            .field(field)
            .cloned()
            .ok_or_else(|| VaultLookupError::FieldNotFound {
                key: request.key.clone(),
                field: field.clone(),
            }),
    }
}
