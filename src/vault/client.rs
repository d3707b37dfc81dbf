//! Blocking HTTP client for the two Vault endpoints a lookup needs.
//!
//! - `POST /v1/auth/github/login` exchanges a GitHub token for a client token
//! - `GET|POST /v1/{path}` reads (no body) or writes (JSON body) a secret
//!
//! Nothing here retries and no timeouts are set: the first failure is
//! returned to the caller.

use std::sync::Arc;

use serde::Deserialize;
use ureq::{Agent, AgentBuilder};

use crate::config::ConnectionConfig;
use crate::errors::{Result, VaultLookupError};

use super::{tls, SecretResult, VaultToken};

/// Path of the GitHub auth backend's login endpoint.
pub const GITHUB_LOGIN_PATH: &str = "auth/github/login";

/// Token acquisition and secret fetch, as seen by a `Lookup`.
pub trait VaultBackend {
    /// Exchange a GitHub personal-access token for a Vault client token.
    fn fetch_token(&self, github_token: &str, config: &ConnectionConfig) -> Result<VaultToken>;

    /// Read `key`, or write to it when `body` is given, and return its `data`.
    fn fetch_secret(
        &self,
        key: &str,
        body: Option<&str>,
        token: &VaultToken,
        config: &ConnectionConfig,
    ) -> Result<SecretResult>;
}

impl<B: VaultBackend + ?Sized> VaultBackend for &B {
    fn fetch_token(&self, github_token: &str, config: &ConnectionConfig) -> Result<VaultToken> {
        (**self).fetch_token(github_token, config)
    }

    fn fetch_secret(
        &self,
        key: &str,
        body: Option<&str>,
        token: &VaultToken,
        config: &ConnectionConfig,
    ) -> Result<SecretResult> {
        (**self).fetch_secret(key, body, token, config)
    }
}

/// Talks to a real Vault server over HTTP(S) with `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpBackend;

#[derive(Deserialize)]
struct LoginResponse {
    auth: Option<LoginAuth>,
}

#[derive(Deserialize)]
struct LoginAuth {
    client_token: Option<String>,
}

impl HttpBackend {
    pub fn new() -> Self {
        Self
    }

    fn user_agent() -> String {
        format!("vault-lookup/{}", env!("CARGO_PKG_VERSION"))
    }
}

impl VaultBackend for HttpBackend {
    fn fetch_token(&self, github_token: &str, config: &ConnectionConfig) -> Result<VaultToken> {
        let url = config.api_url(GITHUB_LOGIN_PATH);
        tracing::debug!(%url, "exchanging GitHub token for a Vault token");

        let agent = build_agent(config).map_err(VaultLookupError::AuthError)?;
        let body = serde_json::json!({ "token": github_token }).to_string();

        let response = agent
            .post(&url)
            .set("User-Agent", &Self::user_agent())
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(|e| VaultLookupError::AuthError(e.to_string()))?;

        let text = response
            .into_string()
            .map_err(|e| VaultLookupError::AuthError(e.to_string()))?;

        let login: LoginResponse = serde_json::from_str(&text)
            .map_err(|e| VaultLookupError::AuthError(format!("invalid JSON response: {e}")))?;

        login
            .auth
            .and_then(|auth| auth.client_token)
            .map(VaultToken::new)
            .ok_or_else(|| {
                VaultLookupError::AuthError("response has no auth.client_token".to_string())
            })
    }

    fn fetch_secret(
        &self,
        key: &str,
        body: Option<&str>,
        token: &VaultToken,
        config: &ConnectionConfig,
    ) -> Result<SecretResult> {
        let url = config.api_url(key);
        let agent = build_agent(config).map_err(|e| VaultLookupError::fetch(key, e))?;
        let user_agent = Self::user_agent();

        // A body turns the request into a Vault write.
        let sent = match body {
            Some(body) => {
                tracing::debug!(%url, "writing to Vault path");
                agent
                    .post(&url)
                    .set("User-Agent", &user_agent)
                    .set("X-Vault-Token", token.expose())
                    .set("Content-Type", "application/json")
                    .send_string(body)
            }
            None => {
                tracing::debug!(%url, "reading Vault path");
                agent
                    .get(&url)
                    .set("User-Agent", &user_agent)
                    .set("X-Vault-Token", token.expose())
                    .set("Content-Type", "application/json")
                    .call()
            }
        };

        let response = sent.map_err(|e| VaultLookupError::fetch(key, e))?;
        let text = response
            .into_string()
            .map_err(|e| VaultLookupError::fetch(key, e))?;

        SecretResult::from_envelope(key, &text)
    }
}

// ── Agent ────────────────────────────────────────────────────────────

/// Build an agent for `config`.
///
/// Without a custom CA the platform defaults apply, hostname checks
/// included, regardless of `verify_host`.
fn build_agent(config: &ConnectionConfig) -> std::result::Result<Agent, String> {
    if !config.has_custom_ca() {
        return Ok(AgentBuilder::new().build());
    }

    let tls = tls::client_config(config)?;
    Ok(AgentBuilder::new().tls_config(Arc::new(tls)).build())
}
