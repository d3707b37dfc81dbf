//! Credentials used to talk to Vault.
//!
//! Token strings are wiped from memory on drop and never appear in
//! `Debug` output, so they can't leak through logs or error messages.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// A Vault client token, sent as `X-Vault-Token`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct VaultToken(String);

impl VaultToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VaultToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultToken(<redacted>)")
    }
}

/// How a lookup authenticates.
///
/// A static Vault token is used as-is. A GitHub token has to be exchanged
/// for a Vault client token first (see `HttpBackend::fetch_token`).
#[derive(Clone)]
pub enum Credential {
    StaticVaultToken(VaultToken),
    GithubToken(Zeroizing<String>),
}

impl Credential {
    pub fn github(token: impl Into<String>) -> Self {
        Self::GithubToken(Zeroizing::new(token.into()))
    }

    pub fn vault(token: impl Into<String>) -> Self {
        Self::StaticVaultToken(VaultToken::new(token))
    }

    /// Short label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StaticVaultToken(_) => "vault-token",
            Self::GithubToken(_) => "github-token",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential::{}(<redacted>)", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_tokens() {
        let token = VaultToken::new("s.supersecret");
        assert!(!format!("{token:?}").contains("supersecret"));

        let cred = Credential::github("ghp_abcdef");
        let shown = format!("{cred:?}");
        assert!(!shown.contains("ghp_abcdef"));
        assert!(shown.contains("github-token"));
    }

    #[test]
    fn expose_returns_raw_token() {
        assert_eq!(VaultToken::new("s.abc").expose(), "s.abc");
    }
}
