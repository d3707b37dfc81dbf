//! Parsing of lookup terms.
//!
//! The first term is `"<vault-path> [name=value ...]"`, the optional
//! second term names the field to project out of the secret.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::{Result, VaultLookupError};

/// How malformed `name=value` tokens are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterMode {
    /// Any malformed token silently drops the whole parameter block and
    /// the lookup proceeds as a plain read.
    #[default]
    Lenient,
    /// Any malformed token fails the lookup with `InvalidTerm`.
    Strict,
}

/// Ordered `name=value` pairs. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    /// Insert or replace, keeping the first position of a repeated name.
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Request body for a Vault write, or `None` for a read.
    pub fn to_json_body(&self) -> Result<Option<String>> {
        if self.is_empty() {
            return Ok(None);
        }
        serde_json::to_string(self)
            .map(Some)
            .map_err(|e| VaultLookupError::SerializationError(e.to_string()))
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A parsed lookup call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// Vault path, e.g. `secret/foo`.
    pub key: String,
    pub parameters: Parameters,
    pub field: Option<String>,
}

impl LookupRequest {
    /// Parse raw terms. Terms beyond the second are ignored.
    pub fn parse<S: AsRef<str>>(terms: &[S], mode: ParameterMode) -> Result<Self> {
        let first = terms
            .first()
            .map(AsRef::as_ref)
            .ok_or_else(|| VaultLookupError::InvalidTerm("no terms given".into()))?;

        let (key, rest) = match first.split_once(' ') {
            Some((key, rest)) => (key, Some(rest)),
            None => (first, None),
        };

        if key.is_empty() {
            return Err(VaultLookupError::InvalidTerm(format!(
                "'{first}' does not start with a Vault path"
            )));
        }

        let parameters = match rest {
            None => Parameters::default(),
            Some(rest) => match (parse_parameters(rest), mode) {
                (Ok(params), _) => params,
                (Err(token), ParameterMode::Strict) => {
                    return Err(VaultLookupError::InvalidTerm(format!(
                        "malformed parameter '{token}' in '{first}' (expected name=value)"
                    )))
                }
                (Err(token), ParameterMode::Lenient) => {
                    tracing::debug!(%key, %token, "dropping malformed parameter block");
                    Parameters::default()
                }
            },
        };

        let field = terms.get(1).map(|f| f.as_ref().to_string());

        Ok(Self {
            key: key.to_string(),
            parameters,
            field,
        })
    }
}

/// Split `rest` on single spaces into `name=value` pairs.
///
/// Returns the first offending token on failure. Repeated spaces yield an
/// empty token, which counts as malformed.
fn parse_parameters(rest: &str) -> std::result::Result<Parameters, String> {
    let mut params = Parameters::default();
    for token in rest.split(' ') {
        let mut parts = token.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(value), None) if !name.is_empty() && !value.is_empty() => {
                params.insert(name, value);
            }
            _ => return Err(token.to_string()),
        }
    }
    Ok(params)
}
