//! The payload returned by a Vault read or write.

use serde_json::{Map, Value};

use crate::errors::{Result, VaultLookupError};

/// The `data` object of a Vault response envelope.
///
/// Immutable once fetched; the cache hands out clones.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretResult {
    pub data: Map<String, Value>,
}

impl SecretResult {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Extract `data` from a full response body read from `key`.
    pub fn from_envelope(key: &str, body: &str) -> Result<Self> {
        let envelope: Value = serde_json::from_str(body)
            .map_err(|e| VaultLookupError::fetch(key, format!("invalid JSON response: {e}")))?;

        match envelope.get("data") {
            Some(Value::Object(data)) => Ok(Self::new(data.clone())),
            Some(other) => Err(VaultLookupError::fetch(
                key,
                format!("response 'data' is not an object: {other}"),
            )),
            None => Err(VaultLookupError::fetch(key, "response has no 'data' field")),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// The whole payload as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_data_object() {
        let result =
            SecretResult::from_envelope("secret/foo", r#"{"lease_id":"","data":{"bar":"baz"}}"#)
                .unwrap();
        assert_eq!(result.field("bar"), Some(&json!("baz")));
        assert_eq!(result.to_value(), json!({"bar": "baz"}));
    }

    #[test]
    fn missing_data_names_the_key() {
        let err = SecretResult::from_envelope("secret/foo", r#"{"errors":[]}"#).unwrap_err();
        assert!(matches!(err, VaultLookupError::FetchError { .. }));
        assert!(err.to_string().contains("secret/foo"));
    }

    #[test]
    fn non_object_data_is_rejected() {
        let err = SecretResult::from_envelope("secret/foo", r#"{"data":"nope"}"#).unwrap_err();
        assert!(matches!(err, VaultLookupError::FetchError { .. }));
    }

    #[test]
    fn empty_body_is_rejected() {
        assert!(SecretResult::from_envelope("secret/foo", "").is_err());
    }
}
