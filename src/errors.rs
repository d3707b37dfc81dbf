use thiserror::Error;

/// All errors that can occur during a Vault lookup.
#[derive(Debug, Error)]
pub enum VaultLookupError {
    // --- Config errors ---
    #[error("{0}")]
    ConfigError(String),

    // --- Vault errors ---
    #[error("Unable to retrieve personal token from vault: {0}")]
    AuthError(String),

    #[error("Unable to read {key} from vault: {reason}")]
    FetchError { key: String, reason: String },

    // --- Lookup errors ---
    #[error("Field '{field}' not found in secret {key}")]
    FieldNotFound { key: String, field: String },

    #[error("Invalid lookup term: {0}")]
    InvalidTerm(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl VaultLookupError {
    /// Shorthand for a fetch failure on `key`.
    pub fn fetch(key: &str, reason: impl std::fmt::Display) -> Self {
        Self::FetchError {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience type alias for lookup results.
pub type Result<T> = std::result::Result<T, VaultLookupError>;
