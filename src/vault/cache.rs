//! Memoizes fetched secrets by lookup key.
//!
//! Entries live as long as the cache does: no eviction, no TTL, no bound.
//! The key is the Vault path only, so a second lookup for the same path
//! with another field or other parameters is served the first payload.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::config::ReadEnv;

use super::SecretResult;

/// Environment variable that turns the cache on or off.
pub const ENV_USE_CACHE: &str = "ANSIBLE_HASHICORP_VAULT_USE_CACHE";

#[derive(Debug)]
pub struct ResultCache {
    enabled: bool,
    entries: Mutex<HashMap<String, SecretResult>>,
}

impl ResultCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn enabled() -> Self {
        Self::new(true)
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Build a cache whose enable flag comes from `ANSIBLE_HASHICORP_VAULT_USE_CACHE`.
    ///
    /// `yes`, `1` and `true` (any case) enable it; unset also enables it.
    /// The flag is read once here and never again.
    pub fn from_env(env: &impl ReadEnv) -> Self {
        let enabled = match env.var(ENV_USE_CACHE) {
            Ok(v) => matches!(v.to_ascii_lowercase().as_str(), "yes" | "1" | "true"),
            Err(_) => true,
        };
        Self::new(enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cached result for `key`. Always `None` when disabled.
    pub fn get(&self, key: &str) -> Option<SecretResult> {
        if !self.enabled {
            return None;
        }
        self.lock().get(key).cloned()
    }

    /// Store `result` under `key`. No-op when disabled.
    pub fn put(&self, key: &str, result: SecretResult) {
        if self.enabled {
            self.lock().insert(key.to_string(), result);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SecretResult>> {
        // Entries are only ever inserted whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::enabled()
    }
}
