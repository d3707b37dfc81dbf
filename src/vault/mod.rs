//! Vault module — talking to a HashiCorp Vault server.
//!
//! This module provides:
//! - `Credential` and `VaultToken` types (`credential`)
//! - The `VaultBackend` trait and its `ureq` implementation (`client`)
//! - `SecretResult`, the parsed `data` envelope (`secret`)
//! - `ResultCache`, per-key memoization of fetched secrets (`cache`)
//! - rustls setup for a custom CA (`tls`)

pub mod cache;
pub mod client;
pub mod credential;
pub mod secret;
mod tls;

// Re-export the most commonly used items.
pub use cache::ResultCache;
pub use client::{HttpBackend, VaultBackend};
pub use credential::{Credential, VaultToken};
pub use secret::SecretResult;
