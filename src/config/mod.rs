//! Connection settings, credentials and caller variables.
//!
//! Environment variables take precedence over caller variables, which take
//! precedence over the on-disk token file.

pub mod env;
pub mod settings;

pub use env::{MapEnv, ReadEnv, SystemEnv};
pub use settings::{resolve_credential, token_file_path, ConnectionConfig, Variables};
