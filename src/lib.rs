pub mod cli;
pub mod config;
pub mod errors;
pub mod lookup;
pub mod vault;

pub use errors::{Result, VaultLookupError};
pub use lookup::Lookup;
