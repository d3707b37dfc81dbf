//! `vault-lookup lookup` — run one lookup and print the result list.

use serde_json::Value;

use crate::cli::{parameter_mode, variables, Cli};
use crate::errors::{Result, VaultLookupError};
use crate::lookup::Lookup;

/// Execute the `lookup` command.
pub fn execute(cli: &Cli, term: &str, field: Option<&str>, raw: bool) -> Result<()> {
    let vars = variables(cli)?;
    let lookup = Lookup::from_env().with_parameter_mode(parameter_mode(cli));

    let mut terms = vec![term];
    terms.extend(field);

    let values = lookup.run(terms.as_slice(), &vars)?;
    println!("{}", render(&values, raw)?);

    Ok(())
}

/// Pretty JSON, or the bare string when `raw` and the single result is one.
fn render(values: &[Value], raw: bool) -> Result<String> {
    if raw {
        if let [Value::String(s)] = values {
            return Ok(s.clone());
        }
    }
    serde_json::to_string_pretty(values)
        .map_err(|e| VaultLookupError::SerializationError(e.to_string()))
}
