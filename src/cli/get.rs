//! Get command implementation

use anyhow::{Context, Result};
use clap::Args;

use crate::config::{catalog, ConfigurationStore};

#[derive(Args)]
pub struct GetArgs {
    /// Property key, e.g. `fhir_version` or `cors.enabled`
    #[arg(value_name = "KEY")]
    pub key: String,
}

/// Catalog keys print their typed value (default included); any other key
/// prints its raw configured value.
pub fn run(store: &ConfigurationStore, args: GetArgs) -> Result<()> {
    let key = args.key.as_str();

    if let Some(descriptor) = catalog::find(key) {
        let value = descriptor
            .resolve_display(store)
            .with_context(|| format!("Failed to resolve {key}"))?;
        println!("{value}");
        return Ok(());
    }

    match store.get_string(key)? {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => anyhow::bail!("Unknown property with no configured value: {key}"),
    }
}
