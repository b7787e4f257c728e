//! Check command implementation

use anyhow::Result;

use crate::config::{ConfigurationStore, CATALOG};

pub fn run(store: &ConfigurationStore) -> Result<()> {
    let raw = store.load()?;

    let failures: Vec<_> = CATALOG
        .iter()
        .filter_map(|descriptor| descriptor.resolve_display(store).err())
        .collect();

    if failures.is_empty() {
        println!(
            "OK: {} parameters resolved ({} keys configured)",
            CATALOG.len(),
            raw.len()
        );
        return Ok(());
    }

    for failure in &failures {
        eprintln!("error: {failure}");
    }
    anyhow::bail!("{} configuration value(s) failed to convert", failures.len())
}
