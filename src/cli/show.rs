//! Show command implementation

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::config::{ConfigurationStore, CATALOG};

#[derive(Args)]
pub struct ShowArgs {
    /// Emit JSON instead of aligned text
    #[arg(long)]
    pub json: bool,

    /// Only list parameters that a source actually sets
    #[arg(long)]
    pub configured: bool,
}

#[derive(Serialize)]
struct ResolvedParam {
    key: &'static str,
    #[serde(rename = "type")]
    type_name: &'static str,
    value: String,
    default: String,
    origin: &'static str,
}

pub fn run(store: &ConfigurationStore, args: ShowArgs) -> Result<()> {
    let mut resolved = Vec::with_capacity(CATALOG.len());
    for descriptor in CATALOG {
        let key = descriptor.key();
        let value = descriptor
            .resolve_display(store)
            .with_context(|| format!("Failed to resolve {key}"))?;
        let origin = store.origin(key)?.map_or("default", |origin| origin.as_str());
        if args.configured && origin == "default" {
            continue;
        }
        resolved.push(ResolvedParam {
            key,
            type_name: descriptor.type_name(),
            value,
            default: descriptor.default_display(),
            origin,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    let key_width = resolved.iter().map(|param| param.key.len()).max().unwrap_or(0);
    let value_width = resolved.iter().map(|param| param.value.len()).max().unwrap_or(0);
    let type_width = resolved.iter().map(|param| param.type_name.len()).max().unwrap_or(0);
    for param in &resolved {
        println!(
            "{:<key_width$}  {:<value_width$}  {:<type_width$}  default: {}  [{}]",
            param.key, param.value, param.type_name, param.default, param.origin
        );
    }

    Ok(())
}
