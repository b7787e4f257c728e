//! Command-line interface for hapi-config
//!
//! Provides `show`, `get` and `check` subcommands over the layered
//! `hapi.properties` sources.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ConfigurationStore;

mod check;
mod get;
mod show;
mod utils;

/// Inspect the layered properties of a HAPI FHIR JPA server
#[derive(Parser)]
#[command(name = "hapi-config")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base properties file (defaults to the bundled hapi.properties)
    #[arg(long, global = true, value_name = "FILE")]
    base: Option<PathBuf>,

    /// Override properties file; its values win over the base. Without it the
    /// `hapi.properties` or `HAPI_PROPERTIES` environment setting is used
    #[arg(long = "properties", global = true, value_name = "FILE")]
    properties: Option<PathBuf>,

    /// Ignore any override file, including one named in the environment
    #[arg(long, global = true)]
    no_override: bool,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every known parameter with its resolved value and origin
    Show(show::ShowArgs),

    /// Print the resolved value of one property
    Get(get::GetArgs),

    /// Resolve every known parameter and report values that fail to convert
    Check,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let sources =
        utils::sources_from_args(cli.base.as_deref(), cli.properties.as_deref(), cli.no_override);
    let store = ConfigurationStore::new(sources);

    match cli.command {
        Commands::Show(args) => show::run(&store, args),
        Commands::Get(args) => get::run(&store, args),
        Commands::Check => check::run(&store),
    }
}
