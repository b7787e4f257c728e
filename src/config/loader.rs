//! Source resolution and layering
//!
//! Precedence (lowest to highest):
//! 1. Base source (the bundled `hapi.properties` unless replaced)
//! 2. Override file, when one is configured explicitly or through the
//!    `hapi.properties` / `HAPI_PROPERTIES` environment setting

use crate::config::encoding;
use crate::config::error::{ConfigError, Result};
use crate::config::properties::Properties;
use crate::domain::RawConfiguration;
use figment::providers::Format;
use figment::Figment;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Logical name of the bundled base resource, also the primary name of the
/// override setting.
pub const HAPI_PROPERTIES: &str = "hapi.properties";

/// Shell-friendly spelling of the override setting.
pub const HAPI_PROPERTIES_ENV: &str = "HAPI_PROPERTIES";

const BUNDLED_PROPERTIES: &str = include_str!("../../resources/hapi.properties");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BaseSource {
    #[default]
    Bundled,
    File(PathBuf),
    /// Properties text supplied directly, mostly for tests and embedding.
    Inline(String),
}

impl BaseSource {
    pub fn describe(&self) -> String {
        match self {
            BaseSource::Bundled => format!("bundled {HAPI_PROPERTIES}"),
            BaseSource::File(path) => path.display().to_string(),
            BaseSource::Inline(_) => "inline properties".to_string(),
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            BaseSource::Bundled => Ok(BUNDLED_PROPERTIES.to_string()),
            BaseSource::File(path) => read_file(path),
            BaseSource::Inline(text) => Ok(text.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverrideSource {
    /// Read the path from the environment, if set.
    #[default]
    Environment,
    File(PathBuf),
    Disabled,
}

impl OverrideSource {
    /// The override file to read, if any.
    pub fn resolve(&self) -> Option<PathBuf> {
        match self {
            OverrideSource::Environment => override_path_from_env(),
            OverrideSource::File(path) => Some(path.clone()),
            OverrideSource::Disabled => None,
        }
    }
}

/// Where the base and override layers come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sources {
    pub base: BaseSource,
    pub override_source: OverrideSource,
}

impl Sources {
    pub fn new(base: BaseSource, override_source: OverrideSource) -> Self {
        Self { base, override_source }
    }

    /// Inline base text with no override layer.
    pub fn inline(text: impl Into<String>) -> Self {
        Self::new(BaseSource::Inline(text.into()), OverrideSource::Disabled)
    }

    pub fn with_base(mut self, base: BaseSource) -> Self {
        self.base = base;
        self
    }

    pub fn with_override(mut self, override_source: OverrideSource) -> Self {
        self.override_source = override_source;
        self
    }
}

/// Read the base source, overlay the override file if one is configured, and
/// return the merged view. Any unreadable or malformed layer fails the whole
/// load.
pub fn load_configuration(sources: &Sources) -> Result<RawConfiguration> {
    let base_name = sources.base.describe();
    let base = Properties::string(&sources.base.read()?);
    let base_keys = extract_layer(&base_name, Figment::from(base.clone()))?.len();
    tracing::debug!(source = %base_name, keys = base_keys, "Loaded base properties");

    let mut figment = Figment::from(base);

    let overridden = match sources.override_source.resolve() {
        Some(path) => {
            let name = path.display().to_string();
            let layer = Properties::string(&read_file(&path)?);
            let keys = extract_layer(&name, Figment::from(layer.clone()))?;
            tracing::info!(source = %name, keys = keys.len(), "Applying override properties");
            figment = figment.merge(layer);
            keys
        }
        None => BTreeMap::new(),
    };

    let merged = extract_layer(&format!("merged {HAPI_PROPERTIES} layers"), figment)?;
    Ok(RawConfiguration::from_layers(merged, &overridden))
}

fn override_path_from_env() -> Option<PathBuf> {
    [HAPI_PROPERTIES, HAPI_PROPERTIES_ENV]
        .into_iter()
        .filter_map(std::env::var_os)
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn read_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| ConfigError::Load {
        source_name: path.display().to_string(),
        source,
    })?;
    Ok(encoding::decode(&bytes).into_owned())
}

fn extract_layer(name: &str, figment: Figment) -> Result<BTreeMap<String, String>> {
    figment.extract().map_err(|e| ConfigError::Parse {
        source_name: name.to_string(),
        message: e.to_string(),
    })
}
