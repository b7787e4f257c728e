//! Cached, lazily loaded configuration with typed lookups

use crate::config::catalog::{Param, ParamValue};
use crate::config::error::{ConfigError, Result};
use crate::config::loader::{load_configuration, Sources};
use crate::domain::{ConfigEnum, Origin, RawConfiguration};
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static GLOBAL: Lazy<ConfigurationStore> = Lazy::new(ConfigurationStore::from_environment);

/// Single source of truth for typed configuration values.
///
/// The merged sources are read on first access and cached until
/// [`force_reload`](Self::force_reload). Concurrent first readers load once;
/// readers work on an `Arc` snapshot and never see a partially built map.
///
/// Every defaulted accessor treats a value that is empty after trimming the
/// same as a missing key.
#[derive(Debug)]
pub struct ConfigurationStore {
    sources: Sources,
    cache: RwLock<Option<Arc<RawConfiguration>>>,
}

impl ConfigurationStore {
    pub fn new(sources: Sources) -> Self {
        Self { sources, cache: RwLock::new(None) }
    }

    /// Bundled base plus the override file named in the environment.
    pub fn from_environment() -> Self {
        Self::new(Sources::default())
    }

    /// Process-wide store over [`from_environment`](Self::from_environment).
    /// Prefer passing a store by reference where the caller owns one.
    pub fn global() -> &'static ConfigurationStore {
        &GLOBAL
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    /// The cached configuration, loading it first if needed.
    pub fn load(&self) -> Result<Arc<RawConfiguration>> {
        if let Some(raw) = self.read_cache().as_ref() {
            return Ok(Arc::clone(raw));
        }

        let mut cache = self.write_cache();
        if let Some(raw) = cache.as_ref() {
            return Ok(Arc::clone(raw));
        }
        let raw = Arc::new(load_configuration(&self.sources)?);
        *cache = Some(Arc::clone(&raw));
        Ok(raw)
    }

    /// Discard the cache and read the sources again. Meant for test
    /// isolation; a failed reload leaves the cache empty so the next access
    /// retries.
    pub fn force_reload(&self) -> Result<()> {
        let mut cache = self.write_cache();
        *cache = None;
        let raw = load_configuration(&self.sources)?;
        tracing::debug!(keys = raw.len(), "Reloaded HAPI properties");
        *cache = Some(Arc::new(raw));
        Ok(())
    }

    /// Set a value directly in the cached map, bypassing the file sources.
    /// Lost on the next reload.
    pub fn set_override(&self, key: &str, value: &str) -> Result<()> {
        let mut cache = self.write_cache();
        if cache.is_none() {
            *cache = Some(Arc::new(load_configuration(&self.sources)?));
        }
        if let Some(raw) = cache.as_mut() {
            Arc::make_mut(raw).set(key, value);
        }
        tracing::debug!(key, value, "Runtime property override");
        Ok(())
    }

    /// Raw lookup with no default. A present but empty value is returned as is.
    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.get(key).map(str::to_string))
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.configured(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Only a case-insensitive `true` is true. Anything else is false, never
    /// an error.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        let Some(value) = self.configured(key)? else {
            return Ok(default);
        };
        let parsed = value.eq_ignore_ascii_case("true");
        if !parsed && !value.eq_ignore_ascii_case("false") {
            tracing::warn!(key, value = %value, "Non-boolean property value treated as false");
        }
        Ok(parsed)
    }

    /// Malformed values are an error, not the default.
    pub fn get_int(&self, key: &str, default: i32) -> Result<i32> {
        match self.configured(key)? {
            Some(value) => value.parse().map_err(|_| ConfigError::invalid(key, &value, "integer")),
            None => Ok(default),
        }
    }

    /// Like [`get_int`](Self::get_int), with a textual default that is
    /// parsed the same way as a configured value.
    pub fn get_long(&self, key: &str, default: &str) -> Result<i64> {
        let value = self.configured(key)?.unwrap_or_else(|| default.to_string());
        value.parse().map_err(|_| ConfigError::invalid(key, &value, "long integer"))
    }

    /// Exact-name match against `E`'s constants.
    pub fn get_enum<E: ConfigEnum>(&self, key: &str, default: E) -> Result<E> {
        match self.configured(key)? {
            Some(value) => E::from_name(&value).ok_or_else(|| {
                ConfigError::invalid(
                    key,
                    &value,
                    format!("{} (one of {})", E::TYPE_NAME, E::NAMES.join(", ")),
                )
            }),
            None => Ok(default),
        }
    }

    /// Comma-separated values, trimmed, blanks dropped.
    pub fn get_string_set(&self, key: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .get_string(key)?
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Resolve a catalog parameter.
    pub fn get<T: ParamValue>(&self, param: &Param<T>) -> Result<T> {
        T::resolve(self, param.key(), param.default_value())
    }

    /// Which layer supplied `key`, or `None` when the default applies.
    pub fn origin(&self, key: &str) -> Result<Option<Origin>> {
        Ok(self
            .load()?
            .entry(key)
            .filter(|entry| !entry.value.trim().is_empty())
            .map(|entry| entry.origin))
    }

    fn configured(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_string(key)?.filter(|value| !value.trim().is_empty()))
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, Option<Arc<RawConfiguration>>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, Option<Arc<RawConfiguration>>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}
