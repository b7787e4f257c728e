//! The merged key/value view of the configuration sources

use std::collections::BTreeMap;

/// Where a configured value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Base,
    Override,
    /// Injected at runtime through `ConfigurationStore::set_override`.
    Runtime,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Base => "base",
            Origin::Override => "override",
            Origin::Runtime => "runtime",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub value: String,
    pub origin: Origin,
}

/// Flat string-to-string configuration, already layered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfiguration {
    entries: BTreeMap<String, Entry>,
}

impl RawConfiguration {
    /// Build from the merged values, tagging every key the override layer
    /// defined.
    pub fn from_layers(
        merged: BTreeMap<String, String>,
        overridden: &BTreeMap<String, String>,
    ) -> Self {
        let entries = merged
            .into_iter()
            .map(|(key, value)| {
                let origin =
                    if overridden.contains_key(&key) { Origin::Override } else { Origin::Base };
                (key, Entry { value, origin })
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|entry| entry.value.as_str())
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Entry { value: value.into(), origin: Origin::Runtime });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn from_layers_tags_override_keys() {
        let merged = map(&[("a", "1"), ("b", "2")]);
        let overridden = map(&[("b", "2")]);
        let raw = RawConfiguration::from_layers(merged, &overridden);

        assert_eq!(raw.entry("a").map(|e| e.origin), Some(Origin::Base));
        assert_eq!(raw.entry("b").map(|e| e.origin), Some(Origin::Override));
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn set_marks_runtime_origin() {
        let mut raw = RawConfiguration::default();
        raw.set("cors.enabled", "false");
        assert_eq!(raw.get("cors.enabled"), Some("false"));
        assert_eq!(raw.entry("cors.enabled").map(|e| e.origin), Some(Origin::Runtime));
    }
}
