//! The property metadata index.

use crate::{PropertyMetadata, Result, ValueHint};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::debug;

/// Lookup service over indexed configuration properties.
///
/// The editor only ever reads from an index, so implementations are shared
/// between editors behind a `&dyn PropertyIndex`.
pub trait PropertyIndex: Send + Sync {
    /// The property whose path is exactly `path`.
    fn find_exact(&self, path: &str) -> Option<&PropertyMetadata>;

    /// Every property whose path starts with the string `prefix`, in path
    /// order. Pass `"server."` to get the properties below `server`.
    fn find_with_prefix(&self, prefix: &str) -> Vec<&PropertyMetadata>;

    fn is_empty(&self) -> bool;

    /// True if at least one property path starts with `prefix`.
    fn has_prefix(&self, prefix: &str) -> bool {
        !self.find_with_prefix(prefix).is_empty()
    }
}

/// In-memory [`PropertyIndex`] ordered by path.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    properties: BTreeMap<String, PropertyMetadata>,
}

/// Shape of a configuration-metadata JSON document.
#[derive(Deserialize)]
struct MetadataDocument {
    #[serde(default)]
    properties: Vec<PropertyMetadata>,
    #[serde(default)]
    hints: Vec<HintEntry>,
}

#[derive(Deserialize)]
struct HintEntry {
    name: String,
    #[serde(default)]
    values: Vec<ValueHint>,
}

impl MetadataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration-metadata JSON document
    /// (`{"properties": [...], "hints": [...]}`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if the document does not deserialize.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: MetadataDocument = serde_json::from_str(json)?;
        let mut index = Self::new();
        index.extend(document.properties);
        for hint in document.hints {
            if let Some(property) = index.properties.get_mut(&hint.name) {
                property.hints.extend(hint.values);
            }
        }
        debug!(properties = index.len(), "loaded metadata index");
        Ok(index)
    }

    /// Add a property.
    ///
    /// A path indexed twice (the same property bound from several source
    /// types) keeps the first record and accumulates the setter references.
    pub fn add(&mut self, mut property: PropertyMetadata) {
        if property.targets.is_empty() {
            let derived = property.derived_target();
            property.targets.extend(derived);
        }
        match self.properties.get_mut(&property.path) {
            Some(existing) => {
                for target in property.targets {
                    if !existing.targets.contains(&target) {
                        existing.targets.push(target);
                    }
                }
            }
            None => {
                self.properties.insert(property.path.clone(), property);
            }
        }
    }

    /// Builder-style [`MetadataIndex::add`].
    pub fn with(mut self, property: PropertyMetadata) -> Self {
        self.add(property);
        self
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyMetadata> {
        self.properties.values()
    }
}

impl Extend<PropertyMetadata> for MetadataIndex {
    fn extend<I: IntoIterator<Item = PropertyMetadata>>(&mut self, iter: I) {
        for property in iter {
            self.add(property);
        }
    }
}

impl FromIterator<PropertyMetadata> for MetadataIndex {
    fn from_iter<I: IntoIterator<Item = PropertyMetadata>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

impl PropertyIndex for MetadataIndex {
    fn find_exact(&self, path: &str) -> Option<&PropertyMetadata> {
        self.properties.get(path)
    }

    fn find_with_prefix(&self, prefix: &str) -> Vec<&PropertyMetadata> {
        self.properties
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(_, property)| property)
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.properties
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .next()
            .is_some_and(|(path, _)| path.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetadataIndex {
        [
            PropertyMetadata::new("server.port", "java.lang.Integer", "Server HTTP port"),
            PropertyMetadata::new("server.address", "java.lang.String", "Bind address"),
            PropertyMetadata::new("serverless.mode", "java.lang.String", "Not below server"),
            PropertyMetadata::new("spring.application.name", "java.lang.String", "App name"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_find_exact() {
        let index = sample();
        assert_eq!(index.find_exact("server.port").unwrap().simple_name(), "port");
        assert!(index.find_exact("server").is_none());
    }

    #[test]
    fn test_find_with_prefix_respects_dot() {
        let index = sample();
        let paths: Vec<&str> = index
            .find_with_prefix("server.")
            .iter()
            .map(|p| p.path.as_str())
            .collect();
        assert_eq!(paths, vec!["server.address", "server.port"]);
        assert_eq!(index.find_with_prefix("server").len(), 3);
        assert_eq!(index.find_with_prefix("").len(), 4);
    }

    #[test]
    fn test_has_prefix() {
        let index = sample();
        assert!(index.has_prefix("spring.application."));
        assert!(!index.has_prefix("spring.datasource."));
        assert!(!MetadataIndex::new().has_prefix(""));
    }

    #[test]
    fn test_duplicate_paths_merge_targets() {
        let mut index = MetadataIndex::new();
        index.add(
            PropertyMetadata::new("ds.login-timeout", "int", "")
                .with_target("org.acme.Config.hikari()"),
        );
        index.add(
            PropertyMetadata::new("ds.login-timeout", "int", "")
                .with_target("org.acme.Config.tomcat()"),
        );
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.find_exact("ds.login-timeout").unwrap().targets,
            vec!["org.acme.Config.hikari()", "org.acme.Config.tomcat()"]
        );
    }
}
