//! Aggregate index generation.
//!
//! The index lists every plugin in name order and groups plugin names by
//! tag. Apart from `last_updated`, the document depends only on the set of
//! manifests, never on the order they were loaded in.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::manifest::{DEFAULT_POTIONFILE_PATH, InstallSpec, ManifestRecord, RawDependency};
use crate::resolver::{Resolution, resolve};
use crate::store::ManifestStore;

/// Version of the index document format.
pub const INDEX_FORMAT_VERSION: &str = "1.0.0";

/// The generated registry index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Index format version.
    pub version: String,
    /// When the index was generated (RFC 3339, UTC).
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_updated: DateTime<Utc>,
    pub total_plugins: usize,
    /// Every plugin, sorted by name.
    pub plugins: Vec<PluginEntry>,
    /// Tag to sorted plugin names.
    pub categories: BTreeMap<String, Vec<String>>,
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))
}

impl IndexDocument {
    /// Render as two-space indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Find a plugin entry by name.
    pub fn plugin(&self, name: &str) -> Option<&PluginEntry> {
        self.plugins
            .binary_search_by(|entry| entry.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.plugins[i])
    }
}

/// The public view of one plugin in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub verified: bool,
    pub potionfile_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_potions_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_potions_version: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<RawDependency>,
    #[serde(default)]
    pub install: InstallSpec,
}

impl From<&ManifestRecord> for PluginEntry {
    fn from(record: &ManifestRecord) -> Self {
        let meta = &record.metadata;
        Self {
            name: record.name.clone(),
            version: record.version.to_string(),
            description: meta.description.clone(),
            author: meta.author.clone(),
            repository: record.repository.clone(),
            homepage: meta.homepage.clone(),
            license: meta.license.clone(),
            checksum: meta.checksum.clone(),
            tags: record.tags.iter().cloned().collect(),
            verified: record.verified,
            potionfile_path: meta
                .potionfile_path
                .clone()
                .unwrap_or_else(|| DEFAULT_POTIONFILE_PATH.to_string()),
            min_potions_version: meta.min_potions_version.clone(),
            max_potions_version: meta.max_potions_version.clone(),
            dependencies: record
                .dependencies
                .iter()
                .map(|dep| RawDependency {
                    name: Some(dep.name.clone()),
                    version: dep.expression.clone(),
                })
                .collect(),
            install: meta.install.clone().unwrap_or_default(),
        }
    }
}

/// Builds an [`IndexDocument`] from a fully resolved manifest set.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    format_version: String,
    timestamp: Option<DateTime<Utc>>,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self {
            format_version: INDEX_FORMAT_VERSION.to_string(),
            timestamp: None,
        }
    }
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the index format version written to the document.
    pub fn with_format_version(mut self, version: impl Into<String>) -> Self {
        self.format_version = version.into();
        self
    }

    /// Stamp the document with a fixed time instead of the current time.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build the index.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnresolvedDependency` if the resolution carries any
    /// error. A resolution that claims success is re-checked against `store`,
    /// so one built for a different snapshot cannot slip through. No partial
    /// index is ever produced.
    pub fn build(&self, store: &ManifestStore, resolution: &Resolution) -> Result<IndexDocument> {
        let errors = if resolution.is_resolved() {
            resolve(store).errors
        } else {
            resolution.errors.clone()
        };
        if !errors.is_empty() {
            return Err(Error::UnresolvedDependency { errors });
        }

        let mut plugins = Vec::with_capacity(store.len());
        let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();

        // Store iteration is name-ordered, so every category list comes out sorted.
        for record in store.records() {
            plugins.push(PluginEntry::from(record));
            for tag in &record.tags {
                categories.entry(tag.clone()).or_default().push(record.name.clone());
            }
        }

        tracing::info!(
            plugins = plugins.len(),
            categories = categories.len(),
            "Generated index"
        );

        Ok(IndexDocument {
            version: self.format_version.clone(),
            last_updated: self.timestamp.unwrap_or_else(Utc::now),
            total_plugins: plugins.len(),
            plugins,
            categories,
        })
    }
}

/// Build an index stamped with the current time.
pub fn build_index(store: &ManifestStore, resolution: &Resolution) -> Result<IndexDocument> {
    IndexBuilder::new().build(store, resolution)
}
