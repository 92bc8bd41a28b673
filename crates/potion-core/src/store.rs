//! The manifest snapshot a resolution run works on.

use std::collections::BTreeMap;

use crate::error::{Error, ResolutionError, Result};
use crate::manifest::{ManifestRecord, RawManifest};

/// An immutable snapshot of every manifest in the registry.
///
/// Records are keyed and iterated by name. Problems found while converting
/// raw manifests are kept alongside the records so that resolution can report
/// them together with graph-level errors.
#[derive(Debug, Clone, Default)]
pub struct ManifestStore {
    records: BTreeMap<String, ManifestRecord>,
    issues: Vec<ResolutionError>,
}

impl ManifestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-validated records.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateNames` if two records share a name.
    pub fn from_records(records: impl IntoIterator<Item = ManifestRecord>) -> Result<Self> {
        let mut map = BTreeMap::new();
        let mut duplicates = Vec::new();

        for record in records {
            if map.contains_key(&record.name) {
                if !duplicates.contains(&record.name) {
                    duplicates.push(record.name.clone());
                }
                continue;
            }
            map.insert(record.name.clone(), record);
        }

        if !duplicates.is_empty() {
            duplicates.sort();
            return Err(Error::DuplicateNames { names: duplicates });
        }

        Ok(Self {
            records: map,
            issues: Vec::new(),
        })
    }

    /// Convert and load raw manifests.
    ///
    /// Manifests that fail conversion are left out and their problems recorded
    /// in [`issues`](Self::issues); the remaining manifests still load.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateNames` if two usable manifests share a name.
    pub fn from_raw(raws: impl IntoIterator<Item = RawManifest>) -> Result<Self> {
        let mut records = Vec::new();
        let mut issues = Vec::new();

        for raw in raws {
            let (record, errors) = ManifestRecord::from_raw(raw);
            if let Some(record) = &record {
                tracing::debug!(plugin = %record.name, version = %record.version, "Loaded manifest");
            }
            issues.extend(errors);
            records.extend(record);
        }

        let mut store = Self::from_records(records)?;
        store.issues = issues;
        Ok(store)
    }

    /// Return a copy of this store with `record` added, replacing any record
    /// of the same name.
    pub fn with_record(&self, record: ManifestRecord) -> Self {
        let mut store = self.clone();
        store.records.insert(record.name.clone(), record);
        store
    }

    /// Look up a record by plugin name.
    pub fn get(&self, name: &str) -> Option<&ManifestRecord> {
        self.records.get(name)
    }

    /// Whether a plugin with this name is loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// All records in ascending name order.
    pub fn records(&self) -> impl Iterator<Item = &ManifestRecord> {
        self.records.values()
    }

    /// All plugin names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Problems found while converting raw manifests.
    pub fn issues(&self) -> &[ResolutionError] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
