//! Loading `.potion` manifest files from a plugins directory.
//!
//! Each file holds one YAML manifest. A file that cannot be read or parsed
//! is recorded as a [`LoadIssue`] and the scan carries on with the rest.

use std::fs;
use std::path::{Path, PathBuf};

use potion_core::{ManifestStore, RawManifest};

use crate::{Error, Result, io};

/// A manifest file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadIssue {
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to load {}: {}", self.path.display(), self.message)
    }
}

/// Result of scanning a plugins directory.
#[derive(Debug, Clone, Default)]
pub struct LoadedManifests {
    /// Parsed manifests with the file each came from, in file name order.
    pub manifests: Vec<(PathBuf, RawManifest)>,
    /// Files that were skipped.
    pub issues: Vec<LoadIssue>,
}

impl LoadedManifests {
    /// Convert the parsed manifests into a store.
    pub fn to_store(&self) -> potion_core::Result<ManifestStore> {
        ManifestStore::from_raw(self.manifests.iter().map(|(_, raw)| raw.clone()))
    }
}

/// Reads manifest files with a given extension.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    extension: String,
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self {
            extension: "potion".to_string(),
        }
    }
}

impl ManifestLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different manifest file extension (without the dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Parse a single manifest file.
    pub fn load_file(&self, path: &Path) -> Result<RawManifest> {
        let content = io::read_text(path)?;
        serde_yaml::from_str(&content).map_err(|e| Error::ManifestParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load every manifest file directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns `Error::PluginsDirNotFound` if `dir` does not exist, or an I/O
    /// error if it cannot be listed. Problems with individual files are
    /// reported in [`LoadedManifests::issues`].
    pub fn load_dir(&self, dir: &Path) -> Result<LoadedManifests> {
        if !dir.is_dir() {
            return Err(Error::PluginsDirNotFound {
                path: dir.to_path_buf(),
            });
        }

        let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == self.extension.as_str()))
            .collect();
        paths.sort();

        if paths.is_empty() {
            tracing::warn!(dir = %dir.display(), extension = %self.extension, "No manifest files found");
        }

        let mut loaded = LoadedManifests::default();
        for path in paths {
            match self.load_file(&path) {
                Ok(manifest) => loaded.manifests.push((path, manifest)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping manifest");
                    loaded.issues.push(LoadIssue {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            loaded = loaded.manifests.len(),
            skipped = loaded.issues.len(),
            "Scanned plugins directory"
        );
        Ok(loaded)
    }
}
