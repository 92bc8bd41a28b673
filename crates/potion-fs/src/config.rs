//! Registry configuration from `potion-registry.toml`.
//!
//! ```toml
//! [registry]
//! plugins_dir = "plugins"
//! manifest_extension = "potion"
//!
//! [index]
//! output = "index.json"
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, io};

/// Canonical configuration filename, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "potion-registry.toml";

/// Top-level registry configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub index: IndexSection,
}

/// Where manifests live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySection {
    /// Directory holding one manifest file per plugin.
    #[serde(default = "default_plugins_dir")]
    pub plugins_dir: PathBuf,
    /// File extension of manifest files, without the dot.
    #[serde(default = "default_manifest_extension")]
    pub manifest_extension: String,
}

fn default_plugins_dir() -> PathBuf {
    PathBuf::from("plugins")
}

fn default_manifest_extension() -> String {
    "potion".to_string()
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            plugins_dir: default_plugins_dir(),
            manifest_extension: default_manifest_extension(),
        }
    }
}

/// Where and how the index is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSection {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Format version stamped into the generated index.
    #[serde(default = "default_format_version")]
    pub format_version: String,
}

fn default_output() -> PathBuf {
    PathBuf::from("index.json")
}

fn default_format_version() -> String {
    potion_core::INDEX_FORMAT_VERSION.to_string()
}

impl Default for IndexSection {
    fn default() -> Self {
        Self {
            output: default_output(),
            format_version: default_format_version(),
        }
    }
}

impl RegistryConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read configuration from a file that must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = io::read_text(path)?;
        Self::from_toml(&content, path)
    }

    /// Read configuration from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "Loading registry config");
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No registry config, using defaults");
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RegistryConfig::from_toml("", Path::new("cfg.toml")).unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.registry.plugins_dir, PathBuf::from("plugins"));
        assert_eq!(config.registry.manifest_extension, "potion");
        assert_eq!(config.index.output, PathBuf::from("index.json"));
        assert_eq!(config.index.format_version, "1.0.0");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[registry]
plugins_dir = "registry/plugins"

[index]
output = "dist/index.json"
"#;
        let config = RegistryConfig::from_toml(toml_str, Path::new("cfg.toml")).unwrap();
        assert_eq!(config.registry.plugins_dir, PathBuf::from("registry/plugins"));
        assert_eq!(config.registry.manifest_extension, "potion");
        assert_eq!(config.index.output, PathBuf::from("dist/index.json"));
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let err = RegistryConfig::from_toml("[registry\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { path, .. } if path == Path::new("bad.toml")));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = RegistryConfig::load_or_default(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, RegistryConfig::default());
    }
}
