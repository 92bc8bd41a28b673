//! Plugin manifest records.
//!
//! Manifests arrive as loosely-typed [`RawManifest`] values (every field
//! optional, straight out of a `.potion` file) and are converted into strict
//! [`ManifestRecord`]s before any resolution logic sees them.
//!
//! # Example manifest
//!
//! ```yaml
//! name: git-helpers
//! version: 1.4.0
//! description: Aliases and prompts for everyday git work
//! author: Jane Doe
//! repository: https://github.com/example/git-helpers
//! license: MIT
//! tags: [git, utility]
//! dependencies:
//!   - name: shell-utils
//!     version: ">=1.0.0"
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;
use crate::version::{Constraint, Version};

/// Default path of the Potionfile inside a plugin repository.
pub const DEFAULT_POTIONFILE_PATH: &str = "Potionfile";

/// A manifest exactly as declared, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub potionfile_path: Option<String>,
    #[serde(default)]
    pub min_potions_version: Option<String>,
    #[serde(default)]
    pub max_potions_version: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<RawDependency>,
    #[serde(default)]
    pub install: Option<InstallSpec>,
}

/// A dependency entry as declared in a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawDependency {
    #[serde(default)]
    pub name: Option<String>,
    /// Constraint expression, e.g. `>=1.0.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// How a plugin is installed. Passed through to the index untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InstallSpec {
    #[serde(rename = "type", default = "default_install_type")]
    pub kind: String,
    #[serde(default = "default_install_path")]
    pub path: String,
    /// Any further installer-specific keys.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_install_type() -> String {
    "git".to_string()
}

fn default_install_path() -> String {
    "/".to_string()
}

impl Default for InstallSpec {
    fn default() -> Self {
        Self {
            kind: default_install_type(),
            path: default_install_path(),
            extra: BTreeMap::new(),
        }
    }
}

/// A validated dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Name of the plugin depended upon.
    pub name: String,
    /// Parsed constraint. An undeclared constraint admits every version.
    pub constraint: Constraint,
    /// The expression as written, if one was written.
    pub expression: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, constraint: Constraint) -> Self {
        let expression = Some(constraint.to_string());
        Self {
            name: name.into(),
            constraint,
            expression,
        }
    }

    /// A dependency that accepts any version of `name`.
    pub fn unconstrained(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: Constraint::any(),
            expression: None,
        }
    }
}

/// Descriptive fields the resolver never looks at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginMetadata {
    pub description: Option<String>,
    pub author: Option<String>,
    pub homepage: Option<String>,
    pub license: Option<String>,
    pub checksum: Option<String>,
    pub potionfile_path: Option<String>,
    pub min_potions_version: Option<String>,
    pub max_potions_version: Option<String>,
    pub install: Option<InstallSpec>,
}

/// A strict, validated plugin manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRecord {
    pub name: String,
    pub version: Version,
    /// Declared dependencies, in declaration order.
    pub dependencies: Vec<Dependency>,
    pub tags: BTreeSet<String>,
    pub repository: Option<String>,
    pub verified: bool,
    pub metadata: PluginMetadata,
}

impl ManifestRecord {
    /// Create a record with no dependencies, tags or metadata.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            dependencies: Vec::new(),
            tags: BTreeSet::new(),
            repository: None,
            verified: false,
            metadata: PluginMetadata::default(),
        }
    }

    /// Add a dependency on `name` restricted by `constraint`.
    pub fn depends_on(mut self, name: impl Into<String>, constraint: Constraint) -> Self {
        self.dependencies.push(Dependency::new(name, constraint));
        self
    }

    /// Add a category tag.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Convert a raw manifest into a strict record.
    ///
    /// Returns the record (if its identity fields are usable) together with
    /// every problem found. A bad dependency entry is dropped and reported
    /// without rejecting the rest of the manifest; a missing or invalid
    /// `name` or `version` rejects the whole record.
    pub fn from_raw(raw: RawManifest) -> (Option<Self>, Vec<ResolutionError>) {
        let mut errors = Vec::new();

        let name = match raw.name {
            Some(name) => match validate_plugin_name(&name) {
                Ok(()) => name,
                Err(reason) => {
                    errors.push(ResolutionError::InvalidManifest { name, reason });
                    return (None, errors);
                }
            },
            None => {
                errors.push(ResolutionError::InvalidManifest {
                    name: "<unnamed>".to_string(),
                    reason: "missing required field 'name'".to_string(),
                });
                return (None, errors);
            }
        };

        let version = match raw.version.as_deref().map(Version::parse) {
            Some(Ok(version)) => version,
            Some(Err(e)) => {
                errors.push(ResolutionError::InvalidManifest {
                    name,
                    reason: format!("invalid version: {}", e.reason),
                });
                return (None, errors);
            }
            None => {
                errors.push(ResolutionError::InvalidManifest {
                    name,
                    reason: "missing required field 'version'".to_string(),
                });
                return (None, errors);
            }
        };

        let mut dependencies = Vec::with_capacity(raw.dependencies.len());
        for dep in raw.dependencies {
            let Some(dep_name) = dep.name else {
                errors.push(ResolutionError::InvalidManifest {
                    name: name.clone(),
                    reason: "invalid dependency: missing name".to_string(),
                });
                continue;
            };

            match dep.version {
                None => dependencies.push(Dependency::unconstrained(dep_name)),
                Some(expression) => match Constraint::parse(&expression) {
                    Ok(constraint) => dependencies.push(Dependency {
                        name: dep_name,
                        constraint,
                        expression: Some(expression),
                    }),
                    Err(e) => errors.push(ResolutionError::MalformedConstraint {
                        plugin: name.clone(),
                        dependency: dep_name,
                        expression,
                        reason: e.reason,
                    }),
                },
            }
        }

        let record = Self {
            name,
            version,
            dependencies,
            tags: raw.tags.into_iter().collect(),
            repository: raw.repository,
            verified: raw.verified.unwrap_or(false),
            metadata: PluginMetadata {
                description: raw.description,
                author: raw.author,
                homepage: raw.homepage,
                license: raw.license,
                checksum: raw.checksum,
                potionfile_path: raw.potionfile_path,
                min_potions_version: raw.min_potions_version,
                max_potions_version: raw.max_potions_version,
                install: raw.install,
            },
        };

        (Some(record), errors)
    }
}

/// Check that a plugin name is lowercase alphanumeric plus hyphens.
pub fn validate_plugin_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("name is empty".to_string()),
        Some(first) if !(first.is_ascii_lowercase() || first.is_ascii_digit()) => {
            return Err("name must start with a lowercase letter or digit".to_string());
        }
        Some(_) => {}
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')) {
        return Err(format!("name contains invalid character '{bad}'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(name: &str, version: &str) -> RawManifest {
        RawManifest {
            name: Some(name.to_string()),
            version: Some(version.to_string()),
            ..RawManifest::default()
        }
    }

    fn dep(name: Option<&str>, version: Option<&str>) -> RawDependency {
        RawDependency {
            name: name.map(str::to_string),
            version: version.map(str::to_string),
        }
    }

    #[test]
    fn test_from_raw_minimal() {
        let (record, errors) = ManifestRecord::from_raw(raw("git-helpers", "1.4.0"));
        assert!(errors.is_empty());
        let record = record.unwrap();
        assert_eq!(record.name, "git-helpers");
        assert_eq!(record.version, Version::new(1, 4, 0));
        assert!(!record.verified);
        assert!(record.dependencies.is_empty());
    }

    #[test]
    fn test_from_raw_parses_dependencies_in_order() {
        let mut manifest = raw("a", "1.0.0");
        manifest.dependencies = vec![dep(Some("zeta"), Some(">=1.0.0")), dep(Some("alpha"), None)];

        let (record, errors) = ManifestRecord::from_raw(manifest);
        assert!(errors.is_empty());
        let record = record.unwrap();
        assert_eq!(record.dependencies.len(), 2);
        assert_eq!(record.dependencies[0].name, "zeta");
        assert_eq!(record.dependencies[0].expression.as_deref(), Some(">=1.0.0"));
        assert_eq!(record.dependencies[1].name, "alpha");
        assert_eq!(record.dependencies[1].constraint, Constraint::any());
        assert!(record.dependencies[1].expression.is_none());
    }

    #[test]
    fn test_from_raw_malformed_constraint_keeps_record() {
        let mut manifest = raw("a", "1.0.0");
        manifest.dependencies = vec![dep(Some("b"), Some("about 1.0")), dep(Some("c"), Some("^2.0.0"))];

        let (record, errors) = ManifestRecord::from_raw(manifest);
        let record = record.unwrap();
        assert_eq!(record.dependencies.len(), 1);
        assert_eq!(record.dependencies[0].name, "c");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ResolutionError::MalformedConstraint { plugin, dependency, expression, .. }
                if plugin == "a" && dependency == "b" && expression == "about 1.0"
        ));
    }

    #[test]
    fn test_from_raw_dependency_without_name() {
        let mut manifest = raw("a", "1.0.0");
        manifest.dependencies = vec![dep(None, Some(">=1.0.0"))];

        let (record, errors) = ManifestRecord::from_raw(manifest);
        assert!(record.unwrap().dependencies.is_empty());
        assert!(matches!(&errors[0], ResolutionError::InvalidManifest { name, .. } if name == "a"));
    }

    #[test]
    fn test_from_raw_rejects_missing_name() {
        let manifest = RawManifest {
            version: Some("1.0.0".to_string()),
            ..RawManifest::default()
        };
        let (record, errors) = ManifestRecord::from_raw(manifest);
        assert!(record.is_none());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_from_raw_rejects_bad_version() {
        let (record, errors) = ManifestRecord::from_raw(raw("a", "one"));
        assert!(record.is_none());
        assert!(matches!(&errors[0], ResolutionError::InvalidManifest { name, .. } if name == "a"));
    }

    #[test]
    fn test_from_raw_keeps_prerelease_and_build() {
        let (record, _) = ManifestRecord::from_raw(raw("a", "2.0.0-beta.1+exp.sha.5114f85"));
        let version = record.unwrap().version;
        assert_eq!(version.prerelease.as_deref(), Some("beta.1"));
        assert_eq!(version.build.as_deref(), Some("exp.sha.5114f85"));
        assert_eq!(version.to_string(), "2.0.0-beta.1+exp.sha.5114f85");
    }

    #[test]
    fn test_validate_plugin_name() {
        assert!(validate_plugin_name("git-helpers").is_ok());
        assert!(validate_plugin_name("k8s").is_ok());
        assert!(validate_plugin_name("").is_err());
        assert!(validate_plugin_name("Git").is_err());
        assert!(validate_plugin_name("-lead").is_err());
        assert!(validate_plugin_name("under_score").is_err());
        assert!(validate_plugin_name("white space").is_err());
    }

    #[test]
    fn test_raw_manifest_from_yaml() {
        let yaml = r#"
name: git-helpers
version: 1.4.0
tags: [git, utility]
verified: true
dependencies:
  - name: shell-utils
    version: ">=1.0.0"
install:
  type: script
  path: /install.sh
  shell: bash
"#;
        let manifest: RawManifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(manifest.tags, vec!["git", "utility"]);
        assert_eq!(manifest.verified, Some(true));
        let install = manifest.install.unwrap();
        assert_eq!(install.kind, "script");
        assert_eq!(install.extra.get("shell"), Some(&serde_json::json!("bash")));
    }
}
