//! Command implementations for potion-cli

pub mod check;
pub mod index;
pub mod resolve;

pub use check::run_check;
pub use index::run_index;
pub use resolve::run_resolve;

use std::path::{Path, PathBuf};

use colored::Colorize;
use potion_core::ManifestStore;
use potion_fs::{ManifestLoader, RegistryConfig};

use crate::error::{CliError, Result};

/// Settings shared by every command, after merging config file and flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: RegistryConfig,
}

impl Settings {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = RegistryConfig::load_or_default(config_path)?;
        Ok(Self { config })
    }

    /// The plugins directory, preferring an explicit override.
    pub fn plugins_dir(&self, overridden: Option<PathBuf>) -> PathBuf {
        overridden.unwrap_or_else(|| self.config.registry.plugins_dir.clone())
    }

    pub fn loader(&self) -> ManifestLoader {
        ManifestLoader::new().with_extension(self.config.registry.manifest_extension.clone())
    }
}

/// A loaded registry snapshot plus every problem found while loading it.
pub struct Registry {
    pub store: Option<ManifestStore>,
    pub problems: Vec<String>,
}

/// Load every manifest in `dir`, collecting file and conversion problems.
///
/// Duplicate plugin names leave `store` empty: resolution cannot run on
/// such a snapshot.
pub fn load_registry(settings: &Settings, dir: &Path) -> Result<Registry> {
    let loaded = settings.loader().load_dir(dir)?;
    let mut problems: Vec<String> = loaded.issues.iter().map(ToString::to_string).collect();

    let store = match loaded.to_store() {
        Ok(store) => Some(store),
        Err(e @ potion_core::Error::DuplicateNames { .. }) => {
            problems.extend(e.resolution_errors().iter().map(ToString::to_string));
            None
        }
        Err(e) => return Err(CliError::from(e)),
    };

    Ok(Registry { store, problems })
}

/// Print a list of problems under a red heading.
pub fn print_problems(heading: &str, problems: &[String]) {
    eprintln!("{} {}", "FAILED".red().bold(), heading);
    for problem in problems {
        eprintln!("   {} {}", "-".red(), problem);
    }
}
