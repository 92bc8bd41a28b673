//! Single-manifest validation against the registry

use std::path::{Path, PathBuf};

use colored::Colorize;
use potion_core::{DependencyGraph, ManifestRecord, check_candidate};

use super::{Settings, load_registry, print_problems};
use crate::error::{CliError, Result};

/// Run the check command
///
/// Validates one manifest's dependencies against the current registry
/// snapshot. Resolution problems elsewhere in the registry do not affect the
/// outcome, but a registry that failed to load does: its files are reported
/// and the check fails.
pub fn run_check(settings: &Settings, manifest: &Path, plugins_dir: Option<PathBuf>) -> Result<()> {
    let dir = settings.plugins_dir(plugins_dir);
    let registry = load_registry(settings, &dir)?;
    let mut problems = registry.problems;

    let Some(store) = registry.store else {
        print_problems("Registry could not be loaded:", &problems);
        return Err(CliError::Unresolved {
            context: "dependency validation",
            count: problems.len(),
        });
    };

    let raw = settings.loader().load_file(manifest)?;
    let (candidate, conversion_errors) = ManifestRecord::from_raw(raw);
    problems.extend(conversion_errors.iter().map(ToString::to_string));

    if let Some(candidate) = &candidate {
        tracing::debug!(plugin = %candidate.name, "Checking candidate manifest");
        problems.extend(check_candidate(&store, candidate).iter().map(ToString::to_string));
    }

    if !problems.is_empty() {
        print_problems("Dependency validation failed:", &problems);
        return Err(CliError::Unresolved {
            context: "dependency validation",
            count: problems.len(),
        });
    }

    println!("{} All dependencies are valid", "OK".green().bold());
    if let Some(candidate) = &candidate {
        let (graph, _) = DependencyGraph::build(&store);
        let dependents: Vec<String> = graph.transitive_dependents(&candidate.name).into_iter().collect();
        if !dependents.is_empty() {
            println!("   Required by: {}", dependents.join(", "));
        }
    }
    Ok(())
}
