//! Whole-registry dependency resolution

use std::path::PathBuf;

use colored::Colorize;
use potion_core::{DependencyGraph, resolve};

use super::{Settings, load_registry, print_problems};
use crate::error::{CliError, Result};

/// Run the resolve command
///
/// Loads every manifest, resolves the graph and reports every problem in one
/// pass. Fails if anything at all is wrong.
pub fn run_resolve(settings: &Settings, plugins_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let dir = settings.plugins_dir(plugins_dir);
    tracing::debug!(dir = %dir.display(), "Resolving registry");

    let registry = load_registry(settings, &dir)?;
    let mut problems = registry.problems;

    let (plugins, dependencies, install_order) = match &registry.store {
        Some(store) => {
            let resolution = resolve(store);
            problems.extend(resolution.errors.iter().map(ToString::to_string));
            let (graph, _) = DependencyGraph::build(store);
            let order: Option<Vec<String>> = graph
                .topological_order()
                .map(|names| names.into_iter().map(str::to_string).collect());
            (store.len(), resolution.edges.len(), order)
        }
        None => (0, 0, None),
    };

    if json {
        // Dependencies before dependents; null unless everything resolved
        let install_order = install_order.filter(|_| problems.is_empty());
        let report = serde_json::json!({
            "resolved": problems.is_empty(),
            "plugins": plugins,
            "dependencies": dependencies,
            "install_order": install_order,
            "errors": problems,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if problems.is_empty() {
        println!("{} All dependencies resolved successfully", "OK".green().bold());
        println!("   Total plugins: {plugins}");
        println!("   Total dependencies: {dependencies}");
    } else {
        print_problems("Dependency resolution failed:", &problems);
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(CliError::Unresolved {
            context: "dependency resolution",
            count: problems.len(),
        })
    }
}
