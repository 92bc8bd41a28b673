//! Index generation

use std::path::PathBuf;

use colored::Colorize;
use potion_core::{IndexBuilder, resolve};

use super::{Settings, load_registry, print_problems};
use crate::error::{CliError, Result};

/// Run the index command
///
/// Resolves the registry and, only if nothing is wrong, writes the index.
/// On any problem nothing is written and an existing index is left as is.
pub fn run_index(
    settings: &Settings,
    plugins_dir: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let dir = settings.plugins_dir(plugins_dir);
    let output = output.unwrap_or_else(|| settings.config.index.output.clone());

    let registry = load_registry(settings, &dir)?;
    let mut problems = registry.problems;

    let built = match &registry.store {
        Some(store) => {
            let resolution = resolve(store);
            problems.extend(resolution.errors.iter().map(ToString::to_string));
            if problems.is_empty() {
                let index = IndexBuilder::new()
                    .with_format_version(settings.config.index.format_version.clone())
                    .build(store, &resolution)?;
                Some(index)
            } else {
                None
            }
        }
        None => None,
    };

    let Some(index) = built else {
        print_problems("Index not generated:", &problems);
        return Err(CliError::Unresolved {
            context: "index generation",
            count: problems.len(),
        });
    };

    let mut rendered = index.to_json_pretty()?;
    rendered.push('\n');
    potion_fs::write_text(&output, &rendered)?;

    println!(
        "{} Generated index with {} plugins",
        "OK".green().bold(),
        index.total_plugins
    );
    println!("   Categories: {}", index.categories.len());
    println!("   Output: {}", output.display());
    Ok(())
}
