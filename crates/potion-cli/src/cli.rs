//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Potion Registry - validate plugin dependencies and build the registry index
#[derive(Parser, Debug)]
#[command(name = "potion-registry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the registry configuration file
    #[arg(short, long, global = true, env = "POTION_REGISTRY_CONFIG", default_value = potion_fs::CONFIG_FILENAME)]
    pub config: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve every manifest in the registry and report all problems
    ///
    /// Detects missing dependencies, circular dependencies, versions that
    /// do not satisfy a constraint, and constraints that can never be
    /// satisfied together.
    Resolve {
        /// Plugins directory (defaults to the configured one)
        plugins_dir: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Validate a single manifest's dependencies against the registry
    Check {
        /// Manifest file to validate
        manifest: PathBuf,

        /// Plugins directory (defaults to the configured one)
        #[arg(short, long)]
        plugins_dir: Option<PathBuf>,
    },

    /// Build the registry index
    ///
    /// The index is written only if every manifest resolves cleanly.
    Index {
        /// Plugins directory (defaults to the configured one)
        plugins_dir: Option<PathBuf>,

        /// Output file (defaults to the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
