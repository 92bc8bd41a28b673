//! Potion Registry CLI
//!
//! Validates plugin manifests and generates the registry index.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use commands::Settings;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load(&cli.config)?;
    execute_command(&settings, cli.command)
}

/// Log to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        tracing::debug!("Verbose mode enabled");
    }
}

fn execute_command(settings: &Settings, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Resolve { plugins_dir, json } => commands::run_resolve(settings, plugins_dir, json),
        Commands::Check {
            manifest,
            plugins_dir,
        } => commands::run_check(settings, &manifest, plugins_dir),
        Commands::Index {
            plugins_dir,
            output,
        } => commands::run_index(settings, plugins_dir, output),
    }
}
