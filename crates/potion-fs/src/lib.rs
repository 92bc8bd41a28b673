//! Filesystem layer for the Potion registry
//!
//! Loads manifest files and registry configuration from disk and writes the
//! generated index atomically.

pub mod config;
pub mod error;
pub mod io;
pub mod loader;

pub use config::{CONFIG_FILENAME, RegistryConfig};
pub use error::{Error, Result};
pub use io::{write_atomic, write_text};
pub use loader::{LoadIssue, LoadedManifests, ManifestLoader};
