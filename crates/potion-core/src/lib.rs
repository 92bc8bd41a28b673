//! Dependency resolution and index generation for the Potion plugin registry.
//!
//! A resolution run takes one immutable [`ManifestStore`] snapshot, builds a
//! [`DependencyGraph`], and checks it for missing dependencies, cycles and
//! version conflicts. Only a snapshot that resolves without a single error
//! can be turned into an [`IndexDocument`].
//!
//! ```
//! use potion_core::{ManifestRecord, ManifestStore, Version, build_index, resolve};
//!
//! let store = ManifestStore::from_records([
//!     ManifestRecord::new("git-helpers", Version::new(1, 0, 0)).tagged("git"),
//! ])
//! .unwrap();
//!
//! let resolution = resolve(&store);
//! assert!(resolution.is_resolved());
//!
//! let index = build_index(&store, &resolution).unwrap();
//! assert_eq!(index.total_plugins, 1);
//! ```

pub mod cycle;
pub mod error;
pub mod graph;
pub mod index;
pub mod manifest;
pub mod resolver;
pub mod store;
pub mod version;

pub use cycle::CycleDetector;
pub use error::{Error, ResolutionError, Result};
pub use graph::{DependencyEdge, DependencyGraph};
pub use index::{INDEX_FORMAT_VERSION, IndexBuilder, IndexDocument, PluginEntry, build_index};
pub use manifest::{Dependency, InstallSpec, ManifestRecord, RawDependency, RawManifest};
pub use resolver::{ConstraintResolver, Resolution, check_candidate, resolve};
pub use store::ManifestStore;
pub use version::{Constraint, ConstraintError, Operator, Version, VersionRange};
