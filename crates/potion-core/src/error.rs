//! Error types for potion-core

use std::fmt;

use crate::version::Constraint;

/// Result type for potion-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop an operation outright.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two or more manifests in one snapshot share a name.
    #[error("duplicate plugin names in manifest set: {}", names.join(", "))]
    DuplicateNames { names: Vec<String> },

    /// An index was requested for a manifest set that did not resolve cleanly.
    #[error("refusing to build index: {} unresolved dependency error(s)", errors.len())]
    UnresolvedDependency { errors: Vec<ResolutionError> },

    /// Failed to render the index document.
    #[error("failed to serialize index: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// The individual problems behind this error, for per-item reporting.
    pub fn resolution_errors(&self) -> Vec<ResolutionError> {
        match self {
            Error::DuplicateNames { names } => names
                .iter()
                .map(|name| ResolutionError::DuplicateName { name: name.clone() })
                .collect(),
            Error::UnresolvedDependency { errors } => errors.clone(),
            Error::Serialize(_) => Vec::new(),
        }
    }
}

/// A single problem found while loading or resolving a manifest set.
///
/// Resolution never stops at the first problem; callers receive the full
/// list and decide how to render it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// A constraint expression does not follow `<op><major>.<minor>.<patch>[-pre]`.
    #[error("[{plugin}] invalid version constraint '{expression}' for '{dependency}': {reason}")]
    MalformedConstraint {
        plugin: String,
        dependency: String,
        expression: String,
        reason: String,
    },

    /// A manifest could not be turned into a strict record.
    #[error("invalid manifest '{name}': {reason}")]
    InvalidManifest { name: String, reason: String },

    /// A dependency names a plugin that is not in the registry.
    #[error("[{from}] dependency '{to}' not found in registry")]
    MissingDependency { from: String, to: String },

    /// A chain of dependencies leads back to where it started.
    #[error("circular dependency detected: {}", path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    /// The installed version of a dependency does not satisfy an edge.
    #[error("[{from}] dependency '{to}' version '{actual}' does not satisfy constraint '{constraint}'")]
    VersionConflict {
        from: String,
        to: String,
        constraint: Constraint,
        actual: String,
    },

    /// Dependents impose constraints on one plugin that can never hold together.
    #[error("conflicting version requirements for '{to}': {}", ConflictList(constraints))]
    ConstraintConflict {
        to: String,
        constraints: Vec<(String, Constraint)>,
    },

    /// Two manifests share a name.
    #[error("duplicate plugin name '{name}'")]
    DuplicateName { name: String },
}

struct ConflictList<'a>(&'a [(String, Constraint)]);

impl fmt::Display for ConflictList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (from, constraint)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{from} requires {constraint}")?;
        }
        Ok(())
    }
}
