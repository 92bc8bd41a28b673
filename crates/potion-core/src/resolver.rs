//! Version constraint checking across the dependency graph.
//!
//! The registry holds exactly one version of each plugin, so resolution is a
//! satisfaction check rather than a search: every edge's constraint must
//! accept the installed version of its target. On top of that, constraints
//! that several dependents place on the same target are compared with each
//! other; ranges that can never overlap are reported as a conflict even when
//! the installed version happens to satisfy one side.

use serde::Serialize;

use crate::cycle::CycleDetector;
use crate::error::ResolutionError;
use crate::graph::{DependencyEdge, DependencyGraph};
use crate::manifest::ManifestRecord;
use crate::store::ManifestStore;

/// Outcome of one resolution run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    /// Every edge of the graph.
    pub edges: Vec<DependencyEdge>,
    /// Every problem found, in the order: manifest issues, missing
    /// dependencies, cycles, version conflicts, constraint conflicts.
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<ResolutionError>,
}

fn serialize_errors<S: serde::Serializer>(
    errors: &[ResolutionError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

impl Resolution {
    /// Whether the manifest set is fully consistent.
    pub fn is_resolved(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks edge constraints against installed versions.
pub struct ConstraintResolver<'g, 'a> {
    graph: &'g DependencyGraph<'a>,
}

impl<'g, 'a> ConstraintResolver<'g, 'a> {
    pub fn new(graph: &'g DependencyGraph<'a>) -> Self {
        Self { graph }
    }

    /// One `VersionConflict` for every edge whose target version falls
    /// outside the edge's constraint.
    pub fn check_edges(&self) -> Vec<ResolutionError> {
        let mut errors = Vec::new();
        for edge in self.graph.edges() {
            let Some(target) = self.graph.record(&edge.to) else {
                continue;
            };
            if !edge.constraint.matches(&target.version) {
                errors.push(ResolutionError::VersionConflict {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    constraint: edge.constraint.clone(),
                    actual: target.version.to_string(),
                });
            }
        }
        errors
    }

    /// One `ConstraintConflict` per target whose incoming constraints cannot
    /// all hold at once, whatever version is installed.
    ///
    /// The conflict lists every incoming edge that is disjoint from at least
    /// one other incoming edge, in edge order.
    pub fn check_shared_targets(&self) -> Vec<ResolutionError> {
        let mut errors = Vec::new();
        for name in self.graph.names() {
            let incoming = self.graph.dependents_of(name);
            if incoming.len() < 2 {
                continue;
            }

            let conflicting: Vec<(String, _)> = incoming
                .iter()
                .enumerate()
                .filter(|&(i, edge)| {
                    incoming
                        .iter()
                        .enumerate()
                        .any(|(j, other)| i != j && edge.constraint.is_disjoint(&other.constraint))
                })
                .map(|(_, edge)| (edge.from.clone(), edge.constraint.clone()))
                .collect();

            if !conflicting.is_empty() {
                tracing::debug!(plugin = %name, count = conflicting.len(), "Incompatible constraints");
                errors.push(ResolutionError::ConstraintConflict {
                    to: name.to_string(),
                    constraints: conflicting,
                });
            }
        }
        errors
    }

    /// All constraint problems in the graph.
    pub fn check(&self) -> Vec<ResolutionError> {
        let mut errors = self.check_edges();
        errors.extend(self.check_shared_targets());
        errors
    }
}

/// Resolve a manifest snapshot.
///
/// Runs every check and accumulates every error; nothing stops early.
pub fn resolve(store: &ManifestStore) -> Resolution {
    let mut errors: Vec<ResolutionError> = store.issues().to_vec();

    let (graph, missing) = DependencyGraph::build(store);
    errors.extend(missing);
    errors.extend(CycleDetector::new(&graph).detect());
    errors.extend(ConstraintResolver::new(&graph).check());

    let edges: Vec<DependencyEdge> = graph.edges().cloned().collect();

    if errors.is_empty() {
        tracing::info!(
            plugins = store.len(),
            dependencies = edges.len(),
            "All dependencies resolved"
        );
    } else {
        tracing::info!(errors = errors.len(), "Dependency resolution failed");
    }

    Resolution { edges, errors }
}

/// Validate one proposed manifest against a registry snapshot.
///
/// Checks that each of the candidate's dependencies exists and accepts the
/// installed version, and that adding the candidate (replacing any record of
/// the same name) does not close a dependency cycle through it. Problems
/// elsewhere in the registry are not reported.
pub fn check_candidate(store: &ManifestStore, candidate: &ManifestRecord) -> Vec<ResolutionError> {
    let mut errors = Vec::new();

    for dep in &candidate.dependencies {
        let Some(target) = store.get(&dep.name) else {
            errors.push(ResolutionError::MissingDependency {
                from: candidate.name.clone(),
                to: dep.name.clone(),
            });
            continue;
        };
        if !dep.constraint.matches(&target.version) {
            errors.push(ResolutionError::VersionConflict {
                from: candidate.name.clone(),
                to: dep.name.clone(),
                constraint: dep.constraint.clone(),
                actual: target.version.to_string(),
            });
        }
    }

    let combined = store.with_record(candidate.clone());
    let (graph, _) = DependencyGraph::build(&combined);
    errors.extend(
        CycleDetector::new(&graph)
            .cycles_involving(&candidate.name)
            .into_iter()
            .map(|path| ResolutionError::CircularDependency { path }),
    );

    errors
}
