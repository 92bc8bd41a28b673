//! Dependency graph built from a manifest snapshot.
//!
//! Edges point from dependent to dependency: if `a` depends on `b`, the edge
//! is `a -> b` and appears in `a`'s forward list and `b`'s reverse list.
//! Dependencies on plugins that are not in the snapshot never become edges;
//! they are reported as [`ResolutionError::MissingDependency`] instead.
//!
//! # Example
//!
//! ```
//! use potion_core::graph::DependencyGraph;
//! use potion_core::manifest::ManifestRecord;
//! use potion_core::store::ManifestStore;
//! use potion_core::version::{Constraint, Version};
//!
//! let store = ManifestStore::from_records([
//!     ManifestRecord::new("app", Version::new(1, 0, 0))
//!         .depends_on("lib", Constraint::parse(">=1.0.0").unwrap()),
//!     ManifestRecord::new("lib", Version::new(1, 2, 0)),
//! ])
//! .unwrap();
//!
//! let (graph, errors) = DependencyGraph::build(&store);
//! assert!(errors.is_empty());
//! assert_eq!(graph.topological_order().unwrap(), vec!["lib", "app"]);
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use crate::error::ResolutionError;
use crate::manifest::ManifestRecord;
use crate::store::ManifestStore;
use crate::version::Constraint;

/// A resolved dependency between two plugins that both exist in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    pub constraint: Constraint,
}

/// Forward and reverse adjacency over one [`ManifestStore`].
///
/// Built once per resolution run and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DependencyGraph<'a> {
    store: &'a ManifestStore,
    /// Outgoing edges: what each plugin depends on.
    forward: BTreeMap<String, Vec<DependencyEdge>>,
    /// Incoming edges: who depends on each plugin.
    reverse: BTreeMap<String, Vec<DependencyEdge>>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph, collecting a `MissingDependency` error for every
    /// declared dependency whose target is not in the store.
    pub fn build(store: &'a ManifestStore) -> (Self, Vec<ResolutionError>) {
        let mut forward: BTreeMap<String, Vec<DependencyEdge>> = BTreeMap::new();
        let mut reverse: BTreeMap<String, Vec<DependencyEdge>> = BTreeMap::new();
        let mut errors = Vec::new();

        for name in store.names() {
            forward.entry(name.to_string()).or_default();
            reverse.entry(name.to_string()).or_default();
        }

        for record in store.records() {
            for dep in &record.dependencies {
                if !store.contains(&dep.name) {
                    tracing::debug!(from = %record.name, to = %dep.name, "Dependency not in registry");
                    errors.push(ResolutionError::MissingDependency {
                        from: record.name.clone(),
                        to: dep.name.clone(),
                    });
                    continue;
                }

                let edge = DependencyEdge {
                    from: record.name.clone(),
                    to: dep.name.clone(),
                    constraint: dep.constraint.clone(),
                };
                reverse.entry(edge.to.clone()).or_default().push(edge.clone());
                forward.entry(edge.from.clone()).or_default().push(edge);
            }
        }

        let graph = Self {
            store,
            forward,
            reverse,
        };
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            missing = errors.len(),
            "Built dependency graph"
        );
        (graph, errors)
    }

    /// The snapshot this graph was built from.
    pub fn store(&self) -> &'a ManifestStore {
        self.store
    }

    /// Look up the manifest behind a node.
    pub fn record(&self, name: &str) -> Option<&'a ManifestRecord> {
        self.store.get(name)
    }

    /// All node names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.forward.keys().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.forward.len()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(Vec::len).sum()
    }

    /// Every edge, grouped by source in name order and by declaration order
    /// within a source.
    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.forward.values().flatten()
    }

    /// Outgoing edges of `name`.
    pub fn dependencies_of(&self, name: &str) -> &[DependencyEdge] {
        self.forward.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Incoming edges of `name`.
    pub fn dependents_of(&self, name: &str) -> &[DependencyEdge] {
        self.reverse.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every plugin that depends on `name` directly or indirectly.
    pub fn transitive_dependents(&self, name: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let mut queue = VecDeque::from([name.to_string()]);

        while let Some(current) = queue.pop_front() {
            for edge in self.dependents_of(&current) {
                if found.insert(edge.from.clone()) {
                    queue.push_back(edge.from.clone());
                }
            }
        }

        found
    }

    /// Dependency-first ordering using Kahn's algorithm.
    ///
    /// Ties are broken alphabetically. Returns `None` if the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<&str>> {
        let mut remaining: BTreeMap<&str, usize> = self
            .forward
            .iter()
            .map(|(name, edges)| (name.as_str(), edges.len()))
            .collect();

        let mut ready: BTreeSet<&str> = remaining
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&name, _)| name)
            .collect();

        let mut order = Vec::with_capacity(remaining.len());

        while let Some(current) = ready.pop_first() {
            order.push(current);
            for edge in self.dependents_of(current) {
                if let Some(count) = remaining.get_mut(edge.from.as_str()) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(edge.from.as_str());
                    }
                }
            }
        }

        (order.len() == self.node_count()).then_some(order)
    }
}
