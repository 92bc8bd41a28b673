//! Circular dependency detection.
//!
//! Three-colour depth-first search over the forward adjacency. White nodes
//! are unvisited, gray nodes are on the current path and black nodes are
//! finished. Reaching a gray node closes a cycle. The walk keeps its own
//! frame stack rather than recursing, so very deep dependency chains cannot
//! exhaust the call stack.

use std::collections::HashMap;

use crate::error::ResolutionError;
use crate::graph::DependencyGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Finds every cycle reachable in a [`DependencyGraph`].
pub struct CycleDetector<'g, 'a> {
    graph: &'g DependencyGraph<'a>,
}

impl<'g, 'a> CycleDetector<'g, 'a> {
    pub fn new(graph: &'g DependencyGraph<'a>) -> Self {
        Self { graph }
    }

    /// Return every cycle found, each as the path from the node where the
    /// cycle was entered back to that same node (`["a", "b", "a"]`).
    ///
    /// Every node is tried as a root in name order, so disconnected
    /// components are all covered. Each back edge yields one cycle;
    /// identical paths are reported once.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut color: HashMap<&str, Color> =
            self.graph.names().map(|name| (name, Color::White)).collect();
        let mut cycles: Vec<Vec<String>> = Vec::new();

        for root in self.graph.names() {
            if color.get(root) != Some(&Color::White) {
                continue;
            }

            // (node, index of the next outgoing edge to follow)
            let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
            color.insert(root, Color::Gray);

            while let Some(&(node, next)) = stack.last() {
                let edges = self.graph.dependencies_of(node);
                let Some(edge) = edges.get(next) else {
                    color.insert(node, Color::Black);
                    stack.pop();
                    continue;
                };

                let top = stack.len() - 1;
                stack[top].1 += 1;

                let target = edge.to.as_str();
                match color.get(target).copied().unwrap_or(Color::Black) {
                    Color::White => {
                        color.insert(target, Color::Gray);
                        stack.push((target, 0));
                    }
                    Color::Gray => {
                        if let Some(start) = stack.iter().position(|&(name, _)| name == target) {
                            let cycle: Vec<String> = stack[start..]
                                .iter()
                                .map(|&(name, _)| name.to_string())
                                .chain(std::iter::once(target.to_string()))
                                .collect();
                            tracing::debug!(cycle = %cycle.join(" -> "), "Found dependency cycle");
                            if !cycles.contains(&cycle) {
                                cycles.push(cycle);
                            }
                        }
                    }
                    Color::Black => {}
                }
            }
        }

        cycles
    }

    /// Report every cycle as a `CircularDependency` error.
    pub fn detect(&self) -> Vec<ResolutionError> {
        self.find_cycles()
            .into_iter()
            .map(|path| ResolutionError::CircularDependency { path })
            .collect()
    }

    /// Cycles that pass through `name`.
    pub fn cycles_involving(&self, name: &str) -> Vec<Vec<String>> {
        self.find_cycles()
            .into_iter()
            .filter(|cycle| cycle.iter().any(|n| n == name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestRecord;
    use crate::store::ManifestStore;
    use crate::version::{Constraint, Version};

    fn node(name: &str, deps: &[&str]) -> ManifestRecord {
        deps.iter().fold(ManifestRecord::new(name, Version::new(1, 0, 0)), |record, dep| {
            record.depends_on(*dep, Constraint::any())
        })
    }

    fn cycles_of(records: Vec<ManifestRecord>) -> Vec<Vec<String>> {
        let store = ManifestStore::from_records(records).unwrap();
        let (graph, _) = DependencyGraph::build(&store);
        CycleDetector::new(&graph).find_cycles()
    }

    #[test]
    fn test_acyclic_graph() {
        let cycles = cycles_of(vec![
            node("a", &["b", "c"]),
            node("b", &["c"]),
            node("c", &[]),
        ]);
        assert!(cycles.is_empty());
    }

    #[test]
    fn test_three_node_cycle() {
        let cycles = cycles_of(vec![node("a", &["b"]), node("b", &["c"]), node("c", &["a"])]);
        assert_eq!(cycles, vec![vec!["a", "b", "c", "a"]]);
    }

    #[test]
    fn test_self_dependency() {
        let cycles = cycles_of(vec![node("solo", &["solo"])]);
        assert_eq!(cycles, vec![vec!["solo", "solo"]]);
    }

    #[test]
    fn test_cycle_entered_mid_path() {
        // entry -> x -> y -> x: the reported path starts where the cycle starts
        let cycles = cycles_of(vec![node("entry", &["x"]), node("x", &["y"]), node("y", &["x"])]);
        assert_eq!(cycles, vec![vec!["x", "y", "x"]]);
    }

    #[test]
    fn test_disconnected_cycles_all_reported() {
        let cycles = cycles_of(vec![
            node("a", &["b"]),
            node("b", &["a"]),
            node("m", &[]),
            node("x", &["y"]),
            node("y", &["z"]),
            node("z", &["x"]),
        ]);
        assert_eq!(cycles.len(), 2);
        assert!(cycles.contains(&vec!["a".to_string(), "b".to_string(), "a".to_string()]));
        assert!(cycles.contains(&vec![
            "x".to_string(),
            "y".to_string(),
            "z".to_string(),
            "x".to_string()
        ]));
    }

    #[test]
    fn test_two_cycles_through_one_node() {
        // a -> b -> a and a -> c -> a share node a but no edge
        let cycles = cycles_of(vec![node("a", &["b", "c"]), node("b", &["a"]), node("c", &["a"])]);
        assert_eq!(
            cycles,
            vec![vec!["a", "b", "a"], vec!["a", "c", "a"]]
        );
    }

    #[test]
    fn test_repeated_edge_reported_once() {
        let cycles = cycles_of(vec![node("a", &["a", "a"])]);
        assert_eq!(cycles.len(), 1);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let n = 20_000;
        let mut records: Vec<ManifestRecord> = (0..n)
            .map(|i| node(&format!("p{i:05}"), &[format!("p{:05}", i + 1).as_str()]))
            .collect();
        records.push(node(&format!("p{n:05}"), &["p00000"]));

        let cycles = cycles_of(records);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), n + 2);
    }

    #[test]
    fn test_cycles_involving() {
        let store = ManifestStore::from_records(vec![
            node("a", &["b"]),
            node("b", &["a"]),
            node("c", &["c"]),
        ])
        .unwrap();
        let (graph, _) = DependencyGraph::build(&store);
        let detector = CycleDetector::new(&graph);

        assert_eq!(detector.cycles_involving("c"), vec![vec!["c", "c"]]);
        assert_eq!(detector.cycles_involving("a").len(), 1);
        assert!(detector.detect().iter().all(|e| matches!(e, ResolutionError::CircularDependency { .. })));
    }
}
