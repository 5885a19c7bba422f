//! Insertion-ordered directed graph used throughout the pipeline.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// A directed graph whose node and successor iteration follows insertion
/// order.
///
/// Hash-based adjacency would leak nondeterministic iteration order into
/// the emitted command stream, so nodes and edges are stored in
/// [`IndexMap`]/[`IndexSet`] and every traversal replays the order in
/// which they were first added.
///
/// The graphs this pipeline operates on never contain self-loops (the
/// class graph by input contract, the file graph by construction), so
/// [`DepGraph::add_edge`] silently drops an edge from a node to itself.
#[derive(Debug, Clone)]
pub struct DepGraph<N> {
    adjacency: IndexMap<N, IndexSet<N>>,
}

impl<N: Eq + Hash> PartialEq for DepGraph<N> {
    fn eq(&self, other: &Self) -> bool {
        self.adjacency == other.adjacency
    }
}

impl<N> Default for DepGraph<N> {
    fn default() -> Self {
        Self {
            adjacency: IndexMap::new(),
        }
    }
}

impl<N: Eq + Hash + Clone> DepGraph<N> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with no edges. Re-adding an existing node keeps its
    /// position and edges.
    pub fn add_node(&mut self, node: N) {
        self.adjacency.entry(node).or_default();
    }

    /// Adds a directed edge, inserting both endpoints as needed (source
    /// first, so node order follows first mention). Self-loops are
    /// dropped.
    pub fn add_edge(&mut self, from: N, to: N) {
        if from == to {
            return;
        }
        self.add_node(to.clone());
        self.adjacency.entry(from).or_default().insert(to);
    }

    /// Returns true if the node is present.
    pub fn contains_node(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Returns true if the edge is present.
    pub fn has_edge(&self, from: &N, to: &N) -> bool {
        self.adjacency
            .get(from)
            .is_some_and(|successors| successors.contains(to))
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.adjacency.keys()
    }

    /// Iterates over the successors of a node in insertion order. A node
    /// that is absent from the graph has no successors.
    pub fn successors(&self, node: &N) -> impl Iterator<Item = &N> {
        self.adjacency.get(node).into_iter().flatten()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexSet::len).sum()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)]) -> DepGraph<String> {
        let mut g = DepGraph::new();
        for (from, to) in edges {
            g.add_edge((*from).to_owned(), (*to).to_owned());
        }
        g
    }

    /// Nodes iterate in the order they were first mentioned, whether as
    /// edge source or edge target.
    #[test]
    fn test_node_order_follows_first_mention() {
        let g = graph(&[("a", "b"), ("c", "a"), ("b", "d")]);
        let nodes: Vec<&str> = g.nodes().map(String::as_str).collect();
        assert_eq!(nodes, vec!["a", "b", "c", "d"]);
    }

    /// Successors iterate in edge insertion order.
    #[test]
    fn test_successor_order_is_insertion_order() {
        let g = graph(&[("a", "z"), ("a", "b"), ("a", "m")]);
        let successors: Vec<&str> =
            g.successors(&"a".to_owned()).map(String::as_str).collect();
        assert_eq!(successors, vec!["z", "b", "m"]);
    }

    /// Self-loops are dropped at insertion.
    #[test]
    fn test_self_loops_are_dropped() {
        let mut g = graph(&[("a", "b")]);
        g.add_edge("a".to_owned(), "a".to_owned());

        assert!(!g.has_edge(&"a".to_owned(), &"a".to_owned()));
        assert_eq!(g.edge_count(), 1);
    }

    /// Duplicate edges collapse to one.
    #[test]
    fn test_duplicate_edges_collapse() {
        let g = graph(&[("a", "b"), ("a", "b")]);
        assert_eq!(g.edge_count(), 1);
    }

    /// Re-adding a node keeps its edges; absent nodes have no
    /// successors.
    #[test]
    fn test_add_node_is_idempotent() {
        let mut g = graph(&[("a", "b")]);
        g.add_node("a".to_owned());

        assert!(g.has_edge(&"a".to_owned(), &"b".to_owned()));
        assert_eq!(g.successors(&"missing".to_owned()).count(), 0);
    }
}
