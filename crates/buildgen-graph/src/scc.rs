//! Strongly-connected-component condensation over a [`DepGraph`].
//!
//! Nodes are interned into dense indices, the graph is handed to
//! petgraph's Tarjan-based `condensation`, and the result is re-keyed by
//! the original node values. The condensation yields components in
//! reverse topological order (every component precedes the components
//! that depend on it), which is exactly the order the command emitter
//! walks, so that a rule's dependencies are created before the rule
//! itself.

use std::hash::Hash;

use indexmap::IndexSet;
use petgraph::algo::condensation;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::depgraph::DepGraph;

/// The condensation of a directed graph: its strongly connected
/// components plus the acyclic graph induced between them.
///
/// Component ids are positions in reverse topological order. An edge
/// `c1 -> c2` exists iff the input contained an edge `(u, v)` with
/// `u ∈ c1`, `v ∈ c2`, `c1 ≠ c2`; parallel edges are deduplicated and
/// there are no self-loops. Singleton components are valid and kept.
#[derive(Debug, Clone)]
pub struct ComponentDag<N> {
    components: Vec<IndexSet<N>>,
    successors: Vec<Vec<usize>>,
}

impl<N: Eq + Hash> ComponentDag<N> {
    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the input graph had no nodes.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The component with the given id.
    pub fn component(&self, id: usize) -> &IndexSet<N> {
        &self.components[id]
    }

    /// Iterates over components in reverse topological order.
    pub fn components(&self) -> impl Iterator<Item = &IndexSet<N>> {
        self.components.iter()
    }

    /// Ids of the components that `id` depends on, ascending.
    pub fn successors(&self, id: usize) -> &[usize] {
        &self.successors[id]
    }

    /// Id of the component containing `node`, if any.
    pub fn component_of(&self, node: &N) -> Option<usize> {
        self.components
            .iter()
            .position(|component| component.contains(node))
    }
}

/// Condenses a directed graph into its [`ComponentDag`].
///
/// Neighbor iteration follows the `DepGraph`'s insertion order, so
/// component ordering is reproducible for a given input.
pub fn condense<N: Eq + Hash + Clone>(graph: &DepGraph<N>) -> ComponentDag<N> {
    // Intern nodes so petgraph works over dense indices.
    let index: IndexSet<N> = graph.nodes().cloned().collect();
    let mut digraph = DiGraph::<usize, ()>::with_capacity(index.len(), 0);
    for i in 0..index.len() {
        digraph.add_node(i);
    }
    for (from, node) in index.iter().enumerate() {
        for successor in graph.successors(node) {
            let to = index
                .get_index_of(successor)
                .expect("every successor is a graph node");
            digraph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
        }
    }

    // make_acyclic=true drops self-loops and deduplicates inter-component
    // edges; node order in the result is reverse topological.
    let condensed = condensation(digraph, true);

    let components: Vec<IndexSet<N>> = condensed
        .node_weights()
        .map(|members| members.iter().map(|&i| index[i].clone()).collect())
        .collect();
    let successors: Vec<Vec<usize>> = (0..condensed.node_count())
        .map(|id| {
            let mut successor_ids: Vec<usize> = condensed
                .neighbors(NodeIndex::new(id))
                .map(NodeIndex::index)
                .collect();
            successor_ids.sort_unstable();
            successor_ids.dedup();
            successor_ids
        })
        .collect();

    debug!(
        node_count = index.len(),
        component_count = components.len(),
        "condensed dependency graph"
    );
    ComponentDag {
        components,
        successors,
    }
}
