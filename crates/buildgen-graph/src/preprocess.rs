//! Class-graph preprocessing: pattern trimming and nested-class
//! collapsing.
//!
//! Preprocessing runs two passes, in this order:
//!
//! 1. *Trim* keeps a class iff its identifier matches the include
//!    pattern and does not match the exclude pattern. A kept class's
//!    outgoing edges survive unless the target matches the exclude
//!    pattern. Targets do not need to match the include pattern, since
//!    dependencies on out-of-project classes are resolved later by the
//!    resolver chain. Classes reachable only from trimmed classes fall
//!    out of the graph with their last incoming edge.
//! 2. *Collapse* replaces every surviving identifier with its enclosing
//!    top-level identifier. Edges between two members of the same
//!    top-level class become self-loops and are dropped; duplicate
//!    edges collapse to one.

use regex::Regex;

use crate::classname::outer_class;
use crate::depgraph::DepGraph;

/// Preprocesses a class graph against include/exclude patterns.
///
/// Both patterns use substring matching, so `bfg` matches
/// `com.bfg.Foo`. Patterns that exclude every identifier yield an empty
/// graph; preprocessing itself cannot fail.
pub fn preprocess(
    graph: &DepGraph<String>,
    include: &Regex,
    exclude: &Regex,
) -> DepGraph<String> {
    collapse_nested(&trim(graph, include, exclude))
}

/// Drops excluded classes and all outgoing edges of non-included
/// classes.
fn trim(
    graph: &DepGraph<String>,
    include: &Regex,
    exclude: &Regex,
) -> DepGraph<String> {
    let mut trimmed = DepGraph::new();
    for class in graph.nodes() {
        if !include.is_match(class) || exclude.is_match(class) {
            continue;
        }
        trimmed.add_node(class.clone());
        for successor in graph.successors(class) {
            if exclude.is_match(successor) {
                continue;
            }
            trimmed.add_edge(class.clone(), successor.clone());
        }
    }
    trimmed
}

/// Collapses nested classes into their enclosing top-level class.
fn collapse_nested(graph: &DepGraph<String>) -> DepGraph<String> {
    let mut collapsed = DepGraph::new();
    for class in graph.nodes() {
        let outer = outer_class(class);
        collapsed.add_node(outer.to_owned());
        for successor in graph.successors(class) {
            let outer_successor = outer_class(successor);
            if outer == outer_successor {
                // An edge between two members of the same top-level
                // class collapses into a self-loop; drop it.
                continue;
            }
            collapsed.add_edge(outer.to_owned(), outer_successor.to_owned());
        }
    }
    collapsed
}
