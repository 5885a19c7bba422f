//! Consolidation of a class graph into a source-file graph.
//!
//! Classes defined in the same file collapse into one node, so an edge
//! list like
//!
//! ```text
//! com.A -> com.C        com.A -> com/A.java
//! com.B -> com.C        com.B -> com/B.java
//! com.C -> com.A        com.C -> com/A.java
//! ```
//!
//! becomes `com/A.java -> com/B.java`-style file edges with the
//! `com.A -> com.C` edge dropped as intra-file.

use camino::Utf8PathBuf;
use indexmap::IndexMap;

use crate::classname::is_nested;
use crate::depgraph::DepGraph;
use crate::error::GraphError;

/// Converts a class dependency graph into a source-file dependency
/// graph.
///
/// Classes absent from `class_to_file` are skipped along with their
/// edges: they belong to externally resolved or out-of-project classes
/// and are handled at the class-to-rule layer. Edges between classes in
/// the same file are dropped, so the result never contains self-loops.
///
/// # Errors
///
/// Returns [`GraphError::is_nested_class`] if the graph still contains a
/// nested-class identifier; callers must preprocess first.
pub fn consolidate(
    class_graph: &DepGraph<String>,
    class_to_file: &IndexMap<String, Utf8PathBuf>,
) -> Result<DepGraph<Utf8PathBuf>, GraphError> {
    let mut file_graph = DepGraph::new();
    for class in class_graph.nodes() {
        if is_nested(class) {
            return Err(GraphError::nested_class(class));
        }
        let Some(file) = class_to_file.get(class) else {
            continue;
        };
        file_graph.add_node(file.clone());
        for successor in class_graph.successors(class) {
            let Some(successor_file) = class_to_file.get(successor) else {
                continue;
            };
            if successor_file != file {
                file_graph.add_edge(file.clone(), successor_file.clone());
            }
        }
    }
    Ok(file_graph)
}
