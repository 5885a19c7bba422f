//! Graph stages of the buildgen pipeline.
//!
//! This crate owns everything between the raw class graph and the
//! strongly-connected-component DAG the rule builder consumes:
//!
//! 1. [`preprocess`] trims the class graph against include/exclude
//!    patterns and collapses nested-class identifiers into their
//!    enclosing top-level identifier.
//! 2. [`consolidate`] converts the class graph into a source-file graph
//!    using a class→file mapping, dropping intra-file edges.
//! 3. [`condense`] computes strongly connected components and the
//!    induced acyclic component graph, in the reverse topological order
//!    the command emitter walks.
//!
//! All graphs are [`DepGraph`]s: adjacency is insertion-ordered, so
//! every traversal, and therefore the emitted command stream, is
//! reproducible across runs.

pub mod classname;
mod consolidate;
mod depgraph;
mod error;
mod preprocess;
mod scc;

#[doc(inline)]
pub use crate::consolidate::consolidate;
#[doc(inline)]
pub use crate::depgraph::DepGraph;
#[doc(inline)]
pub use crate::error::GraphError;
#[doc(inline)]
pub use crate::preprocess::preprocess;
#[doc(inline)]
pub use crate::scc::{ComponentDag, condense};
