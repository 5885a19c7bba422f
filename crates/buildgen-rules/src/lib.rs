//! Build-rule construction and command emission.
//!
//! This crate owns everything between the preprocessed class graph and
//! the emitted command stream:
//!
//! - the [`BuildRule`] model: project rules (generated, with sources and
//!   creation commands) and external rules (only a label),
//! - the [`ClassResolver`] trait and its variants: the project resolver
//!   that condenses source files into components and builds rules, the
//!   user-mapping resolver, and the external-process resolver,
//! - package layout planning (which directory hosts a component's BUILD
//!   file) and rule-kind election across a component's files,
//! - rule-graph assembly and the deterministic command stream walk.

mod command;
mod emit;
mod error;
mod external;
mod kind;
mod layout;
mod project;
mod resolve;
mod rule;
mod source_files;
mod user_mapping;

#[doc(inline)]
pub use crate::emit::{
    RuleGraph, build_file_dirs, build_rule_graph, compute_commands,
};
#[doc(inline)]
pub use crate::error::RuleError;
#[doc(inline)]
pub use crate::external::ExternalResolver;
#[doc(inline)]
pub use crate::kind::{MergedHint, merge_hints};
#[doc(inline)]
pub use crate::layout::{longest_common_prefix, plan_packages};
#[doc(inline)]
pub use crate::project::ProjectResolver;
#[doc(inline)]
pub use crate::resolve::{ClassResolver, resolve_classes};
#[doc(inline)]
pub use crate::rule::{BuildRule, ProjectRule};
#[doc(inline)]
pub use crate::source_files::resolve_source_files;
#[doc(inline)]
pub use crate::user_mapping::UserMappingResolver;
