//! Class-to-rule resolution: the resolver interface and its
//! composition.

use buildgen_graph::DepGraph;
use indexmap::{IndexMap, IndexSet};
use tracing::warn;

use crate::error::RuleError;
use crate::rule::BuildRule;

/// Maps fully qualified top-level class names to build rules.
///
/// Implementations resolve whatever subset of the request they know
/// about and silently omit the rest; the pipeline runs resolvers in
/// priority order over the shrinking set of unresolved classes.
pub trait ClassResolver {
    /// Resolves as many of `classes` as possible.
    ///
    /// # Errors
    ///
    /// Implementations fail only on fatal conditions (bad mapping data,
    /// failed child processes, coverage below threshold); a class they
    /// simply do not know is not an error.
    fn resolve(
        &self,
        classes: &IndexSet<String>,
    ) -> Result<IndexMap<String, BuildRule>, RuleError>;
}

/// Runs `resolvers` in priority order over the graph's classes and
/// combines their answers into one class→rule map.
///
/// Each resolver only sees the classes no earlier resolver claimed;
/// once everything is resolved the remaining resolvers are skipped. A
/// class need not resolve at all (leftovers are logged at warning
/// level and dropped from the rule graph), but a resolver answering
/// for a class that already has a rule is a fatal conflict.
pub fn resolve_classes(
    class_graph: &DepGraph<String>,
    resolvers: &[Box<dyn ClassResolver + '_>],
) -> Result<IndexMap<String, BuildRule>, RuleError> {
    let mut unresolved: IndexSet<String> =
        class_graph.nodes().cloned().collect();
    let mut rules: IndexMap<String, BuildRule> = IndexMap::new();

    for resolver in resolvers {
        if unresolved.is_empty() {
            break;
        }
        for (class, rule) in resolver.resolve(&unresolved)? {
            unresolved.shift_remove(&class);
            if let Some(existing) = rules.get(&class) {
                return Err(RuleError::resolve_conflict(
                    &class,
                    rule.label(),
                    existing.label(),
                ));
            }
            rules.insert(class, rule);
        }
    }

    if !unresolved.is_empty() {
        let mut classes: Vec<&str> =
            unresolved.iter().map(String::as_str).collect();
        classes.sort_unstable();
        warn!(?classes, "no build rules found for some classes");
    }
    Ok(rules)
}
