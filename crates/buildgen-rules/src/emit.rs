//! Rule-graph assembly and deterministic command emission.

use buildgen_graph::DepGraph;
use camino::Utf8PathBuf;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use crate::command;
use crate::rule::BuildRule;

/// Directed acyclic graph of build rules, keyed by label.
///
/// Node iteration follows first insertion, which
/// [`build_rule_graph`] arranges to be rule creation order: project
/// rules in the component DAG's reverse topological order. That makes
/// the emitted stream walk dependencies before their dependents
/// without a second sort.
#[derive(Debug, Default)]
pub struct RuleGraph {
    nodes: IndexMap<String, BuildRule>,
    successors: IndexMap<String, IndexSet<String>>,
}

impl RuleGraph {
    /// Creates an empty rule graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule; re-adding keeps the original position.
    pub fn add_node(&mut self, rule: &BuildRule) {
        if !self.nodes.contains_key(rule.label()) {
            self.nodes.insert(rule.label().to_owned(), rule.clone());
        }
    }

    /// Adds a dependency edge between two rules, inserting both as
    /// needed. Self-edges are dropped.
    pub fn add_edge(&mut self, from: &BuildRule, to: &BuildRule) {
        if from.label() == to.label() {
            return;
        }
        self.add_node(from);
        self.add_node(to);
        self.successors
            .entry(from.label().to_owned())
            .or_default()
            .insert(to.label().to_owned());
    }

    /// Iterates over rules in insertion order.
    pub fn rules(&self) -> impl Iterator<Item = &BuildRule> {
        self.nodes.values()
    }

    /// Labels of the rules `label` depends on, in edge insertion
    /// order.
    pub fn successor_labels(
        &self,
        label: &str,
    ) -> impl Iterator<Item = &str> {
        self.successors
            .get(label)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Number of rules.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Builds the rule DAG from the class graph and the combined class→rule
/// map.
///
/// Classes sharing a rule collapse into one node; an edge between two
/// classes of the same rule would be a self-loop and is dropped.
/// Classes without a rule contribute nothing.
pub fn build_rule_graph(
    class_graph: &DepGraph<String>,
    rules: &IndexMap<String, BuildRule>,
) -> RuleGraph {
    let mut graph = RuleGraph::new();
    for (class, rule) in rules {
        graph.add_node(rule);
        for successor in class_graph.successors(class) {
            let Some(target) = rules.get(successor) else {
                continue;
            };
            if target.label() == rule.label() {
                continue;
            }
            graph.add_edge(rule, target);
        }
    }
    graph
}

/// Emits the complete command stream for a rule graph.
///
/// Per rule, in graph order: the creation commands, then, for project
/// rules with at least one dependency, a single `add deps` command
/// listing every successor label exactly once, alphabetically sorted.
/// External rules and dependency-free project rules emit no dep
/// command.
pub fn compute_commands(graph: &RuleGraph) -> Vec<String> {
    let mut commands = Vec::new();
    for rule in graph.rules() {
        commands.extend_from_slice(rule.creation_commands());
        if !rule.wants_deps() {
            continue;
        }
        let deps: Vec<String> = graph
            .successor_labels(rule.label())
            .map(str::to_owned)
            .sorted()
            .collect();
        if deps.is_empty() {
            continue;
        }
        commands.push(command::add_attribute("deps", &deps, rule.label()));
    }
    commands
}

/// Package directories that must contain a BUILD file before the edit
/// tool can apply the stream, deduplicated in rule order.
pub fn build_file_dirs(graph: &RuleGraph) -> Vec<Utf8PathBuf> {
    let mut dirs: IndexSet<Utf8PathBuf> = IndexSet::new();
    for rule in graph.rules() {
        if let Some(project) = rule.as_project() {
            dirs.insert(project.package_dir().to_owned());
        }
    }
    dirs.into_iter().collect()
}
