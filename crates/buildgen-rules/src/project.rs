//! Resolver for project classes: the include-matched classes whose
//! sources live in this workspace.
//!
//! This is where the graph pipeline runs: the requested classes are
//! mapped to source files, the class graph is consolidated into a file
//! graph, the file graph is condensed into strongly connected
//! components, each component gets a package and a rule, and finally
//! every class is answered with the rule of its file's component.

use buildgen_graph::{DepGraph, condense, consolidate};
use buildgen_graph::classname::ensure_top_level;
use buildgen_schemas::RuleHint;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use tracing::{debug, error};

use crate::error::RuleError;
use crate::layout::plan_packages;
use crate::resolve::ClassResolver;
use crate::rule::{BuildRule, ProjectRule};
use crate::source_files::resolve_source_files;

/// Resolves include-matched classes to freshly generated project
/// rules.
///
/// Constructed by the pipeline with borrowed inputs; one instance
/// serves one run.
pub struct ProjectResolver<'a> {
    /// The preprocessed class graph.
    pub class_graph: &'a DepGraph<String>,
    /// Classes this resolver is responsible for (substring match).
    pub include: &'a Regex,
    /// Parser-supplied class→file map. When empty, the content roots
    /// are probed on the filesystem instead.
    pub class_to_file: &'a IndexMap<String, Utf8PathBuf>,
    /// Rule-kind hint for every source file.
    pub file_hints: &'a IndexMap<Utf8PathBuf, RuleHint>,
    /// Roots probed by the filesystem fallback.
    pub content_roots: &'a [Utf8PathBuf],
    /// Extension used by the filesystem fallback.
    pub source_ext: &'a str,
    /// Workspace root for label computation.
    pub workspace: &'a Utf8Path,
    /// Maximum fraction of include-matched classes that may remain
    /// unmapped before the run aborts.
    pub unresolved_threshold: f64,
}

impl ClassResolver for ProjectResolver<'_> {
    fn resolve(
        &self,
        classes: &IndexSet<String>,
    ) -> Result<IndexMap<String, BuildRule>, RuleError> {
        ensure_top_level(classes.iter().map(String::as_str))?;

        let project_classes: IndexSet<String> = classes
            .iter()
            .filter(|class| self.include.is_match(class))
            .cloned()
            .collect();
        let class_to_file = self.map_classes_to_files(&project_classes)?;
        self.check_coverage(&project_classes, &class_to_file)?;

        let file_graph = consolidate(self.class_graph, &class_to_file)?;
        let dag = condense(&file_graph);
        debug!(
            file_count = file_graph.node_count(),
            component_count = dag.len(),
            "condensed source-file graph"
        );
        let packages = plan_packages(dag.components());

        // One rule per component, created in the DAG's reverse
        // topological order. That order carries through the returned
        // map into the rule graph, which is what makes the emitted
        // stream list dependencies before their dependents.
        let mut file_to_rule: IndexMap<Utf8PathBuf, BuildRule> =
            IndexMap::new();
        for component in dag.components() {
            let directory = component
                .first()
                .expect("components are non-empty")
                .parent()
                .map(Utf8Path::to_owned)
                .unwrap_or_default();
            let package = packages
                .get(&directory)
                .expect("every component directory is planned");
            let rule = ProjectRule::new(
                component,
                self.file_hints,
                package,
                self.workspace,
            )?;
            for file in component {
                file_to_rule.insert(file.clone(), rule.clone());
            }
        }

        // Answer each class with its file's rule, keeping component
        // order: files of earlier components first, classes in mapping
        // order within a file.
        let mut classes_by_file: IndexMap<&Utf8PathBuf, Vec<&String>> =
            IndexMap::new();
        for (class, file) in &class_to_file {
            classes_by_file.entry(file).or_default().push(class);
        }
        let mut resolved = IndexMap::new();
        for (file, rule) in &file_to_rule {
            for class in classes_by_file.get(file).into_iter().flatten() {
                resolved.insert((*class).clone(), rule.clone());
            }
        }
        Ok(resolved)
    }
}

impl ProjectResolver<'_> {
    fn map_classes_to_files(
        &self,
        project_classes: &IndexSet<String>,
    ) -> Result<IndexMap<String, Utf8PathBuf>, RuleError> {
        if self.class_to_file.is_empty() {
            return resolve_source_files(
                project_classes,
                self.content_roots,
                self.source_ext,
            );
        }
        Ok(project_classes
            .iter()
            .filter_map(|class| {
                self.class_to_file
                    .get(class)
                    .map(|file| (class.clone(), file.clone()))
            })
            .collect())
    }

    /// Logs unmapped classes and fails when their share exceeds the
    /// threshold.
    #[expect(
        clippy::cast_precision_loss,
        reason = "class counts are far below 2^52"
    )]
    fn check_coverage(
        &self,
        project_classes: &IndexSet<String>,
        resolved: &IndexMap<String, Utf8PathBuf>,
    ) -> Result<(), RuleError> {
        let mut unresolved: Vec<&str> = project_classes
            .iter()
            .filter(|class| !resolved.contains_key(*class))
            .map(String::as_str)
            .collect();
        if unresolved.is_empty() || project_classes.is_empty() {
            return Ok(());
        }
        unresolved.sort_unstable();
        error!(
            classes = ?unresolved,
            "could not map project classes to source files"
        );

        let allowed = self.unresolved_threshold * project_classes.len() as f64;
        if allowed < unresolved.len() as f64 {
            return Err(RuleError::coverage_below_threshold(
                self.unresolved_threshold,
                project_classes.len(),
                unresolved.len(),
            ));
        }
        Ok(())
    }
}
