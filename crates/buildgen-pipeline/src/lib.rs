//! Pipeline orchestration: from parser output to the command stream.
//!
//! A run moves through fixed stages, each consuming its predecessor's
//! output: the raw class graph is preprocessed, the resolver chain maps
//! classes to build rules, the rule DAG is assembled, and the command
//! stream is emitted. The stream is collected in memory before anything
//! is written, so a fatal failure in any stage produces no output at
//! all, and partial effects on build files are impossible.
//!
//! ## Usage
//!
//! ```no_run
//! use buildgen_pipeline::{Config, run};
//! use regex::Regex;
//!
//! let config = Config::new(Regex::new("com.example").unwrap(), "/ws");
//! let input = std::io::stdin().lock();
//! let mut output = std::io::stdout().lock();
//! run(input, &mut output, &config).unwrap();
//! ```

mod config;
mod error;

use std::io::{Read, Write};

use buildgen_graph::{DepGraph, preprocess};
use buildgen_rules::{
    ClassResolver, ExternalResolver, ProjectResolver, UserMappingResolver,
    build_file_dirs, build_rule_graph, compute_commands, resolve_classes,
};
use buildgen_schemas::ParserOutput;
use camino::Utf8PathBuf;
use tracing::{debug, debug_span};

#[doc(inline)]
pub use crate::config::{
    Config, DEFAULT_EXCLUDE_PATTERN, DEFAULT_SOURCE_EXT,
    DEFAULT_UNRESOLVED_THRESHOLD,
};
#[doc(inline)]
pub use crate::error::PipelineError;

/// The complete output of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStream {
    /// Edit-tool commands, in emission order.
    pub commands: Vec<String>,
    /// Directories that must contain a BUILD file before the edit tool
    /// applies the commands.
    pub build_file_dirs: Vec<Utf8PathBuf>,
}

/// Decodes a [`ParserOutput`] from its MessagePack encoding, reading
/// the input to EOF.
///
/// # Errors
///
/// Returns [`PipelineError::is_decode`] on malformed input.
pub fn read_parser_output(
    input: impl Read,
) -> Result<ParserOutput, PipelineError> {
    Ok(rmp_serde::from_read(input)?)
}

/// Runs the generation pipeline over decoded parser output.
///
/// # Errors
///
/// Any stage failure aborts the run; see [`PipelineError`].
pub fn generate(
    parser_output: &ParserOutput,
    config: &Config,
) -> Result<CommandStream, PipelineError> {
    let _span = debug_span!("generate").entered();

    let class_graph = class_graph_from(parser_output);
    let class_graph =
        preprocess(&class_graph, &config.include, &config.exclude);
    debug!(
        class_count = class_graph.node_count(),
        edge_count = class_graph.edge_count(),
        "preprocessed class graph"
    );

    let resolvers = resolver_chain(parser_output, config, &class_graph);
    let rules = resolve_classes(&class_graph, &resolvers)?;
    debug!(rule_count = rules.len(), "resolved classes to rules");

    let rule_graph = build_rule_graph(&class_graph, &rules);
    Ok(CommandStream {
        commands: compute_commands(&rule_graph),
        build_file_dirs: build_file_dirs(&rule_graph),
    })
}

/// Decodes parser output from `input`, runs the pipeline, and writes
/// the newline-terminated command stream to `output`.
///
/// # Errors
///
/// Any decode, stage, or write failure aborts the run before output is
/// flushed.
pub fn run(
    input: impl Read,
    output: &mut impl Write,
    config: &Config,
) -> Result<(), PipelineError> {
    let parser_output = read_parser_output(input)?;
    let stream = generate(&parser_output, config)?;
    for command in &stream.commands {
        writeln!(output, "{command}")?;
    }
    Ok(())
}

/// Materializes the adjacency lists into a class graph. Self-loops in
/// malformed input are dropped rather than rejected.
fn class_graph_from(parser_output: &ParserOutput) -> DepGraph<String> {
    let mut graph = DepGraph::new();
    for (class, dependencies) in &parser_output.class_to_class {
        graph.add_node(class.clone());
        for dependency in dependencies {
            graph.add_edge(class.clone(), dependency.clone());
        }
    }
    graph
}

/// Builds the resolver chain in priority order: project sources first,
/// then the user mapping, then each external resolver.
fn resolver_chain<'a>(
    parser_output: &'a ParserOutput,
    config: &'a Config,
    class_graph: &'a DepGraph<String>,
) -> Vec<Box<dyn ClassResolver + 'a>> {
    let mut resolvers: Vec<Box<dyn ClassResolver>> =
        vec![Box::new(ProjectResolver {
            class_graph,
            include: &config.include,
            class_to_file: &parser_output.class_to_file,
            file_hints: &parser_output.file_to_rule_hint,
            content_roots: &config.content_roots,
            source_ext: &config.source_ext,
            workspace: &config.workspace,
            unresolved_threshold: config.unresolved_threshold,
        })];
    if !config.user_mapping.is_empty() {
        resolvers.push(Box::new(UserMappingResolver::new(
            config.user_mapping.clone(),
        )));
    }
    for executable in &config.external_resolvers {
        resolvers.push(Box::new(ExternalResolver::new(executable.clone())));
    }
    resolvers
}
