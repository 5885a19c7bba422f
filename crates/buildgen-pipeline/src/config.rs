//! Run configuration for the pipeline.

use camino::Utf8PathBuf;
use regex::Regex;

/// Default exclude pattern: generated identifiers.
pub const DEFAULT_EXCLUDE_PATTERN: &str = "AutoValue_";

/// Default maximum fraction of include-matched classes that may stay
/// unresolved before the run aborts.
pub const DEFAULT_UNRESOLVED_THRESHOLD: f64 = 0.7;

/// Default extension probed by the filesystem fallback resolver.
pub const DEFAULT_SOURCE_EXT: &str = "java";

/// Settings controlling a single pipeline run.
///
/// Built by the CLI from its flags; both patterns use substring
/// matching, so `bfg` matches `com.bfg.Foo`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Classes to generate rules for.
    pub include: Regex,
    /// Classes to drop from the graph entirely.
    pub exclude: Regex,
    /// Workspace root; labels are computed relative to it.
    pub workspace: Utf8PathBuf,
    /// Directories probed by the filesystem fallback resolver, in
    /// order.
    pub content_roots: Vec<Utf8PathBuf>,
    /// Extension appended when probing the content roots.
    pub source_ext: String,
    /// Lines of the user mapping file; empty disables the user-mapping
    /// resolver.
    pub user_mapping: Vec<String>,
    /// External resolver executables, in priority order.
    pub external_resolvers: Vec<String>,
    /// Maximum fraction of include-matched classes that may stay
    /// unresolved.
    pub unresolved_threshold: f64,
}

impl Config {
    /// Creates a configuration with the given include pattern and
    /// workspace root; everything else starts at its default.
    pub fn new(include: Regex, workspace: impl Into<Utf8PathBuf>) -> Self {
        Self {
            include,
            exclude: Regex::new(DEFAULT_EXCLUDE_PATTERN)
                .expect("default exclude pattern compiles"),
            workspace: workspace.into(),
            content_roots: Vec::new(),
            source_ext: DEFAULT_SOURCE_EXT.to_owned(),
            user_mapping: Vec::new(),
            external_resolvers: Vec::new(),
            unresolved_threshold: DEFAULT_UNRESOLVED_THRESHOLD,
        }
    }
}
