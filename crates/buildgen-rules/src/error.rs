//! Error types for the buildgen-rules crate.

use std::backtrace::Backtrace;
use std::fmt;
use std::process::ExitStatus;

use buildgen_graph::GraphError;
use camino::{Utf8Path, Utf8PathBuf};

/// Error type for class resolution and rule construction.
///
/// Every fatal condition between the preprocessed class graph and the
/// emitted command stream is reported through this type. Uses the
/// struct-wrapping-an-enum pattern with backtrace capture and `is_xxx()`
/// classifier methods; the variants stay private so the classification
/// surface is stable.
#[derive(Debug)]
pub struct RuleError {
    kind: RuleErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
enum RuleErrorKind {
    /// A nested-class identifier reached a stage that requires
    /// top-level identifiers.
    Graph(GraphError),
    /// Rule kinds within one component disagree on their prefix.
    KindPrefixMismatch(Vec<String>),
    /// Rule kinds within one component cannot be merged into one kind.
    KindMergeAmbiguous(Vec<String>),
    /// A resolved source file carries no rule-kind hint.
    MissingKindHint(Utf8PathBuf),
    /// Two resolvers produced rules for the same class.
    ResolveConflict {
        class: String,
        first: String,
        second: String,
    },
    /// Too many include-matched classes could not be mapped to files.
    CoverageBelowThreshold {
        threshold: f64,
        matched: usize,
        unresolved: usize,
    },
    /// A user-mapping line is not of the `class,label` form.
    UserMappingMalformedLine { line_number: usize, line: String },
    /// A user-mapping class name contains `$`.
    UserMappingNestedClass(String),
    /// A user-mapping class maps to two different labels.
    UserMappingDuplicateKey {
        class: String,
        first: String,
        second: String,
    },
    /// An external resolver executable could not be launched.
    ResolverSpawn {
        executable: String,
        source: std::io::Error,
    },
    /// I/O towards a running external resolver failed.
    ResolverExchange {
        executable: String,
        source: std::io::Error,
    },
    /// An external resolver exited with a non-zero status.
    ResolverFailed {
        executable: String,
        status: ExitStatus,
    },
    /// An external resolver emitted a class line without a label line.
    ResolverTruncatedOutput(String),
    /// A path was expected to live under a base directory but does not.
    PathNotUnder {
        path: Utf8PathBuf,
        base: Utf8PathBuf,
    },
}

impl RuleError {
    fn new(kind: RuleErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    pub(crate) fn kind_prefix_mismatch(kinds: Vec<String>) -> Self {
        Self::new(RuleErrorKind::KindPrefixMismatch(kinds))
    }

    pub(crate) fn kind_merge_ambiguous(kinds: Vec<String>) -> Self {
        Self::new(RuleErrorKind::KindMergeAmbiguous(kinds))
    }

    pub(crate) fn missing_kind_hint(file: &Utf8Path) -> Self {
        Self::new(RuleErrorKind::MissingKindHint(file.to_owned()))
    }

    pub(crate) fn resolve_conflict(
        class: &str,
        first: &str,
        second: &str,
    ) -> Self {
        Self::new(RuleErrorKind::ResolveConflict {
            class: class.to_owned(),
            first: first.to_owned(),
            second: second.to_owned(),
        })
    }

    pub(crate) fn coverage_below_threshold(
        threshold: f64,
        matched: usize,
        unresolved: usize,
    ) -> Self {
        Self::new(RuleErrorKind::CoverageBelowThreshold {
            threshold,
            matched,
            unresolved,
        })
    }

    pub(crate) fn user_mapping_malformed_line(
        line_number: usize,
        line: &str,
    ) -> Self {
        Self::new(RuleErrorKind::UserMappingMalformedLine {
            line_number,
            line: line.to_owned(),
        })
    }

    pub(crate) fn user_mapping_nested_class(class: &str) -> Self {
        Self::new(RuleErrorKind::UserMappingNestedClass(class.to_owned()))
    }

    pub(crate) fn user_mapping_duplicate_key(
        class: &str,
        first: &str,
        second: &str,
    ) -> Self {
        Self::new(RuleErrorKind::UserMappingDuplicateKey {
            class: class.to_owned(),
            first: first.to_owned(),
            second: second.to_owned(),
        })
    }

    pub(crate) fn resolver_spawn(
        executable: &str,
        source: std::io::Error,
    ) -> Self {
        Self::new(RuleErrorKind::ResolverSpawn {
            executable: executable.to_owned(),
            source,
        })
    }

    pub(crate) fn resolver_exchange(
        executable: &str,
        source: std::io::Error,
    ) -> Self {
        Self::new(RuleErrorKind::ResolverExchange {
            executable: executable.to_owned(),
            source,
        })
    }

    pub(crate) fn resolver_failed(
        executable: &str,
        status: ExitStatus,
    ) -> Self {
        Self::new(RuleErrorKind::ResolverFailed {
            executable: executable.to_owned(),
            status,
        })
    }

    pub(crate) fn resolver_truncated_output(executable: &str) -> Self {
        Self::new(RuleErrorKind::ResolverTruncatedOutput(
            executable.to_owned(),
        ))
    }

    pub(crate) fn path_not_under(path: &Utf8Path, base: &Utf8Path) -> Self {
        Self::new(RuleErrorKind::PathNotUnder {
            path: path.to_owned(),
            base: base.to_owned(),
        })
    }

    /// Returns true if this error is a nested-class invariant violation.
    pub fn is_nested_class(&self) -> bool {
        matches!(&self.kind, RuleErrorKind::Graph(e) if e.is_nested_class())
    }

    /// Returns true if rule-kind prefixes disagreed within a component.
    pub fn is_kind_prefix_mismatch(&self) -> bool {
        matches!(self.kind, RuleErrorKind::KindPrefixMismatch(_))
    }

    /// Returns true if a component's rule kinds could not be merged.
    pub fn is_kind_merge_ambiguous(&self) -> bool {
        matches!(self.kind, RuleErrorKind::KindMergeAmbiguous(_))
    }

    /// Returns true if a resolved file carried no rule-kind hint.
    pub fn is_missing_kind_hint(&self) -> bool {
        matches!(self.kind, RuleErrorKind::MissingKindHint(_))
    }

    /// Returns true if two resolvers disagreed on a class.
    pub fn is_resolve_conflict(&self) -> bool {
        matches!(self.kind, RuleErrorKind::ResolveConflict { .. })
    }

    /// Returns true if source-file coverage fell below the threshold.
    pub fn is_coverage_below_threshold(&self) -> bool {
        matches!(self.kind, RuleErrorKind::CoverageBelowThreshold { .. })
    }

    /// Returns true for any user-mapping content error.
    pub fn is_user_mapping(&self) -> bool {
        matches!(
            self.kind,
            RuleErrorKind::UserMappingMalformedLine { .. }
                | RuleErrorKind::UserMappingNestedClass(_)
                | RuleErrorKind::UserMappingDuplicateKey { .. }
        )
    }

    /// Returns true for any external-resolver failure.
    pub fn is_external_resolver(&self) -> bool {
        matches!(
            self.kind,
            RuleErrorKind::ResolverSpawn { .. }
                | RuleErrorKind::ResolverExchange { .. }
                | RuleErrorKind::ResolverFailed { .. }
                | RuleErrorKind::ResolverTruncatedOutput(_)
        )
    }

    /// Returns true if a path fell outside its expected base directory.
    pub fn is_path_not_under(&self) -> bool {
        matches!(self.kind, RuleErrorKind::PathNotUnder { .. })
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RuleErrorKind::Graph(err) => err.fmt(f),
            RuleErrorKind::KindPrefixMismatch(kinds) => write!(
                f,
                "rule kinds in one component have different prefixes: {}",
                kinds.join(", ")
            ),
            RuleErrorKind::KindMergeAmbiguous(kinds) => write!(
                f,
                "unable to merge the rule kinds of one component: {}",
                kinds.join(", ")
            ),
            RuleErrorKind::MissingKindHint(file) => {
                write!(f, "no rule-kind hint for source file `{file}`")
            }
            RuleErrorKind::ResolveConflict {
                class,
                first,
                second,
            } => write!(
                f,
                "class `{class}` was mapped to two different targets: \
                 {first}, {second}"
            ),
            RuleErrorKind::CoverageBelowThreshold {
                threshold,
                matched,
                unresolved,
            } => write!(
                f,
                "failed to map over {:.0} percent of project class names \
                 to source files ({unresolved} of {matched} unresolved); \
                 check the include pattern and content roots",
                threshold * 100.0
            ),
            RuleErrorKind::UserMappingMalformedLine { line_number, line } => {
                write!(
                    f,
                    "user mapping line {line_number} is not of the form \
                     `class,label`: `{line}`"
                )
            }
            RuleErrorKind::UserMappingNestedClass(class) => write!(
                f,
                "user mapping class names must not contain `$`: `{class}`"
            ),
            RuleErrorKind::UserMappingDuplicateKey {
                class,
                first,
                second,
            } => write!(
                f,
                "user mapping maps `{class}` to multiple targets: \
                 {first}, {second}"
            ),
            RuleErrorKind::ResolverSpawn { executable, source } => write!(
                f,
                "failed to launch external resolver `{executable}`: {source}"
            ),
            RuleErrorKind::ResolverExchange { executable, source } => write!(
                f,
                "I/O error talking to external resolver `{executable}`: \
                 {source}"
            ),
            RuleErrorKind::ResolverFailed { executable, status } => {
                write!(f, "external resolver `{executable}` failed: {status}")
            }
            RuleErrorKind::ResolverTruncatedOutput(executable) => write!(
                f,
                "external resolver `{executable}` closed its output after \
                 a class line without the matching label line"
            ),
            RuleErrorKind::PathNotUnder { path, base } => {
                write!(f, "`{path}` is not located under `{base}`")
            }
        }
    }
}

impl std::error::Error for RuleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            RuleErrorKind::Graph(err) => Some(err),
            RuleErrorKind::ResolverSpawn { source, .. }
            | RuleErrorKind::ResolverExchange { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<GraphError> for RuleError {
    fn from(err: GraphError) -> Self {
        Self::new(RuleErrorKind::Graph(err))
    }
}
