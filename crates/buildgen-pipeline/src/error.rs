//! Error types for the buildgen-pipeline crate.

use std::backtrace::Backtrace;
use std::fmt;

use buildgen_rules::RuleError;

/// Error type for a pipeline run.
///
/// Wraps the stage errors plus the two boundary failures the pipeline
/// itself can hit: decoding the input and writing the output. Uses the
/// struct-wrapping-an-enum pattern with backtrace capture and `is_xxx()`
/// classifier methods.
#[derive(Debug)]
pub struct PipelineError {
    kind: PipelineErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
enum PipelineErrorKind {
    /// The input could not be decoded as a `ParserOutput`.
    Decode(rmp_serde::decode::Error),
    /// I/O error reading input or writing the command stream.
    Io(std::io::Error),
    /// A resolution or rule-construction stage failed.
    Rule(RuleError),
}

impl PipelineError {
    fn new(kind: PipelineErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    /// Returns true if the input failed to decode.
    pub fn is_decode(&self) -> bool {
        matches!(self.kind, PipelineErrorKind::Decode(_))
    }

    /// Returns true if this error is due to I/O failure.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, PipelineErrorKind::Io(_))
    }

    /// Returns true if a resolution or rule-construction stage failed.
    pub fn is_rule(&self) -> bool {
        matches!(self.kind, PipelineErrorKind::Rule(_))
    }

    /// The stage error behind this failure, if it is one.
    pub fn as_rule(&self) -> Option<&RuleError> {
        match &self.kind {
            PipelineErrorKind::Rule(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PipelineErrorKind::Decode(err) => {
                write!(f, "failed to decode parser output: {err}")
            }
            PipelineErrorKind::Io(err) => write!(f, "I/O error: {err}"),
            PipelineErrorKind::Rule(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            PipelineErrorKind::Decode(err) => Some(err),
            PipelineErrorKind::Io(err) => Some(err),
            PipelineErrorKind::Rule(err) => Some(err),
        }
    }
}

impl From<rmp_serde::decode::Error> for PipelineError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::new(PipelineErrorKind::Decode(err))
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::new(PipelineErrorKind::Io(err))
    }
}

impl From<RuleError> for PipelineError {
    fn from(err: RuleError) -> Self {
        Self::new(PipelineErrorKind::Rule(err))
    }
}
