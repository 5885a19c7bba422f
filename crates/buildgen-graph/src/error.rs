//! Error types for the buildgen-graph crate.

use std::backtrace::Backtrace;
use std::fmt;

/// Error type for graph preprocessing and consolidation.
///
/// Uses the struct-wrapping-an-enum pattern with backtrace capture and
/// `is_xxx()` classifier methods, keeping the variant set private.
#[derive(Debug)]
pub struct GraphError {
    kind: GraphErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
enum GraphErrorKind {
    /// A nested-class identifier appeared where only top-level
    /// identifiers are allowed (after preprocessing has collapsed them).
    NestedClass(String),
}

impl GraphError {
    /// Creates an error for a nested-class identifier in a position that
    /// requires top-level identifiers.
    pub fn nested_class(class: impl Into<String>) -> Self {
        Self {
            kind: GraphErrorKind::NestedClass(class.into()),
            backtrace: Backtrace::capture(),
        }
    }

    /// Returns true if this error is due to a nested-class identifier.
    pub fn is_nested_class(&self) -> bool {
        matches!(self.kind, GraphErrorKind::NestedClass(_))
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            GraphErrorKind::NestedClass(class) => write!(
                f,
                "found nested class `{class}` where a top-level class \
                 identifier is required"
            ),
        }
    }
}

impl std::error::Error for GraphError {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Nested-class errors are classified and carry the identifier in
    /// their message.
    #[test]
    fn test_nested_class() {
        let err = GraphError::nested_class("com.example.Foo$Bar");

        assert!(err.is_nested_class());
        assert!(err.to_string().contains("com.example.Foo$Bar"));
    }

    /// Backtraces are captured on construction. Content depends on the
    /// RUST_BACKTRACE environment variable.
    #[test]
    fn test_backtrace_captured() {
        let err = GraphError::nested_class("a.B$C");
        let _ = err.backtrace();
    }
}
