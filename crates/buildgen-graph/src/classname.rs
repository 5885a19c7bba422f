//! Utilities for fully qualified class identifiers.

use crate::error::GraphError;

/// Returns true if the identifier names a nested (inner) class.
pub fn is_nested(class: &str) -> bool {
    class.contains('$')
}

/// Returns the enclosing top-level identifier: the prefix before the
/// first `$`. Top-level identifiers are returned unchanged.
pub fn outer_class(class: &str) -> &str {
    match class.split_once('$') {
        Some((outer, _)) => outer,
        None => class,
    }
}

/// Ensures every identifier is a top-level class name.
///
/// Stages past preprocessing (resolvers, class→file consolidation)
/// require collapsed identifiers; this is their shared precondition.
pub fn ensure_top_level<'a>(
    classes: impl IntoIterator<Item = &'a str>,
) -> Result<(), GraphError> {
    for class in classes {
        if is_nested(class) {
            return Err(GraphError::nested_class(class));
        }
    }
    Ok(())
}
