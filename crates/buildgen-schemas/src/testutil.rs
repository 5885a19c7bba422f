//! Shared proptest strategies for schema tests.

use proptest::prelude::*;

/// Strategy for generating fully qualified dotted class names, with an
/// occasional nested-class suffix.
pub fn arb_class_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}(\\.[A-Z][A-Za-z0-9]{0,7}){1,3}(\\$[A-Z][a-z0-9]{0,5})?"
}

/// Strategy for generating workspace-relative source-file paths.
pub fn arb_rel_path() -> impl Strategy<Value = String> {
    "([a-z]{1,8}/){1,3}[A-Z][a-z0-9]{0,7}\\.[a-z]{1,4}"
}
