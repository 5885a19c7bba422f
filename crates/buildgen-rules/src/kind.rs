//! Rule-kind election and extra-command merging across a component.
//!
//! Each source file carries a rule-kind hint; a component spanning
//! several files must still produce exactly one rule, so the hinted
//! kinds are merged with a few crude but predictable elections:
//!
//! - one distinct kind: use it
//! - `<p>_library` + `<p>_test` → `<p>_test`
//! - `<p>_library` + `<p>_binary` → `<p>_binary`
//! - `<p>_image` together with only libraries/binaries → `<p>_image`
//!
//! Anything else, including kinds with different prefixes, is a fatal
//! error rather than a guess.

use std::collections::BTreeSet;

use buildgen_schemas::RuleHint;
use indexmap::IndexSet;

use crate::error::RuleError;

/// The hint for a whole component, merged from its files' hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedHint {
    /// The elected rule kind.
    pub kind: String,
    /// Deduplicated union of the files' extra commands, in file order.
    pub extra_commands: Vec<String>,
}

/// Merges the rule-kind hints of one component.
///
/// # Errors
///
/// Fails with [`RuleError::is_kind_prefix_mismatch`] when the hinted
/// kinds carry different prefixes and with
/// [`RuleError::is_kind_merge_ambiguous`] when no election rule applies.
///
/// # Panics
///
/// Panics if `hints` is empty; components are non-empty and every file
/// in them carries a hint.
pub fn merge_hints<'a>(
    hints: impl IntoIterator<Item = &'a RuleHint>,
) -> Result<MergedHint, RuleError> {
    let mut kinds: IndexSet<&str> = IndexSet::new();
    let mut extra_commands: IndexSet<&str> = IndexSet::new();
    for hint in hints {
        kinds.insert(hint.kind.as_str());
        extra_commands
            .extend(hint.extra_commands.iter().map(String::as_str));
    }

    let kind = elect_kind(&kinds)?;
    Ok(MergedHint {
        kind,
        extra_commands: extra_commands
            .into_iter()
            .map(str::to_owned)
            .collect(),
    })
}

fn elect_kind(kinds: &IndexSet<&str>) -> Result<String, RuleError> {
    let first = *kinds.first().expect("component carries at least one hint");
    if kinds.len() == 1 {
        return Ok(first.to_owned());
    }

    let mut prefixes: IndexSet<&str> = IndexSet::new();
    let mut suffixes: BTreeSet<&str> = BTreeSet::new();
    for kind in kinds {
        // A kind without an underscore is all prefix; it can only merge
        // with identical kinds, which the singleton case already took.
        let (prefix, suffix) = kind.split_once('_').unwrap_or((*kind, ""));
        prefixes.insert(prefix);
        suffixes.insert(suffix);
    }

    let owned_kinds =
        || kinds.iter().map(|kind| (*kind).to_owned()).collect();
    if prefixes.len() != 1 {
        return Err(RuleError::kind_prefix_mismatch(owned_kinds()));
    }
    let prefix = *prefixes.first().expect("one prefix");

    if suffixes == BTreeSet::from(["library", "test"]) {
        return Ok(format!("{prefix}_test"));
    }
    if suffixes == BTreeSet::from(["binary", "library"]) {
        return Ok(format!("{prefix}_binary"));
    }
    let image_compatible = suffixes
        .iter()
        .all(|suffix| matches!(*suffix, "binary" | "image" | "library"));
    if suffixes.contains("image") && image_compatible {
        return Ok(format!("{prefix}_image"));
    }
    Err(RuleError::kind_merge_ambiguous(owned_kinds()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(kinds: &[&str]) -> Result<MergedHint, RuleError> {
        let hints: Vec<RuleHint> =
            kinds.iter().map(|kind| RuleHint::new(*kind)).collect();
        merge_hints(&hints)
    }

    /// A component hinted with one kind keeps it.
    #[test]
    fn test_single_kind() {
        assert_eq!(merge(&["java_library"]).unwrap().kind, "java_library");
    }

    /// Repeated identical hints count as one kind.
    #[test]
    fn test_repeated_kind_is_singleton() {
        let merged =
            merge(&["java_library", "java_library", "java_library"]).unwrap();
        assert_eq!(merged.kind, "java_library");
    }

    /// library + test elects test.
    #[test]
    fn test_library_and_test() {
        assert_eq!(
            merge(&["java_library", "java_test"]).unwrap().kind,
            "java_test"
        );
    }

    /// library + binary elects binary.
    #[test]
    fn test_library_and_binary() {
        assert_eq!(
            merge(&["java_binary", "java_library"]).unwrap().kind,
            "java_binary"
        );
    }

    /// image absorbs libraries and binaries.
    #[test]
    fn test_image_absorbs_library_and_binary() {
        assert_eq!(
            merge(&["java_library", "java_image", "java_binary"])
                .unwrap()
                .kind,
            "java_image"
        );
    }

    /// image does not absorb tests.
    #[test]
    fn test_image_with_test_is_ambiguous() {
        let err = merge(&["java_image", "java_test"]).unwrap_err();
        assert!(err.is_kind_merge_ambiguous());
    }

    /// test + binary has no election rule.
    #[test]
    fn test_test_and_binary_is_ambiguous() {
        let err = merge(&["java_test", "java_binary"]).unwrap_err();
        assert!(err.is_kind_merge_ambiguous());
    }

    /// Kinds from different languages never merge.
    #[test]
    fn test_prefix_mismatch() {
        let err = merge(&["java_library", "py_library"]).unwrap_err();
        assert!(err.is_kind_prefix_mismatch());
        assert!(err.to_string().contains("py_library"));
    }

    /// Extra commands union across files with duplicates removed, in
    /// file order.
    #[test]
    fn test_extra_commands_deduplicated_union() {
        let hints = vec![
            RuleHint::new("java_binary")
                .with_extra_command("set main_class com.Main"),
            RuleHint::new("java_library")
                .with_extra_command("set main_class com.Main")
                .with_extra_command("add tags manual"),
        ];

        let merged = merge_hints(&hints).unwrap();
        assert_eq!(merged.kind, "java_binary");
        assert_eq!(
            merged.extra_commands,
            vec![
                "set main_class com.Main".to_owned(),
                "add tags manual".to_owned()
            ]
        );
    }
}
