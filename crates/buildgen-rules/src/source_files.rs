//! Filesystem probing from class names to source files.
//!
//! `a.b.C` under content root `/ws/src` becomes the candidate path
//! `/ws/src/a/b/C.<ext>`; the first root with a matching file wins.
//! Classes without a hit are simply absent from the result; the
//! caller decides whether that coverage is acceptable.
//!
//! Files holding several top-level classes, or package-private classes
//! named differently from their file, are not supported by probing;
//! projects with those need the parser-supplied class→file map.

use buildgen_graph::classname::ensure_top_level;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};

use crate::error::RuleError;

/// Maps each class name to the first matching source file under
/// `roots`.
///
/// Roots should be absolute so downstream path arithmetic (package
/// planning, label computation) sees absolute paths. Candidate probes
/// hold no file handles beyond the existence check.
///
/// # Errors
///
/// Fails when a class name contains `$`; probing requires collapsed
/// top-level identifiers.
pub fn resolve_source_files(
    classes: &IndexSet<String>,
    roots: &[Utf8PathBuf],
    source_ext: &str,
) -> Result<IndexMap<String, Utf8PathBuf>, RuleError> {
    ensure_top_level(classes.iter().map(String::as_str))?;

    let mut resolved = IndexMap::new();
    for class in classes {
        if let Some(path) = probe(class, roots, source_ext) {
            resolved.insert(class.clone(), path);
        }
    }
    Ok(resolved)
}

fn probe(
    class: &str,
    roots: &[Utf8PathBuf],
    source_ext: &str,
) -> Option<Utf8PathBuf> {
    roots
        .iter()
        .map(|root| path_for_class(class, root, source_ext))
        .find(|candidate| candidate.is_file())
}

/// `sample.pkg.Name` under `/root` becomes `/root/sample/pkg/Name.<ext>`.
fn path_for_class(
    class: &str,
    root: &Utf8Path,
    source_ext: &str,
) -> Utf8PathBuf {
    let mut path = root.to_owned();
    let mut segments = class.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            path.push(format!("{segment}.{source_ext}"));
        } else {
            path.push(segment);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn classes(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    fn utf8(path: &std::path::Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
    }

    #[test]
    fn test_candidate_path_shape() {
        assert_eq!(
            path_for_class("sample.pkg.Name", Utf8Path::new("/ws/src"), "java"),
            Utf8PathBuf::from("/ws/src/sample/pkg/Name.java")
        );
    }

    /// A class whose file exists under a root resolves to that file.
    #[test]
    fn test_resolves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = utf8(dir.path());
        fs::create_dir_all(root.join("com/example")).unwrap();
        fs::write(root.join("com/example/Foo.java"), "class Foo {}")
            .unwrap();

        let resolved = resolve_source_files(
            &classes(&["com.example.Foo"]),
            &[root.clone()],
            "java",
        )
        .unwrap();

        assert_eq!(
            resolved["com.example.Foo"],
            root.join("com/example/Foo.java")
        );
    }

    /// Classes without a file on disk are omitted, not errors.
    #[test]
    fn test_missing_file_is_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_source_files(
            &classes(&["com.example.Nowhere"]),
            &[utf8(dir.path())],
            "java",
        )
        .unwrap();

        assert!(resolved.is_empty());
    }

    /// Roots are probed in order; the first hit wins.
    #[test]
    fn test_first_root_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for dir in [&first, &second] {
            let root = utf8(dir.path());
            fs::create_dir_all(root.join("com")).unwrap();
            fs::write(root.join("com/Foo.java"), "").unwrap();
        }

        let resolved = resolve_source_files(
            &classes(&["com.Foo"]),
            &[utf8(first.path()), utf8(second.path())],
            "java",
        )
        .unwrap();

        assert_eq!(
            resolved["com.Foo"],
            utf8(first.path()).join("com/Foo.java")
        );
    }

    /// Nested-class identifiers are rejected before any probing.
    #[test]
    fn test_nested_class_is_rejected() {
        let err = resolve_source_files(
            &classes(&["com.Foo$Bar"]),
            &[Utf8PathBuf::from("/nowhere")],
            "java",
        )
        .unwrap_err();

        assert!(err.is_nested_class());
    }
}
