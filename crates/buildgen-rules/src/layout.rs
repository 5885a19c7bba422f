//! Package layout planning: choosing the BUILD-file directory for each
//! component.
//!
//! Rules for the files in a directory are written to the BUILD file of
//! that directory, unless a component spans several directories, in
//! which case all of them (and every directory transitively entangled
//! with them through other components) share the BUILD file of their
//! longest common ancestor. Two directories may host rules in the same
//! BUILD file only if they were unioned here, so no two packages ever
//! claim the same directory.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};
use petgraph::unionfind::UnionFind;

/// Associates every source directory with the directory of its
/// enclosing package.
///
/// Two-phase: a union-find over directories joins any two directories
/// that contribute files to the same component; each resulting
/// equivalence class then maps to the component-wise longest common
/// path prefix of its members. Directories entirely local to one
/// component map to themselves.
pub fn plan_packages<'a>(
    components: impl IntoIterator<Item = &'a IndexSet<Utf8PathBuf>>,
) -> IndexMap<Utf8PathBuf, Utf8PathBuf> {
    // Intern directories first so the union-find can size itself.
    let mut directories: IndexSet<Utf8PathBuf> = IndexSet::new();
    let mut unions: Vec<(usize, usize)> = Vec::new();
    for component in components {
        let mut first: Option<usize> = None;
        for file in component {
            let (index, _) = directories.insert_full(parent_dir(file));
            match first {
                None => first = Some(index),
                Some(anchor) => unions.push((anchor, index)),
            }
        }
    }

    let mut union_find: UnionFind<usize> = UnionFind::new(directories.len());
    for (a, b) in unions {
        union_find.union(a, b);
    }

    // Group directories by representative, in first-seen order.
    let mut classes: IndexMap<usize, Vec<usize>> = IndexMap::new();
    for index in 0..directories.len() {
        classes
            .entry(union_find.find_mut(index))
            .or_default()
            .push(index);
    }

    let mut packages = IndexMap::new();
    for members in classes.values() {
        let class_dirs: Vec<&Utf8Path> =
            members.iter().map(|&index| directories[index].as_path()).collect();
        let package = longest_common_prefix(&class_dirs);
        for &index in members {
            packages.insert(directories[index].clone(), package.clone());
        }
    }
    packages
}

/// Computes the longest common path prefix, component-wise rather than
/// character-wise: `/a/b/c` and `/a/b/d` share `/a/b`, while `/a/bc`
/// and `/a/bd` share only `/a`. An absolute root is preserved.
///
/// # Panics
///
/// Panics if `paths` is empty.
pub fn longest_common_prefix(paths: &[&Utf8Path]) -> Utf8PathBuf {
    let first = paths.first().expect("at least one path");
    if paths.len() == 1 {
        return (*first).to_owned();
    }

    let split: Vec<Vec<&str>> = paths
        .iter()
        .map(|path| path.components().map(|c| c.as_str()).collect())
        .collect();
    let upper_bound = split
        .iter()
        .map(Vec::len)
        .min()
        .expect("paths is non-empty");

    let mut prefix_len = upper_bound;
    'scan: for position in 0..upper_bound {
        let segment = split[0][position];
        for components in &split[1..] {
            if components[position] != segment {
                prefix_len = position;
                break 'scan;
            }
        }
    }

    let mut prefix = Utf8PathBuf::new();
    for segment in &split[0][..prefix_len] {
        prefix.push(segment);
    }
    prefix
}

fn parent_dir(file: &Utf8Path) -> Utf8PathBuf {
    file.parent().map(Utf8Path::to_owned).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(files: &[&str]) -> IndexSet<Utf8PathBuf> {
        files.iter().map(|file| Utf8PathBuf::from(*file)).collect()
    }

    fn path(p: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(p)
    }

    /// Components confined to one directory keep that directory as
    /// their package.
    #[test]
    fn test_single_directory_maps_to_itself() {
        let components = vec![
            component(&["/ws/java/com/A.java", "/ws/java/com/B.java"]),
            component(&["/ws/java/org/C.java"]),
        ];

        let packages = plan_packages(&components);

        assert_eq!(packages[&path("/ws/java/com")], path("/ws/java/com"));
        assert_eq!(packages[&path("/ws/java/org")], path("/ws/java/org"));
    }

    /// A component spanning sibling directories pulls both up to the
    /// common parent.
    #[test]
    fn test_spanning_component_collapses_to_ancestor() {
        let components = vec![component(&[
            "/ws/x/foo/Foo.java",
            "/ws/x/bar/Bar.java",
        ])];

        let packages = plan_packages(&components);

        assert_eq!(packages[&path("/ws/x/foo")], path("/ws/x"));
        assert_eq!(packages[&path("/ws/x/bar")], path("/ws/x"));
    }

    /// Entanglement is transitive: a directory shared between two
    /// components drags all their directories into one package.
    #[test]
    fn test_transitive_entanglement() {
        let components = vec![
            component(&["/ws/a/b/One.java", "/ws/a/c/Two.java"]),
            component(&["/ws/a/c/Three.java", "/ws/a/d/Four.java"]),
        ];

        let packages = plan_packages(&components);

        assert_eq!(packages[&path("/ws/a/b")], path("/ws/a"));
        assert_eq!(packages[&path("/ws/a/c")], path("/ws/a"));
        assert_eq!(packages[&path("/ws/a/d")], path("/ws/a"));
    }

    /// Components with disjoint directories stay in distinct packages.
    #[test]
    fn test_disjoint_components_stay_apart() {
        let components = vec![
            component(&["/ws/left/A.java"]),
            component(&["/ws/right/B.java"]),
        ];

        let packages = plan_packages(&components);

        assert_eq!(packages[&path("/ws/left")], path("/ws/left"));
        assert_eq!(packages[&path("/ws/right")], path("/ws/right"));
    }

    /// The prefix is computed over path components, not characters.
    #[test]
    fn test_prefix_is_component_wise() {
        let prefix = longest_common_prefix(&[
            Utf8Path::new("/a/bc/One.java"),
            Utf8Path::new("/a/bd/Two.java"),
        ]);
        assert_eq!(prefix, path("/a"));
    }

    /// The absolute root survives prefix computation.
    #[test]
    fn test_prefix_preserves_root() {
        let prefix = longest_common_prefix(&[
            Utf8Path::new("/a/b/c"),
            Utf8Path::new("/a/b/d"),
        ]);
        assert_eq!(prefix, path("/a/b"));

        let disjoint = longest_common_prefix(&[
            Utf8Path::new("/x/One.java"),
            Utf8Path::new("/y/Two.java"),
        ]);
        assert_eq!(disjoint, path("/"));
    }

    /// A single path is its own prefix.
    #[test]
    fn test_prefix_of_single_path() {
        let prefix = longest_common_prefix(&[Utf8Path::new("/a/b/c")]);
        assert_eq!(prefix, path("/a/b/c"));
    }

    /// One path being an ancestor of the other makes the ancestor the
    /// prefix.
    #[test]
    fn test_prefix_with_nested_paths() {
        let prefix = longest_common_prefix(&[
            Utf8Path::new("/a/b"),
            Utf8Path::new("/a/b/c/d"),
        ]);
        assert_eq!(prefix, path("/a/b"));
    }
}
