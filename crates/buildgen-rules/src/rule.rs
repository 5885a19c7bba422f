//! The build-rule model and target naming.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use buildgen_schemas::RuleHint;
use camino::{Utf8Path, Utf8PathBuf};
use fnv::FnvHasher;
use indexmap::{IndexMap, IndexSet};

use crate::command;
use crate::error::RuleError;
use crate::kind::merge_hints;

/// Prefix of hashed target names for multi-file components.
const MULTI_FILE_TARGET_PREFIX: &str = "gen_rule";

/// A build rule referenced by the generated command stream.
///
/// Project rules are generated by this run: they own source files and
/// emit creation commands plus a dependency command. External rules
/// belong to someone else (a user mapping or an external resolver
/// named them), so they contribute nothing but their label to other
/// rules' `deps`.
///
/// Rules are compared and hashed by label; labels are unique within a
/// run.
#[derive(Debug, Clone)]
pub enum BuildRule {
    /// A rule generated for one component of project sources.
    Project(Arc<ProjectRule>),
    /// A pre-existing rule identified only by its label.
    External { label: String },
}

impl BuildRule {
    /// Creates an external rule from its label.
    pub fn external(label: impl Into<String>) -> Self {
        Self::External {
            label: label.into(),
        }
    }

    /// The rule's label, `//<package>:<target>`.
    pub fn label(&self) -> &str {
        match self {
            Self::Project(rule) => &rule.label,
            Self::External { label } => label,
        }
    }

    /// Commands that create this rule and populate its sources.
    /// External rules are never modified and produce none.
    pub fn creation_commands(&self) -> &[String] {
        match self {
            Self::Project(rule) => &rule.commands,
            Self::External { .. } => &[],
        }
    }

    /// Returns true if a dependency command should be emitted for this
    /// rule.
    pub fn wants_deps(&self) -> bool {
        matches!(self, Self::Project(_))
    }

    /// The project rule behind this handle, if it is one.
    pub fn as_project(&self) -> Option<&ProjectRule> {
        match self {
            Self::Project(rule) => Some(rule),
            Self::External { .. } => None,
        }
    }
}

impl PartialEq for BuildRule {
    fn eq(&self, other: &Self) -> bool {
        self.label() == other.label()
    }
}

impl Eq for BuildRule {}

impl Hash for BuildRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label().hash(state);
    }
}

/// A rule generated for one strongly connected component of source
/// files.
#[derive(Debug)]
pub struct ProjectRule {
    label: String,
    target_name: String,
    package: Utf8PathBuf,
    commands: Vec<String>,
}

impl ProjectRule {
    /// Builds the rule for one component.
    ///
    /// `files` is the component in its discovery order (the order feeds
    /// the hashed target name); `package` is the directory chosen by
    /// the layout planner; `hints` supplies every file's rule-kind
    /// hint. Both `package` and the files must be located under
    /// `workspace` and `package` respectively, which the planner
    /// guarantees for planner-chosen packages.
    ///
    /// # Errors
    ///
    /// Fails when a file carries no hint, when the hints cannot be
    /// merged, or when a path escapes its base directory.
    pub fn new(
        files: &IndexSet<Utf8PathBuf>,
        hints: &IndexMap<Utf8PathBuf, RuleHint>,
        package: &Utf8Path,
        workspace: &Utf8Path,
    ) -> Result<BuildRule, RuleError> {
        let package_name = package
            .strip_prefix(workspace)
            .map_err(|_| RuleError::path_not_under(package, workspace))?
            .as_str();
        let target_name = target_name(files, package)?;
        let label = format!("//{package_name}:{target_name}");

        let hint_per_file: Vec<&RuleHint> = files
            .iter()
            .map(|file| {
                hints
                    .get(file)
                    .ok_or_else(|| RuleError::missing_kind_hint(file))
            })
            .collect::<Result<_, _>>()?;
        let merged = merge_hints(hint_per_file)?;

        let mut srcs: Vec<String> = files
            .iter()
            .map(|file| {
                file.strip_prefix(package)
                    .map(|relative| relative.as_str().to_owned())
                    .map_err(|_| RuleError::path_not_under(file, package))
            })
            .collect::<Result<_, _>>()?;
        srcs.sort_unstable();

        let mut commands = vec![
            command::new_rule(&merged.kind, &target_name, package_name),
            command::add_attribute("srcs", &srcs, &label),
        ];
        commands.extend(
            merged
                .extra_commands
                .iter()
                .map(|extra| command::add_fragment(extra, &label)),
        );

        Ok(BuildRule::Project(Arc::new(Self {
            label,
            target_name,
            package: package.to_owned(),
            commands,
        })))
    }

    /// The rule's label, `//<package>:<target>`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The within-package target name.
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// The directory holding the rule's BUILD file.
    pub fn package_dir(&self) -> &Utf8Path {
        &self.package
    }
}

/// Derives the target name for a component.
///
/// Single-file components use the dash-joined segments of the file's
/// package-relative path with the extension stripped, so
/// `com/google/Hello.java` under package `//x` becomes
/// `com-google-Hello`; the relative path keeps same-named files in
/// sibling subdirectories from colliding. Multi-file components hash
/// the concatenated base names instead; the hash is a stable 64-bit
/// FNV-1a, identical across runs and platforms.
fn target_name(
    files: &IndexSet<Utf8PathBuf>,
    package: &Utf8Path,
) -> Result<String, RuleError> {
    if files.len() == 1 {
        let file = files.first().expect("component is non-empty");
        let relative = file
            .strip_prefix(package)
            .map_err(|_| RuleError::path_not_under(file, package))?;
        return Ok(single_file_target_name(relative));
    }

    let combined: String =
        files.iter().filter_map(|file| file.file_name()).collect();
    let mut hasher = FnvHasher::default();
    hasher.write(combined.as_bytes());
    Ok(format!(
        "{MULTI_FILE_TARGET_PREFIX}_{:016x}",
        hasher.finish()
    ))
}

fn single_file_target_name(relative: &Utf8Path) -> String {
    let mut segments: Vec<&str> = relative
        .parent()
        .map(|parent| parent.components().map(|c| c.as_str()).collect())
        .unwrap_or_default();
    if let Some(stem) = relative.file_stem() {
        segments.push(stem);
    }
    segments.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> IndexSet<Utf8PathBuf> {
        paths.iter().map(|path| Utf8PathBuf::from(*path)).collect()
    }

    fn library_hints(
        paths: &[&str],
    ) -> IndexMap<Utf8PathBuf, RuleHint> {
        paths
            .iter()
            .map(|path| {
                (Utf8PathBuf::from(*path), RuleHint::new("java_library"))
            })
            .collect()
    }

    fn workspace() -> &'static Utf8Path {
        Utf8Path::new("/ws")
    }

    /// A single-file rule in its own directory: target named after the
    /// file, sources relative to the package.
    #[test]
    fn test_single_file_rule() {
        let srcs = files(&["/ws/java/com/Hello.java"]);
        let rule = ProjectRule::new(
            &srcs,
            &library_hints(&["/ws/java/com/Hello.java"]),
            Utf8Path::new("/ws/java/com"),
            workspace(),
        )
        .unwrap();

        assert_eq!(rule.label(), "//java/com:Hello");
        assert_eq!(
            rule.creation_commands(),
            &[
                "new java_library Hello|//java/com:__pkg__".to_owned(),
                "add srcs Hello.java|//java/com:Hello".to_owned(),
            ]
        );
        assert!(rule.wants_deps());
    }

    /// A file below its package directory gets the relative path folded
    /// into the target name, preventing collisions with same-named
    /// files in sibling directories.
    #[test]
    fn test_single_file_rule_in_subdirectory() {
        let srcs = files(&["/ws/java/com/google/Hello.java"]);
        let rule = ProjectRule::new(
            &srcs,
            &library_hints(&["/ws/java/com/google/Hello.java"]),
            Utf8Path::new("/ws/java"),
            workspace(),
        )
        .unwrap();

        assert_eq!(rule.label(), "//java:com-google-Hello");
        assert_eq!(
            rule.creation_commands()[1],
            "add srcs com/google/Hello.java|//java:com-google-Hello"
        );
    }

    /// Multi-file components get a hashed target name and sorted
    /// sources.
    #[test]
    fn test_multi_file_rule() {
        let srcs = files(&["/ws/java/B.java", "/ws/java/A.java"]);
        let rule = ProjectRule::new(
            &srcs,
            &library_hints(&["/ws/java/A.java", "/ws/java/B.java"]),
            Utf8Path::new("/ws/java"),
            workspace(),
        )
        .unwrap();

        let project = rule.as_project().unwrap();
        assert!(project.target_name().starts_with("gen_rule_"));
        // 16 hex digits after the prefix and separator.
        assert_eq!(
            project.target_name().len(),
            "gen_rule_".len() + 16
        );
        assert_eq!(
            rule.creation_commands()[1],
            format!("add srcs A.java B.java|{}", rule.label())
        );
    }

    /// The hashed name depends only on base names in component order.
    #[test]
    fn test_multi_file_target_name_is_stable() {
        let make = || {
            ProjectRule::new(
                &files(&["/ws/java/B.java", "/ws/java/A.java"]),
                &library_hints(&["/ws/java/A.java", "/ws/java/B.java"]),
                Utf8Path::new("/ws/java"),
                workspace(),
            )
            .unwrap()
        };
        assert_eq!(make().label(), make().label());
    }

    /// Merged extra commands are appended after srcs, addressed at the
    /// rule's label.
    #[test]
    fn test_extra_commands_follow_creation() {
        let srcs = files(&["/ws/java/Main.java"]);
        let mut hints = IndexMap::new();
        hints.insert(
            Utf8PathBuf::from("/ws/java/Main.java"),
            RuleHint::new("java_binary")
                .with_extra_command("set main_class com.Main"),
        );

        let rule = ProjectRule::new(
            &srcs,
            &hints,
            Utf8Path::new("/ws/java"),
            workspace(),
        )
        .unwrap();

        assert_eq!(
            rule.creation_commands()[2],
            "set main_class com.Main|//java:Main"
        );
    }

    /// A file without a hint is a fatal error, not a silent default.
    #[test]
    fn test_missing_hint_is_fatal() {
        let srcs = files(&["/ws/java/A.java"]);
        let err = ProjectRule::new(
            &srcs,
            &IndexMap::new(),
            Utf8Path::new("/ws/java"),
            workspace(),
        )
        .unwrap_err();

        assert!(err.is_missing_kind_hint());
    }

    /// A package directory outside the workspace root cannot be
    /// labelled.
    #[test]
    fn test_package_outside_workspace() {
        let srcs = files(&["/elsewhere/A.java"]);
        let err = ProjectRule::new(
            &srcs,
            &library_hints(&["/elsewhere/A.java"]),
            Utf8Path::new("/elsewhere"),
            workspace(),
        )
        .unwrap_err();

        assert!(err.is_path_not_under());
    }

    /// Only the trailing extension is stripped from target names; a
    /// dotted stem survives.
    #[test]
    fn test_dotted_stem_survives() {
        assert_eq!(
            single_file_target_name(Utf8Path::new("v1/A.gen.java")),
            "v1-A.gen"
        );
    }

    /// External rules compare equal to any rule with the same label and
    /// emit nothing.
    #[test]
    fn test_external_rule() {
        let rule = BuildRule::external("//third_party:guava");

        assert_eq!(rule.label(), "//third_party:guava");
        assert!(rule.creation_commands().is_empty());
        assert!(!rule.wants_deps());
        assert_eq!(rule, BuildRule::external("//third_party:guava"));
    }
}
