//! Parser-output schema: the structure handed to the pipeline.
//!
//! A source-language parser analyzes a project and emits one
//! [`ParserOutput`] describing the class-level dependency graph along
//! with per-file metadata. The pipeline consumes nothing else: every
//! generated build rule is derived from this structure plus the run
//! configuration.
//!
//! ## Terminology
//!
//! - **Class identifier**: a fully qualified dotted name
//!   (`com.example.Foo`). Nested classes carry a `$` separator
//!   (`com.example.Foo$Bar`) until preprocessing collapses them.
//! - **Rule-kind hint**: the parser's per-file guess at the rule kind
//!   (`java_library`, `java_test`, ...), optionally with extra edit
//!   commands such as `set main_class com.example.Main`.

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything the pipeline learns from the source-language parser.
///
/// Maps deserialize into [`IndexMap`] so the input order is preserved;
/// downstream stages iterate these maps when building graphs, and the
/// emitted command stream must be reproducible from the input alone.
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema,
)]
pub struct ParserOutput {
    /// Class dependency adjacency lists: each class maps to the classes
    /// it references. Targets may name classes outside the project; the
    /// resolver chain decides what becomes of them.
    #[serde(default)]
    #[schemars(with = "std::collections::BTreeMap<String, Vec<String>>")]
    pub class_to_class: IndexMap<String, Vec<String>>,

    /// Rule-kind hint for every parsed source file. Omitted if empty.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[schemars(with = "std::collections::BTreeMap<String, RuleHint>")]
    pub file_to_rule_hint: IndexMap<Utf8PathBuf, RuleHint>,

    /// Where each top-level class is defined. May be empty, in which
    /// case the pipeline falls back to probing the content roots on the
    /// filesystem.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[schemars(with = "std::collections::BTreeMap<String, String>")]
    pub class_to_file: IndexMap<String, Utf8PathBuf>,
}

/// The parser's rule-kind hint for one source file.
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema,
)]
pub struct RuleHint {
    /// Rule kind, `<prefix>_<suffix>` (e.g. `java_library`). Hints from
    /// files in the same component are merged into a single kind.
    pub kind: String,

    /// Additional edit commands to run against the generated rule, in
    /// the edit tool's `<verb> <args>` form without the target suffix.
    /// Omitted if empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_commands: Vec<String>,
}

impl RuleHint {
    /// Creates a hint with the given kind and no extra commands.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            extra_commands: Vec::new(),
        }
    }

    /// Adds an extra edit command to the hint.
    #[must_use]
    pub fn with_extra_command(mut self, command: impl Into<String>) -> Self {
        self.extra_commands.push(command.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::*;
    use crate::testutil::{arb_class_name, arb_rel_path};

    /// Strategy for generating arbitrary rule hints.
    fn arb_rule_hint() -> impl Strategy<Value = RuleHint> {
        (
            "[a-z]{1,8}_[a-z]{1,8}",
            vec("[a-z_ ]{1,24}", 0..3),
        )
            .prop_map(|(kind, extra_commands)| RuleHint {
                kind,
                extra_commands,
            })
    }

    prop_compose! {
        /// Strategy for generating arbitrary parser outputs. The graphs
        /// are not structurally consistent (dependencies need not map to
        /// files); serialization does not care.
        fn arb_parser_output()
            (
                class_to_class in proptest::collection::hash_map(
                    arb_class_name(), vec(arb_class_name(), 0..4), 0..8),
                file_to_rule_hint in proptest::collection::hash_map(
                    arb_rel_path(), arb_rule_hint(), 0..8),
                class_to_file in proptest::collection::hash_map(
                    arb_class_name(), arb_rel_path(), 0..8),
            )
        -> ParserOutput {
            ParserOutput {
                class_to_class: class_to_class.into_iter().collect(),
                file_to_rule_hint: file_to_rule_hint
                    .into_iter()
                    .map(|(path, hint)| (Utf8PathBuf::from(path), hint))
                    .collect(),
                class_to_file: class_to_file
                    .into_iter()
                    .map(|(class, path)| (class, Utf8PathBuf::from(path)))
                    .collect(),
            }
        }
    }

    proptest! {
        /// Arbitrary parser outputs survive a MessagePack roundtrip.
        ///
        /// This is the wire format the CLI reads from stdin, so the
        /// roundtrip exercises exactly the production decode path.
        #[test]
        fn test_parser_output_msgpack_roundtrip(
            output in arb_parser_output()
        ) {
            let bytes =
                rmp_serde::to_vec_named(&output).expect("serialize");
            let parsed: ParserOutput =
                rmp_serde::from_slice(&bytes).expect("deserialize");
            prop_assert_eq!(parsed, output);
        }
    }

    /// Empty optional maps are omitted from serialized output and
    /// restored as empty on deserialization.
    #[test]
    fn test_optional_maps_default_to_empty() {
        let json = r#"{"class_to_class": {"com.A": ["com.B"]}}"#;
        let output: ParserOutput = serde_json::from_str(json).unwrap();

        assert_eq!(output.class_to_class.len(), 1);
        assert!(output.file_to_rule_hint.is_empty());
        assert!(output.class_to_file.is_empty());

        let round = serde_json::to_string(&output).unwrap();
        assert!(!round.contains("file_to_rule_hint"));
        assert!(!round.contains("class_to_file"));
    }

    /// Input order of adjacency lists is preserved through
    /// deserialization; the pipeline depends on it for deterministic
    /// output.
    #[test]
    fn test_map_order_preserved() {
        let json = r#"{
            "class_to_class": {
                "com.Z": [],
                "com.A": [],
                "com.M": []
            }
        }"#;
        let output: ParserOutput = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> =
            output.class_to_class.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["com.Z", "com.A", "com.M"]);
    }

    /// Hint constructors compose the way tests across the workspace use
    /// them.
    #[test]
    fn test_rule_hint_builders() {
        let hint = RuleHint::new("java_binary")
            .with_extra_command("set main_class com.example.Main");

        assert_eq!(hint.kind, "java_binary");
        assert_eq!(
            hint.extra_commands,
            vec!["set main_class com.example.Main".to_string()]
        );
    }
}
