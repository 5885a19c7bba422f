//! Resolver backed by a user-provided class→label mapping.
//!
//! The mapping is a plain text file, one `classid,label` pair per
//! line, letting users pin classes the automatic resolvers get wrong
//! (vendored sources, generated code, one-off exceptions).

use buildgen_graph::classname::is_nested;
use indexmap::{IndexMap, IndexSet};

use crate::error::RuleError;
use crate::resolve::ClassResolver;
use crate::rule::BuildRule;

/// Maps class names to externally maintained rules based on a
/// user-provided table.
pub struct UserMappingResolver {
    lines: Vec<String>,
}

impl UserMappingResolver {
    /// Creates a resolver from the mapping file's lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

impl ClassResolver for UserMappingResolver {
    /// Resolves every requested class the table names. Blank lines are
    /// skipped; content errors are fatal.
    fn resolve(
        &self,
        classes: &IndexSet<String>,
    ) -> Result<IndexMap<String, BuildRule>, RuleError> {
        let mut resolved: IndexMap<String, BuildRule> = IndexMap::new();
        for (index, line) in self.lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let Some((class, label)) = line.split_once(',') else {
                return Err(RuleError::user_mapping_malformed_line(
                    index + 1,
                    line,
                ));
            };
            if is_nested(class) {
                return Err(RuleError::user_mapping_nested_class(class));
            }
            if !classes.contains(class) {
                continue;
            }
            if let Some(existing) = resolved.get(class) {
                if existing.label() != label {
                    return Err(RuleError::user_mapping_duplicate_key(
                        class,
                        existing.label(),
                        label,
                    ));
                }
                continue;
            }
            resolved.insert(class.to_owned(), BuildRule::external(label));
        }
        Ok(resolved)
    }
}
