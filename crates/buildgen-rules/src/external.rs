//! Resolver that delegates to an external executable.
//!
//! The child is handed every unresolved class name on its own line on
//! stdin, and answers with pairs of lines (class name, then label)
//! until it closes stdout. This lets projects plug in lookups the
//! generator cannot do itself, like querying an index of third-party
//! artifacts.

use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::error::RuleError;
use crate::resolve::ClassResolver;
use crate::rule::BuildRule;

/// Resolves classes by spawning an external executable.
pub struct ExternalResolver {
    executable: String,
}

impl ExternalResolver {
    /// Creates a resolver that runs `executable`.
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Feeds the request to the child and collects its raw output.
    /// Class names are written in sorted order so the child sees a
    /// reproducible request. Dropping the stdin handle closes the
    /// child's input half before output is read.
    fn exchange(
        &self,
        child: &mut Child,
        classes: &IndexSet<String>,
    ) -> Result<String, RuleError> {
        let io_err = |source| RuleError::resolver_exchange(&self.executable, source);

        let mut stdin = child.stdin.take().expect("child stdin is piped");
        let mut sorted: Vec<&str> =
            classes.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        for class in sorted {
            writeln!(stdin, "{class}").map_err(io_err)?;
        }
        drop(stdin);

        let mut output = String::new();
        child
            .stdout
            .take()
            .expect("child stdout is piped")
            .read_to_string(&mut output)
            .map_err(io_err)?;
        Ok(output)
    }
}

impl ClassResolver for ExternalResolver {
    fn resolve(
        &self,
        classes: &IndexSet<String>,
    ) -> Result<IndexMap<String, BuildRule>, RuleError> {
        if classes.is_empty() {
            return Ok(IndexMap::new());
        }
        debug!(
            executable = %self.executable,
            class_count = classes.len(),
            "delegating to external resolver"
        );

        let mut child = Command::new(&self.executable)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| RuleError::resolver_spawn(&self.executable, e))?;

        // Always reap the child, even when the exchange fails, so no
        // error path leaks a process or its pipe handles.
        let exchange = self.exchange(&mut child, classes);
        let status = child
            .wait()
            .map_err(|e| RuleError::resolver_exchange(&self.executable, e))?;
        if !status.success() {
            return Err(RuleError::resolver_failed(&self.executable, status));
        }
        let output = exchange?;

        let mut resolved = IndexMap::new();
        let mut lines = output.lines();
        while let Some(class) = lines.next() {
            let Some(label) = lines.next() else {
                return Err(RuleError::resolver_truncated_output(
                    &self.executable,
                ));
            };
            resolved.insert(class.to_owned(), BuildRule::external(label));
        }
        Ok(resolved)
    }
}
