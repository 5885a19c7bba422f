//! Constructors for the edit tool's command grammar.
//!
//! Commands are single lines of the form `<verb> <args>|<target>`. The
//! target is either a rule label or, for rule creation, the package
//! pseudo-target `//<pkg>:__pkg__`.

/// Creates a new rule in a package's BUILD file.
pub(crate) fn new_rule(
    rule_kind: &str,
    target_name: &str,
    package_name: &str,
) -> String {
    format!("new {rule_kind} {target_name}|//{package_name}:__pkg__")
}

/// Adds `values` to `attribute` of the rule at `target`.
pub(crate) fn add_attribute(
    attribute: &str,
    values: &[String],
    target: &str,
) -> String {
    format!("add {attribute} {}|{target}", values.join(" "))
}

/// Appends a verbatim command fragment addressed at `target`.
pub(crate) fn add_fragment(fragment: &str, target: &str) -> String {
    format!("{fragment}|{target}")
}
