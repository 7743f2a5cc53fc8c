//! The rule abstraction shared by every check

use crate::{result::ValidationResult, section::ConfigSection};

/// One check against a configuration tree
///
/// The validator calls a rule once for every section of the tree, passing the
/// section and its dotted path from the root (empty for the root itself). A
/// rule looks its target up relative to the section it is handed and reports
/// nothing when the target is absent there, unless presence is what it checks.
///
/// Rules hold only their own configuration, so one instance can serve any
/// number of validation passes, including concurrent ones.
pub trait ValidationRule: Send + Sync {
    fn validate(&self, section: &dyn ConfigSection, base_path: &str) -> ValidationResult;
}

impl<F> ValidationRule for F
where
    F: Fn(&dyn ConfigSection, &str) -> ValidationResult + Send + Sync,
{
    fn validate(&self, section: &dyn ConfigSection, base_path: &str) -> ValidationResult {
        self(section, base_path)
    }
}
