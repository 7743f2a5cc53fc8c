//! Presence check for mandatory fields

use crate::{
    result::ValidationResult,
    rule::ValidationRule,
    section::{join_path, ConfigSection},
};

/// Reports every listed path that is absent from the section
///
/// The target paths are looked up as given; the base path only prefixes the
/// paths in the emitted errors.
#[derive(Debug, Clone)]
pub struct RequiredFieldRule {
    paths: Vec<String>,
}

impl RequiredFieldRule {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

impl ValidationRule for RequiredFieldRule {
    fn validate(&self, section: &dyn ConfigSection, base_path: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        for required in &self.paths {
            if !section.contains(required) {
                result.add_error(&join_path(base_path, required), "Required field is missing");
            }
        }

        result
    }
}
