//! Cross-field requirement

use serde_yaml::Value;

use crate::{
    result::ValidationResult,
    rule::ValidationRule,
    section::{display_value, join_path, ConfigSection},
};

/// When both `path` and `depends_on` are present, requires `depends_on` to
/// hold `required_value`
///
/// A missing dependent field means the requirement does not apply.
#[derive(Debug, Clone)]
pub struct DependencyRule {
    path: String,
    depends_on: String,
    required_value: Value,
}

impl DependencyRule {
    pub fn new(
        path: impl Into<String>,
        depends_on: impl Into<String>,
        required_value: impl Into<Value>,
    ) -> Self {
        Self {
            path: path.into(),
            depends_on: depends_on.into(),
            required_value: required_value.into(),
        }
    }
}

impl ValidationRule for DependencyRule {
    fn validate(&self, section: &dyn ConfigSection, base_path: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !section.contains(&self.path) {
            return result;
        }
        let Some(dependency) = section.get(&self.depends_on) else {
            return result;
        };

        if *dependency != self.required_value {
            result.add_error(
                &join_path(base_path, &self.path),
                format!(
                    "Requires {} to be {}",
                    self.depends_on,
                    display_value(&self.required_value)
                ),
            );
        }

        result
    }
}
