//! Value type check

use crate::{
    result::ValidationResult,
    rule::ValidationRule,
    section::{join_path, ConfigSection, ValueType},
};

/// Requires a present, non-null value to carry the expected type tag
#[derive(Debug, Clone)]
pub struct TypeRule {
    path: String,
    expected: ValueType,
}

impl TypeRule {
    pub fn new(path: impl Into<String>, expected: ValueType) -> Self {
        Self {
            path: path.into(),
            expected,
        }
    }
}

impl ValidationRule for TypeRule {
    fn validate(&self, section: &dyn ConfigSection, base_path: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(value) = section.get(&self.path) else {
            return result;
        };
        let Some(actual) = ValueType::of(value) else {
            return result;
        };

        if !self.expected.matches(value) {
            result.add_error(
                &join_path(base_path, &self.path),
                format!("Expected type {} but got {}", self.expected, actual),
            );
        }

        result
    }
}
