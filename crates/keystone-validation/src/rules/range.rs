//! Inclusive numeric bounds

use crate::{
    result::ValidationResult,
    rule::ValidationRule,
    section::{join_path, ConfigSection},
};

/// Requires a present value to be a number within `[min, max]`
///
/// Integers and floats are both compared as `f64`. A null value counts as absent.
#[derive(Debug, Clone)]
pub struct RangeRule {
    path: String,
    min: f64,
    max: f64,
}

impl RangeRule {
    pub fn new(path: impl Into<String>, min: impl Into<f64>, max: impl Into<f64>) -> Self {
        Self {
            path: path.into(),
            min: min.into(),
            max: max.into(),
        }
    }
}

impl ValidationRule for RangeRule {
    fn validate(&self, section: &dyn ConfigSection, base_path: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(value) = section.get(&self.path) else {
            return result;
        };
        if value.is_null() {
            return result;
        }

        match value.as_f64() {
            Some(number) if number < self.min || number > self.max => {
                result.add_error(
                    &join_path(base_path, &self.path),
                    format!("Value must be between {} and {}", self.min, self.max),
                );
            }
            Some(_) => {}
            None => {
                result.add_error(&join_path(base_path, &self.path), "Value must be a number");
            }
        }

        result
    }
}
