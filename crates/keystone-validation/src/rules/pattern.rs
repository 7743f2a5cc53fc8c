//! Regular expression check

use regex::Regex;

use crate::{
    error::{RuleError, RuleResult},
    result::ValidationResult,
    rule::ValidationRule,
    section::{join_path, scalar_text, ConfigSection},
};

/// Requires the text of a present value to match a pattern in full
#[derive(Debug, Clone)]
pub struct PatternRule {
    path: String,
    pattern: String,
    regex: Regex,
}

impl PatternRule {
    /// Compile the pattern, anchored at both ends
    pub fn new(path: impl Into<String>, pattern: impl Into<String>) -> RuleResult<Self> {
        let path = path.into();
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| RuleError::invalid_pattern(path.clone(), pattern.clone(), e))?;

        Ok(Self {
            path,
            pattern,
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl ValidationRule for PatternRule {
    fn validate(&self, section: &dyn ConfigSection, base_path: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(value) = section.get(&self.path) else {
            return result;
        };
        if value.is_null() {
            return result;
        }

        let matched = scalar_text(value).is_some_and(|text| self.regex.is_match(&text));
        if !matched {
            result.add_error(
                &join_path(base_path, &self.path),
                format!("Value must match pattern: {}", self.pattern),
            );
        }

        result
    }
}
