//! Allowed-values check

use crate::{
    result::ValidationResult,
    rule::ValidationRule,
    section::{join_path, scalar_text, ConfigSection},
};

/// Requires the text of a present value to be one of a fixed set
#[derive(Debug, Clone)]
pub struct EnumRule {
    path: String,
    case_sensitive: bool,
    allowed: Vec<String>,
}

impl EnumRule {
    pub fn new<I, S>(path: impl Into<String>, case_sensitive: bool, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<String> = Vec::new();
        for value in allowed.into_iter().map(Into::into) {
            let value = if case_sensitive {
                value
            } else {
                value.to_lowercase()
            };
            if !values.contains(&value) {
                values.push(value);
            }
        }

        Self {
            path: path.into(),
            case_sensitive,
            allowed: values,
        }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    fn accepts(&self, text: &str) -> bool {
        if self.case_sensitive {
            self.allowed.iter().any(|allowed| allowed == text)
        } else {
            let text = text.to_lowercase();
            self.allowed.iter().any(|allowed| *allowed == text)
        }
    }
}

impl ValidationRule for EnumRule {
    fn validate(&self, section: &dyn ConfigSection, base_path: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(value) = section.get(&self.path) else {
            return result;
        };
        if value.is_null() {
            return result;
        }

        let accepted = scalar_text(value).is_some_and(|text| self.accepts(&text));
        if !accepted {
            result.add_error(
                &join_path(base_path, &self.path),
                format!("Value must be one of: {}", self.allowed.join(", ")),
            );
        }

        result
    }
}
