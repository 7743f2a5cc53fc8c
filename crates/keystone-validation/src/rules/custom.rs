//! Caller-supplied predicate

use std::{fmt, sync::Arc};

use serde_yaml::Value;

use crate::{
    result::ValidationResult,
    rule::ValidationRule,
    section::{join_path, ConfigSection},
};

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Reports a fixed message when the predicate rejects a present value
///
/// The predicate receives the raw value, null included.
#[derive(Clone)]
pub struct CustomRule {
    path: String,
    predicate: Predicate,
    message: String,
}

impl CustomRule {
    pub fn new<F>(path: impl Into<String>, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            predicate: Arc::new(predicate),
            message: message.into(),
        }
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("path", &self.path)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl ValidationRule for CustomRule {
    fn validate(&self, section: &dyn ConfigSection, base_path: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(value) = section.get(&self.path) {
            if !(self.predicate)(value) {
                result.add_error(&join_path(base_path, &self.path), &self.message);
            }
        }

        result
    }
}
