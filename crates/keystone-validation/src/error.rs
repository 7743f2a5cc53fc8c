//! Rule construction errors

use thiserror::Error;

/// Result type for rule construction
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors raised while building a validation rule
///
/// Validation itself never fails; problems found in a configuration tree are
/// reported through [`crate::ValidationResult`]. These errors only cover rules
/// that cannot be constructed from the arguments they were given.
#[derive(Error, Debug)]
pub enum RuleError {
    /// The regular expression of a pattern rule does not compile
    #[error("Invalid pattern '{pattern}' for {path}: {source}")]
    InvalidPattern {
        path: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl RuleError {
    /// Create an invalid pattern error
    pub fn invalid_pattern(
        path: impl Into<String>,
        pattern: impl Into<String>,
        source: regex::Error,
    ) -> Self {
        RuleError::InvalidPattern {
            path: path.into(),
            pattern: pattern.into(),
            source,
        }
    }
}
