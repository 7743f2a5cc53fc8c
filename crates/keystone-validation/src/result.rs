//! Accumulated outcome of a validation pass

use std::fmt;

/// Errors, warnings and suggestions collected while validating a tree
///
/// Entries are stored already formatted with the dotted path they refer to and
/// keep insertion order. Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
    suggestions: Vec<String>,
}

impl ValidationResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error at a path
    pub fn add_error(&mut self, path: &str, message: impl fmt::Display) {
        self.errors.push(format!("Error at '{}': {}", path, message));
    }

    /// Record a warning at a path
    pub fn add_warning(&mut self, path: &str, message: impl fmt::Display) {
        self.warnings
            .push(format!("Warning at '{}': {}", path, message));
    }

    /// Record a suggestion for a path
    pub fn add_suggestion(&mut self, path: &str, message: impl fmt::Display) {
        self.suggestions
            .push(format!("Suggestion for '{}': {}", path, message));
    }

    /// Append every entry of `other` after the entries already present
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.suggestions.extend(other.suggestions);
    }

    /// Builder-style [`merge`](Self::merge)
    pub fn merged(mut self, other: ValidationResult) -> Self {
        self.merge(other);
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// True when nothing at all was recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.suggestions.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s), {} warning(s), {} suggestion(s)",
            self.errors.len(),
            self.warnings.len(),
            self.suggestions.len()
        )
    }
}
