//! Recursive validation engine and rule factory

use std::{fmt, sync::Arc};

use serde_yaml::Value;

use crate::{
    error::RuleResult,
    result::ValidationResult,
    rule::ValidationRule,
    rules::{
        CustomRule, DependencyRule, EnumRule, ListRule, PatternRule, RangeRule,
        RequiredFieldRule, TypeRule,
    },
    section::{join_path, ConfigSection, ValueType},
};

/// Ordered set of rules applied to every section of a tree
///
/// For each rule, in registration order, the validator visits the root and
/// then every nested section depth first, parent before children and children
/// in key order, handing the rule the section and its dotted path. All
/// findings land in one [`ValidationResult`].
///
/// ```ignore
/// let validator = Validator::new()
///     .add_rule(Rules::required(["server.port"]))
///     .add_rule(Rules::range("server.port", 1024, 65535));
///
/// let result = validator.validate(&document);
/// ```
#[derive(Clone, Default)]
pub struct Validator {
    rules: Vec<Arc<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, returning the validator for chaining
    pub fn add_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate a tree against every registered rule
    pub fn validate(&self, root: &dyn ConfigSection) -> ValidationResult {
        let mut result = ValidationResult::new();

        for rule in &self.rules {
            Self::validate_recursively(root, "", rule.as_ref(), &mut result);
        }

        result
    }

    fn validate_recursively(
        section: &dyn ConfigSection,
        path: &str,
        rule: &dyn ValidationRule,
        result: &mut ValidationResult,
    ) {
        result.merge(rule.validate(section, path));

        for (key, child) in section.subsections() {
            let child_path = join_path(path, &key);
            Self::validate_recursively(child, &child_path, rule, result);
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Constructors for the built-in rules
pub struct Rules;

impl Rules {
    pub fn required<I, S>(paths: I) -> RequiredFieldRule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RequiredFieldRule::new(paths)
    }

    pub fn value_type(path: impl Into<String>, expected: ValueType) -> TypeRule {
        TypeRule::new(path, expected)
    }

    pub fn range(path: impl Into<String>, min: impl Into<f64>, max: impl Into<f64>) -> RangeRule {
        RangeRule::new(path, min, max)
    }

    pub fn pattern(path: impl Into<String>, regex: impl Into<String>) -> RuleResult<PatternRule> {
        PatternRule::new(path, regex)
    }

    pub fn custom<F>(path: impl Into<String>, predicate: F, message: impl Into<String>) -> CustomRule
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        CustomRule::new(path, predicate, message)
    }

    pub fn list(
        path: impl Into<String>,
        min_size: Option<usize>,
        max_size: Option<usize>,
        element_type: Option<ValueType>,
    ) -> ListRule {
        ListRule::new(path, min_size, max_size, element_type)
    }

    pub fn enum_value<I, S>(path: impl Into<String>, case_sensitive: bool, allowed: I) -> EnumRule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumRule::new(path, case_sensitive, allowed)
    }

    pub fn dependency(
        path: impl Into<String>,
        depends_on: impl Into<String>,
        required_value: impl Into<Value>,
    ) -> DependencyRule {
        DependencyRule::new(path, depends_on, required_value)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_yaml::Mapping;

    use super::*;

    fn tree() -> Mapping {
        serde_yaml::from_str(
            r#"
name: lobby
server:
  port: 25565
  limits:
    players: 20
  motd: hello
database:
  host: localhost
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_every_section_is_visited_parent_first() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&visited);
        let validator = Validator::new().add_rule(move |_: &dyn ConfigSection, path: &str| {
            sink.lock().unwrap().push(path.to_string());
            ValidationResult::new()
        });

        validator.validate(&tree());

        assert_eq!(
            *visited.lock().unwrap(),
            vec!["", "server", "server.limits", "database"]
        );
    }

    #[test]
    fn test_rules_run_in_registration_order() {
        let validator = Validator::new()
            .add_rule(|_: &dyn ConfigSection, path: &str| {
                let mut result = ValidationResult::new();
                result.add_error(path, "first");
                result
            })
            .add_rule(|_: &dyn ConfigSection, path: &str| {
                let mut result = ValidationResult::new();
                result.add_error(path, "second");
                result
            });

        let result = validator.validate(&tree());

        let messages: Vec<&str> = result
            .errors()
            .iter()
            .map(|e| e.rsplit(": ").next().unwrap())
            .collect();
        assert_eq!(
            messages,
            vec!["first", "first", "first", "first", "second", "second", "second", "second"]
        );
    }

    #[test]
    fn test_absolute_rules_only_fire_where_the_path_resolves() {
        let validator = Validator::new()
            .add_rule(Rules::range("server.port", 1, 1024))
            .add_rule(Rules::value_type("server.motd", ValueType::String));

        let result = validator.validate(&tree());

        assert_eq!(
            result.errors(),
            ["Error at 'server.port': Value must be between 1 and 1024"]
        );
    }

    #[test]
    fn test_relative_rule_fires_at_nested_level() {
        let validator = Validator::new().add_rule(Rules::range("players", 1, 10));
        let result = validator.validate(&tree());

        assert_eq!(
            result.errors(),
            ["Error at 'server.limits.players': Value must be between 1 and 10"]
        );
    }

    #[test]
    fn test_empty_validator_reports_nothing() {
        let validator = Validator::new();
        assert!(validator.is_empty());
        assert!(validator.validate(&tree()).is_empty());
    }
}
