//! Sequence size and element type check

use crate::{
    result::ValidationResult,
    rule::ValidationRule,
    section::{join_path, ConfigSection, ValueType},
};

/// Requires a present value to be a list, optionally bounded in size and
/// restricted to one element type
///
/// Each bound is checked on its own and may be left unset. Null elements are
/// never reported.
#[derive(Debug, Clone)]
pub struct ListRule {
    path: String,
    min_size: Option<usize>,
    max_size: Option<usize>,
    element_type: Option<ValueType>,
}

impl ListRule {
    pub fn new(
        path: impl Into<String>,
        min_size: Option<usize>,
        max_size: Option<usize>,
        element_type: Option<ValueType>,
    ) -> Self {
        Self {
            path: path.into(),
            min_size,
            max_size,
            element_type,
        }
    }
}

impl ValidationRule for ListRule {
    fn validate(&self, section: &dyn ConfigSection, base_path: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !section.contains(&self.path) {
            return result;
        }

        let full_path = join_path(base_path, &self.path);
        let Some(items) = section.get_list(&self.path) else {
            result.add_error(&full_path, "Value must be a list");
            return result;
        };

        if let Some(min) = self.min_size {
            if items.len() < min {
                result.add_error(
                    &full_path,
                    format!("List must have at least {} elements", min),
                );
            }
        }
        if let Some(max) = self.max_size {
            if items.len() > max {
                result.add_error(&full_path, format!("List must have at most {} elements", max));
            }
        }

        if let Some(element_type) = self.element_type {
            for (index, item) in items.iter().enumerate() {
                if !item.is_null() && !element_type.matches(item) {
                    result.add_error(
                        &format!("{}[{}]", full_path, index),
                        format!("Element must be of type {}", element_type),
                    );
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use serde_yaml::Mapping;

    use super::*;

    fn section() -> Mapping {
        serde_yaml::from_str(
            "worlds: [world, nether, end]\nmixed: [a, 1, ~, b, true]\nnot_list: hello\n",
        )
        .unwrap()
    }

    #[test]
    fn test_sizes_at_the_bounds_pass() {
        let rule = ListRule::new("worlds", Some(3), Some(3), Some(ValueType::String));
        assert!(!rule.validate(&section(), "").has_errors());
    }

    #[test]
    fn test_each_bound_is_checked_independently() {
        let too_short = ListRule::new("worlds", Some(4), None, None);
        assert_eq!(
            too_short.validate(&section(), "").errors(),
            ["Error at 'worlds': List must have at least 4 elements"]
        );

        let too_long = ListRule::new("worlds", None, Some(2), None);
        assert_eq!(
            too_long.validate(&section(), "").errors(),
            ["Error at 'worlds': List must have at most 2 elements"]
        );
    }

    #[test]
    fn test_element_errors_carry_the_index() {
        let rule = ListRule::new("mixed", None, None, Some(ValueType::String));
        assert_eq!(
            rule.validate(&section(), "perms").errors(),
            [
                "Error at 'perms.mixed[1]': Element must be of type String",
                "Error at 'perms.mixed[4]': Element must be of type String"
            ]
        );
    }

    #[test]
    fn test_non_list_skips_remaining_checks() {
        let rule = ListRule::new("not_list", Some(5), None, Some(ValueType::Integer));
        assert_eq!(
            rule.validate(&section(), "").errors(),
            ["Error at 'not_list': Value must be a list"]
        );
    }

    #[test]
    fn test_absent_list_is_ignored() {
        let rule = ListRule::new("missing", Some(1), None, None);
        assert!(!rule.validate(&section(), "").has_errors());
    }
}
