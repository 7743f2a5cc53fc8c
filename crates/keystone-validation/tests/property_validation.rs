//! Property-based tests for validation rules and results

use keystone_validation::{Mapping, Rules, ValidationResult, ValidationRule, Validator, Value};
use proptest::prelude::*;

fn section_with(value: Value) -> Mapping {
    let mut section = Mapping::new();
    section.insert(Value::from("value"), value);
    section
}

fn result_strategy() -> impl Strategy<Value = ValidationResult> {
    (
        prop::collection::vec("[a-z]{1,6}", 0..4),
        prop::collection::vec("[a-z]{1,6}", 0..4),
        prop::collection::vec("[a-z]{1,6}", 0..4),
    )
        .prop_map(|(errors, warnings, suggestions)| {
            let mut result = ValidationResult::new();
            for e in errors {
                result.add_error("path", e);
            }
            for w in warnings {
                result.add_warning("path", w);
            }
            for s in suggestions {
                result.add_suggestion("path", s);
            }
            result
        })
}

proptest! {
    /// A range rule errors exactly when the value falls outside the bounds
    #[test]
    fn prop_range_errors_iff_out_of_bounds(
        min in -1000i32..1000,
        span in 0i32..1000,
        value in -3000i64..3000,
    ) {
        let max = min + span;
        let rule = Rules::range("value", min, max);
        let result = rule.validate(&section_with(Value::from(value)), "");

        let outside = (value as f64) < min as f64 || (value as f64) > max as f64;
        prop_assert_eq!(result.has_errors(), outside);
    }

    /// Text is never accepted by a range rule
    #[test]
    fn prop_range_rejects_text(text in "[a-zA-Z ]{0,12}") {
        let rule = Rules::range("value", 0, 10);
        let result = rule.validate(&section_with(Value::from(text)), "");

        prop_assert_eq!(result.errors(), ["Error at 'value': Value must be a number"]);
    }

    /// Merging is associative and preserves every entry
    #[test]
    fn prop_merge_is_associative(
        a in result_strategy(),
        b in result_strategy(),
        c in result_strategy(),
    ) {
        let left = a.clone().merged(b.clone()).merged(c.clone());
        let right = a.clone().merged(b.clone().merged(c.clone()));

        prop_assert_eq!(&left, &right);
        prop_assert_eq!(
            left.errors().len(),
            a.errors().len() + b.errors().len() + c.errors().len()
        );
    }

    /// Case-insensitive enum rules accept any casing of an allowed value
    #[test]
    fn prop_enum_ignores_case_when_asked(index in 0usize..3, upper in any::<bool>()) {
        let allowed = ["survival", "creative", "adventure"];
        let text = if upper {
            allowed[index].to_uppercase()
        } else {
            allowed[index].to_string()
        };

        let validator = Validator::new().add_rule(Rules::enum_value("value", false, allowed));
        prop_assert!(!validator.validate(&section_with(Value::from(text))).has_errors());
    }
}
