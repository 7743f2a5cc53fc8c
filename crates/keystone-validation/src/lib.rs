//! # Keystone Validation
//!
//! Declarative validation for hierarchical, human-edited configuration trees.
//!
//! A [`Validator`] holds an ordered list of [`ValidationRule`]s and applies each
//! of them at every section of a tree, collecting errors, warnings and
//! suggestions tagged with dotted paths into a single [`ValidationResult`].
//!
//! ## Built-in rules
//!
//! - [`Rules::required`]: listed paths must exist
//! - [`Rules::value_type`]: value must carry a [`ValueType`]
//! - [`Rules::range`]: inclusive numeric bounds
//! - [`Rules::pattern`]: full regular expression match
//! - [`Rules::enum_value`]: one of a fixed set, optionally case-insensitive
//! - [`Rules::list`]: list size bounds and element type
//! - [`Rules::dependency`]: cross-field requirement
//! - [`Rules::custom`]: caller-supplied predicate
//!
//! Every rule except `required` treats its target as optional and stays
//! silent when the path is absent.

pub mod error;
pub mod result;
pub mod rule;
pub mod rules;
pub mod section;
pub mod validator;

pub use error::{RuleError, RuleResult};
pub use result::ValidationResult;
pub use rule::ValidationRule;
pub use rules::{
    CustomRule, DependencyRule, EnumRule, ListRule, PatternRule, RangeRule, RequiredFieldRule,
    TypeRule,
};
pub use section::{join_path, ConfigSection, ValueType};
pub use validator::{Rules, Validator};

/// Re-exported so callers can build values and trees without a direct dependency
pub use serde_yaml::{Mapping, Value};
