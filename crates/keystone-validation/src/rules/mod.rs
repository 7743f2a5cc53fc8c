//! Built-in validation rules
//!
//! Every rule emits paths as `base_path.path`, with no leading separator when
//! the base path is empty.

pub mod custom;
pub mod dependency;
pub mod enumeration;
pub mod list;
pub mod pattern;
pub mod range;
pub mod required;
pub mod type_check;

pub use custom::CustomRule;
pub use dependency::DependencyRule;
pub use enumeration::EnumRule;
pub use list::ListRule;
pub use pattern::PatternRule;
pub use range::RangeRule;
pub use required::RequiredFieldRule;
pub use type_check::TypeRule;
