//! Hierarchical configuration tree access
//!
//! Rules never see a concrete document type. They address a [`ConfigSection`]
//! through dotted paths such as `database.host`, where every segment but the
//! last names a nested section.
//!
//! Values are [`serde_yaml::Value`]s. A YAML mapping keeps its keys in the
//! order they were written, which is the order the validator walks children in.

use std::fmt;

use serde_yaml::{Mapping, Value};

/// Separator between the segments of a dotted path
pub const PATH_SEPARATOR: char = '.';

/// Runtime type tag of a configuration value
///
/// Null values carry no tag: [`ValueType::of`] returns `None` for them and
/// [`ValueType::matches`] never accepts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Text
    String,
    /// Whole number
    Integer,
    /// Floating point number
    Float,
    /// Either an integer or a float
    Number,
    /// `true` or `false`
    Boolean,
    /// Sequence of values
    List,
    /// Nested section
    Section,
}

impl ValueType {
    /// Tag of a concrete value, `None` for null
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ValueType::Boolean),
            Value::Number(number) if number.is_f64() => Some(ValueType::Float),
            Value::Number(_) => Some(ValueType::Integer),
            Value::String(_) => Some(ValueType::String),
            Value::Sequence(_) => Some(ValueType::List),
            Value::Mapping(_) => Some(ValueType::Section),
            Value::Tagged(tagged) => Self::of(&tagged.value),
        }
    }

    /// Check whether a value is an instance of this type
    pub fn matches(&self, value: &Value) -> bool {
        match (self, Self::of(value)) {
            (_, None) => false,
            (ValueType::Number, Some(ValueType::Integer | ValueType::Float)) => true,
            (expected, Some(actual)) => *expected == actual,
        }
    }

    /// Display name used in validation messages
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "String",
            ValueType::Integer => "Integer",
            ValueType::Float => "Float",
            ValueType::Number => "Number",
            ValueType::Boolean => "Boolean",
            ValueType::List => "List",
            ValueType::Section => "Section",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read access to one node of a configuration tree
///
/// All paths are relative to the node the trait is implemented on.
pub trait ConfigSection: Send + Sync {
    /// Value at a dotted path
    fn get(&self, path: &str) -> Option<&Value>;

    /// Keys of this section; nested keys are included as dotted paths when `deep` is set
    fn get_keys(&self, deep: bool) -> Vec<String>;

    /// Direct child sections, in key order
    fn subsections(&self) -> Vec<(String, &dyn ConfigSection)>;

    /// Nested section at a dotted path
    fn section(&self, path: &str) -> Option<&dyn ConfigSection>;

    /// Whether a value exists at the path (a null value counts as present)
    fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Scalar value at the path rendered as text
    fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(scalar_text)
    }

    /// Sequence at the path, `None` when absent or not a list
    fn get_list(&self, path: &str) -> Option<&[Value]> {
        match untag(self.get(path)?) {
            Value::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Whether the path names a nested section
    fn is_section(&self, path: &str) -> bool {
        matches!(self.get(path).map(untag), Some(Value::Mapping(_)))
    }
}

impl ConfigSection for Mapping {
    fn get(&self, path: &str) -> Option<&Value> {
        resolve(self, path)
    }

    fn get_keys(&self, deep: bool) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(self, "", deep, &mut keys);
        keys
    }

    fn subsections(&self) -> Vec<(String, &dyn ConfigSection)> {
        self.iter()
            .filter_map(|(key, value)| match (key_text(key), untag(value)) {
                (Some(key), Value::Mapping(child)) => Some((key, child as &dyn ConfigSection)),
                _ => None,
            })
            .collect()
    }

    fn section(&self, path: &str) -> Option<&dyn ConfigSection> {
        match untag(resolve(self, path)?) {
            Value::Mapping(child) => Some(child as &dyn ConfigSection),
            _ => None,
        }
    }
}

/// Join a base path and a relative path without a leading separator
pub fn join_path(base: &str, path: &str) -> String {
    if base.is_empty() {
        path.to_string()
    } else if path.is_empty() {
        base.to_string()
    } else {
        format!("{}{}{}", base, PATH_SEPARATOR, path)
    }
}

/// Resolve a dotted path inside a mapping
pub fn resolve<'a>(root: &'a Mapping, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut segments = path.split(PATH_SEPARATOR);
    let mut current = lookup(root, segments.next()?)?;
    for segment in segments {
        match untag(current) {
            Value::Mapping(map) => current = lookup(map, segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Text form of a mapping key, `None` for keys that are not scalars
pub fn key_text(key: &Value) -> Option<String> {
    match untag(key) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text form of a scalar value; `None` for null, lists and sections
pub fn scalar_text(value: &Value) -> Option<String> {
    match untag(value) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Human-readable rendering of any value, used in messages
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(display_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", display_value(k), display_value(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, display_value(&tagged.value)),
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn lookup<'a>(map: &'a Mapping, segment: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(segment) {
        return Some(value);
    }
    // Numeric and boolean keys are addressed by their text form
    map.iter()
        .find(|(key, _)| !key.is_string() && key_text(key).as_deref() == Some(segment))
        .map(|(_, value)| value)
}

fn collect_keys(map: &Mapping, prefix: &str, deep: bool, out: &mut Vec<String>) {
    for (key, value) in map {
        let Some(key) = key_text(key) else {
            continue;
        };
        let path = join_path(prefix, &key);
        out.push(path.clone());
        if deep {
            if let Value::Mapping(child) = untag(value) {
                collect_keys(child, &path, deep, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_resolve_nested_path() {
        let root = tree("database:\n  host: localhost\n  port: 5432\n");
        assert_eq!(
            ConfigSection::get(&root, "database.host"),
            Some(&Value::from("localhost"))
        );
        assert!(ConfigSection::contains(&root, "database.port"));
        assert!(!ConfigSection::contains(&root, "database.user"));
        assert!(!ConfigSection::contains(&root, "database.host.extra"));
    }

    #[test]
    fn test_null_value_is_present() {
        let root = tree("name: ~\n");
        assert!(ConfigSection::contains(&root, "name"));
        assert_eq!(root.get_string("name"), None);
    }

    #[test]
    fn test_numeric_keys_are_addressable() {
        let root = tree("levels:\n  1: easy\n  2: hard\n");
        assert_eq!(root.get_string("levels.2"), Some("hard".to_string()));
    }

    #[test]
    fn test_keys_shallow_and_deep() {
        let root = tree("a: 1\nb:\n  c: 2\n  d:\n    e: 3\n");
        assert_eq!(root.get_keys(false), vec!["a", "b"]);
        assert_eq!(root.get_keys(true), vec!["a", "b", "b.c", "b.d", "b.d.e"]);
    }

    #[test]
    fn test_subsections_keep_key_order() {
        let root = tree("zeta:\n  x: 1\nalpha:\n  y: 2\nplain: 3\n");
        let names: Vec<String> = root.subsections().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert!(root.is_section("zeta"));
        assert!(!root.is_section("plain"));
    }

    #[test]
    fn test_nested_section_lookup() {
        let root = tree("database:\n  pool:\n    size: 8\n  host: db\n");

        let database = root.section("database").unwrap();
        assert_eq!(database.get_string("host"), Some("db".to_string()));
        assert_eq!(database.section("pool").unwrap().get("size"), Some(&Value::from(8)));
        assert_eq!(root.section("database.pool").unwrap().get_keys(false), vec!["size"]);

        assert!(root.section("database.host").is_none());
        assert!(root.section("missing").is_none());
        assert!(root.section("").is_none());
    }

    #[test]
    fn test_value_type_tags() {
        assert_eq!(ValueType::of(&Value::from(1)), Some(ValueType::Integer));
        assert_eq!(ValueType::of(&Value::from(1.5)), Some(ValueType::Float));
        assert_eq!(ValueType::of(&Value::Null), None);
        assert!(ValueType::Number.matches(&Value::from(3)));
        assert!(ValueType::Number.matches(&Value::from(3.0)));
        assert!(!ValueType::Integer.matches(&Value::from(3.0)));
        assert!(!ValueType::String.matches(&Value::Null));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "port"), "port");
        assert_eq!(join_path("server", "port"), "server.port");
        assert_eq!(join_path("server", ""), "server");
    }

    #[test]
    fn test_display_value() {
        let root = tree("list: [1, two]\nmap:\n  k: true\n");
        assert_eq!(display_value(ConfigSection::get(&root, "list").unwrap()), "[1, two]");
        assert_eq!(display_value(ConfigSection::get(&root, "map").unwrap()), "{k: true}");
    }
}
