//! Named configuration documents backed by a file
//!
//! A [`ConfigDocument`] is an in-memory tree of sections addressed with dotted
//! paths. It remembers the file it was read from and the syntax of that file so
//! it can be written back unchanged in form.

use std::path::{Path, PathBuf};

use keystone_validation::{section::PATH_SEPARATOR, ConfigSection};
use serde_yaml::{Mapping, Value};

use crate::{
    error::{StorageError, StorageResult},
    types::ConfigFormat,
};

/// Hierarchical key/value document with a backing file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Mapping,
    path: PathBuf,
    format: ConfigFormat,
}

impl ConfigDocument {
    /// Create an empty document for a file that may not exist yet
    pub fn new(path: impl Into<PathBuf>, format: ConfigFormat) -> Self {
        Self {
            root: Mapping::new(),
            path: path.into(),
            format,
        }
    }

    /// Parse file contents into a document
    ///
    /// Empty content yields an empty document. The top level must be a mapping.
    pub fn parse(
        path: impl Into<PathBuf>,
        format: ConfigFormat,
        content: &str,
    ) -> StorageResult<Self> {
        let path = path.into();
        let parse_err = |message: String| StorageError::parse_error(path.clone(), format.to_string(), message);

        let value: Value = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
            ConfigFormat::Toml => {
                let table: toml::Value = toml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
                serde_yaml::to_value(table).map_err(|e| parse_err(e.to_string()))?
            }
            ConfigFormat::Json => {
                if content.trim().is_empty() {
                    Value::Null
                } else {
                    let json: serde_json::Value =
                        serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?;
                    serde_yaml::to_value(json).map_err(|e| parse_err(e.to_string()))?
                }
            }
        };

        let root = match value {
            Value::Null => Mapping::new(),
            Value::Mapping(map) => map,
            other => {
                return Err(parse_err(format!(
                    "expected a mapping at the top level, found {}",
                    keystone_validation::section::display_value(&other)
                )))
            }
        };

        Ok(Self { root, path, format })
    }

    /// Render the document in its file format
    pub fn serialize(&self) -> StorageResult<String> {
        let serialize_err = |message: String| {
            StorageError::parse_error(self.path.clone(), self.format.to_string(), message)
        };

        match self.format {
            ConfigFormat::Yaml => {
                serde_yaml::to_string(&self.root).map_err(|e| serialize_err(e.to_string()))
            }
            ConfigFormat::Toml => {
                toml::to_string_pretty(&self.root).map_err(|e| serialize_err(e.to_string()))
            }
            ConfigFormat::Json => {
                serde_json::to_string_pretty(&self.root).map_err(|e| serialize_err(e.to_string()))
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Set a value, creating intermediate sections as needed
    ///
    /// An intermediate value that is not a section is replaced by one.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        if path.is_empty() {
            return;
        }

        let mut segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let last = segments.pop().unwrap_or(path);

        let mut current = &mut self.root;
        for segment in segments {
            let key = Value::from(segment);
            let slot = current
                .entry(key)
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            if !slot.is_mapping() {
                *slot = Value::Mapping(Mapping::new());
            }
            current = match slot {
                Value::Mapping(map) => map,
                _ => return,
            };
        }

        current.insert(Value::from(last), value.into());
    }

    /// Remove the value at a path, returning it
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let (parent, key) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((parent, key)) => (Some(parent), key),
            None => (None, path),
        };

        let map = match parent {
            None => &mut self.root,
            Some(parent) => {
                let mut current = &mut self.root;
                for segment in parent.split(PATH_SEPARATOR) {
                    current = current.get_mut(segment)?.as_mapping_mut()?;
                }
                current
            }
        };
        map.shift_remove(key)
    }

    /// Apply defaults key by key, overwriting whatever is present
    pub fn apply_defaults(&mut self, defaults: &Mapping) {
        for (key, value) in defaults {
            match key.as_str() {
                Some(path) => self.set(path, value.clone()),
                None => {
                    self.root.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Replace the tree, keeping the backing file and format
    pub fn replace_with(&mut self, other: ConfigDocument) {
        self.root = other.root;
    }
}

impl ConfigSection for ConfigDocument {
    fn get(&self, path: &str) -> Option<&Value> {
        ConfigSection::get(&self.root, path)
    }

    fn get_keys(&self, deep: bool) -> Vec<String> {
        self.root.get_keys(deep)
    }

    fn subsections(&self) -> Vec<(String, &dyn ConfigSection)> {
        self.root.subsections()
    }

    fn section(&self, path: &str) -> Option<&dyn ConfigSection> {
        self.root.section(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_creates_sections() {
        let mut doc = ConfigDocument::new("config.yaml", ConfigFormat::Yaml);
        doc.set("database.pool.size", 8);
        doc.set("name", "lobby");

        assert_eq!(doc.get("database.pool.size"), Some(&Value::from(8)));
        assert!(doc.is_section("database.pool"));
        assert_eq!(doc.get_keys(false), vec!["database", "name"]);
    }

    #[test]
    fn test_section_sees_values_set_through_the_document() {
        let mut doc = ConfigDocument::new("config.yaml", ConfigFormat::Yaml);
        doc.set("worlds.nether.enabled", false);

        let worlds = doc.section("worlds").unwrap();
        assert!(worlds.is_section("nether"));
        assert_eq!(worlds.get("nether.enabled"), Some(&Value::Bool(false)));
        assert!(doc.section("worlds.nether.enabled").is_none());
    }

    #[test]
    fn test_set_replaces_scalar_with_section() {
        let mut doc = ConfigDocument::new("config.yaml", ConfigFormat::Yaml);
        doc.set("motd", "hello");
        doc.set("motd.text", "hello");

        assert_eq!(doc.get_string("motd.text"), Some("hello".to_string()));
    }

    #[test]
    fn test_remove_nested_value() {
        let mut doc = ConfigDocument::parse("c.yaml", ConfigFormat::Yaml, "a:\n  b: 1\n  c: 2\n").unwrap();

        assert_eq!(doc.remove("a.b"), Some(Value::from(1)));
        assert_eq!(doc.remove("a.missing"), None);
        assert_eq!(doc.remove("x.y"), None);
        assert_eq!(doc.get_keys(true), vec!["a", "a.c"]);
    }

    #[test]
    fn test_dotted_default_keys_become_sections() {
        let mut defaults = Mapping::new();
        defaults.insert(Value::from("server.port"), Value::from(25565));
        defaults.insert(Value::from("debug"), Value::from(false));

        let mut doc = ConfigDocument::new("config.yaml", ConfigFormat::Yaml);
        doc.apply_defaults(&defaults);

        assert_eq!(doc.get("server.port"), Some(&Value::from(25565)));
        assert_eq!(doc.get("debug"), Some(&Value::from(false)));
    }

    #[test]
    fn test_parse_each_format() {
        let yaml = ConfigDocument::parse("c.yaml", ConfigFormat::Yaml, "server:\n  port: 1\n").unwrap();
        let toml = ConfigDocument::parse("c.toml", ConfigFormat::Toml, "[server]\nport = 1\n").unwrap();
        let json = ConfigDocument::parse("c.json", ConfigFormat::Json, r#"{"server": {"port": 1}}"#).unwrap();

        for doc in [&yaml, &toml, &json] {
            assert_eq!(doc.get("server.port"), Some(&Value::from(1)));
        }
    }

    #[test]
    fn test_empty_content_is_an_empty_document() {
        let doc = ConfigDocument::parse("c.yaml", ConfigFormat::Yaml, "").unwrap();
        assert!(doc.root().is_empty());
        let doc = ConfigDocument::parse("c.json", ConfigFormat::Json, "  \n").unwrap();
        assert!(doc.root().is_empty());
    }

    #[test]
    fn test_non_mapping_top_level_is_rejected() {
        let err = ConfigDocument::parse("c.yaml", ConfigFormat::Yaml, "- a\n- b\n").unwrap_err();
        assert!(matches!(err, StorageError::ParseError { .. }));
    }

    #[test]
    fn test_serialize_keeps_values() {
        let mut doc = ConfigDocument::new("c.toml", ConfigFormat::Toml);
        doc.set("server.port", 25565);
        doc.set("name", "lobby");

        let text = doc.serialize().unwrap();
        let reparsed = ConfigDocument::parse("c.toml", ConfigFormat::Toml, &text).unwrap();
        assert_eq!(reparsed.get("server.port"), Some(&Value::from(25565)));
        assert_eq!(reparsed.get_string("name"), Some("lobby".to_string()));
    }
}
