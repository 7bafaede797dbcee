//! Configuration tree model.
//!
//! Every parsed document is converted into a [`ConfigNode`] at the boundary,
//! so comparison code matches over a closed set of shapes instead of
//! inspecting raw JSON values.

mod path;

pub use path::{Path, PathPattern, PathSegment, PatternSegment, PATH_SEPARATOR};

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::fmt;

/// A node of a configuration document
#[derive(Debug, Clone)]
pub enum ConfigNode {
    /// Keyed children, document order preserved
    Mapping(Mapping),

    /// Ordered children
    Sequence(Vec<ConfigNode>),

    /// Leaf value
    Scalar(Scalar),
}

/// Leaf value of a configuration document
#[derive(Debug, Clone)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// Mapping with unique keys in insertion order
///
/// Equality ignores entry order. Lookups go through a key → position index.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: Vec<(String, ConfigNode)>,
    index: HashMap<String, usize>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing an existing entry in place
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigNode) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigNode> {
        let position = *self.index.get(key)?;
        Some(&mut self.entries[position].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Remove an entry and return its value, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<ConfigNode> {
        let position = self.index.remove(key)?;
        let (_, value) = self.entries.remove(position);
        for (k, _) in &self.entries[position..] {
            if let Some(p) = self.index.get_mut(k) {
                *p -= 1;
            }
        }
        Some(value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigNode)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|o| o == value))
    }
}

impl FromIterator<(String, ConfigNode)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (String, ConfigNode)>>(iter: T) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Number(a), Scalar::Number(b)) => numbers_equal(a, b),
            (Scalar::String(a), Scalar::String(b)) => a == b,
            _ => false,
        }
    }
}

/// Integers compare exactly; a float on either side compares by `f64` value
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    if a.is_f64() || b.is_f64() {
        return a.as_f64() == b.as_f64();
    }
    false
}

impl PartialEq for ConfigNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConfigNode::Mapping(a), ConfigNode::Mapping(b)) => a == b,
            (ConfigNode::Sequence(a), ConfigNode::Sequence(b)) => a == b,
            (ConfigNode::Scalar(a), ConfigNode::Scalar(b)) => a == b,
            _ => false,
        }
    }
}

impl ConfigNode {
    pub fn null() -> Self {
        ConfigNode::Scalar(Scalar::Null)
    }

    pub fn empty_mapping() -> Self {
        ConfigNode::Mapping(Mapping::new())
    }

    /// Parse a JSON document
    pub fn parse_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Child of a mapping node, `None` for other shapes
    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigNode::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigNode]> {
        match self {
            ConfigNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::Scalar(Scalar::String(text)) => Some(text),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigNode::Scalar(Scalar::Null))
    }

    /// Short shape name used in type mismatch reports
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigNode::Mapping(_) => "mapping",
            ConfigNode::Sequence(_) => "sequence",
            ConfigNode::Scalar(Scalar::Null) => "null",
            ConfigNode::Scalar(Scalar::Bool(_)) => "bool",
            ConfigNode::Scalar(Scalar::Number(_)) => "number",
            ConfigNode::Scalar(Scalar::String(_)) => "string",
        }
    }

    /// Strings as their raw text, everything else as compact JSON
    pub fn to_plain_string(&self) -> String {
        match self {
            ConfigNode::Scalar(Scalar::String(text)) => text.clone(),
            other => other.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ConfigNode::Mapping(mapping) => {
                let mut map = Map::new();
                for (key, value) in mapping.iter() {
                    map.insert(key.clone(), value.to_value());
                }
                Value::Object(map)
            }
            ConfigNode::Sequence(items) => {
                Value::Array(items.iter().map(ConfigNode::to_value).collect())
            }
            ConfigNode::Scalar(Scalar::Null) => Value::Null,
            ConfigNode::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            ConfigNode::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            ConfigNode::Scalar(Scalar::String(s)) => Value::String(s.clone()),
        }
    }
}

impl From<Value> for ConfigNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ConfigNode::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, ConfigNode::from(value)))
                    .collect(),
            ),
            Value::Array(items) => {
                ConfigNode::Sequence(items.into_iter().map(ConfigNode::from).collect())
            }
            Value::Null => ConfigNode::Scalar(Scalar::Null),
            Value::Bool(b) => ConfigNode::Scalar(Scalar::Bool(b)),
            Value::Number(n) => ConfigNode::Scalar(Scalar::Number(n)),
            Value::String(s) => ConfigNode::Scalar(Scalar::String(s)),
        }
    }
}

impl From<&str> for ConfigNode {
    fn from(text: &str) -> Self {
        ConfigNode::Scalar(Scalar::String(text.to_string()))
    }
}

impl From<String> for ConfigNode {
    fn from(text: String) -> Self {
        ConfigNode::Scalar(Scalar::String(text))
    }
}

impl Serialize for ConfigNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigNode::Mapping(mapping) => {
                let mut map = serializer.serialize_map(Some(mapping.len()))?;
                for (key, value) in mapping.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            ConfigNode::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigNode::Scalar(Scalar::Null) => serializer.serialize_unit(),
            ConfigNode::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            ConfigNode::Scalar(Scalar::Number(n)) => n.serialize(serializer),
            ConfigNode::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ConfigNode::from)
    }
}

impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_equality_ignores_order() {
        let a = ConfigNode::from(json!({"a": 1, "b": 2}));
        let b = ConfigNode::from(json!({"b": 2, "a": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_mapping_index_follows_removals() {
        let mut mapping: Mapping = ["a", "b", "c", "d"]
            .iter()
            .enumerate()
            .map(|(i, k)| (k.to_string(), ConfigNode::from(json!(i))))
            .collect();

        assert_eq!(mapping.remove("b"), Some(ConfigNode::from(json!(1))));
        assert_eq!(mapping.get("c"), Some(&ConfigNode::from(json!(2))));
        assert_eq!(mapping.get("d"), Some(&ConfigNode::from(json!(3))));
        assert!(!mapping.contains_key("b"));

        mapping.insert("b", ConfigNode::from(json!(9)));
        mapping.insert("a", ConfigNode::from(json!(7)));
        let keys: Vec<&String> = mapping.keys().collect();
        assert_eq!(keys, ["a", "c", "d", "b"]);
        assert_eq!(mapping.get("a"), Some(&ConfigNode::from(json!(7))));

        if let Some(value) = mapping.get_mut("d") {
            *value = ConfigNode::null();
        }
        assert!(mapping.get("d").is_some_and(ConfigNode::is_null));
    }

    #[test]
    fn test_parse_preserves_document_order() {
        let node = ConfigNode::parse_json(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let keys: Vec<&String> = node.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_string_never_equals_number() {
        assert_ne!(ConfigNode::from(json!("29000")), ConfigNode::from(json!(29000)));
    }

    #[test]
    fn test_bool_never_equals_number() {
        assert_ne!(ConfigNode::from(json!(true)), ConfigNode::from(json!(1)));
    }

    #[test]
    fn test_integer_equals_equivalent_float() {
        assert_eq!(ConfigNode::from(json!(1)), ConfigNode::from(json!(1.0)));
        assert_ne!(ConfigNode::from(json!(1)), ConfigNode::from(json!(1.5)));
    }

    #[test]
    fn test_sequence_order_matters() {
        assert_ne!(ConfigNode::from(json!([1, 2])), ConfigNode::from(json!([2, 1])));
    }

    #[test]
    fn test_display_is_compact_json() {
        let node = ConfigNode::from(json!({"b": [1, "x"], "a": null}));
        assert_eq!(node.to_string(), r#"{"b":[1,"x"],"a":null}"#);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut mapping = Mapping::new();
        mapping.insert("a", ConfigNode::from("1"));
        mapping.insert("b", ConfigNode::from("2"));
        mapping.insert("a", ConfigNode::from("3"));
        let keys: Vec<&String> = mapping.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(mapping.get("a").and_then(ConfigNode::as_str), Some("3"));
    }

    #[test]
    fn test_to_value_round_trip() {
        let value = json!({"x": [1, 2.5, true, null, "s"], "y": {}});
        assert_eq!(ConfigNode::from(value.clone()).to_value(), value);
    }
}
