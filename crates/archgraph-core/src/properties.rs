//! Open key-value property maps.
//!
//! Elements, relationships, diagrams and architecture nodes carry free-form
//! metadata such as `external`, `container_type`, `functional_area` or the
//! cluster membership assigned by the optimizer. The set of keys is open, so
//! every accessor returns a defined default when the key is absent instead of
//! failing.
//!
//! # Example
//!
//! ```
//! # use archgraph_core::properties::Properties;
//! let mut props = Properties::new();
//! props.insert("external", true);
//! props.insert("container_type", "database");
//!
//! assert!(props.get_bool("external"));
//! assert_eq!(props.get_str("container_type"), "database");
//! assert_eq!(props.get_str("functional_area"), "");
//! assert!(!props.get_bool("missing"));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for PropertyValue {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Insertion-ordered property map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(IndexMap<String, PropertyValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.0.shift_remove(key)
    }

    /// Returns the text value for `key`, or `""` when absent or not text.
    pub fn get_str(&self, key: &str) -> &str {
        match self.0.get(key) {
            Some(PropertyValue::Text(text)) => text,
            _ => "",
        }
    }

    /// Returns the text value for `key`, or `default` when absent or not text.
    pub fn get_str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.0.get(key) {
            Some(PropertyValue::Text(text)) => text,
            _ => default,
        }
    }

    /// Returns the boolean value for `key`, or `false`.
    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(PropertyValue::Bool(true)))
    }

    /// Returns the integer value for `key`, or `0`.
    pub fn get_int(&self, key: &str) -> i64 {
        match self.0.get(key) {
            Some(PropertyValue::Int(value)) => *value,
            _ => 0,
        }
    }

    /// Returns the list value for `key`, or an empty slice.
    pub fn get_list(&self, key: &str) -> &[String] {
        match self.0.get(key) {
            Some(PropertyValue::List(items)) => items,
            _ => &[],
        }
    }

    /// Appends `item` to the list under `key`, creating the list if needed.
    ///
    /// A non-list value stored under `key` is replaced.
    pub fn push_to_list(&mut self, key: &str, item: impl Into<String>) {
        match self.0.get_mut(key) {
            Some(PropertyValue::List(items)) => items.push(item.into()),
            _ => {
                self.0
                    .insert(key.to_string(), PropertyValue::List(vec![item.into()]));
            }
        }
    }

    /// Copies every entry of `other` into this map, later values overwriting earlier ones.
    pub fn merge(&mut self, other: &Properties) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}
