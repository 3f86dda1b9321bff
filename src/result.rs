//! Nested result values produced by plugins and test cases
//!
//! A [`ResultMap`] keeps insertion order and unique keys. Values are either
//! strings or further maps, nested to any depth.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Key used for failure records
pub const ERROR_KEY: &str = "error";

/// A single result value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Nested(ResultMap),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Nested(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&ResultMap> {
        match self {
            Value::Str(_) => None,
            Value::Nested(map) => Some(map),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<ResultMap> for Value {
    fn from(map: ResultMap) -> Self {
        Value::Nested(map)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Nested(map) => write!(f, "{}", map),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Str(s) => serializer.serialize_str(s),
            Value::Nested(map) => map.serialize(serializer),
        }
    }
}

/// Ordered string-keyed result mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMap {
    entries: Vec<(String, Value)>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical failure record `{"error": message}`
    pub fn error(message: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.insert(ERROR_KEY, message.into());
        map
    }

    /// Insert a value, replacing an existing entry in place
    ///
    /// Returns the previous value for the key, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a string value
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Look up a nested map
    pub fn get_map(&self, key: &str) -> Option<&ResultMap> {
        self.get(key).and_then(Value::as_map)
    }

    /// Whether this map is a failure record
    pub fn is_error(&self) -> bool {
        self.get_str(ERROR_KEY).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ResultMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl fmt::Display for ResultMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Value::Str(s) => write!(f, "{:?}: {:?}", key, s)?,
                Value::Nested(map) => write!(f, "{:?}: {}", key, map)?,
            }
        }
        f.write_str("}")
    }
}

impl Serialize for ResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
