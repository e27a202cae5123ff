//! Name-keyed record type.
//!
//! [`RowMap`] wraps an [`IndexMap`] so that the dict-keyed reader yields
//! fields in schema order. Equality ignores order.
//!
//! ```rust
//! use row_format::{RowMap, Value};
//!
//! let mut map = RowMap::new();
//! map.insert("city".to_string(), Value::from("Niterói"));
//! map.insert("inhabitants".to_string(), Value::from(487562));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("inhabitants").and_then(Value::as_i64), Some(487562));
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::ops::Index;

/// An ordered map of field names to values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowMap(IndexMap<String, Value>);

impl RowMap {
    #[must_use]
    pub fn new() -> Self {
        RowMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RowMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a field; returns the previous value if the name was present.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a field, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl Index<&str> for RowMap {
    type Output = Value;

    /// # Panics
    ///
    /// Panics if the field is absent, like `HashMap`'s `Index`.
    fn index(&self, key: &str) -> &Value {
        &self.0[key]
    }
}

impl IntoIterator for RowMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RowMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for RowMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        RowMap(IndexMap::from_iter(iter))
    }
}

impl From<HashMap<String, Value>> for RowMap {
    fn from(map: HashMap<String, Value>) -> Self {
        RowMap(map.into_iter().collect())
    }
}

impl From<IndexMap<String, Value>> for RowMap {
    fn from(map: IndexMap<String, Value>) -> Self {
        RowMap(map)
    }
}

impl serde::Serialize for RowMap {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_preserved() {
        let map: RowMap = vec![
            ("z".to_string(), Value::from(1)),
            ("a".to_string(), Value::from(2)),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(map["a"], Value::Integer(2));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map = RowMap::new();
        map.insert("a".into(), Value::Null);
        map.insert("b".into(), Value::Null);
        map.insert("c".into(), Value::Null);
        map.remove("a");
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_serialize_json() {
        let mut map = RowMap::new();
        map.insert("b".into(), Value::from(true));
        map.insert("a".into(), Value::Null);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"b":true,"a":null}"#);
    }
}
