//! Ordered map type for UON maps.
//!
//! [`ValueMap`] wraps an [`IndexMap`] keyed by `Option<String>`: `None` is the
//! null key, which serializes as the bare literal `null` and parses back to
//! `None`. Insertion order is iteration order, and iteration order is output
//! order unless `sort_maps` is set.
//!
//! ## Examples
//!
//! ```rust
//! use serde_uon::{ValueMap, Value};
//!
//! let mut map = ValueMap::new();
//! map.insert("name", Value::from("Alice"));
//! map.insert("age", Value::from(30));
//! map.insert_key(None, Value::from("nameless"));
//!
//! assert_eq!(map.len(), 3);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! assert_eq!(map.get_null_key().and_then(|v| v.as_str()), Some("nameless"));
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of optional string keys to UON values.
///
/// # Examples
///
/// ```rust
/// use serde_uon::{ValueMap, Value};
///
/// let mut map = ValueMap::new();
/// map.insert("first", Value::from(1));
/// map.insert("second", Value::from(2));
///
/// let keys: Vec<_> = map.keys().map(|k| k.as_deref()).collect();
/// assert_eq!(keys, vec![Some("first"), Some("second")]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap(IndexMap<Option<String>, Value>);

impl ValueMap {
    #[must_use]
    pub fn new() -> Self {
        ValueMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ValueMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a string-keyed entry, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(Some(key.into()), value)
    }

    /// Inserts an entry whose key may be the null key.
    pub fn insert_key(&mut self, key: Option<String>, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(&Some(key.to_string()))
    }

    #[must_use]
    pub fn get_key(&self, key: &Option<String>) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_key_mut(&mut self, key: &Option<String>) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn get_null_key(&self) -> Option<&Value> {
        self.0.get(&None)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(&Some(key.to_string()))
    }

    /// Removes an entry, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(&Some(key.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, Option<String>, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, Option<String>, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Option<String>, Value> {
        self.0.iter()
    }
}

impl From<HashMap<String, Value>> for ValueMap {
    fn from(map: HashMap<String, Value>) -> Self {
        ValueMap(map.into_iter().map(|(k, v)| (Some(k), v)).collect())
    }
}

impl IntoIterator for ValueMap {
    type Item = (Option<String>, Value);
    type IntoIter = indexmap::map::IntoIter<Option<String>, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(Option<String>, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (Option<String>, Value)>>(iter: T) -> Self {
        ValueMap(IndexMap::from_iter(iter))
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        ValueMap(iter.into_iter().map(|(k, v)| (Some(k), v)).collect())
    }
}
