//! Dynamic value representation for UON data.
//!
//! This module provides the [`Value`] enum, the tagged model every
//! serializer and parser call consumes or produces.
//!
//! ## Core Types
//!
//! - [`Value`]: null, scalar, sequence, map, record, or a reference into an [`Arena`]
//! - [`Scalar`]: text plus an inferred [`ScalarKind`]
//! - [`Record`]: a named record with ordered fields
//! - [`Arena`] / [`NodeId`]: shared container nodes with stable identities
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use serde_uon::{Record, Value};
//!
//! let null = Value::Null;
//! let number = Value::from(42);
//! let text = Value::from("hello");
//! let link = Value::uri("f0/x0");
//!
//! let bean = Record::new("Person")
//!     .with_field("name", "Alice")
//!     .with_field("age", 30);
//! assert_eq!(bean.get("age").and_then(|v| v.as_i64()), Some(30));
//! ```
//!
//! ### Shared and Cyclic Graphs
//!
//! Owned values are trees. Sharing and cycles go through an [`Arena`]:
//!
//! ```rust
//! use serde_uon::{Arena, Record, Value};
//!
//! let mut arena = Arena::new();
//! let a = arena.reserve();
//! let b = arena.alloc(Record::new("B").with_field("a", Value::Ref(a)).into());
//! arena.set(a, Record::new("A").with_field("b", Value::Ref(b)).into());
//! assert_eq!(arena.len(), 2);
//! ```

use crate::ValueMap;
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The inferred kind of a scalar's text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    #[default]
    String,
    Number,
    Boolean,
    Uri,
}

impl ScalarKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Uri => "uri",
        }
    }
}

/// A scalar carried as text.
///
/// Numbers and booleans keep their literal text so that the writer can emit
/// exactly what was read.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scalar {
    text: String,
    kind: ScalarKind,
}

impl Scalar {
    pub fn new(text: impl Into<String>, kind: ScalarKind) -> Self {
        Scalar {
            text: text.into(),
            kind,
        }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::new(text, ScalarKind::String)
    }

    /// Creates a numeric scalar, rejecting text that is not a number literal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_uon::Scalar;
    ///
    /// assert!(Scalar::number("-12.5e3").is_some());
    /// assert!(Scalar::number("123456789012345678901234567890").is_some());
    /// assert!(Scalar::number("NaN").is_none());
    /// ```
    pub fn number(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        is_numeric(&text).then(|| Self::new(text, ScalarKind::Number))
    }

    pub fn boolean(b: bool) -> Self {
        Self::new(if b { "true" } else { "false" }, ScalarKind::Boolean)
    }

    pub fn uri(text: impl Into<String>) -> Self {
        Self::new(text, ScalarKind::Uri)
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        self.kind
    }

    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Parses the text as an arbitrary-size integer.
    #[must_use]
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self.kind {
            ScalarKind::Number => BigInt::from_str(&self.text).ok(),
            _ => None,
        }
    }
}

/// Returns `true` if `s` is a number literal: `-? digits (. digits)? ([eE] [+-]? digits)?`.
///
/// `NaN` and `inf` are not numbers here and stay strings.
pub(crate) fn is_numeric(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start {
        return false;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return false;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}

/// A named record ("bean"): a type tag plus ordered fields.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Record {
    type_name: String,
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Record {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in insertion order.
    pub fn fields(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    #[must_use]
    pub fn into_fields(self) -> IndexMap<String, Value> {
        self.fields
    }
}

/// Stable identity of a container node stored in an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Storage for container nodes that are shared or take part in cycles.
///
/// Values refer to nodes with [`Value::Ref`]; the cycle guard keys its
/// visited set by [`NodeId`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arena {
    nodes: Vec<Value>,
}

impl Arena {
    #[must_use]
    pub const fn new() -> Self {
        Arena { nodes: Vec::new() }
    }

    /// Stores `value` and returns its identity.
    pub fn alloc(&mut self, value: Value) -> NodeId {
        self.nodes.push(value);
        NodeId(self.nodes.len() - 1)
    }

    /// Allocates a `Null` placeholder to be filled with [`Arena::set`].
    pub fn reserve(&mut self) -> NodeId {
        self.alloc(Value::Null)
    }

    /// Replaces the node's value. Returns `false` if the id is unknown.
    pub fn set(&mut self, id: NodeId, value: Value) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Value> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Value> {
        self.nodes.get_mut(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A dynamically-typed UON value.
///
/// # Examples
///
/// ```rust
/// use serde_uon::{Value, ScalarKind};
///
/// let v = Value::from(42);
/// assert!(v.is_scalar());
/// assert_eq!(v.as_scalar().map(|s| s.kind()), Some(ScalarKind::Number));
/// assert_eq!(Value::from("x").as_str(), Some("x"));
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Map(ValueMap),
    Record(Record),
    Ref(NodeId),
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::Scalar(Scalar::string(text))
    }

    pub fn uri(text: impl Into<String>) -> Self {
        Value::Scalar(Scalar::uri(text))
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    #[inline]
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the text of a string or URI scalar.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) if matches!(s.kind, ScalarKind::String | ScalarKind::Uri) => {
                Some(&s.text)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Scalar(s) if s.kind == ScalarKind::Number => s.text.parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Scalar(s) if s.kind == ScalarKind::Number => s.text.parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Scalar(s) if s.kind == ScalarKind::Boolean => match s.text.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_sequence(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Short human-readable name of the variant, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Scalar(s) => s.kind.as_str(),
            Value::Sequence(_) => "sequence",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Ref(_) => "reference",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = crate::Config::default();
        let text = crate::Serializer::new(&config)
            .serialize(self, &crate::TypeRef::dynamic())
            .map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{Error as _, SerializeMap, SerializeSeq};

        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Scalar(s) => match s.kind {
                ScalarKind::Boolean => serializer.serialize_bool(s.text == "true"),
                ScalarKind::Number => {
                    if let Ok(i) = s.text.parse::<i64>() {
                        serializer.serialize_i64(i)
                    } else if let Ok(u) = s.text.parse::<u64>() {
                        serializer.serialize_u64(u)
                    } else if let Ok(f) = s.text.parse::<f64>() {
                        serializer.serialize_f64(f)
                    } else {
                        serializer.serialize_str(&s.text)
                    }
                }
                ScalarKind::String | ScalarKind::Uri => serializer.serialize_str(&s.text),
            },
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Record(record) => {
                let mut out = serializer.serialize_map(Some(record.len()))?;
                for (k, v) in record.fields() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Ref(id) => Err(S::Error::custom(format!(
                "cannot serialize arena reference {} without its arena",
                id
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid UON value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::from(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::string(value))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::string(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Sequence(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = ValueMap::new();
                while let Some((key, value)) = map.next_entry::<Option<String>, Value>()? {
                    values.insert_key(key, value);
                }
                Ok(Value::Map(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_i64().ok_or_else(|| {
            crate::Error::custom(format!("expected integer, found {}", value.kind_name()))
        })
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_f64().ok_or_else(|| {
            crate::Error::custom(format!("expected number, found {}", value.kind_name()))
        })
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_bool().ok_or_else(|| {
            crate::Error::custom(format!("expected boolean, found {}", value.kind_name()))
        })
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Scalar(s) if matches!(s.kind, ScalarKind::String | ScalarKind::Uri) => {
                Ok(s.text)
            }
            other => Err(crate::Error::custom(format!(
                "expected string, found {}",
                other.kind_name()
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(Scalar::boolean(value))
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Scalar(Scalar::new(value.to_string(), ScalarKind::Number))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::from(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Value::Scalar(Scalar::new(value.to_string(), ScalarKind::Number))
        } else {
            Value::Null
        }
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::Scalar(Scalar::new(value.to_string(), ScalarKind::Number))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::string(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Sequence(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl From<NodeId> for Value {
    fn from(value: NodeId) -> Self {
        Value::Ref(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn test_is_numeric() {
        for ok in ["0", "-1", "12.5", "1e10", "1.5E-3", "-0.0", "99999999999999999999999"] {
            assert!(is_numeric(ok), "{ok} should be numeric");
        }
        for bad in ["", "-", "1.", ".5", "1e", "NaN", "inf", "1_000", "0x10", "1 "] {
            assert!(!is_numeric(bad), "{bad} should not be numeric");
        }
    }

    #[test]
    fn test_tryfrom_i64() {
        let result: i64 = TryFrom::try_from(Value::from(42)).unwrap();
        assert_eq!(result, 42);
        assert!(i64::try_from(Value::from("test")).is_err());
    }

    #[test]
    fn test_tryfrom_string() {
        let result: String = TryFrom::try_from(Value::from("hello")).unwrap();
        assert_eq!(result, "hello");
        assert!(String::try_from(Value::from(42)).is_err());
    }

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Scalar(Scalar::boolean(true)));
        assert_eq!(Value::from(3.5f64).as_f64(), Some(3.5));
        assert_eq!(Value::from(f64::NAN), Value::Null);
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::string("x"));
    }

    #[test]
    fn test_bigint_scalar() {
        let big = Scalar::number("123456789012345678901234567890").unwrap();
        assert_eq!(
            big.as_bigint().map(|b| b.to_string()),
            Some("123456789012345678901234567890".to_string())
        );
    }

    #[test]
    fn test_arena_reserve_and_set() {
        let mut arena = Arena::new();
        let id = arena.reserve();
        assert_eq!(arena.get(id), Some(&Value::Null));
        assert!(arena.set(id, Value::from(1)));
        assert_eq!(arena.get(id).and_then(Value::as_i64), Some(1));
        assert!(!arena.set(NodeId(7), Value::Null));
    }

    #[test]
    fn test_record_field_order_is_insertion_order() {
        let record = Record::new("R").with_field("b", 1).with_field("a", 2);
        let names: Vec<_> = record.fields().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
