//! Serde bridge out of the [`Value`] model.
//!
//! Scalars carry text, so typed requests (`deserialize_u16`, `deserialize_bool`
//! and so on) parse the text they are given regardless of the inferred kind.
//! A quoted `'42'` therefore still fills an integer field. `deserialize_any`
//! follows the inferred kind.

use crate::{Error, Record, Result, Scalar, ScalarKind, Value, ValueMap};
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::str::FromStr;

pub(crate) struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub(crate) fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }

    fn scalar(self, expected: &str) -> Result<Scalar> {
        match self.value {
            Value::Scalar(s) => Ok(s),
            other => Err(Error::custom(format!(
                "expected {}, found {}",
                expected,
                other.kind_name()
            ))),
        }
    }

    fn parse<T: FromStr>(self, expected: &str) -> Result<T> {
        let scalar = self.scalar(expected)?;
        scalar.text().parse().map_err(|_| {
            Error::custom(format!("expected {}, found '{}'", expected, scalar.text()))
        })
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                visitor.$visit(self.parse::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Scalar(s) => match s.kind() {
                ScalarKind::Boolean => visitor.visit_bool(s.text() == "true"),
                ScalarKind::Number => {
                    if let Ok(i) = s.text().parse::<i64>() {
                        visitor.visit_i64(i)
                    } else if let Ok(u) = s.text().parse::<u64>() {
                        visitor.visit_u64(u)
                    } else if let Ok(f) = s.text().parse::<f64>() {
                        visitor.visit_f64(f)
                    } else {
                        visitor.visit_string(s.into_text())
                    }
                }
                ScalarKind::String | ScalarKind::Uri => visitor.visit_string(s.into_text()),
            },
            Value::Sequence(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
            Value::Record(record) => visitor.visit_map(MapDeserializer::from_record(record)),
            Value::Ref(id) => Err(Error::custom(format!(
                "cannot deserialize arena reference {} without its arena",
                id
            ))),
        }
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
        deserialize_bool => visit_bool: bool,
        deserialize_char => visit_char: char,
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.scalar("string")?.into_text())
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            value => visitor.visit_some(ValueDeserializer::new(value)),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            other => Err(Error::custom(format!(
                "expected null, found {}",
                other.kind_name()
            ))),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    /// A lone value where a sequence is expected is read as a one-element
    /// sequence, matching how single form parameters arrive.
    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Sequence(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Null => visitor.visit_seq(SeqDeserializer::new(Vec::new())),
            single => visitor.visit_seq(SeqDeserializer::new(vec![single])),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Scalar(s) => visitor.visit_enum(s.into_text().into_deserializer()),
            Value::Map(map) if map.len() == 1 => {
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((Some(variant), value)) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, value))
                    }
                    _ => Err(Error::custom("expected enum variant name")),
                }
            }
            other => Err(Error::custom(format!(
                "expected enum, found {}",
                other.kind_name()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bytes byte_buf map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: Box<dyn Iterator<Item = (Option<String>, Value)>>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: ValueMap) -> Self {
        MapDeserializer {
            iter: Box::new(map.into_iter()),
            value: None,
        }
    }

    fn from_record(record: Record) -> Self {
        MapDeserializer {
            iter: Box::new(record.into_fields().into_iter().map(|(k, v)| (Some(k), v))),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                let key = key.map(Value::string).unwrap_or(Value::Null);
                seed.deserialize(ValueDeserializer::new(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Value,
}

impl EnumDeserializer {
    fn new(variant: String, value: Value) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::string(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Value,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Value::Null => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(ValueDeserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Sequence(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
            Value::Record(record) => visitor.visit_map(MapDeserializer::from_record(record)),
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

pub(crate) fn from_value<T>(value: Value) -> Result<T>
where
    T: de::DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
        label: String,
        price: Option<f64>,
        tags: Vec<String>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    enum Command {
        Stop,
        Move(i32),
        Resize { w: u32, h: u32 },
    }

    fn map(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn test_struct_from_map() {
        let value = map(vec![
            ("id", Value::from(7)),
            ("label", Value::from(123)),
            ("price", Value::Null),
            ("tags", Value::from("solo")),
        ]);
        let item: Item = from_value(value).unwrap();
        assert_eq!(
            item,
            Item {
                id: 7,
                label: "123".to_string(),
                price: None,
                tags: vec!["solo".to_string()],
            }
        );
    }

    #[test]
    fn test_quoted_number_fills_integer() {
        let n: u16 = from_value(Value::string("42")).unwrap();
        assert_eq!(n, 42);
        assert!(from_value::<u8>(Value::from(300)).is_err());
    }

    #[test]
    fn test_enums() {
        assert_eq!(from_value::<Command>(Value::from("Stop")).unwrap(), Command::Stop);
        assert_eq!(
            from_value::<Command>(map(vec![("Move", Value::from(-3))])).unwrap(),
            Command::Move(-3)
        );
        let resize = map(vec![(
            "Resize",
            map(vec![("w", Value::from(1)), ("h", Value::from(2))]),
        )]);
        assert_eq!(
            from_value::<Command>(resize).unwrap(),
            Command::Resize { w: 1, h: 2 }
        );
    }

    #[test]
    fn test_numeric_map_keys() {
        let value = map(vec![("1", Value::from("a")), ("2", Value::from("b"))]);
        let parsed: HashMap<u32, String> = from_value(value).unwrap();
        assert_eq!(parsed.get(&2).map(String::as_str), Some("b"));
    }

    #[test]
    fn test_record_reads_as_map() {
        let record = Record::new("Item")
            .with_field("id", 1)
            .with_field("label", "x")
            .with_field("price", 2.5)
            .with_field("tags", Value::Sequence(vec![]));
        let item: Item = from_value(Value::Record(record)).unwrap();
        assert_eq!(item.price, Some(2.5));
    }
}
