//! Casting generic parse trees to expected types.
//!
//! The reader produces maps, sequences and inferred scalars. [`Caster`]
//! walks that tree alongside a [`TypeDescriptor`] and produces the typed
//! value: records in declaration order, converted scalars, reversed swaps and
//! resolved discriminators.

use crate::de::UnknownProperty;
use crate::types::resolve_child;
use crate::value::is_numeric;
use crate::{
    Config, Error, Record, Result, Scalar, ScalarKind, Shape, TypeDescriptor, TypeProvider, Value,
    ValueMap,
};

pub(crate) struct Caster<'a> {
    config: &'a Config,
    types: &'a dyn TypeProvider,
    on_unknown: Option<&'a dyn Fn(&UnknownProperty<'_>)>,
}

impl<'a> Caster<'a> {
    pub(crate) fn new(
        config: &'a Config,
        types: &'a dyn TypeProvider,
        on_unknown: Option<&'a dyn Fn(&UnknownProperty<'_>)>,
    ) -> Self {
        Caster {
            config,
            types,
            on_unknown,
        }
    }

    pub(crate) fn cast(&self, value: Value, ty: &TypeDescriptor, path: &str) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if let Some(swap) = ty.swap {
            let surrogate = self.cast(value, swap.surrogate_type(), path)?;
            if surrogate.is_null() {
                return Ok(Value::Null);
            }
            tracing::trace!(swap = swap.name(), path, "reversing swap");
            return swap.backward(surrogate, ty);
        }
        match ty.shape {
            Shape::Dynamic => self.cast_dynamic(value, path),
            Shape::Scalar(kind) => cast_scalar(value, kind, path),
            Shape::Sequence => {
                let element = resolve_child(ty.element.as_ref(), self.types)?;
                let items = match value {
                    Value::Sequence(items) => items,
                    single => vec![single],
                };
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| self.cast(item, element, &format!("{}[{}]", path, i)))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Sequence)
            }
            Shape::Map => self.cast_map(value, ty, path),
            Shape::Record => self.cast_record(value, ty, path),
        }
    }

    /// Resolves discriminators and `_value` wrappers anywhere in an untyped tree.
    fn cast_dynamic(&self, value: Value, path: &str) -> Result<Value> {
        match value {
            Value::Map(map) => {
                let type_name = map
                    .get(self.config.type_property_name())
                    .and_then(Value::as_str)
                    .map(str::to_string);
                if let Some(name) = type_name {
                    let types = self.types;
                    let desc = types.lookup(&name).ok_or_else(|| {
                        Error::class_resolution(format!("unknown type '{}' at {}", name, path))
                    })?;
                    return self.cast(Value::Map(map), desc, path);
                }
                if map.len() == 1 && map.contains_key("_value") {
                    let inner = map.into_iter().next().map(|(_, v)| v).unwrap_or_default();
                    return self.cast_dynamic(inner, path);
                }
                map.into_iter()
                    .map(|(key, value)| {
                        let child = child_path(path, key.as_deref());
                        Ok((key, self.cast_dynamic(value, &child)?))
                    })
                    .collect::<Result<ValueMap>>()
                    .map(Value::Map)
            }
            Value::Sequence(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| self.cast_dynamic(item, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Sequence),
            other => Ok(other),
        }
    }

    fn cast_map(&self, value: Value, ty: &TypeDescriptor, path: &str) -> Result<Value> {
        let map = match value {
            Value::Map(map) => map,
            other => return Err(Error::type_mismatch(path, &ty.name, other.kind_name())),
        };
        let key_ty = resolve_child(ty.key.as_ref(), self.types)?;
        let value_ty = resolve_child(ty.value.as_ref(), self.types)?;
        map.into_iter()
            .map(|(key, value)| {
                let child = child_path(path, key.as_deref());
                if let Some(key) = &key {
                    check_key(key, key_ty, &child)?;
                }
                Ok((key, self.cast(value, value_ty, &child)?))
            })
            .collect::<Result<ValueMap>>()
            .map(Value::Map)
    }

    fn cast_record(&self, value: Value, ty: &TypeDescriptor, path: &str) -> Result<Value> {
        let map: ValueMap = match value {
            Value::Map(map) => map,
            Value::Record(record) => record.into_fields().into_iter().collect(),
            other => return Err(Error::type_mismatch(path, &ty.name, other.kind_name())),
        };
        let property = ty
            .discriminator
            .as_deref()
            .unwrap_or_else(|| self.config.type_property_name());
        let named = map
            .get(property)
            .and_then(Value::as_str)
            .filter(|name| *name != ty.name)
            .map(str::to_string);
        match named {
            Some(name) => {
                let types = self.types;
                let subtype = types
                    .lookup(&name)
                    .filter(|desc| desc.shape == Shape::Record)
                    .ok_or_else(|| {
                        Error::class_resolution(format!("unknown type '{}' at {}", name, path))
                    })?;
                self.build_record(map, subtype, property, path)
            }
            None => self.build_record(map, ty, property, path),
        }
    }

    fn build_record(
        &self,
        mut map: ValueMap,
        desc: &TypeDescriptor,
        discriminator: &str,
        path: &str,
    ) -> Result<Value> {
        let mut record = Record::new(desc.name.clone());
        for field in &desc.fields {
            let field_ty = field.ty.resolve(self.types)?;
            let raw = map.remove(&field.name).unwrap_or(Value::Null);
            let child = child_path(path, Some(&field.name));
            record.insert(field.name.clone(), self.cast(raw, field_ty, &child)?);
        }
        for (key, value) in map.iter() {
            if key.as_deref() == Some(discriminator) {
                continue;
            }
            self.unknown(&desc.name, key.as_deref().unwrap_or("null"), value)?;
        }
        Ok(Value::Record(record))
    }

    fn unknown(&self, record: &str, property: &str, value: &Value) -> Result<()> {
        if let Some(handler) = self.on_unknown {
            handler(&UnknownProperty {
                record,
                property,
                value,
            });
        }
        if self.config.strict() {
            return Err(Error::unknown_property(record, property));
        }
        tracing::debug!(record, property, "ignoring unknown property");
        Ok(())
    }
}

fn cast_scalar(value: Value, kind: ScalarKind, path: &str) -> Result<Value> {
    let scalar = match value {
        Value::Scalar(scalar) => scalar,
        other => return Err(Error::type_mismatch(path, kind.as_str(), other.kind_name())),
    };
    match kind {
        ScalarKind::String => Ok(Value::string(scalar.into_text())),
        ScalarKind::Uri => Ok(Value::uri(scalar.into_text())),
        ScalarKind::Number if scalar.kind() == ScalarKind::Number => Ok(Value::Scalar(scalar)),
        ScalarKind::Number => Scalar::number(scalar.text())
            .map(Value::Scalar)
            .ok_or_else(|| mismatch(path, "number", &scalar)),
        ScalarKind::Boolean => match scalar.text() {
            "true" => Ok(Value::from(true)),
            "false" => Ok(Value::from(false)),
            _ => Err(mismatch(path, "boolean", &scalar)),
        },
    }
}

fn check_key(key: &str, key_ty: &TypeDescriptor, path: &str) -> Result<()> {
    let ok = match key_ty.shape {
        Shape::Scalar(ScalarKind::Number) => is_numeric(key),
        Shape::Scalar(ScalarKind::Boolean) => key == "true" || key == "false",
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::type_mismatch(
            path,
            &format!("{} key", key_ty.name),
            &format!("'{}'", key),
        ))
    }
}

fn mismatch(path: &str, expected: &str, found: &Scalar) -> Error {
    Error::type_mismatch(
        path,
        expected,
        &format!("{} '{}'", found.kind().as_str(), found.text()),
    )
}

fn child_path(path: &str, name: Option<&str>) -> String {
    format!("{}.{}", path, name.unwrap_or("null"))
}
