//! UON writer.
//!
//! This module provides the [`Serializer`], which turns a [`Value`] graph into
//! text in either grammar:
//!
//! - **Bracketed**: `(key=value,...)` objects and `@(v1,v2)` sequences
//! - **Form-encoded**: `key=value&key=value` at the top level, bracketed
//!   notation for nested values, percent-encoded token text
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root. Direct
//! use gives control over type metadata and shared graphs:
//!
//! ```rust
//! use serde_uon::{Config, Record, Serializer, TypeRef, Value};
//!
//! let config = Config::default();
//! let person = Value::from(Record::new("Person").with_field("name", "Alice").with_field("age", 30));
//!
//! let ser = Serializer::new(&config);
//! assert_eq!(ser.serialize(&person, &TypeRef::dynamic()).unwrap(), "(name=Alice,age=30)");
//! assert_eq!(ser.serialize_form(&person, &TypeRef::dynamic()).unwrap(), "name=Alice&age=30");
//! ```
//!
//! A `Serializer` holds only borrowed, immutable state. Each call builds its
//! own traversal session, so one serializer can be used from many threads.

use crate::escape::{quote_if_needed, QuoteStyle, Role};
use crate::guard::{CycleGuard, Visit};
use crate::types::{resolve_child, well_known, NO_TYPES};
use crate::uri;
use crate::{
    Arena, Config, Error, FieldDescriptor, NodeId, Record, Result, Scalar, ScalarKind, Shape,
    TypeDescriptor, TypeProvider, TypeRef, Value, ValueMap,
};
use std::borrow::Cow;

static NULL: Value = Value::Null;

/// The UON writer.
///
/// Created with [`Serializer::new`]; type metadata and an [`Arena`] for
/// shared or cyclic graphs are attached with the `with_*` methods.
#[derive(Clone, Copy)]
pub struct Serializer<'a> {
    config: &'a Config,
    types: &'a dyn TypeProvider,
    arena: Option<&'a Arena>,
}

impl<'a> Serializer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Serializer {
            config,
            types: &NO_TYPES,
            arena: None,
        }
    }

    /// Resolves record type names through `types`.
    #[must_use]
    pub fn with_types(mut self, types: &'a dyn TypeProvider) -> Self {
        self.types = types;
        self
    }

    /// Resolves [`Value::Ref`] nodes through `arena`.
    #[must_use]
    pub fn with_arena(mut self, arena: &'a Arena) -> Self {
        self.arena = Some(arena);
        self
    }

    /// Writes `value` in the bracketed grammar.
    pub fn serialize(&self, value: &Value, ty: &TypeRef) -> Result<String> {
        let expected = ty.resolve(self.types)?;
        tracing::debug!(grammar = "bracketed", expected = %expected.name, "serializing value");
        let mut session = Session::new(self, false);
        session.write_value(value, expected, "root", Slot::Root)?;
        Ok(session.out)
    }

    /// Writes `value` in the form-encoded grammar.
    ///
    /// A map or record root becomes `key=value` pairs; anything else is
    /// written as the single pair `_value=<value>`.
    pub fn serialize_form(&self, value: &Value, ty: &TypeRef) -> Result<String> {
        let expected = ty.resolve(self.types)?;
        tracing::debug!(grammar = "form", expected = %expected.name, "serializing value");
        let mut session = Session::new(self, true);
        session.write_form_root(value, expected)?;
        Ok(session.out)
    }
}

/// Where a value sits relative to its parent; decides what "omit" means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Root,
    Field,
    Entry,
    Element,
}

impl Slot {
    fn omittable(self) -> bool {
        matches!(self, Slot::Field | Slot::Entry)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Emit {
    Written,
    Omitted,
}

/// How the entries of a map or record are framed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    Bracketed,
    FormRoot,
}

impl Layout {
    fn separator(self) -> char {
        match self {
            Layout::Bracketed => ',',
            Layout::FormRoot => '&',
        }
    }
}

/// Per-call traversal state.
struct Session<'a> {
    config: &'a Config,
    types: &'a dyn TypeProvider,
    arena: Option<&'a Arena>,
    style: QuoteStyle,
    encode: bool,
    pretty: bool,
    guard: CycleGuard,
    level: usize,
    out: String,
}

impl<'a> Session<'a> {
    fn new(ser: &Serializer<'a>, form: bool) -> Self {
        let config = ser.config;
        Session {
            config,
            types: ser.types,
            arena: ser.arena,
            style: config.quote_style(),
            encode: form || config.encode_chars(),
            pretty: config.pretty() && !form,
            guard: CycleGuard::from_config(config),
            level: 0,
            out: String::with_capacity(256),
        }
    }

    fn write_form_root<'t>(&mut self, value: &'t Value, expected: &'t TypeDescriptor) -> Result<()>
    where
        'a: 't,
    {
        let (value, identity) = self.deref(value)?;
        let runtime = self.runtime_type(value, expected);
        let container = is_container(value);
        if container {
            // The stack is empty, so the root can never be pruned.
            self.guard
                .check("root", type_label(value, runtime), identity)?;
        }
        let surrogate;
        let (value, ty) = match runtime.swap {
            Some(swap) if !value.is_null() => {
                surrogate = swap.forward(value)?;
                tracing::trace!(swap = swap.name(), "applied swap");
                (&surrogate, swap.surrogate_type())
            }
            _ => (value, runtime),
        };
        match value {
            Value::Map(map) => {
                self.write_map(map, ty, Slot::Root, Layout::FormRoot)?;
            }
            Value::Record(record) => {
                self.write_record(record, expected, ty, Layout::FormRoot)?;
            }
            _ => {
                self.out.push_str("_value=");
                self.write_shape(value, expected, ty, Slot::Root)?;
            }
        }
        if container {
            self.guard.pop();
        }
        Ok(())
    }

    fn write_value<'t>(
        &mut self,
        value: &'t Value,
        expected: &'t TypeDescriptor,
        label: &str,
        slot: Slot,
    ) -> Result<Emit>
    where
        'a: 't,
    {
        let (value, identity) = self.deref(value)?;
        let runtime = self.runtime_type(value, expected);
        let container = is_container(value);
        if container {
            if let Visit::Prune = self
                .guard
                .check(label, type_label(value, runtime), identity)?
            {
                return Ok(self.pruned(slot));
            }
        }
        let emitted = match runtime.swap {
            Some(swap) if !value.is_null() => {
                let surrogate = swap.forward(value)?;
                tracing::trace!(swap = swap.name(), label, "applied swap");
                self.write_shape(&surrogate, expected, swap.surrogate_type(), slot)?
            }
            _ => self.write_shape(value, expected, runtime, slot)?,
        };
        if container {
            self.guard.pop();
        }
        Ok(emitted)
    }

    /// A pruned edge disappears from records and maps and becomes `null` elsewhere.
    fn pruned(&mut self, slot: Slot) -> Emit {
        if slot.omittable() {
            Emit::Omitted
        } else {
            self.out.push_str("null");
            Emit::Written
        }
    }

    fn write_shape<'u>(
        &mut self,
        value: &'u Value,
        expected: &'u TypeDescriptor,
        ty: &'u TypeDescriptor,
        slot: Slot,
    ) -> Result<Emit>
    where
        'a: 'u,
    {
        match value {
            Value::Null => {
                if slot == Slot::Field && self.config.trim_nulls() {
                    Ok(Emit::Omitted)
                } else {
                    self.out.push_str("null");
                    Ok(Emit::Written)
                }
            }
            Value::Scalar(scalar) => {
                self.write_scalar(scalar, ty);
                Ok(Emit::Written)
            }
            Value::Sequence(items) => self.write_sequence(items, ty, slot),
            Value::Map(map) => self.write_map(map, ty, slot, Layout::Bracketed),
            Value::Record(record) => self.write_record(record, expected, ty, Layout::Bracketed),
            Value::Ref(id) => Err(Error::custom(format!(
                "swap for '{}' produced arena reference {}",
                ty.name, id
            ))),
        }
    }

    fn write_scalar(&mut self, scalar: &Scalar, ty: &TypeDescriptor) {
        let is_uri = scalar.kind() == ScalarKind::Uri || ty.shape == Shape::Scalar(ScalarKind::Uri);
        let as_string = ty.shape == Shape::Scalar(ScalarKind::String);
        match scalar.kind() {
            ScalarKind::Number | ScalarKind::Boolean if !as_string && !is_uri => {
                if self.encode {
                    self.out.push_str(&urlencoding::encode(scalar.text()));
                } else {
                    self.out.push_str(scalar.text());
                }
            }
            _ => {
                let text = if is_uri {
                    uri::resolve(scalar.text(), self.config.uri())
                } else {
                    Cow::Borrowed(scalar.text())
                };
                let text: &str = if self.config.trim_strings() {
                    text.trim()
                } else {
                    &text
                };
                self.write_text(Some(text), Role::StringValue);
            }
        }
    }

    fn write_text(&mut self, text: Option<&str>, role: Role) {
        let simple = self.config.simple_mode();
        match text {
            Some(text) if self.encode => {
                let encoded = urlencoding::encode(text);
                let token = quote_if_needed(Some(&encoded), role, simple, &self.style);
                self.out.push_str(&token);
            }
            _ => {
                let token = quote_if_needed(text, role, simple, &self.style);
                self.out.push_str(&token);
            }
        }
    }

    fn write_sequence<'u>(
        &mut self,
        items: &'u [Value],
        ty: &'u TypeDescriptor,
        slot: Slot,
    ) -> Result<Emit>
    where
        'a: 'u,
    {
        if items.is_empty() && slot.omittable() && self.config.trim_empty_collections() {
            return Ok(Emit::Omitted);
        }
        let element = match ty.shape {
            Shape::Sequence => resolve_child(ty.element.as_ref(), self.types)?,
            _ => well_known(Shape::Dynamic),
        };
        self.out.push_str("@(");
        self.level += 1;
        let mut count = 0;
        for (i, item) in items.iter().enumerate() {
            if count > 0 {
                self.out.push(',');
            }
            self.newline();
            // Elements are never omitted.
            self.write_value(item, element, &i.to_string(), Slot::Element)?;
            count += 1;
        }
        self.close(count, Layout::Bracketed);
        Ok(Emit::Written)
    }

    fn write_map<'u>(
        &mut self,
        map: &'u ValueMap,
        ty: &'u TypeDescriptor,
        slot: Slot,
        layout: Layout,
    ) -> Result<Emit>
    where
        'a: 'u,
    {
        if map.is_empty() && slot.omittable() && self.config.trim_empty_maps() {
            return Ok(Emit::Omitted);
        }
        let value_ty = match ty.shape {
            Shape::Map => resolve_child(ty.value.as_ref(), self.types)?,
            _ => well_known(Shape::Dynamic),
        };
        let mut entries: Vec<_> = map.iter().collect();
        if self.config.sort_maps() {
            entries.sort_by(|a, b| a.0.cmp(b.0));
        }
        self.open(layout);
        let mut count = 0;
        for (key, value) in entries {
            self.write_entry(key.as_deref(), value, value_ty, Slot::Entry, layout, &mut count)?;
        }
        self.close(count, layout);
        Ok(Emit::Written)
    }

    fn write_record<'u>(
        &mut self,
        record: &'u Record,
        expected: &'u TypeDescriptor,
        ty: &'u TypeDescriptor,
        layout: Layout,
    ) -> Result<Emit>
    where
        'a: 'u,
    {
        let types = self.types;
        let registered = types.lookup(record.type_name());
        let desc: Option<&'u TypeDescriptor> = match registered {
            Some(desc) => Some(desc),
            None if ty.shape == Shape::Record => Some(ty),
            None => None,
        };
        let tagged = self.config.add_type_info()
            || (registered.is_some() && record.type_name() != expected.name);
        let expand_all = layout == Layout::FormRoot
            && (self.config.expanded_params() || desc.map_or(false, |d| d.expanded_params));

        self.open(layout);
        let mut count = 0;
        if tagged {
            let property = desc
                .and_then(|d| d.discriminator.as_deref())
                .unwrap_or_else(|| self.config.type_property_name());
            let property = property.to_string();
            self.begin_entry(count, layout);
            self.write_text(Some(&property), Role::AttributeName);
            self.out.push('=');
            self.write_text(Some(record.type_name()), Role::StringValue);
            count += 1;
        }

        match desc {
            Some(desc) => {
                let mut fields: Vec<&FieldDescriptor> = desc.fields.iter().collect();
                if self.config.sort_properties() {
                    fields.sort_by(|a, b| a.name.cmp(&b.name));
                }
                for field in fields {
                    let field_ty = field.ty.resolve(types)?;
                    let value = record.get(&field.name).unwrap_or(&NULL);
                    if layout == Layout::FormRoot && (expand_all || field.expanded) {
                        self.write_expanded(&field.name, value, field_ty, &mut count)?;
                    } else {
                        self.write_entry(
                            Some(&field.name),
                            value,
                            field_ty,
                            Slot::Field,
                            layout,
                            &mut count,
                        )?;
                    }
                }
            }
            None => {
                let mut fields: Vec<_> = record.fields().collect();
                if self.config.sort_properties() {
                    fields.sort_by(|a, b| a.0.cmp(b.0));
                }
                let dynamic = well_known(Shape::Dynamic);
                for (name, value) in fields {
                    if expand_all {
                        self.write_expanded(name, value, dynamic, &mut count)?;
                    } else {
                        self.write_entry(Some(name), value, dynamic, Slot::Field, layout, &mut count)?;
                    }
                }
            }
        }
        self.close(count, layout);
        Ok(Emit::Written)
    }

    /// Writes a sequence-valued field as one `name=element` pair per element.
    ///
    /// Anything that is not a sequence is written as an ordinary field.
    fn write_expanded<'u>(
        &mut self,
        name: &str,
        value: &'u Value,
        ty: &'u TypeDescriptor,
        count: &mut usize,
    ) -> Result<()>
    where
        'a: 'u,
    {
        let (resolved, identity) = self.deref(value)?;
        let Value::Sequence(items) = resolved else {
            return self.write_entry(Some(name), value, ty, Slot::Field, Layout::FormRoot, count);
        };
        if let Visit::Prune = self.guard.check(name, type_label(resolved, ty), identity)? {
            return Ok(());
        }
        let element = match ty.shape {
            Shape::Sequence => resolve_child(ty.element.as_ref(), self.types)?,
            _ => well_known(Shape::Dynamic),
        };
        for item in items {
            self.write_entry(Some(name), item, element, Slot::Element, Layout::FormRoot, count)?;
        }
        self.guard.pop();
        Ok(())
    }

    /// Writes `key=value`, rolling the output back if the value is omitted.
    fn write_entry<'u>(
        &mut self,
        key: Option<&str>,
        value: &'u Value,
        ty: &'u TypeDescriptor,
        slot: Slot,
        layout: Layout,
        count: &mut usize,
    ) -> Result<()>
    where
        'a: 'u,
    {
        let mark = self.out.len();
        self.begin_entry(*count, layout);
        self.write_text(key, Role::AttributeName);
        self.out.push('=');
        match self.write_value(value, ty, key.unwrap_or("null"), slot)? {
            Emit::Written => *count += 1,
            Emit::Omitted => self.out.truncate(mark),
        }
        Ok(())
    }

    fn begin_entry(&mut self, count: usize, layout: Layout) {
        if count > 0 {
            self.out.push(layout.separator());
        }
        if layout == Layout::Bracketed {
            self.newline();
        }
    }

    fn open(&mut self, layout: Layout) {
        if layout == Layout::Bracketed {
            self.out.push('(');
            self.level += 1;
        }
    }

    fn close(&mut self, count: usize, layout: Layout) {
        if layout == Layout::Bracketed {
            self.level -= 1;
            if count > 0 {
                self.newline();
            }
            self.out.push(')');
        }
    }

    fn newline(&mut self) {
        if self.pretty {
            self.out.push('\n');
            let width = self.level * self.config.indent();
            self.out.extend(std::iter::repeat(' ').take(width));
        }
    }

    /// Follows [`Value::Ref`] links, returning the target and the last identity seen.
    fn deref<'t>(&self, value: &'t Value) -> Result<(&'t Value, Option<NodeId>)>
    where
        'a: 't,
    {
        let mut current = value;
        let mut identity = None;
        let mut hops = 0;
        while let Value::Ref(id) = current {
            let arena = self.arena.ok_or_else(|| {
                Error::custom(format!("reference {} cannot be resolved without an arena", id))
            })?;
            current = arena
                .get(*id)
                .ok_or_else(|| Error::custom(format!("dangling reference {}", id)))?;
            identity = Some(*id);
            hops += 1;
            if hops > arena.len() {
                return Err(Error::custom(format!("reference {} only leads to references", id)));
            }
        }
        Ok((current, identity))
    }

    /// The registered descriptor of a record's own type, else `expected`.
    fn runtime_type<'t>(&self, value: &'t Value, expected: &'t TypeDescriptor) -> &'t TypeDescriptor
    where
        'a: 't,
    {
        let types = self.types;
        match value {
            Value::Record(record) => types.lookup(record.type_name()).unwrap_or(expected),
            _ => expected,
        }
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Sequence(_) | Value::Map(_) | Value::Record(_))
}

fn type_label<'x>(value: &'x Value, ty: &'x TypeDescriptor) -> &'x str {
    match value {
        Value::Record(record) => record.type_name(),
        Value::Sequence(_) if ty.shape == Shape::Sequence => &ty.name,
        Value::Sequence(_) => "Sequence",
        Value::Map(_) if ty.shape == Shape::Map => &ty.name,
        Value::Map(_) => "Map",
        _ => &ty.name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Swap, TypeRegistry, UriContext};

    fn write(value: &Value, config: &Config) -> Result<String> {
        Serializer::new(config).serialize(value, &TypeRef::dynamic())
    }

    fn three_cycle() -> (Arena, NodeId) {
        let mut arena = Arena::new();
        let r1 = arena.reserve();
        let r2 = arena.reserve();
        let r3 = arena.reserve();
        arena.set(r1, Record::new("R1").with_field("name", "foo").with_field("r2", r2).into());
        arena.set(r2, Record::new("R2").with_field("name", "bar").with_field("r3", r3).into());
        arena.set(r3, Record::new("R3").with_field("name", "baz").with_field("r1", r1).into());
        (arena, r1)
    }

    #[test]
    fn test_trim_nulls() {
        let value: Value = Record::new("A")
            .with_field("s1", Value::Null)
            .with_field("s2", "s2")
            .into();
        let untrimmed = Config::builder().with_trim_nulls(false).build();
        assert_eq!(write(&value, &untrimmed).unwrap(), "(s1=null,s2=s2)");
        assert_eq!(write(&value, &Config::default()).unwrap(), "(s2=s2)");
    }

    #[test]
    fn test_map_entries_keep_nulls() {
        let mut map = ValueMap::new();
        map.insert("a", Value::Null);
        map.insert_key(None, Value::from(1));
        assert_eq!(write(&map.into(), &Config::default()).unwrap(), "(a=null,null=1)");
    }

    #[test]
    fn test_trim_empty_collections() {
        let inner: Value = Record::new("B").with_field("s2", "s2").into();
        let value: Value = Record::new("A")
            .with_field("f1", Value::Sequence(vec![]))
            .with_field("f2", vec![Value::Null, inner])
            .into();
        assert_eq!(
            write(&value, &Config::default()).unwrap(),
            "(f1=@(),f2=@(null,(s2=s2)))"
        );
        let trimmed = Config::builder().with_trim_empty_collections(true).build();
        assert_eq!(write(&value, &trimmed).unwrap(), "(f2=@(null,(s2=s2)))");
    }

    #[test]
    fn test_trim_empty_maps() {
        let value: Value = Record::new("A")
            .with_field("m", ValueMap::new())
            .with_field("x", 1)
            .into();
        let trimmed = Config::builder().with_trim_empty_maps(true).build();
        assert_eq!(write(&value, &Config::default()).unwrap(), "(m=(),x=1)");
        assert_eq!(write(&value, &trimmed).unwrap(), "(x=1)");
    }

    #[test]
    fn test_recursion_undetected_hits_depth_bound() {
        let (arena, root) = three_cycle();
        let config = Config::default();
        let err = Serializer::new(&config)
            .with_arena(&arena)
            .serialize(&Value::Ref(root), &TypeRef::dynamic())
            .unwrap_err();
        assert!(err.to_string().contains("detect_recursions"));
    }

    #[test]
    fn test_recursion_detected() {
        let (arena, root) = three_cycle();
        let config = Config::builder().with_detect_recursions(true).build();
        let err = Serializer::new(&config)
            .with_arena(&arena)
            .serialize(&Value::Ref(root), &TypeRef::dynamic())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Recursion detected: [0]root:R1 -> [1]r2:R2 -> [2]r3:R3 -> [3]r1:R1"
        );
    }

    #[test]
    fn test_recursion_ignored() {
        let (arena, root) = three_cycle();
        let config = Config::builder()
            .with_detect_recursions(true)
            .with_ignore_recursions(true)
            .build();
        let text = Serializer::new(&config)
            .with_arena(&arena)
            .serialize(&Value::Ref(root), &TypeRef::dynamic())
            .unwrap();
        assert_eq!(text, "(name=foo,r2=(name=bar,r3=(name=baz)))");
    }

    #[test]
    fn test_pruned_sequence_element_becomes_null() {
        let mut arena = Arena::new();
        let list = arena.reserve();
        arena.set(list, Value::Sequence(vec![Value::from(1), Value::Ref(list)]));
        let config = Config::builder()
            .with_detect_recursions(true)
            .with_ignore_recursions(true)
            .build();
        let text = Serializer::new(&config)
            .with_arena(&arena)
            .serialize(&Value::Ref(list), &TypeRef::dynamic())
            .unwrap();
        assert_eq!(text, "@(1,null)");
    }

    #[test]
    fn test_shared_node_written_twice() {
        let mut arena = Arena::new();
        let leaf = arena.alloc(Record::new("Leaf").with_field("v", 1).into());
        let root = Value::Sequence(vec![Value::Ref(leaf), Value::Ref(leaf)]);
        let config = Config::builder().with_detect_recursions(true).build();
        let text = Serializer::new(&config)
            .with_arena(&arena)
            .serialize(&root, &TypeRef::dynamic())
            .unwrap();
        assert_eq!(text, "@((v=1),(v=1))");
    }

    #[test]
    fn test_uri_resolution() {
        let value: Value = Record::new("L")
            .with_field("f0", Value::uri("f0/x0"))
            .with_field("f3", Value::uri("http://host/f3/x3"))
            .into();
        assert_eq!(
            write(&value, &Config::default()).unwrap(),
            "(f0=f0/x0,f3=http://host/f3/x3)"
        );
        let config = Config::builder()
            .with_uri_context(UriContext::new().with_relative_base("/cr"))
            .build();
        assert_eq!(
            write(&value, &config).unwrap(),
            "(f0=/cr/f0/x0,f3=http://host/f3/x3)"
        );
    }

    #[test]
    fn test_discriminator_for_registered_subtype() {
        let types = TypeRegistry::new().with(
            TypeDescriptor::record("Dog")
                .with_field("name", TypeDescriptor::string())
                .with_field("age", TypeDescriptor::number()),
        );
        let config = Config::default();
        let dog: Value = Record::new("Dog")
            .with_field("age", 3)
            .with_field("name", "Rex")
            .into();
        let ser = Serializer::new(&config).with_types(&types);
        assert_eq!(
            ser.serialize(&dog, &TypeRef::dynamic()).unwrap(),
            "(_type=Dog,name=Rex,age=3)"
        );
        assert_eq!(
            ser.serialize(&dog, &TypeRef::named("Dog")).unwrap(),
            "(name=Rex,age=3)"
        );
    }

    #[test]
    fn test_add_type_info_with_custom_property() {
        let config = Config::builder()
            .with_add_type_info(true)
            .with_type_property_name("t")
            .build();
        let value: Value = Record::new("Point").with_field("x", 1).into();
        assert_eq!(write(&value, &config).unwrap(), "(t=Point,x=1)");
    }

    #[test]
    fn test_string_typed_number_is_quoted() {
        let config = Config::default();
        let ty = TypeRef::from(TypeDescriptor::string());
        let text = Serializer::new(&config).serialize(&Value::from(42), &ty).unwrap();
        assert_eq!(text, "'42'");
    }

    #[test]
    fn test_swap_forward_applied() {
        let config = Config::default();
        let ty = TypeRef::from(TypeDescriptor::string().with_swap(Swap::EpochMillis));
        let text = Serializer::new(&config)
            .serialize(&Value::from("1970-01-01T00:00:01Z"), &ty)
            .unwrap();
        assert_eq!(text, "1000");
    }

    #[test]
    fn test_sorting() {
        let mut map = ValueMap::new();
        map.insert("b", Value::from(2));
        map.insert("a", Value::from(1));
        let value: Value = Record::new("R")
            .with_field("z", map)
            .with_field("y", true)
            .into();
        let config = Config::builder()
            .with_sort_properties(true)
            .with_sort_maps(true)
            .build();
        assert_eq!(write(&value, &config).unwrap(), "(y=true,z=(a=1,b=2))");
    }

    #[test]
    fn test_pretty() {
        let value: Value = Record::new("R")
            .with_field("a", 1)
            .with_field("b", vec![Value::from(1), Value::from(2)])
            .with_field("c", Value::Sequence(vec![]))
            .into();
        let config = Config::builder().with_pretty(true).build();
        assert_eq!(
            write(&value, &config).unwrap(),
            "(\n  a=1,\n  b=@(\n    1,\n    2\n  ),\n  c=@()\n)"
        );
    }

    #[test]
    fn test_non_simple_mode() {
        let value: Value = Record::new("R").with_field("a", "b").with_field("n", 1).into();
        let config = Config::builder().with_simple_mode(false).build();
        assert_eq!(write(&value, &config).unwrap(), "('a'='b','n'=1)");
    }

    #[test]
    fn test_form_root_pairs_and_encoding() {
        let config = Config::default();
        let value: Value = Record::new("Q")
            .with_field("q", "a b&c")
            .with_field("n", -1.5)
            .with_field("tags", vec![Value::from("x"), Value::from("y")])
            .into();
        let text = Serializer::new(&config)
            .serialize_form(&value, &TypeRef::dynamic())
            .unwrap();
        assert_eq!(text, "q=a%20b%26c&n=-1.5&tags=@(x,y)");
    }

    #[test]
    fn test_form_scalar_root_is_wrapped() {
        let config = Config::default();
        let ser = Serializer::new(&config);
        assert_eq!(
            ser.serialize_form(&Value::from("hello"), &TypeRef::dynamic()).unwrap(),
            "_value=hello"
        );
        assert_eq!(
            ser.serialize_form(&Value::Sequence(vec![1.into(), 2.into()]), &TypeRef::dynamic())
                .unwrap(),
            "_value=@(1,2)"
        );
    }

    #[test]
    fn test_form_expanded_params() {
        let types = TypeRegistry::new().with(
            TypeDescriptor::record("Search")
                .with_field_descriptor(
                    FieldDescriptor::new(
                        "tag",
                        TypeDescriptor::sequence(TypeDescriptor::string()),
                    )
                    .expanded(),
                )
                .with_field("page", TypeDescriptor::number()),
        );
        let config = Config::default();
        let value: Value = Record::new("Search")
            .with_field("tag", vec![Value::from("a"), Value::from("b")])
            .with_field("page", 2)
            .into();
        let text = Serializer::new(&config)
            .with_types(&types)
            .serialize_form(&value, &TypeRef::named("Search"))
            .unwrap();
        assert_eq!(text, "tag=a&tag=b&page=2");
    }

    #[test]
    fn test_ref_without_arena_is_an_error() {
        let mut arena = Arena::new();
        let id = arena.alloc(Value::Null);
        assert!(write(&Value::Ref(id), &Config::default()).is_err());
    }
}
