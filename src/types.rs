//! Type descriptors: the metadata the codec consumes instead of reflection.
//!
//! The serializer and parser never look inside concrete record layouts on
//! their own. Everything they need to know about a type (its shape, its
//! fields in order, element/key/value types, an optional [`Swap`], the name of
//! its discriminator property) comes from a [`TypeDescriptor`], and named
//! record types are resolved through a [`TypeProvider`].
//!
//! ## Examples
//!
//! ```rust
//! use serde_uon::{FieldDescriptor, TypeDescriptor, TypeRef, TypeRegistry};
//!
//! let mut types = TypeRegistry::new();
//! types.register(
//!     TypeDescriptor::record("Node")
//!         .with_field("name", TypeDescriptor::string())
//!         .with_field("next", TypeRef::named("Node")),
//! );
//! assert!(types.get("Node").is_some());
//! ```

use crate::{Error, Result, ScalarKind, Swap};
use indexmap::IndexMap;
use std::sync::{Arc, OnceLock};

/// How a type is laid out on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar(ScalarKind),
    Sequence,
    Map,
    Record,
    /// Not known until parse time; inferred from the token stream.
    Dynamic,
}

/// A reference to a type: inline, or by name through a [`TypeProvider`].
///
/// Named references make recursive record types expressible.
#[derive(Clone, Debug)]
pub enum TypeRef {
    Named(String),
    Inline(Arc<TypeDescriptor>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    #[must_use]
    pub fn dynamic() -> Self {
        TypeRef::Inline(Arc::new(TypeDescriptor::dynamic()))
    }

    /// Resolves to a descriptor, looking named types up in `types`.
    pub fn resolve<'a>(&'a self, types: &'a dyn TypeProvider) -> Result<&'a TypeDescriptor> {
        match self {
            TypeRef::Inline(desc) => Ok(desc),
            TypeRef::Named(name) => types
                .lookup(name)
                .ok_or_else(|| Error::class_resolution(format!("unknown type '{}'", name))),
        }
    }
}

impl From<TypeDescriptor> for TypeRef {
    fn from(desc: TypeDescriptor) -> Self {
        TypeRef::Inline(Arc::new(desc))
    }
}

/// One declared property of a record type.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeRef,
    /// In the form-encoded grammar, write a sequence value as repeated `name=v` pairs.
    pub expanded: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        FieldDescriptor {
            name: name.into(),
            ty: ty.into(),
            expanded: false,
        }
    }

    #[must_use]
    pub fn expanded(mut self) -> Self {
        self.expanded = true;
        self
    }
}

/// Metadata for one type.
///
/// # Examples
///
/// ```rust
/// use serde_uon::{Shape, TypeDescriptor};
///
/// let tags = TypeDescriptor::sequence(TypeDescriptor::string());
/// assert_eq!(tags.shape, Shape::Sequence);
///
/// let person = TypeDescriptor::record("Person")
///     .with_field("name", TypeDescriptor::string())
///     .with_field("tags", tags);
/// assert_eq!(person.field("tags").map(|f| f.name.as_str()), Some("tags"));
/// ```
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    pub name: String,
    pub shape: Shape,
    pub fields: Vec<FieldDescriptor>,
    pub element: Option<TypeRef>,
    pub key: Option<TypeRef>,
    pub value: Option<TypeRef>,
    pub swap: Option<Swap>,
    /// Overrides the configured type property name for this type.
    pub discriminator: Option<String>,
    /// Every sequence-valued field of this record is written expanded.
    pub expanded_params: bool,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        TypeDescriptor {
            name: name.into(),
            shape,
            fields: Vec::new(),
            element: None,
            key: None,
            value: None,
            swap: None,
            discriminator: None,
            expanded_params: false,
        }
    }

    #[must_use]
    pub fn dynamic() -> Self {
        Self::new("Object", Shape::Dynamic)
    }

    #[must_use]
    pub fn scalar(kind: ScalarKind) -> Self {
        let name = match kind {
            ScalarKind::String => "String",
            ScalarKind::Number => "Number",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Uri => "URI",
        };
        Self::new(name, Shape::Scalar(kind))
    }

    #[must_use]
    pub fn string() -> Self {
        Self::scalar(ScalarKind::String)
    }

    #[must_use]
    pub fn number() -> Self {
        Self::scalar(ScalarKind::Number)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::scalar(ScalarKind::Boolean)
    }

    #[must_use]
    pub fn uri() -> Self {
        Self::scalar(ScalarKind::Uri)
    }

    pub fn sequence(element: impl Into<TypeRef>) -> Self {
        let mut desc = Self::new("Sequence", Shape::Sequence);
        desc.element = Some(element.into());
        desc
    }

    pub fn map(key: impl Into<TypeRef>, value: impl Into<TypeRef>) -> Self {
        let mut desc = Self::new("Map", Shape::Map);
        desc.key = Some(key.into());
        desc.value = Some(value.into());
        desc
    }

    pub fn record(name: impl Into<String>) -> Self {
        Self::new(name, Shape::Record)
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.fields.push(FieldDescriptor::new(name, ty));
        self
    }

    #[must_use]
    pub fn with_field_descriptor(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_swap(mut self, swap: Swap) -> Self {
        self.swap = Some(swap);
        self
    }

    #[must_use]
    pub fn with_discriminator(mut self, name: impl Into<String>) -> Self {
        self.discriminator = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_expanded_params(mut self) -> Self {
        self.expanded_params = true;
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[inline]
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.shape == Shape::Dynamic
    }
}

/// Shared descriptors for the shapes that need no configuration.
///
/// Used for untyped children (`element`, `key`, `value` left unset) and for
/// swap surrogates.
pub(crate) fn well_known(shape: Shape) -> &'static TypeDescriptor {
    static DESCRIPTORS: OnceLock<Vec<TypeDescriptor>> = OnceLock::new();
    let all = DESCRIPTORS.get_or_init(|| {
        vec![
            TypeDescriptor::dynamic(),
            TypeDescriptor::string(),
            TypeDescriptor::number(),
            TypeDescriptor::boolean(),
            TypeDescriptor::uri(),
            TypeDescriptor::new("Sequence", Shape::Sequence),
            TypeDescriptor::new("Map", Shape::Map),
            TypeDescriptor::new("Record", Shape::Record),
        ]
    });
    let index = match shape {
        Shape::Dynamic => 0,
        Shape::Scalar(ScalarKind::String) => 1,
        Shape::Scalar(ScalarKind::Number) => 2,
        Shape::Scalar(ScalarKind::Boolean) => 3,
        Shape::Scalar(ScalarKind::Uri) => 4,
        Shape::Sequence => 5,
        Shape::Map => 6,
        Shape::Record => 7,
    };
    &all[index]
}

/// Resolves an optional child type, defaulting to `Dynamic`.
pub(crate) fn resolve_child<'a>(
    child: Option<&'a TypeRef>,
    types: &'a dyn TypeProvider,
) -> Result<&'a TypeDescriptor> {
    match child {
        Some(ty) => ty.resolve(types),
        None => Ok(well_known(Shape::Dynamic)),
    }
}

/// Looks up record descriptors by name.
///
/// This is the seam where a host plugs in its own metadata facility.
pub trait TypeProvider {
    fn lookup(&self, name: &str) -> Option<&TypeDescriptor>;
}

/// A provider that knows no types.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTypes;

impl TypeProvider for NoTypes {
    fn lookup(&self, _name: &str) -> Option<&TypeDescriptor> {
        None
    }
}

pub(crate) static NO_TYPES: NoTypes = NoTypes;

/// The stock [`TypeProvider`]: descriptors keyed by name, in registration order.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under its own name, replacing any previous one.
    pub fn register(&mut self, desc: TypeDescriptor) -> &mut Self {
        self.types.insert(desc.name.clone(), desc);
        self
    }

    #[must_use]
    pub fn with(mut self, desc: TypeDescriptor) -> Self {
        self.register(desc);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeProvider for TypeRegistry {
    fn lookup(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }
}
