//! # serde_uon
//!
//! A codec for UON (URL-Encoded Object Notation), with a Serde bridge.
//!
//! ## What is UON?
//!
//! UON is a textual notation for object graphs that stays readable inside a
//! URL. It comes in two grammars:
//!
//! - **Bracketed**: `(key=value,key2=@(v1,v2))`, usable as a single query
//!   parameter or path segment
//! - **Form-encoded**: `key=value&key2=@(v1,v2)`, the top level of a query
//!   string or an `application/x-www-form-urlencoded` body
//!
//! Strings that could be mistaken for something else are quoted (`'...'`),
//! numbers and booleans are bare, and `null` is a literal.
//!
//! ## Key Features
//!
//! - **Serde Compatible**: Works with existing Rust types via `#[derive(Serialize, Deserialize)]`
//! - **Typed Values**: A [`Value`] model with named [`Record`]s, ordered maps and URI scalars
//! - **Type Metadata**: [`TypeDescriptor`]s drive record layout, discriminators and [`Swap`]s
//! - **Graph Aware**: Shared and cyclic structures through an [`Arena`], with a configurable cycle guard
//! - **No Unsafe Code**: Written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_uon = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Basic Serialization and Deserialization
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_uon::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     tags: Vec<String>,
//! }
//!
//! let user = User {
//!     id: 123,
//!     name: "Alice Smith".to_string(),
//!     tags: vec!["admin".to_string(), "it's".to_string()],
//! };
//!
//! let uon = to_string(&user).unwrap();
//! assert_eq!(uon, r"(id=123,name='Alice Smith',tags=@(admin,'it\'s'))");
//!
//! let back: User = from_str(&uon).unwrap();
//! assert_eq!(user, back);
//! ```
//!
//! ### Query Strings
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_uon::{from_form_str, to_form_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Search {
//!     q: String,
//!     page: u32,
//! }
//!
//! let search = Search { q: "rust & serde".to_string(), page: 2 };
//! let query = to_form_string(&search).unwrap();
//! assert_eq!(query, "q=rust%20%26%20serde&page=2");
//!
//! let back: Search = from_form_str(&query).unwrap();
//! assert_eq!(search, back);
//! ```
//!
//! ### Typed Graphs
//!
//! When the shape of the data matters more than a Rust type, build a
//! [`Value`] and write it with a [`Serializer`]:
//!
//! ```rust
//! use serde_uon::{Arena, Config, Record, Serializer, TypeRef, Value};
//!
//! let mut arena = Arena::new();
//! let root = arena.reserve();
//! arena.set(root, Record::new("Node").with_field("name", "a").with_field("next", Value::Ref(root)).into());
//!
//! let config = Config::builder()
//!     .with_detect_recursions(true)
//!     .with_ignore_recursions(true)
//!     .build();
//! let out = Serializer::new(&config)
//!     .with_arena(&arena)
//!     .serialize(&Value::Ref(root), &TypeRef::dynamic())
//!     .unwrap();
//! assert_eq!(out, "(name=a)");
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Recursion is bounded on both the write and the read side
//! - Proper error propagation with `Result` types

pub mod escape;
pub mod guard;
pub mod uri;

mod convert;
mod de;
mod error;
mod from_value;
mod macros;
mod map;
mod options;
mod ser;
mod swap;
mod to_value;
mod types;
mod value;

pub use de::{Parser, UnknownProperty};
pub use error::{Error, LexErrorKind, Result};
pub use map::ValueMap;
pub use options::{Config, ConfigBuilder, QuoteChar, UriContext};
pub use ser::Serializer;
pub use swap::{CustomSwap, Swap};
pub use types::{
    FieldDescriptor, NoTypes, Shape, TypeDescriptor, TypeProvider, TypeRef, TypeRegistry,
};
pub use value::{Arena, NodeId, Record, Scalar, ScalarKind, Value};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Serialize any `T: Serialize` to a bracketed UON string.
///
/// # Examples
///
/// ```rust
/// use serde_uon::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "(x=1,y=2)");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_config(value, &Config::default())
}

/// Serialize any `T: Serialize` to a pretty-printed UON string.
///
/// Pretty-printing puts each entry of a non-empty container on its own
/// indented line. The output parses back to the same value.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_config(value, &Config::builder().with_pretty(true).build())
}

/// Serialize any `T: Serialize` to a bracketed UON string with custom settings.
///
/// # Examples
///
/// ```rust
/// use serde_uon::{to_string_with_config, Config};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: Option<i32> }
///
/// let config = Config::builder().with_trim_nulls(false).build();
/// let uon = to_string_with_config(&Point { x: 1, y: None }, &config).unwrap();
/// assert_eq!(uon, "(x=1,y=null)");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_config<T>(value: &T, config: &Config) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let value = to_value(value)?;
    Serializer::new(config).serialize(&value, &TypeRef::dynamic())
}

/// Serialize any `T: Serialize` to form-encoded UON (`k=v&k=v`).
///
/// A value that is not a struct or map is written as `_value=<token>`.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_form_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let value = to_value(value)?;
    Serializer::new(&Config::default()).serialize_form(&value, &TypeRef::dynamic())
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_uon::to_value;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.as_record().map(|r| r.type_name()), Some("Point"));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be represented, for example a map
/// whose keys are sequences.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    to_value::to_value(value)
}

/// Convert a [`Value`] into any `T: DeserializeOwned`.
///
/// # Errors
///
/// Returns an error if the value does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value::from_value(value)
}

/// Serialize any `T: Serialize` to a writer as bracketed UON.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let uon = to_string(value)?;
    writer
        .write_all(uon.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of type `T` from bracketed UON text.
///
/// # Examples
///
/// ```rust
/// use serde_uon::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("(x=1,y=2)").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid UON or cannot be deserialized to
/// type `T`. Lexical and syntax errors include line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = Parser::new(&Config::default()).parse(s, &TypeRef::dynamic())?;
    from_value(value)
}

/// Deserialize an instance of type `T` from form-encoded UON.
///
/// # Examples
///
/// ```rust
/// use serde_uon::from_form_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Query { ids: Vec<u32>, name: String }
///
/// let query: Query = from_form_str("?ids=1&ids=2&name=a+b").unwrap();
/// assert_eq!(query, Query { ids: vec![1, 2], name: "a b".to_string() });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid UON or cannot be deserialized to
/// type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_form_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = Parser::new(&Config::default()).parse_form(s, &TypeRef::dynamic())?;
    from_value(value)
}

/// Deserialize an instance of type `T` from an I/O stream of bracketed UON.
///
/// # Errors
///
/// Returns an error if reading from the reader fails, the input is not valid
/// UON, or the data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of bracketed UON.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid UON, or
/// cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}
