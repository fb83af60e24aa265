//! UON parsing.
//!
//! This module provides the [`Parser`], which reads either grammar back into
//! a [`Value`]:
//!
//! - **Bracketed**: `(key=value,...)` objects, `@(v1,v2)` sequences
//! - **Form-encoded**: `[?]key=value&key=value`, with `+` and percent escapes
//!   decoded in token text
//!
//! Parsing happens in two passes. The character reader builds a generic tree
//! of maps, sequences and inferred scalars; that tree is then cast against the
//! expected [`TypeDescriptor`], which is where records are built, swaps are
//! reversed and discriminators are resolved.
//!
//! ## Usage
//!
//! ```rust
//! use serde_uon::{Config, Parser, TypeRef, Value};
//!
//! let config = Config::default();
//! let parser = Parser::new(&config);
//!
//! let value = parser.parse("(name=Alice,tags=@(a,b))", &TypeRef::dynamic()).unwrap();
//! let map = value.as_map().unwrap();
//! assert_eq!(map.get("name").and_then(Value::as_str), Some("Alice"));
//!
//! let form = parser.parse_form("?a=1&a=2", &TypeRef::dynamic()).unwrap();
//! assert_eq!(form.as_map().unwrap().get("a").and_then(Value::as_sequence).map(Vec::len), Some(2));
//! ```
//!
//! ## Errors
//!
//! Input that ends inside an object body fails with one of four distinct
//! [`LexErrorKind`]s, depending on what the parser was looking for:
//!
//! ```rust
//! use serde_uon::{Config, LexErrorKind, Parser, TypeRef};
//!
//! let config = Config::default();
//! let parser = Parser::new(&config);
//! let kind = |s: &str| parser.parse(s, &TypeRef::dynamic()).unwrap_err().lex_kind();
//!
//! assert_eq!(kind("("), Some(LexErrorKind::MissingAttributeName));
//! assert_eq!(kind("(a"), Some(LexErrorKind::MissingEquals));
//! assert_eq!(kind("(a="), Some(LexErrorKind::DanglingEquals));
//! assert_eq!(kind("(a=1"), Some(LexErrorKind::MissingClosingDelimiter));
//! ```

use crate::convert::Caster;
use crate::escape::unescape;
use crate::types::NO_TYPES;
use crate::value::is_numeric;
use crate::{
    Config, Error, LexErrorKind, Result, Scalar, ScalarKind, TypeProvider, TypeRef, Value, ValueMap,
};
use std::collections::HashSet;

/// A record property with no matching field, reported while parsing.
#[derive(Debug, Clone, Copy)]
pub struct UnknownProperty<'a> {
    pub record: &'a str,
    pub property: &'a str,
    pub value: &'a Value,
}

/// The UON parser.
///
/// Created with [`Parser::new`]; type metadata and an unknown-property
/// callback are attached with the `with_*` methods. Like the
/// [`Serializer`](crate::Serializer), a parser holds no per-call state.
#[derive(Clone, Copy)]
pub struct Parser<'a> {
    config: &'a Config,
    types: &'a dyn TypeProvider,
    on_unknown: Option<&'a dyn Fn(&UnknownProperty<'_>)>,
}

impl<'a> Parser<'a> {
    pub fn new(config: &'a Config) -> Self {
        Parser {
            config,
            types: &NO_TYPES,
            on_unknown: None,
        }
    }

    #[must_use]
    pub fn with_types(mut self, types: &'a dyn TypeProvider) -> Self {
        self.types = types;
        self
    }

    /// Called for each property a record type does not declare.
    ///
    /// In strict mode the handler still runs, and the parse then fails.
    #[must_use]
    pub fn with_unknown_property_handler(
        mut self,
        handler: &'a dyn Fn(&UnknownProperty<'_>),
    ) -> Self {
        self.on_unknown = Some(handler);
        self
    }

    /// Parses bracketed text as `ty`.
    ///
    /// Empty input parses as `null`.
    pub fn parse(&self, text: &str, ty: &TypeRef) -> Result<Value> {
        let expected = ty.resolve(self.types)?;
        tracing::debug!(grammar = "bracketed", expected = %expected.name, len = text.len(), "parsing value");
        let mut reader = Reader::new(text, self.config, self.config.encode_chars());
        let generic = reader.parse_root()?;
        self.caster().cast(generic, expected, "root")
    }

    /// Parses form-encoded text as `ty`.
    pub fn parse_form(&self, text: &str, ty: &TypeRef) -> Result<Value> {
        let expected = ty.resolve(self.types)?;
        tracing::debug!(grammar = "form", expected = %expected.name, len = text.len(), "parsing value");
        let mut reader = Reader::new(text, self.config, true);
        let generic = reader.parse_form()?;
        self.caster().cast(generic, expected, "root")
    }

    fn caster(&self) -> Caster<'a> {
        Caster::new(self.config, self.types, self.on_unknown)
    }
}

/// Where a value token sits, which decides what ends a bare token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Context {
    /// Inside `(...)` / `@(...)`, or at the root of bracketed text.
    Nested,
    /// A top-level form value, ended only by `&`.
    FormTop,
}

impl Context {
    #[inline]
    fn ends_token(self, c: char) -> bool {
        match self {
            Context::Nested => c == ',' || c == ')',
            Context::FormTop => c == '&',
        }
    }
}

/// Collects object entries, promoting repeated keys to sequences.
#[derive(Default)]
struct Entries {
    map: ValueMap,
    promoted: HashSet<Option<String>>,
}

impl Entries {
    fn insert(&mut self, key: Option<String>, value: Value) {
        match self.map.get_key_mut(&key) {
            Some(existing) => {
                if self.promoted.contains(&key) {
                    if let Value::Sequence(items) = existing {
                        items.push(value);
                    }
                } else {
                    let first = std::mem::take(existing);
                    *existing = Value::Sequence(vec![first, value]);
                    self.promoted.insert(key);
                }
            }
            None => {
                self.map.insert_key(key, value);
            }
        }
    }

    fn finish(self) -> Value {
        Value::Map(self.map)
    }
}

/// Character reader producing the generic tree.
struct Reader<'de> {
    input: &'de str,
    position: usize,
    line: usize,
    column: usize,
    decode: bool,
    trim_strings: bool,
    max_depth: usize,
    depth: usize,
}

impl<'de> Reader<'de> {
    fn new(input: &'de str, config: &Config, decode: bool) -> Self {
        Reader {
            input,
            position: 0,
            line: 1,
            column: 1,
            decode,
            trim_strings: config.trim_strings(),
            max_depth: config.max_depth(),
            depth: 0,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.position..].chars().nth(1)
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.input[self.position..].chars().next()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn lex(&self, kind: LexErrorKind) -> Error {
        Error::lex(self.line, self.column, kind)
    }

    fn syntax(&self, msg: &str) -> Error {
        Error::syntax(self.line, self.column, msg)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.syntax(&format!("nesting deeper than max_depth {}", self.max_depth)));
        }
        Ok(())
    }

    fn parse_root(&mut self) -> Result<Value> {
        self.skip_whitespace();
        if self.peek_char().is_none() {
            return Ok(Value::Null);
        }
        let value = self.parse_value(Context::Nested)?;
        self.skip_whitespace();
        if let Some(c) = self.peek_char() {
            return Err(self.syntax(&format!("unexpected trailing character '{}'", c)));
        }
        Ok(value)
    }

    fn parse_form(&mut self) -> Result<Value> {
        if self.peek_char() == Some('?') {
            self.next_char();
        }
        let mut entries = Entries::default();
        while let Some(c) = self.peek_char() {
            if c == '&' {
                self.next_char();
                continue;
            }
            let key = self.parse_key(Context::FormTop)?;
            let value = if self.peek_char() == Some('=') {
                self.next_char();
                match self.peek_char() {
                    None | Some('&') => self.string_value(String::new()),
                    Some(_) => self.parse_value(Context::FormTop)?,
                }
            } else {
                Value::Null
            };
            entries.insert(key, value);
            match self.peek_char() {
                None => break,
                Some('&') => {
                    self.next_char();
                }
                Some(c) => {
                    return Err(self.syntax(&format!("expected '&' between parameters, found '{}'", c)))
                }
            }
        }
        Ok(entries.finish())
    }

    fn parse_value(&mut self, ctx: Context) -> Result<Value> {
        match self.peek_char() {
            Some('(') => self.parse_object(),
            Some('@') if self.peek_second() == Some('(') => self.parse_sequence(),
            Some(q @ ('\'' | '"')) => {
                let text = self.read_quoted(q)?;
                let text = self.decode_text(text);
                Ok(self.string_value(text))
            }
            _ => {
                let raw = self.read_bare(|c| ctx.ends_token(c));
                Ok(self.bare_value(raw))
            }
        }
    }

    /// `(` S1 key S2 `=` S3 value S4 (`,` | `)`)
    fn parse_object(&mut self) -> Result<Value> {
        self.next_char();
        self.enter()?;
        let mut entries = Entries::default();
        loop {
            self.skip_whitespace();
            match self.peek_char() {
                None => return Err(self.lex(LexErrorKind::MissingAttributeName)),
                Some(')') => {
                    self.next_char();
                    break;
                }
                Some(_) => {}
            }
            let key = self.parse_key(Context::Nested)?;

            self.skip_whitespace();
            match self.peek_char() {
                None => return Err(self.lex(LexErrorKind::MissingEquals)),
                Some('=') => {
                    self.next_char();
                }
                Some(c) => {
                    return Err(self.syntax(&format!(
                        "expected '=' after attribute name, found '{}'",
                        c
                    )))
                }
            }

            self.skip_whitespace();
            let value = match self.peek_char() {
                None => return Err(self.lex(LexErrorKind::DanglingEquals)),
                Some(',') | Some(')') => self.string_value(String::new()),
                Some(_) => self.parse_value(Context::Nested)?,
            };
            entries.insert(key, value);

            self.skip_whitespace();
            match self.next_char() {
                None => return Err(self.lex(LexErrorKind::MissingClosingDelimiter)),
                Some(',') => continue,
                Some(')') => break,
                Some(c) => {
                    return Err(self.syntax(&format!("expected ',' or ')', found '{}'", c)))
                }
            }
        }
        self.depth -= 1;
        Ok(entries.finish())
    }

    fn parse_sequence(&mut self) -> Result<Value> {
        self.next_char();
        self.next_char();
        self.enter()?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek_char() {
                None => return Err(self.lex(LexErrorKind::MissingClosingDelimiter)),
                Some(')') => {
                    self.next_char();
                    break;
                }
                Some(',') => items.push(self.string_value(String::new())),
                Some(_) => items.push(self.parse_value(Context::Nested)?),
            }

            self.skip_whitespace();
            match self.next_char() {
                None => return Err(self.lex(LexErrorKind::MissingClosingDelimiter)),
                Some(',') => continue,
                Some(')') => break,
                Some(c) => {
                    return Err(self.syntax(&format!("expected ',' or ')', found '{}'", c)))
                }
            }
        }
        self.depth -= 1;
        Ok(Value::Sequence(items))
    }

    /// A bare `null` is the null key; a quoted one is the string.
    fn parse_key(&mut self, ctx: Context) -> Result<Option<String>> {
        match self.peek_char() {
            Some(q @ ('\'' | '"')) => {
                let text = self.read_quoted(q)?;
                Ok(Some(self.decode_text(text)))
            }
            _ => {
                let raw = self.read_bare(|c| c == '=' || ctx.ends_token(c));
                let text = self.decode_text(raw);
                Ok((text != "null").then_some(text))
            }
        }
    }

    fn read_quoted(&mut self, quote: char) -> Result<String> {
        let (line, col) = (self.line, self.column);
        self.next_char();
        let mut out = String::new();
        loop {
            match self.next_char() {
                None => return Err(Error::syntax(line, col, "unterminated quoted string")),
                Some('\\') => match self.next_char() {
                    Some('u') => out.push(self.read_unicode_escape()?),
                    Some(c) => out.push(unescape(c)),
                    None => return Err(Error::syntax(line, col, "unterminated quoted string")),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    fn read_unicode_escape(&mut self) -> Result<char> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .next_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| {
                    self.syntax("Invalid unicode escape sequence (expected 4 hex digits)")
                })?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.syntax("Invalid unicode code point"))
    }

    /// Reads up to (not including) a stop character. A backslash takes the
    /// next character literally.
    fn read_bare(&mut self, stop: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            if stop(c) {
                break;
            }
            self.next_char();
            if c == '\\' {
                match self.next_char() {
                    Some(escaped) => out.push(unescape(escaped)),
                    None => out.push('\\'),
                }
            } else {
                out.push(c);
            }
        }
        let len = out.trim_end().len();
        out.truncate(len);
        out
    }

    fn bare_value(&self, raw: String) -> Value {
        let text = self.decode_text(raw);
        match text.as_str() {
            "null" => return Value::Null,
            "true" => return Value::from(true),
            "false" => return Value::from(false),
            _ => {}
        }
        if is_numeric(&text) {
            Value::Scalar(Scalar::new(text, ScalarKind::Number))
        } else {
            self.string_value(text)
        }
    }

    fn string_value(&self, text: String) -> Value {
        if self.trim_strings {
            Value::string(text.trim())
        } else {
            Value::string(text)
        }
    }

    /// `+` is a space and `%XX` a byte; malformed escapes are kept as written.
    fn decode_text(&self, text: String) -> String {
        if !self.decode {
            return text;
        }
        let spaced = text.replace('+', " ");
        match urlencoding::decode(&spaced) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => spaced,
        }
    }
}
