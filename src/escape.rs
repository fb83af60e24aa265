//! Escaping and quoting of keys and string values.
//!
//! Quoting is a pure function of the raw text: it never looks at how the
//! text was written before, so re-serializing a parsed string produces the
//! same token again.
//!
//! ```rust
//! use serde_uon::escape::{quote_if_needed, QuoteStyle, Role};
//!
//! let style = QuoteStyle::default();
//! assert_eq!(quote_if_needed(Some("name"), Role::AttributeName, true, &style), "name");
//! assert_eq!(quote_if_needed(Some("class"), Role::AttributeName, true, &style), "'class'");
//! assert_eq!(quote_if_needed(None, Role::AttributeName, true, &style), "null");
//! assert_eq!(quote_if_needed(Some("a b"), Role::StringValue, true, &style), "'a b'");
//! assert_eq!(quote_if_needed(Some("it's"), Role::StringValue, true, &style), "'it\\'s'");
//! ```

use crate::value::is_numeric;
use std::borrow::Cow;

/// What a piece of text is being written as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    AttributeName,
    StringValue,
}

/// Quote character and optional escapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuoteStyle {
    pub quote: char,
    pub escape_solidus: bool,
}

impl Default for QuoteStyle {
    fn default() -> Self {
        QuoteStyle {
            quote: '\'',
            escape_solidus: false,
        }
    }
}

/// Keywords that are always quoted when used as keys, matched case-sensitively.
const RESERVED_WORDS: &[&str] = &[
    "arguments",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

#[inline]
pub(crate) fn is_reserved_word(s: &str) -> bool {
    RESERVED_WORDS.binary_search(&s).is_ok()
}

#[inline]
fn is_valid_first_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[inline]
fn is_valid_subsequent_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn needs_trim(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace)
}

/// Characters that carry meaning somewhere in either grammar.
#[inline]
fn is_structural(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | ',' | '=' | '\'' | '"' | '\\' | '&' | '?' | '#' | '~'
    )
}

fn is_bare_attribute(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if is_valid_first_char(first) => {}
        _ => return false,
    }
    !is_reserved_word(s) && chars.all(is_valid_subsequent_char)
}

/// A string value can go out bare if reading it back yields the same string.
fn is_bare_value(s: &str) -> bool {
    !s.is_empty()
        && !needs_trim(s)
        && !s.starts_with('@')
        && s != "null"
        && s != "true"
        && s != "false"
        && !is_numeric(s)
        && !s
            .chars()
            .any(|c| is_structural(c) || c.is_whitespace() || c.is_control())
}

#[inline]
fn needs_escape(c: char, style: &QuoteStyle) -> bool {
    matches!(c, '\n' | '\t' | '\u{0008}' | '\u{000C}' | '\r' | '\\')
        || c == style.quote
        || (c == '/' && style.escape_solidus)
}

/// Writes `text` between quote characters, escaping as needed.
///
/// Carriage returns are dropped, never escaped.
pub fn write_quoted(out: &mut String, text: &str, style: &QuoteStyle) {
    out.push(style.quote);
    if !text.chars().any(|c| needs_escape(c, style)) {
        out.push_str(text);
    } else {
        for ch in text.chars() {
            match ch {
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\u{0008}' => out.push_str("\\b"),
                '\u{000C}' => out.push_str("\\f"),
                '\r' => {}
                '\\' => out.push_str("\\\\"),
                '/' if style.escape_solidus => out.push_str("\\/"),
                c if c == style.quote => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
    }
    out.push(style.quote);
}

/// Returns the token for `text` in the given role.
///
/// `None` is the null literal. With `simple_mode` off every key and string
/// value is quoted.
pub fn quote_if_needed<'a>(
    text: Option<&'a str>,
    role: Role,
    simple_mode: bool,
    style: &QuoteStyle,
) -> Cow<'a, str> {
    let Some(text) = text else {
        return Cow::Borrowed("null");
    };
    let bare = simple_mode
        && match role {
            Role::AttributeName => !needs_trim(text) && is_bare_attribute(text),
            Role::StringValue => is_bare_value(text),
        };
    if bare {
        Cow::Borrowed(text)
    } else {
        let mut out = String::with_capacity(text.len() + 2);
        write_quoted(&mut out, text, style);
        Cow::Owned(out)
    }
}

/// Maps the character after a backslash to what it stands for.
///
/// `u` is handled by the reader since it consumes four more characters.
#[inline]
pub(crate) fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'b' => '\u{0008}',
        'f' => '\u{000C}',
        'r' => '\r',
        other => other,
    }
}
