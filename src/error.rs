//! Error types for UON serialization and parsing.
//!
//! Every failure the codec can surface is a variant of [`Error`]. Nothing is
//! swallowed silently except the two policies that are explicitly opt-in:
//! pruned recursive edges (`ignore_recursions`) and unknown record properties
//! when `strict` is off.
//!
//! ## Error Categories
//!
//! - **Lexical errors**: an unterminated object body, reported with one of the
//!   four [`LexErrorKind`] messages plus line/column
//! - **Syntax errors**: anything else the character machine rejects
//! - **Cycle errors**: a recursive value graph, with the full visited chain
//! - **Type errors**: scalar conversion failures, unresolvable type names,
//!   unknown properties in strict mode
//! - **Configuration errors**: mutation of a locked builder, invalid settings
//!
//! A partially written buffer is never returned alongside an error; callers
//! should discard whatever they were accumulating.
//!
//! ## Examples
//!
//! ```rust
//! use serde_uon::{from_str, Error, Value};
//!
//! let result: Result<Value, Error> = from_str("(a=1");
//! assert!(matches!(result, Err(Error::Lex { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// The four ways an object body can be cut short by end of input.
///
/// The messages are stable and part of the public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// Input ended while looking for the start of a key.
    #[error("missing attribute name")]
    MissingAttributeName,

    /// Input ended after a key, before its `=`.
    #[error("missing '=' after attribute name")]
    MissingEquals,

    /// Input ended right after `=`.
    #[error("dangling '=' with no value")]
    DanglingEquals,

    /// Input ended before the closing `)`.
    #[error("missing closing delimiter")]
    MissingClosingDelimiter,
}

/// Represents all possible errors that can occur during UON serialization/parsing.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Unterminated object or sequence body
    #[error("{kind} at line {line}, column {col}")]
    Lex {
        line: usize,
        col: usize,
        kind: LexErrorKind,
    },

    /// Any other malformed input
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// A value could not be converted to the expected type
    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// The value graph recurses back into one of its ancestors
    #[error("Recursion detected: {chain}")]
    Cycle { chain: String },

    /// Nesting went past `max_depth` while recursion detection was off
    #[error(
        "Depth too deep ({depth} > max_depth {max}). Stack overflow likely caused by a cyclic value graph; enable detect_recursions to trace it"
    )]
    DepthExceeded { depth: usize, max: usize },

    /// A type discriminator or named type reference could not be resolved
    #[error("Class resolution error: {0}")]
    ClassResolution(String),

    /// A record received a property it does not declare (strict mode only)
    #[error("Unknown property '{property}' on record '{record}'")]
    UnknownProperty { record: String, property: String },

    /// A setting was changed on a locked configuration builder
    #[error("Configuration is locked; cannot set '{0}'")]
    ConfigLocked(String),

    /// A setting name or value was not understood
    #[error("Invalid setting '{name}': {reason}")]
    InvalidSetting { name: String, reason: String },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates one of the four end-of-input errors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_uon::{Error, LexErrorKind};
    ///
    /// let err = Error::lex(1, 5, LexErrorKind::DanglingEquals);
    /// assert!(err.to_string().contains("dangling '='"));
    /// ```
    pub fn lex(line: usize, col: usize, kind: LexErrorKind) -> Self {
        Error::Lex { line, col, kind }
    }

    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_uon::Error;
    ///
    /// let err = Error::syntax(10, 5, "unexpected token");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates a type mismatch error for a value at `path`.
    pub fn type_mismatch(path: &str, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn class_resolution<T: fmt::Display>(msg: T) -> Self {
        Error::ClassResolution(msg.to_string())
    }

    pub fn unknown_property(record: &str, property: &str) -> Self {
        Error::UnknownProperty {
            record: record.to_string(),
            property: property.to_string(),
        }
    }

    pub fn invalid_setting<T: fmt::Display>(name: &str, reason: T) -> Self {
        Error::InvalidSetting {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_uon::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader/writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the lexical error kind, if this is one.
    #[must_use]
    pub fn lex_kind(&self) -> Option<LexErrorKind> {
        match self {
            Error::Lex { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
