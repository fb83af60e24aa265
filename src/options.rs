//! Configuration for UON serialization and parsing.
//!
//! This module provides the types that control both grammars:
//!
//! - [`Config`]: immutable settings, safe to share across threads and calls
//! - [`ConfigBuilder`]: produces a [`Config`]; can be locked against late changes
//! - [`UriContext`]: bases used to rewrite relative URI values
//! - [`QuoteChar`]: the quote character for quoted tokens
//!
//! ## Examples
//!
//! ```rust
//! use serde_uon::{to_string, to_string_with_config, Config};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Pair { s1: Option<String>, s2: String }
//!
//! let data = Pair { s1: None, s2: "s2".to_string() };
//! assert_eq!(to_string(&data).unwrap(), "(s2=s2)");
//!
//! let config = Config::builder().with_trim_nulls(false).build();
//! assert_eq!(to_string_with_config(&data, &config).unwrap(), "(s1=null,s2=s2)");
//! ```

use crate::escape::QuoteStyle;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Quote character for quoted keys and strings.
///
/// # Examples
///
/// ```rust
/// use serde_uon::QuoteChar;
///
/// assert_eq!(QuoteChar::Single.as_char(), '\'');
/// assert_eq!(QuoteChar::Double.as_char(), '"');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteChar {
    #[default]
    Single,
    Double,
}

impl QuoteChar {
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            QuoteChar::Single => '\'',
            QuoteChar::Double => '"',
        }
    }

    fn from_setting(value: &str) -> Option<Self> {
        match value {
            "'" | "single" => Some(QuoteChar::Single),
            "\"" | "double" => Some(QuoteChar::Double),
            _ => None,
        }
    }
}

/// Base URIs for rewriting relative URI values.
///
/// With neither base set, URI values are written as supplied.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UriContext {
    relative_base: Option<String>,
    absolute_path_base: Option<String>,
}

impl UriContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix for plain-relative values such as `f0/x0`.
    #[must_use]
    pub fn with_relative_base(mut self, base: impl Into<String>) -> Self {
        self.relative_base = Some(base.into());
        self
    }

    /// Prefix for root-relative values such as `/f1/x1`.
    #[must_use]
    pub fn with_absolute_path_base(mut self, base: impl Into<String>) -> Self {
        self.absolute_path_base = Some(base.into());
        self
    }

    #[must_use]
    pub fn relative_base(&self) -> Option<&str> {
        self.relative_base.as_deref()
    }

    #[must_use]
    pub fn absolute_path_base(&self) -> Option<&str> {
        self.absolute_path_base.as_deref()
    }
}

/// Immutable codec settings.
///
/// A `Config` is built once with a [`ConfigBuilder`] and then shared freely;
/// every serialize and parse call creates its own traversal state, so one
/// `Config` can serve any number of concurrent calls.
///
/// Configs can also be loaded from any serde format. Missing settings take
/// their defaults:
///
/// ```rust
/// use serde_uon::Config;
///
/// let config: Config = serde_json::from_str(r#"{"detect_recursions": true}"#).unwrap();
/// assert!(config.detect_recursions());
/// assert!(config.trim_nulls());
/// assert_eq!(config.max_depth(), 100);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    trim_nulls: bool,
    trim_empty_collections: bool,
    trim_empty_maps: bool,
    trim_strings: bool,
    sort_properties: bool,
    sort_maps: bool,
    detect_recursions: bool,
    ignore_recursions: bool,
    max_depth: usize,
    add_type_info: bool,
    type_property_name: String,
    quote_char: QuoteChar,
    escape_solidus: bool,
    simple_mode: bool,
    encode_chars: bool,
    expanded_params: bool,
    strict: bool,
    pretty: bool,
    indent: usize,
    uri: UriContext,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            trim_nulls: true,
            trim_empty_collections: false,
            trim_empty_maps: false,
            trim_strings: false,
            sort_properties: false,
            sort_maps: false,
            detect_recursions: false,
            ignore_recursions: false,
            max_depth: 100,
            add_type_info: false,
            type_property_name: "_type".to_string(),
            quote_char: QuoteChar::Single,
            escape_solidus: false,
            simple_mode: true,
            encode_chars: false,
            expanded_params: false,
            strict: false,
            pretty: false,
            indent: 2,
            uri: UriContext::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// A builder seeded with this config's settings.
    #[must_use]
    pub fn to_builder(&self) -> ConfigBuilder {
        ConfigBuilder {
            config: self.clone(),
            locked: false,
        }
    }

    /// Record fields holding `null` are omitted. Map entries are kept.
    #[must_use]
    pub fn trim_nulls(&self) -> bool {
        self.trim_nulls
    }

    /// Empty sequences are omitted from records and maps.
    #[must_use]
    pub fn trim_empty_collections(&self) -> bool {
        self.trim_empty_collections
    }

    /// Empty maps are omitted from records and maps.
    #[must_use]
    pub fn trim_empty_maps(&self) -> bool {
        self.trim_empty_maps
    }

    /// String values are trimmed of surrounding whitespace when written and parsed.
    #[must_use]
    pub fn trim_strings(&self) -> bool {
        self.trim_strings
    }

    #[must_use]
    pub fn sort_properties(&self) -> bool {
        self.sort_properties
    }

    #[must_use]
    pub fn sort_maps(&self) -> bool {
        self.sort_maps
    }

    #[must_use]
    pub fn detect_recursions(&self) -> bool {
        self.detect_recursions
    }

    /// Only meaningful together with [`Config::detect_recursions`].
    #[must_use]
    pub fn ignore_recursions(&self) -> bool {
        self.ignore_recursions
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn add_type_info(&self) -> bool {
        self.add_type_info
    }

    #[must_use]
    pub fn type_property_name(&self) -> &str {
        &self.type_property_name
    }

    #[must_use]
    pub fn quote_char(&self) -> QuoteChar {
        self.quote_char
    }

    #[must_use]
    pub fn escape_solidus(&self) -> bool {
        self.escape_solidus
    }

    /// When off, every key and string value is quoted.
    #[must_use]
    pub fn simple_mode(&self) -> bool {
        self.simple_mode
    }

    /// Percent-encode token text in the bracketed grammar.
    ///
    /// The form-encoded grammar always encodes.
    #[must_use]
    pub fn encode_chars(&self) -> bool {
        self.encode_chars
    }

    #[must_use]
    pub fn expanded_params(&self) -> bool {
        self.expanded_params
    }

    /// Unknown record properties fail the parse instead of being ignored.
    #[must_use]
    pub fn strict(&self) -> bool {
        self.strict
    }

    #[must_use]
    pub fn pretty(&self) -> bool {
        self.pretty
    }

    #[must_use]
    pub fn indent(&self) -> usize {
        self.indent
    }

    #[must_use]
    pub fn uri(&self) -> &UriContext {
        &self.uri
    }

    pub(crate) fn quote_style(&self) -> QuoteStyle {
        QuoteStyle {
            quote: self.quote_char.as_char(),
            escape_solidus: self.escape_solidus,
        }
    }
}

/// Builds a [`Config`].
///
/// Settings are applied with the consuming `with_*` methods, or by name with
/// [`ConfigBuilder::set`] when they come from somewhere dynamic. After
/// [`ConfigBuilder::lock`], `set` fails with [`Error::ConfigLocked`] and
/// `with_*` calls are dropped.
///
/// # Examples
///
/// ```rust
/// use serde_uon::{Config, Error};
///
/// let mut builder = Config::builder().with_detect_recursions(true);
/// builder.set("ignore_recursions", "true").unwrap();
/// builder.lock();
/// assert!(matches!(builder.set("strict", "true"), Err(Error::ConfigLocked(_))));
///
/// let config = builder.build();
/// assert!(config.ignore_recursions());
/// assert!(!config.strict());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
    locked: bool,
}

macro_rules! with_setting {
    ($(#[$meta:meta])* $method:ident, $field:ident: $ty:ty) => {
        $(#[$meta])*
        #[must_use]
        pub fn $method(mut self, value: $ty) -> Self {
            if self.locked {
                tracing::warn!(setting = stringify!($field), "ignoring change to locked config");
            } else {
                self.config.$field = value;
            }
            self
        }
    };
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    with_setting!(with_trim_nulls, trim_nulls: bool);
    with_setting!(with_trim_empty_collections, trim_empty_collections: bool);
    with_setting!(with_trim_empty_maps, trim_empty_maps: bool);
    with_setting!(with_trim_strings, trim_strings: bool);
    with_setting!(with_sort_properties, sort_properties: bool);
    with_setting!(with_sort_maps, sort_maps: bool);
    with_setting!(with_detect_recursions, detect_recursions: bool);
    with_setting!(with_ignore_recursions, ignore_recursions: bool);
    with_setting!(
        /// Nesting bound for writing with detection off, and for parsing.
        with_max_depth, max_depth: usize
    );
    with_setting!(with_add_type_info, add_type_info: bool);
    with_setting!(with_quote_char, quote_char: QuoteChar);
    with_setting!(with_escape_solidus, escape_solidus: bool);
    with_setting!(with_simple_mode, simple_mode: bool);
    with_setting!(with_encode_chars, encode_chars: bool);
    with_setting!(with_expanded_params, expanded_params: bool);
    with_setting!(with_strict, strict: bool);
    with_setting!(with_pretty, pretty: bool);
    with_setting!(with_indent, indent: usize);
    with_setting!(with_uri_context, uri: UriContext);

    /// Name of the discriminator property written ahead of record fields.
    #[must_use]
    pub fn with_type_property_name(mut self, name: impl Into<String>) -> Self {
        if self.locked {
            tracing::warn!(setting = "type_property_name", "ignoring change to locked config");
        } else {
            self.config.type_property_name = name.into();
        }
        self
    }

    /// Sets one setting by name from its textual value.
    ///
    /// Booleans take `true`/`false`, numbers take decimal text, the URI bases
    /// take any text (empty clears them), and `quote_char` takes `'`, `"`,
    /// `single` or `double`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        if self.locked {
            return Err(Error::ConfigLocked(name.to_string()));
        }
        let c = &mut self.config;
        match name {
            "trim_nulls" => c.trim_nulls = parse_bool(name, value)?,
            "trim_empty_collections" => c.trim_empty_collections = parse_bool(name, value)?,
            "trim_empty_maps" => c.trim_empty_maps = parse_bool(name, value)?,
            "trim_strings" => c.trim_strings = parse_bool(name, value)?,
            "sort_properties" => c.sort_properties = parse_bool(name, value)?,
            "sort_maps" => c.sort_maps = parse_bool(name, value)?,
            "detect_recursions" => c.detect_recursions = parse_bool(name, value)?,
            "ignore_recursions" => c.ignore_recursions = parse_bool(name, value)?,
            "max_depth" => c.max_depth = parse_usize(name, value)?,
            "add_type_info" => c.add_type_info = parse_bool(name, value)?,
            "type_property_name" => {
                if value.is_empty() {
                    return Err(Error::invalid_setting(name, "must not be empty"));
                }
                c.type_property_name = value.to_string();
            }
            "quote_char" => {
                c.quote_char = QuoteChar::from_setting(value)
                    .ok_or_else(|| Error::invalid_setting(name, "expected ' or \""))?;
            }
            "escape_solidus" => c.escape_solidus = parse_bool(name, value)?,
            "simple_mode" => c.simple_mode = parse_bool(name, value)?,
            "encode_chars" => c.encode_chars = parse_bool(name, value)?,
            "expanded_params" => c.expanded_params = parse_bool(name, value)?,
            "strict" => c.strict = parse_bool(name, value)?,
            "pretty" => c.pretty = parse_bool(name, value)?,
            "indent" => c.indent = parse_usize(name, value)?,
            "relative_uri_base" => c.uri.relative_base = non_empty(value),
            "absolute_path_uri_base" => c.uri.absolute_path_base = non_empty(value),
            _ => return Err(Error::invalid_setting(name, "unknown setting")),
        }
        tracing::debug!(setting = name, value, "config setting applied");
        Ok(())
    }

    /// Freezes the builder against further [`ConfigBuilder::set`] calls.
    pub fn lock(&mut self) {
        self.locked = true;
        tracing::debug!("config builder locked");
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::invalid_setting(
            name,
            format!("expected true or false, found '{}'", other),
        )),
    }
}

fn parse_usize(name: &str, value: &str) -> Result<usize> {
    value.parse().map_err(|_| {
        Error::invalid_setting(name, format!("expected a non-negative integer, found '{}'", value))
    })
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.trim_nulls());
        assert!(config.simple_mode());
        assert!(!config.detect_recursions());
        assert_eq!(config.max_depth(), 100);
        assert_eq!(config.type_property_name(), "_type");
        assert_eq!(config.quote_char(), QuoteChar::Single);
        assert_eq!(config.indent(), 2);
        assert_eq!(config.uri(), &UriContext::default());
    }

    #[test]
    fn test_set_by_name() {
        let mut builder = ConfigBuilder::new();
        builder.set("max_depth", "7").unwrap();
        builder.set("quote_char", "\"").unwrap();
        builder.set("relative_uri_base", "/cr").unwrap();
        let config = builder.build();
        assert_eq!(config.max_depth(), 7);
        assert_eq!(config.quote_char(), QuoteChar::Double);
        assert_eq!(config.uri().relative_base(), Some("/cr"));
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut builder = ConfigBuilder::new();
        assert!(matches!(
            builder.set("no_such_thing", "true"),
            Err(Error::InvalidSetting { .. })
        ));
        assert!(matches!(
            builder.set("strict", "yes"),
            Err(Error::InvalidSetting { .. })
        ));
        assert!(matches!(
            builder.set("quote_char", "`"),
            Err(Error::InvalidSetting { .. })
        ));
        assert!(matches!(
            builder.set("type_property_name", ""),
            Err(Error::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_locked_builder() {
        let mut builder = ConfigBuilder::new().with_strict(true);
        builder.lock();
        assert!(builder.is_locked());
        let err = builder.set("strict", "false").unwrap_err();
        assert_eq!(err.to_string(), "Configuration is locked; cannot set 'strict'");

        let config = builder.with_pretty(true).build();
        assert!(config.strict());
        assert!(!config.pretty());
    }

    #[test]
    fn test_to_builder_keeps_settings() {
        let base = Config::builder().with_sort_maps(true).build();
        let derived = base.to_builder().with_pretty(true).build();
        assert!(derived.sort_maps());
        assert!(derived.pretty());
        assert!(!base.pretty());
    }

    #[test]
    fn test_config_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Config>();
    }
}
