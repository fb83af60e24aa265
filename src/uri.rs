//! URI base resolution for link-typed scalars.
//!
//! A literal is classified as absolute, root-relative or plain-relative, and
//! only the latter two are ever rewritten:
//!
//! ```rust
//! use serde_uon::uri::{classify, resolve, UriKind};
//! use serde_uon::UriContext;
//!
//! let ctx = UriContext::new().with_relative_base("/cr");
//! assert_eq!(classify("f0/x0"), UriKind::Relative);
//! assert_eq!(resolve("f0/x0", &ctx), "/cr/f0/x0");
//! assert_eq!(resolve("http://host/f3/x3", &ctx), "http://host/f3/x3");
//! ```

use crate::UriContext;
use std::borrow::Cow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UriKind {
    /// Has a scheme (`http:`, `urn:`) or is network-path (`//host`).
    Absolute,
    /// Starts with a single `/`.
    RootRelative,
    Relative,
}

/// Classifies a URI literal without parsing it.
#[must_use]
pub fn classify(uri: &str) -> UriKind {
    if uri.starts_with("//") || has_scheme(uri) {
        UriKind::Absolute
    } else if uri.starts_with('/') {
        UriKind::RootRelative
    } else {
        UriKind::Relative
    }
}

/// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`
fn has_scheme(uri: &str) -> bool {
    let Some(colon) = uri.find(':') else {
        return false;
    };
    let scheme = &uri[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Rewrites `uri` against the configured bases.
///
/// Plain-relative values get `relative_base` prefixed; root-relative values
/// get `absolute_path_base` prefixed when one is set. Absolute values and
/// values with no applicable base come back unchanged.
#[must_use]
pub fn resolve<'a>(uri: &'a str, ctx: &UriContext) -> Cow<'a, str> {
    let base = match classify(uri) {
        UriKind::Absolute => None,
        UriKind::RootRelative => ctx.absolute_path_base(),
        UriKind::Relative => ctx.relative_base(),
    };
    match base {
        Some(base) => Cow::Owned(join(base, uri)),
        None => Cow::Borrowed(uri),
    }
}

fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    let mut out = String::with_capacity(base.len() + path.len() + 1);
    out.push_str(base);
    if !path.is_empty() {
        out.push('/');
        out.push_str(path);
    } else if base.is_empty() {
        out.push('/');
    }
    out
}
