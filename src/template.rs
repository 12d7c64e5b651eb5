//! URI template expansion.
//!
//! Base URIs and resource paths are written as templates containing
//! `{name}` (or `{+name}`) placeholders. [`expand`] substitutes every
//! placeholder with the percent-encoded value found in a [`UriParameters`]
//! mapping.
//!
//! Expansion never fails. A placeholder whose name is missing from the
//! mapping, or whose value is null, collapses to an empty string. The
//! placeholder syntax itself is always consumed.
//!
//! # Example
//!
//! ```rust
//! use odss_client::template::{expand, UriParameters};
//!
//! let params = UriParameters::new()
//!     .with("version", 1)
//!     .with("incidentId", 42);
//!
//! assert_eq!(
//!     expand("https://api.example.org/v{version}/incidents/{incidentId}", &params),
//!     "https://api.example.org/v1/incidents/42"
//! );
//!
//! // Missing parameters expand to an empty string
//! assert_eq!(expand("/incidents/{incidentId}", &UriParameters::new()), "/incidents/");
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;

/// A mapping from placeholder names to values used by [`expand`].
///
/// Values are stored as strings. A key can also be present with a null
/// value (see [`UriParameters::with_null`]), which expands exactly like an
/// absent key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UriParameters(BTreeMap<String, Option<String>>);

impl UriParameters {
    /// Creates an empty parameter mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, returning the updated mapping.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds a parameter whose value is explicitly null.
    #[must_use]
    pub fn with_null(mut self, name: impl Into<String>) -> Self {
        self.0.insert(name.into(), None);
        self
    }

    /// Inserts or replaces a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.0.insert(name.into(), Some(value.to_string()));
    }

    /// Removes a parameter, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name).flatten()
    }

    /// Returns the value for `name`, or `None` when absent or null.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Option::as_deref)
    }

    /// Returns `true` if `name` is present, even with a null value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the number of parameters, null values included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for UriParameters
where
    K: Into<String>,
    V: Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Expands every `{name}` and `{+name}` placeholder in `template`.
///
/// Each placeholder is replaced by the percent-encoded value of `name` in
/// `params`, or by an empty string when the name is absent or null. The `+`
/// prefix is accepted but encodes exactly like the plain form. Every byte
/// outside `A-Z a-z 0-9 - . _ ~` is encoded, `!'()*` included. Text without
/// a well-formed placeholder (a lone `{`, or `{}`) is copied unchanged.
#[must_use]
pub fn expand(template: &str, params: &UriParameters) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (literal, candidate) = rest.split_at(open);
        result.push_str(literal);

        if let Some((name, consumed)) = parse_placeholder(candidate) {
            if let Some(value) = params.get(name) {
                result.push_str(&urlencoding::encode(value));
            }
            rest = &candidate[consumed..];
        } else {
            result.push('{');
            rest = &candidate[1..];
        }
    }

    result.push_str(rest);
    result
}

/// Parses a placeholder at the start of `candidate`, which begins with `{`.
///
/// Returns the placeholder name and the number of bytes it spans.
fn parse_placeholder(candidate: &str) -> Option<(&str, usize)> {
    let body = &candidate[1..];
    let close = body.find(|c: char| c == '{' || c == '}')?;
    if !body[close..].starts_with('}') {
        return None;
    }

    let inner = &body[..close];
    // `{+}` names a parameter called "+"
    let name = match inner.strip_prefix('+') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => inner,
    };
    if name.is_empty() {
        return None;
    }

    Some((name, close + 2))
}
