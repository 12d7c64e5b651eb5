//! HTTP request types for the ODSS client.
//!
//! This module provides the [`RequestDescriptor`] handed to signers and
//! transports, and the building blocks it is assembled from: [`HttpMethod`],
//! [`RequestBody`], [`Query`], [`FormData`] and [`TransportOptions`].

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Header names mapped to values.
pub type HeaderMapping = BTreeMap<String, String>;

/// Normalized query parameters.
///
/// A key may carry several values. `"a=1&a=2"` keeps both, and they are sent
/// as repeated `a=` pairs in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, Vec<String>>);

impl QueryParams {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, returning the updated mapping.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(key, value);
        self
    }

    /// Appends a value for `key`, keeping any earlier ones.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Returns the first value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// Returns every value for `key`.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map_or(&[][..], Vec::as_slice)
    }

    /// Iterates over `(key, value)` pairs, one per value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str())))
    }

    /// Returns the number of distinct keys.
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

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.append(key, value);
        }
        params
    }
}

/// HTTP methods used by the ODSS API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PATCH method for partially updating resources.
    Patch,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl HttpMethod {
    /// Returns the lowercase method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request body.
///
/// Raw bytes are sent untouched. Any other body is JSON encoded.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// A JSON-encodable value.
    Json(serde_json::Value),
    /// A raw binary payload.
    Raw(Vec<u8>),
}

impl RequestBody {
    /// Serializes `value` into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if `value` cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Json)
    }

    /// Returns `true` unless this is a raw binary body.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Raw(bytes)
    }
}

impl From<&[u8]> for RequestBody {
    fn from(bytes: &[u8]) -> Self {
        Self::Raw(bytes.to_vec())
    }
}

/// Query parameters, either as a raw query string or as a mapping.
///
/// Raw strings are parsed into a mapping before dispatch, so `"a=1&b=2"`
/// and the mapping `{a: "1", b: "2"}` produce identical requests.
///
/// # Example
///
/// ```rust
/// use odss_client::Query;
///
/// let raw = Query::from("a=1&b=2").normalize();
/// let mapped: Query = [("a", "1"), ("b", "2")].into_iter().collect();
/// assert_eq!(raw, mapped.normalize());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    /// A raw query string such as `"status=open&limit=10"`.
    Raw(String),
    /// Already parsed key/value pairs.
    Params(QueryParams),
}

impl Query {
    /// Converts the query into a key/value mapping.
    ///
    /// A leading `?` is ignored and pairs are percent-decoded. A repeated key
    /// keeps every value.
    #[must_use]
    pub fn normalize(self) -> QueryParams {
        match self {
            Self::Params(params) => params,
            Self::Raw(raw) => {
                let raw = raw.trim().trim_start_matches('?');
                url::form_urlencoded::parse(raw.as_bytes())
                    .filter(|(key, _)| !key.is_empty())
                    .map(|(key, value)| (key.into_owned(), value.into_owned()))
                    .collect()
            }
        }
    }
}

impl From<&str> for Query {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for Query {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl From<QueryParams> for Query {
    fn from(params: QueryParams) -> Self {
        Self::Params(params)
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Params(iter.into_iter().collect())
    }
}

/// A binary attachment sent as part of a multipart form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormFile {
    /// The file name reported to the server.
    pub file_name: String,
    /// The MIME type of the content, if known.
    pub content_type: Option<String>,
    /// The file content.
    pub content: Vec<u8>,
}

impl FormFile {
    /// Creates a new attachment.
    #[must_use]
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            content: content.into(),
        }
    }

    /// Sets the MIME type of the attachment.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// A value appended to [`FormData`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormValue {
    /// A text field.
    Text(String),
    /// A binary attachment.
    File(FormFile),
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<FormFile> for FormValue {
    fn from(file: FormFile) -> Self {
        Self::File(file)
    }
}

/// Multipart form fields with an optional binary attachment.
///
/// Text values are stored under the key they were appended with. The
/// attachment is always sent under the field name `file`, whatever key it
/// was appended with, and a later attachment replaces an earlier one.
///
/// # Example
///
/// ```rust
/// use odss_client::{FormData, FormFile};
///
/// let form = FormData::new()
///     .with("description", "Photo of the scene")
///     .with("image", FormFile::new("scene.jpg", vec![0xFF, 0xD8]));
///
/// assert_eq!(form.get("description"), Some("Photo of the scene"));
/// assert_eq!(form.file().unwrap().file_name, "scene.jpg");
/// assert_eq!(form.get("image"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData {
    fields: BTreeMap<String, String>,
    file: Option<FormFile>,
}

impl FormData {
    /// The multipart field name used for the attachment.
    pub const FILE_FIELD: &'static str = "file";

    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to the form.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<FormValue>) {
        match value.into() {
            FormValue::Text(text) => {
                self.fields.insert(key.into(), text);
            }
            FormValue::File(file) => self.file = Some(file),
        }
    }

    /// Appends a value to the form, returning the updated form.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.append(key, value);
        self
    }

    /// Returns the text value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns all text fields.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Returns the attachment, if any.
    #[must_use]
    pub const fn file(&self) -> Option<&FormFile> {
        self.file.as_ref()
    }

    /// Returns `true` if the form has no fields and no attachment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.file.is_none()
    }

    /// Converts the form into a `reqwest` multipart form.
    pub(crate) fn into_multipart(self) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let mut form = reqwest::multipart::Form::new();
        for (key, value) in self.fields {
            form = form.text(key, value);
        }
        if let Some(file) = self.file {
            let mut part = reqwest::multipart::Part::bytes(file.content).file_name(file.file_name);
            if let Some(content_type) = file.content_type {
                part = part.mime_str(&content_type)?;
            }
            form = form.part(Self::FILE_FIELD, part);
        }
        Ok(form)
    }
}

/// Options passed through to the transport untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Total time allowed for the request, response body included.
    pub timeout: Option<Duration>,
}

/// A fully assembled request, ready to be signed and dispatched.
///
/// Signers receive and return this type; transports consume it.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The absolute request URL, without query string.
    pub url: String,
    /// The merged request headers.
    pub headers: HeaderMapping,
    /// Whether the body is JSON encoded and a JSON response is expected.
    pub json: bool,
    /// Multipart form data; takes precedence over `body` when present.
    pub form_data: Option<FormData>,
    /// The request body.
    pub body: Option<RequestBody>,
    /// Normalized query parameters.
    pub query: Option<QueryParams>,
    /// Options for the transport.
    pub options: Option<TransportOptions>,
}

impl RequestDescriptor {
    /// Sets a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns the value of a header, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
