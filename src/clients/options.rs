//! Per-call request options.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::clients::http_request::{
    FormData, HeaderMapping, Query, RequestBody, TransportOptions,
};
use crate::clients::signer::Signer;
use crate::config::BaseUri;
use crate::template::UriParameters;

/// Options for a single request.
///
/// Every field is optional. When a request is composed, each field that is
/// set replaces the client-level default as a whole. A call-level body, for
/// example, is never merged into a configured default body. Headers are the
/// exception: call-level headers are laid over the client headers key by
/// key. [`without_body`](Self::without_body) and
/// [`without_query`](Self::without_query) drop the default instead of
/// inheriting it.
///
/// # Example
///
/// ```rust
/// use odss_client::RequestOptions;
/// use odss_client::template::UriParameters;
/// use serde_json::json;
///
/// let options = RequestOptions::new()
///     .header("X-Correlation-Id", "abc-123")
///     .query("status=open")
///     .body(json!({"name": "Flood"}))
///     .uri_parameters(UriParameters::new().with("incidentId", 5));
///
/// assert!(options.headers.is_some());
/// ```
#[derive(Clone, Default)]
pub struct RequestOptions {
    /// Overrides the client's base URI template.
    pub base_uri: Option<BaseUri>,
    /// Overrides the parameters used to expand the base URI.
    pub base_uri_parameters: Option<UriParameters>,
    /// Parameters used to expand the path template.
    pub uri_parameters: Option<UriParameters>,
    /// Headers laid over the client headers.
    pub headers: Option<HeaderMapping>,
    /// Query parameters.
    pub query: Option<Query>,
    /// The request body.
    pub body: Option<RequestBody>,
    /// Multipart form data.
    pub form_data: Option<FormData>,
    /// Signs the request before it is dispatched.
    pub signer: Option<Arc<dyn Signer>>,
    /// Options for the transport.
    pub transport: Option<TransportOptions>,
    pub(crate) body_cleared: bool,
    pub(crate) query_cleared: bool,
}

impl RequestOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URI template.
    #[must_use]
    pub fn base_uri(mut self, base_uri: BaseUri) -> Self {
        self.base_uri = Some(base_uri);
        self
    }

    /// Sets the base URI parameters.
    #[must_use]
    pub fn base_uri_parameters(mut self, params: UriParameters) -> Self {
        self.base_uri_parameters = Some(params);
        self
    }

    /// Sets the path template parameters.
    #[must_use]
    pub fn uri_parameters(mut self, params: UriParameters) -> Self {
        self.uri_parameters = Some(params);
        self
    }

    /// Sets all headers at once.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMapping) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Adds a single header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HeaderMapping::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets the query, either as a raw string or as a mapping.
    #[must_use]
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self.query_cleared = false;
        self
    }

    /// Sends no query, even if the client has a default one.
    #[must_use]
    pub fn without_query(mut self) -> Self {
        self.query = None;
        self.query_cleared = true;
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self.body_cleared = false;
        self
    }

    /// Sends no body, even if the client has a default one.
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.body = None;
        self.body_cleared = true;
        self
    }

    /// Sets the multipart form data.
    #[must_use]
    pub fn form_data(mut self, form: FormData) -> Self {
        self.form_data = Some(form);
        self
    }

    /// Sets the signer.
    #[must_use]
    pub fn signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Sets a request timeout for the transport.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport = Some(TransportOptions {
            timeout: Some(timeout),
        });
        self
    }

    /// Lays `top` over `self`.
    ///
    /// Every field set in `top` replaces the corresponding field of `self`.
    /// A body or query cleared in `top` stays cleared.
    #[must_use]
    pub fn overlay(self, top: Self) -> Self {
        let body_cleared = top.body_cleared || (top.body.is_none() && self.body_cleared);
        let query_cleared = top.query_cleared || (top.query.is_none() && self.query_cleared);
        Self {
            base_uri: top.base_uri.or(self.base_uri),
            base_uri_parameters: top.base_uri_parameters.or(self.base_uri_parameters),
            uri_parameters: top.uri_parameters.or(self.uri_parameters),
            headers: top.headers.or(self.headers),
            query: if top.query_cleared {
                None
            } else {
                top.query.or(self.query)
            },
            body: if top.body_cleared {
                None
            } else {
                top.body.or(self.body)
            },
            form_data: top.form_data.or(self.form_data),
            signer: top.signer.or(self.signer),
            transport: top.transport.or(self.transport),
            body_cleared,
            query_cleared,
        }
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("base_uri", &self.base_uri)
            .field("base_uri_parameters", &self.base_uri_parameters)
            .field("uri_parameters", &self.uri_parameters)
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("form_data", &self.form_data)
            .field("signer", &self.signer.as_ref().map(|_| "Signer"))
            .field("transport", &self.transport)
            .field("body_cleared", &self.body_cleared)
            .field("query_cleared", &self.query_cleared)
            .finish()
    }
}
