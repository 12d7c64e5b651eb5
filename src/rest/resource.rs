//! Generic resource accessor.

use std::fmt::Display;

use crate::clients::{
    FormData, HttpClient, HttpError, HttpMethod, InvalidHttpRequestError, Query, RequestBody,
    RequestOptions, ResponseEnvelope,
};
use crate::rest::routes::{self, RouteNode};
use crate::template::{expand, UriParameters};

/// The payload of a `post`, `patch`, or `delete` call.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// A JSON or raw request body.
    Body(RequestBody),
    /// Multipart form data.
    Form(FormData),
}

impl From<RequestBody> for Payload {
    fn from(body: RequestBody) -> Self {
        Self::Body(body)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Body(RequestBody::Json(value))
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Body(RequestBody::Raw(bytes))
    }
}

impl From<FormData> for Payload {
    fn from(form: FormData) -> Self {
        Self::Form(form)
    }
}

/// An accessor scoped to one path of the route tree.
///
/// A `Resource` only permits the methods its route lists. Calling any other
/// method fails with [`InvalidHttpRequestError::MethodNotAllowed`] before a
/// request is composed.
///
/// # Example
///
/// ```rust,ignore
/// use odss_client::OdssClient;
/// use serde_json::json;
///
/// let client = OdssClient::new(Default::default())?;
///
/// // GET /incidents/5/clues
/// let clues = client
///     .incidents()
///     .id(5)?
///     .child("clues")?
///     .get(None, Default::default())
///     .await?;
///
/// // POST /operations
/// client
///     .operations()
///     .post(Some(json!({"name": "Search"}).into()), Default::default())
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct Resource<'a> {
    client: &'a HttpClient,
    node: &'static RouteNode,
    path: String,
}

impl<'a> Resource<'a> {
    /// Creates the accessor for a top-level resource.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::UnknownResource`] if `name` is not
    /// a top-level resource.
    pub fn root(client: &'a HttpClient, name: &str) -> Result<Self, InvalidHttpRequestError> {
        let node = routes::root(name).ok_or_else(|| InvalidHttpRequestError::UnknownResource {
            path: String::new(),
            segment: name.to_string(),
        })?;
        Ok(Self {
            client,
            node,
            path: format!("/{}", node.segment),
        })
    }

    pub(crate) fn from_node(client: &'a HttpClient, node: &'static RouteNode) -> Self {
        Self {
            client,
            node,
            path: format!("/{}", node.segment),
        }
    }

    /// Returns the concrete path of this accessor.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the methods valid on this accessor.
    #[must_use]
    pub const fn methods(&self) -> &'static [HttpMethod] {
        self.node.methods
    }

    /// Returns `true` if `method` is valid on this accessor.
    #[must_use]
    pub fn allows(&self, method: HttpMethod) -> bool {
        self.node.allows(method)
    }

    /// Descends into a named sub-resource.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::UnknownResource`] if there is no
    /// such sub-resource.
    pub fn child(&self, name: &str) -> Result<Self, InvalidHttpRequestError> {
        let node = self
            .node
            .child(name)
            .ok_or_else(|| self.unknown(name))?;
        Ok(Self {
            client: self.client,
            node,
            path: format!("{}/{}", self.path, node.segment),
        })
    }

    /// Descends into a collection member, expanding its id template with
    /// `params`.
    ///
    /// A missing id expands to an empty segment.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::UnknownResource`] if this accessor
    /// is not a collection.
    pub fn member(&self, params: &UriParameters) -> Result<Self, InvalidHttpRequestError> {
        let node = self.node.member.ok_or_else(|| self.unknown("{id}"))?;
        Ok(Self {
            client: self.client,
            node,
            path: format!("{}/{}", self.path, expand(node.segment, params)),
        })
    }

    /// Descends into the collection member identified by `id`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::UnknownResource`] if this accessor
    /// is not a collection.
    pub fn id(&self, id: impl Display) -> Result<Self, InvalidHttpRequestError> {
        let name = self
            .node
            .member
            .and_then(RouteNode::parameter)
            .ok_or_else(|| self.unknown("{id}"))?;
        self.member(&UriParameters::new().with(name, id))
    }

    /// Sends a `GET` request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] if `GET` is not valid here, or
    /// any error produced by the transport.
    pub async fn get(
        &self,
        query: Option<Query>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, HttpError> {
        let wrapper = match query {
            Some(query) => RequestOptions::new().query(query),
            None => RequestOptions::new().without_query(),
        };
        self.send(HttpMethod::Get, wrapper.overlay(options)).await
    }

    /// Sends a `POST` request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] if `POST` is not valid here, or
    /// any error produced by the transport.
    pub async fn post(
        &self,
        payload: Option<Payload>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, HttpError> {
        self.send(HttpMethod::Post, with_payload(payload, options))
            .await
    }

    /// Sends a `PATCH` request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] if `PATCH` is not valid here, or
    /// any error produced by the transport.
    pub async fn patch(
        &self,
        payload: Option<Payload>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, HttpError> {
        self.send(HttpMethod::Patch, with_payload(payload, options))
            .await
    }

    /// Sends a `DELETE` request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] if `DELETE` is not valid here,
    /// or any error produced by the transport.
    pub async fn delete(
        &self,
        payload: Option<Payload>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, HttpError> {
        self.send(HttpMethod::Delete, with_payload(payload, options))
            .await
    }

    async fn send(
        &self,
        method: HttpMethod,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, HttpError> {
        if !self.allows(method) {
            return Err(InvalidHttpRequestError::MethodNotAllowed {
                method,
                path: self.path.clone(),
            }
            .into());
        }
        self.client.request(method, &self.path, options).await
    }

    fn unknown(&self, segment: &str) -> InvalidHttpRequestError {
        InvalidHttpRequestError::UnknownResource {
            path: self.path.clone(),
            segment: segment.to_string(),
        }
    }
}

fn with_payload(payload: Option<Payload>, options: RequestOptions) -> RequestOptions {
    let wrapper = match payload {
        Some(Payload::Form(form)) => RequestOptions::new().form_data(form),
        Some(Payload::Body(body)) => RequestOptions::new().body(body),
        None => RequestOptions::new().without_body(),
    };
    wrapper.overlay(options)
}
