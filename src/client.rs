//! The top-level ODSS client.

use std::any::Any;
use std::sync::Arc;

use crate::clients::{
    FormData, HeaderMapping, HttpClient, HttpError, HttpMethod, RequestOptions, ResponseEnvelope,
    Transport,
};
use crate::config::ClientConfig;
use crate::extensions::{Extension, ExtensionError, ExtensionRegistry, ExtensionResolver};
use crate::rest::routes;
use crate::rest::Resource;

/// Names of the client's own properties, which extensions cannot take.
pub const RESERVED_NAMES: &[&str] = &[
    "incidents",
    "operations",
    "logs",
    "personnel",
    "transports",
    "options",
    "path",
    "custom_request",
    "form",
    "set_headers",
    "use",
];

/// Client for the ODSS REST API.
///
/// The client owns its configuration, the transport, and the registered
/// extensions. Resource accessors borrow the client.
///
/// # Thread Safety
///
/// `OdssClient` is `Send + Sync`. Share it behind an `Arc` to issue
/// requests from several tasks. Changing headers or registering extensions
/// requires `&mut self`.
///
/// # Example
///
/// ```rust,ignore
/// use odss_client::{ClientConfig, OdssClient, RequestOptions};
/// use serde_json::json;
///
/// let client = OdssClient::new(ClientConfig::builder().header("X-Client", "console").build())?;
///
/// let incidents = client.incidents().get(None, RequestOptions::new()).await?;
/// let created = client
///     .incidents()
///     .post(Some(json!({"name": "Flood"}).into()), RequestOptions::new())
///     .await?;
/// println!("{} {}", created.status, created.body);
/// ```
#[derive(Debug)]
pub struct OdssClient {
    http: HttpClient,
    extensions: ExtensionRegistry,
}

// Verify OdssClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OdssClient>();
};

impl OdssClient {
    /// Creates a client using the default `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        Ok(Self::from_http(HttpClient::new(config)?))
    }

    /// Creates a client that dispatches through `transport`.
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self::from_http(HttpClient::with_transport(config, transport))
    }

    fn from_http(http: HttpClient) -> Self {
        Self {
            http,
            extensions: ExtensionRegistry::new().with_reserved(RESERVED_NAMES),
        }
    }

    /// Returns the underlying request composer.
    #[must_use]
    pub const fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        self.http.config()
    }

    /// Returns the default headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMapping {
        self.http.config().headers()
    }

    /// Replaces the default headers for all later requests.
    pub fn set_headers(&mut self, headers: HeaderMapping) {
        self.http.config_mut().set_headers(headers);
    }

    /// Returns the default headers for modification.
    pub fn headers_mut(&mut self) -> &mut HeaderMapping {
        self.http.config_mut().headers_mut()
    }

    /// Sends a request to an arbitrary path template.
    ///
    /// # Errors
    ///
    /// Returns any error produced by the transport.
    pub async fn custom_request(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, HttpError> {
        self.http.request(method, path, options).await
    }

    /// Returns an empty multipart form.
    #[must_use]
    pub fn form(&self) -> FormData {
        FormData::new()
    }

    /// `/incidents`
    #[must_use]
    pub fn incidents(&self) -> Resource<'_> {
        Resource::from_node(&self.http, &routes::INCIDENTS)
    }

    /// `/operations`
    #[must_use]
    pub fn operations(&self) -> Resource<'_> {
        Resource::from_node(&self.http, &routes::OPERATIONS)
    }

    /// `/logs`
    #[must_use]
    pub fn logs(&self) -> Resource<'_> {
        Resource::from_node(&self.http, &routes::LOGS)
    }

    /// `/personnel`
    #[must_use]
    pub fn personnel(&self) -> Resource<'_> {
        Resource::from_node(&self.http, &routes::PERSONNEL)
    }

    /// `/transports`
    #[must_use]
    pub fn transports(&self) -> Resource<'_> {
        Resource::from_node(&self.http, &routes::TRANSPORTS)
    }

    /// Returns the top-level resource called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::UnknownResource`](crate::InvalidHttpRequestError::UnknownResource)
    /// if there is no such resource.
    pub fn resource(&self, name: &str) -> Result<Resource<'_>, crate::InvalidHttpRequestError> {
        Resource::root(&self.http, name)
    }

    /// Binds an extension under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::AlreadyExists`] if `name` is one of the
    /// client's own properties or already bound, leaving the existing
    /// binding untouched.
    pub fn use_extension(&mut self, name: &str, extension: Extension) -> Result<(), ExtensionError> {
        self.extensions.register(name, extension)
    }

    /// Binds the extension the resolver knows under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::InvalidExtension`] if no resolver is set or
    /// it does not know `name`, and [`ExtensionError::AlreadyExists`] on a
    /// name conflict.
    pub fn use_by_name(&mut self, name: &str) -> Result<(), ExtensionError> {
        self.extensions.register_by_name(name)
    }

    /// Sets the resolver used for lookup extensions.
    pub fn set_extension_resolver(&mut self, resolver: Arc<dyn ExtensionResolver>) {
        self.extensions.set_resolver(resolver);
    }

    /// Returns the extension bound under `name`, if it has type `T`.
    #[must_use]
    pub fn extension<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.extensions.get(name)
    }

    /// Returns the registered extensions.
    #[must_use]
    pub const fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }
}
