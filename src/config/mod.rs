//! Configuration types for the ODSS client.
//!
//! This module provides the configuration used to construct an
//! [`OdssClient`](crate::OdssClient).
//!
//! # Overview
//!
//! - [`ClientConfig`]: client-wide defaults applied to every request
//! - [`ClientConfigBuilder`]: a builder for constructing [`ClientConfig`] instances
//! - [`BaseUri`]: a validated base URI template
//! - [`ClientId`] and [`ClientSecret`]: validated OAuth2 credentials
//!
//! # Example
//!
//! ```rust
//! use odss_client::{ClientConfig, BaseUri};
//!
//! let config = ClientConfig::builder()
//!     .base_uri(BaseUri::new("https://staging.example.org/api/v{version}").unwrap())
//!     .api_version("2")
//!     .header("X-Client", "dispatch-console")
//!     .build();
//!
//! assert_eq!(config.resolved_base_uri(), "https://staging.example.org/api/v2");
//! ```

mod newtypes;

pub use newtypes::{BaseUri, ClientId, ClientSecret};

use std::fmt;
use std::sync::Arc;

use crate::clients::{
    FormData, HeaderMapping, Query, RequestBody, RequestOptions, Signer, TransportOptions,
};
use crate::template::UriParameters;

/// The API version the client is generated for.
pub const API_VERSION: &str = "1";

/// The production base URI template.
pub const DEFAULT_BASE_URI: &str = "https://api.redcross.no/odss/rest/api/v{version}";

/// Client-wide defaults applied to every request.
///
/// A `ClientConfig` is built once and handed to the client at construction.
/// Only the headers can be changed afterwards, through
/// [`OdssClient::set_headers`](crate::OdssClient::set_headers), which
/// requires exclusive access to the client.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone)]
pub struct ClientConfig {
    base_uri: BaseUri,
    base_uri_parameters: UriParameters,
    headers: HeaderMapping,
    defaults: RequestOptions,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the base URI template.
    #[must_use]
    pub const fn base_uri(&self) -> &BaseUri {
        &self.base_uri
    }

    /// Returns the parameters used to expand the base URI.
    #[must_use]
    pub const fn base_uri_parameters(&self) -> &UriParameters {
        &self.base_uri_parameters
    }

    /// Returns the base URI expanded with the configured parameters.
    #[must_use]
    pub fn resolved_base_uri(&self) -> String {
        self.base_uri.resolve(&self.base_uri_parameters)
    }

    /// Returns the default headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMapping {
        &self.headers
    }

    /// Replaces the default headers.
    pub fn set_headers(&mut self, headers: HeaderMapping) {
        self.headers = headers;
    }

    /// Returns the default headers for modification.
    pub fn headers_mut(&mut self) -> &mut HeaderMapping {
        &mut self.headers
    }

    /// Returns the remaining client-level defaults as request options.
    ///
    /// The base URI, its parameters and the headers are included, so the
    /// result can be overlaid with call-level options directly.
    #[must_use]
    pub fn defaults(&self) -> RequestOptions {
        RequestOptions {
            base_uri: Some(self.base_uri.clone()),
            base_uri_parameters: Some(self.base_uri_parameters.clone()),
            headers: Some(self.headers.clone()),
            ..self.defaults.clone()
        }
    }

    /// Returns the default signer, if configured.
    #[must_use]
    pub fn signer(&self) -> Option<&Arc<dyn Signer>> {
        self.defaults.signer.as_ref()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfigBuilder::new().build()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_uri", &self.base_uri)
            .field("base_uri_parameters", &self.base_uri_parameters)
            .field("headers", &self.headers)
            .field("defaults", &self.defaults)
            .finish()
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// # Defaults
///
/// - `base_uri`: [`DEFAULT_BASE_URI`]
/// - `base_uri_parameters`: `{version: API_VERSION}`
/// - `headers`: empty
/// - `uri_parameters`, `query`, `body`, `form_data`, `signer`, `timeout`: unset
///
/// Setting `base_uri_parameters` replaces the default mapping as a whole,
/// including the `version` entry.
#[derive(Default)]
pub struct ClientConfigBuilder {
    base_uri: Option<BaseUri>,
    base_uri_parameters: Option<UriParameters>,
    api_version: Option<String>,
    headers: HeaderMapping,
    defaults: RequestOptions,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
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

    /// Sets the parameters used to expand the base URI.
    #[must_use]
    pub fn base_uri_parameters(mut self, params: UriParameters) -> Self {
        self.base_uri_parameters = Some(params);
        self
    }

    /// Sets the `version` base URI parameter.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets all default headers at once.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMapping) -> Self {
        self.headers = headers;
        self
    }

    /// Adds a single default header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets default path template parameters.
    #[must_use]
    pub fn uri_parameters(mut self, params: UriParameters) -> Self {
        self.defaults.uri_parameters = Some(params);
        self
    }

    /// Sets a default query.
    #[must_use]
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.defaults.query = Some(query.into());
        self
    }

    /// Sets a default body.
    #[must_use]
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.defaults.body = Some(body.into());
        self
    }

    /// Sets default form data.
    #[must_use]
    pub fn form_data(mut self, form: FormData) -> Self {
        self.defaults.form_data = Some(form);
        self
    }

    /// Sets the default signer.
    #[must_use]
    pub fn signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.defaults.signer = Some(signer);
        self
    }

    /// Sets a default request timeout for the transport.
    #[must_use]
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.defaults.transport = Some(TransportOptions {
            timeout: Some(timeout),
        });
        self
    }

    /// Builds the [`ClientConfig`].
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let base_uri = self.base_uri.unwrap_or_else(default_base_uri);

        let mut base_uri_parameters = self
            .base_uri_parameters
            .unwrap_or_else(|| UriParameters::new().with("version", API_VERSION));
        if let Some(version) = self.api_version {
            if base_uri_parameters.get("version") != Some(version.as_str()) {
                tracing::debug!(
                    "Client overriding default API version {:?} with {}",
                    base_uri_parameters.get("version"),
                    version
                );
            }
            base_uri_parameters.insert("version", version);
        }

        ClientConfig {
            base_uri,
            base_uri_parameters,
            headers: self.headers,
            defaults: RequestOptions {
                base_uri: None,
                base_uri_parameters: None,
                headers: None,
                ..self.defaults
            },
        }
    }
}

impl fmt::Debug for ClientConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfigBuilder")
            .field("base_uri", &self.base_uri)
            .field("base_uri_parameters", &self.base_uri_parameters)
            .field("api_version", &self.api_version)
            .field("headers", &self.headers)
            .field("defaults", &self.defaults)
            .finish()
    }
}

fn default_base_uri() -> BaseUri {
    BaseUri(DEFAULT_BASE_URI.to_string())
}
