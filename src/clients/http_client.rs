//! The request composer.
//!
//! [`HttpClient`] merges the client configuration with per-call
//! [`RequestOptions`], resolves the final URL, signs the request if a signer
//! is configured, and hands it to a [`Transport`].

use std::fmt;
use std::sync::Arc;

use crate::clients::errors::HttpError;
use crate::clients::http_request::{HttpMethod, Query, RequestBody, RequestDescriptor};
use crate::clients::http_response::ResponseEnvelope;
use crate::clients::options::RequestOptions;
use crate::clients::transport::{ReqwestTransport, Transport};
use crate::config::ClientConfig;
use crate::template::{expand, UriParameters};

/// Composes and dispatches requests against the configured API.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`. Requests only read the configuration;
/// changing the headers requires `&mut self`, so it cannot race with
/// requests in flight.
///
/// # Example
///
/// ```rust,ignore
/// use odss_client::{ClientConfig, HttpMethod, RequestOptions};
/// use odss_client::clients::HttpClient;
/// use odss_client::template::UriParameters;
///
/// let client = HttpClient::new(ClientConfig::default())?;
/// let response = client
///     .request(
///         HttpMethod::Get,
///         "/incidents/{incidentId}",
///         RequestOptions::new().uri_parameters(UriParameters::new().with("incidentId", 42)),
///     )
///     .await?;
/// ```
pub struct HttpClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a client that dispatches through [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying HTTP client cannot
    /// be created.
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        Ok(Self::with_transport(config, Arc::new(ReqwestTransport::new()?)))
    }

    /// Creates a client that dispatches through `transport`.
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the client configuration for modification.
    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// Builds the request that [`request`](Self::request) would dispatch.
    #[must_use]
    pub fn compose(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> RequestDescriptor {
        compose_request(&self.config, method, path, options)
    }

    /// Composes a request and dispatches it.
    ///
    /// Errors from the transport are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] on connection failures and
    /// [`HttpError::Response`] for non-2xx responses rejected by the
    /// transport.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, HttpError> {
        let request = self.compose(method, path, options);
        tracing::debug!("Dispatching {} {}", request.method, request.url);

        let mut response = self.transport.send(request).await?;
        response.status = response.status_code;

        tracing::debug!("Received status {}", response.status_code);
        Ok(response)
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Merges `options` over the defaults in `config` and assembles the request.
///
/// Call-level headers are laid over the client headers key by key. Every
/// other option set on the call replaces the client default as a whole.
/// The base URI loses at most one trailing slash before the expanded path is
/// appended. A raw byte body disables JSON encoding.
#[must_use]
pub fn compose_request(
    config: &ClientConfig,
    method: HttpMethod,
    path: &str,
    mut options: RequestOptions,
) -> RequestDescriptor {
    let mut headers = config.headers().clone();
    if let Some(overrides) = options.headers.take() {
        headers.extend(overrides);
    }

    let merged = config.defaults().overlay(options);

    let base_uri = merged
        .base_uri
        .as_ref()
        .unwrap_or_else(|| config.base_uri())
        .resolve(&merged.base_uri_parameters.unwrap_or_default());
    let base_uri = base_uri.strip_suffix('/').unwrap_or(&base_uri);

    let uri_parameters = merged.uri_parameters.unwrap_or_else(UriParameters::new);
    let url = format!("{base_uri}{}", expand(path, &uri_parameters));

    let json = !matches!(merged.body, Some(RequestBody::Raw(_)));

    let request = RequestDescriptor {
        method,
        url,
        headers,
        json,
        form_data: merged.form_data,
        body: merged.body,
        query: merged.query.map(Query::normalize),
        options: merged.transport,
    };

    match merged.signer {
        Some(signer) => signer.sign(request),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::http_request::{FormData, HeaderMapping, QueryParams};
    use crate::clients::transport::BoxFuture;
    use crate::config::BaseUri;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<RequestDescriptor>>,
    }

    impl Transport for RecordingTransport {
        fn send(
            &self,
            request: RequestDescriptor,
        ) -> BoxFuture<'_, Result<ResponseEnvelope, HttpError>> {
            self.sent.lock().unwrap().push(request);
            Box::pin(async {
                let mut response = ResponseEnvelope::new(200, HashMap::new(), json!({"ok": true}));
                response.status = 0;
                Ok(response)
            })
        }
    }

    fn config(base: &str) -> ClientConfig {
        ClientConfig::builder()
            .base_uri(BaseUri::new(base).unwrap())
            .build()
    }

    #[test]
    fn test_resolves_base_uri_and_path_parameters() {
        let request = compose_request(
            &config("https://api.example.org/v{version}"),
            HttpMethod::Get,
            "/incidents/{incidentId}",
            RequestOptions::new().uri_parameters(UriParameters::new().with("incidentId", 42)),
        );

        assert_eq!(request.url, "https://api.example.org/v1/incidents/42");
        assert_eq!(request.method, HttpMethod::Get);
    }

    #[test]
    fn test_strips_one_trailing_slash_from_base_uri() {
        let request = compose_request(
            &config("https://api.example.org/v{version}/"),
            HttpMethod::Get,
            "/logs",
            RequestOptions::new(),
        );
        assert_eq!(request.url, "https://api.example.org/v1/logs");

        let request = compose_request(
            &config("https://api.example.org//"),
            HttpMethod::Get,
            "/logs",
            RequestOptions::new(),
        );
        assert_eq!(request.url, "https://api.example.org//logs");
    }

    #[test]
    fn test_call_headers_overlay_client_headers() {
        let config = ClientConfig::builder()
            .header("A", "client")
            .header("B", "client")
            .build();
        let request = compose_request(
            &config,
            HttpMethod::Get,
            "/logs",
            RequestOptions::new().header("B", "call").header("C", "call"),
        );

        assert_eq!(request.header("A"), Some("client"));
        assert_eq!(request.header("B"), Some("call"));
        assert_eq!(request.header("C"), Some("call"));
        assert_eq!(config.headers().get("B"), Some(&"client".to_string()));
        assert!(config.headers().get("C").is_none());
    }

    #[test]
    fn test_call_body_replaces_default_body() {
        let config = ClientConfig::builder()
            .body(json!({"default": true, "keep": 1}))
            .build();
        let request = compose_request(
            &config,
            HttpMethod::Post,
            "/incidents",
            RequestOptions::new().body(json!({"name": "Flood"})),
        );

        assert_eq!(request.body, Some(RequestBody::Json(json!({"name": "Flood"}))));
    }

    #[test]
    fn test_default_body_used_when_call_has_none() {
        let config = ClientConfig::builder().body(json!({"default": true})).build();
        let request = compose_request(&config, HttpMethod::Post, "/incidents", RequestOptions::new());
        assert_eq!(request.body, Some(RequestBody::Json(json!({"default": true}))));
    }

    #[test]
    fn test_string_and_mapping_queries_are_equivalent() {
        let config = ClientConfig::default();
        let from_string = compose_request(
            &config,
            HttpMethod::Get,
            "/logs",
            RequestOptions::new().query("a=1&b=2"),
        );
        let mapping: QueryParams = [("a", "1"), ("b", "2")].into_iter().collect();
        let from_mapping = compose_request(
            &config,
            HttpMethod::Get,
            "/logs",
            RequestOptions::new().query(mapping.clone()),
        );

        assert_eq!(from_string.query, Some(mapping));
        assert_eq!(from_string.query, from_mapping.query);
    }

    #[test]
    fn test_raw_body_disables_json() {
        let config = ClientConfig::default();
        let raw = compose_request(
            &config,
            HttpMethod::Post,
            "/incidents",
            RequestOptions::new().body(vec![1_u8, 2, 3]),
        );
        let json_body = compose_request(
            &config,
            HttpMethod::Post,
            "/incidents",
            RequestOptions::new().body(json!("text")),
        );
        let no_body = compose_request(&config, HttpMethod::Get, "/incidents", RequestOptions::new());

        assert!(!raw.json);
        assert!(json_body.json);
        assert!(no_body.json);
    }

    #[test]
    fn test_base_uri_override_per_call() {
        let request = compose_request(
            &ClientConfig::default(),
            HttpMethod::Get,
            "/logs",
            RequestOptions::new()
                .base_uri(BaseUri::new("http://localhost:{port}").unwrap())
                .base_uri_parameters(UriParameters::new().with("port", 8080)),
        );
        assert_eq!(request.url, "http://localhost:8080/logs");
    }

    #[test]
    fn test_signer_output_is_dispatched() {
        let signer = |request: RequestDescriptor| request.with_header("Authorization", "Bearer t");
        let config = ClientConfig::builder().signer(Arc::new(signer)).build();
        let request = compose_request(&config, HttpMethod::Get, "/logs", RequestOptions::new());
        assert_eq!(request.header("authorization"), Some("Bearer t"));
    }

    #[test]
    fn test_call_signer_replaces_default_signer() {
        let default_signer = |request: RequestDescriptor| request.with_header("X-Signed", "default");
        let call_signer = |request: RequestDescriptor| request.with_header("X-Signed", "call");
        let config = ClientConfig::builder().signer(Arc::new(default_signer)).build();

        let request = compose_request(
            &config,
            HttpMethod::Get,
            "/logs",
            RequestOptions::new().signer(Arc::new(call_signer)),
        );
        assert_eq!(request.header("X-Signed"), Some("call"));
    }

    #[test]
    fn test_form_data_is_carried() {
        let form = FormData::new().with("caption", "scene");
        let request = compose_request(
            &ClientConfig::default(),
            HttpMethod::Post,
            "/incidents",
            RequestOptions::new().form_data(form.clone()),
        );
        assert_eq!(request.form_data, Some(form));
    }

    #[tokio::test]
    async fn test_request_mirrors_status_code() {
        let transport = Arc::new(RecordingTransport::default());
        let client = HttpClient::with_transport(ClientConfig::default(), transport.clone());

        let response = client
            .request(HttpMethod::Delete, "/logs/{logId}", RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.status, 200);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://api.redcross.no/odss/rest/api/v1/logs/");
    }

    #[test]
    fn test_config_mut_changes_later_requests() {
        let mut client =
            HttpClient::with_transport(ClientConfig::default(), Arc::new(RecordingTransport::default()));
        let mut headers = HeaderMapping::new();
        headers.insert("X-Tenant".to_string(), "north".to_string());
        client.config_mut().set_headers(headers);

        let request = client.compose(HttpMethod::Get, "/logs", RequestOptions::new());
        assert_eq!(request.header("X-Tenant"), Some("north"));
    }
}
