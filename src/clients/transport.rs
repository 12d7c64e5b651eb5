//! The transport boundary.
//!
//! A [`Transport`] turns a [`RequestDescriptor`] into a [`ResponseEnvelope`].
//! [`ReqwestTransport`] is the production implementation; tests can swap in
//! any other implementation through
//! [`HttpClient::with_transport`](crate::clients::HttpClient::with_transport).

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_request::{HttpMethod, RequestBody, RequestDescriptor};
use crate::clients::http_response::ResponseEnvelope;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sends requests over the network.
pub trait Transport: Send + Sync {
    /// Dispatches `request` and resolves to the full response.
    fn send(&self, request: RequestDescriptor)
        -> BoxFuture<'_, Result<ResponseEnvelope, HttpError>>;
}

/// A [`Transport`] backed by `reqwest`.
///
/// - JSON bodies are serialized with `Content-Type: application/json`;
///   raw bodies are sent untouched.
/// - Form data is sent as `multipart/form-data` and takes precedence over
///   the body.
/// - JSON requests without an `Accept` header ask for `application/json`.
/// - Non-2xx responses are rejected with [`HttpError::Response`] unless
///   [`reject_unsuccessful`](Self::reject_unsuccessful) is turned off.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    reject_unsuccessful: bool,
}

// Verify ReqwestTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestTransport>();
};

impl ReqwestTransport {
    /// Creates a transport with a rustls-backed `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self::with_client(client))
    }

    /// Creates a transport around an existing `reqwest` client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            reject_unsuccessful: true,
        }
    }

    /// Sets whether non-2xx responses are returned as errors (default `true`).
    #[must_use]
    pub const fn reject_unsuccessful(mut self, reject: bool) -> Self {
        self.reject_unsuccessful = reject;
        self
    }

    async fn execute(&self, request: RequestDescriptor) -> Result<ResponseEnvelope, HttpError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut req_builder = self.client.request(method, &request.url);

        for (name, value) in &request.headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }
        if request.json && request.header("accept").is_none() {
            req_builder = req_builder.header(reqwest::header::ACCEPT, "application/json");
        }

        if let Some(query) = &request.query {
            req_builder = req_builder.query(&query.pairs().collect::<Vec<_>>());
        }

        if let Some(form) = request.form_data {
            req_builder = req_builder.multipart(form.into_multipart()?);
        } else if let Some(body) = request.body {
            req_builder = match body {
                RequestBody::Raw(bytes) => req_builder.body(bytes),
                RequestBody::Json(value) if request.json => req_builder.json(&value),
                RequestBody::Json(value) => req_builder.body(value.to_string()),
            };
        }

        if let Some(timeout) = request.options.and_then(|options| options.timeout) {
            req_builder = req_builder.timeout(timeout);
        }

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let bytes = res.bytes().await?;
        let response = ResponseEnvelope::new(code, headers, ResponseEnvelope::parse_body(&bytes));

        if self.reject_unsuccessful && !response.is_ok() {
            return Err(HttpError::Response(HttpResponseError::from(response)));
        }

        Ok(response)
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: RequestDescriptor,
    ) -> BoxFuture<'_, Result<ResponseEnvelope, HttpError>> {
        Box::pin(self.execute(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::http_request::{
        FormData, FormFile, HeaderMapping, QueryParams, TransportOptions,
    };
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{
        body_bytes, body_json, header, header_regex, method, path, query_param,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn descriptor(method: HttpMethod, url: String) -> RequestDescriptor {
        RequestDescriptor {
            method,
            url,
            headers: HeaderMapping::new(),
            json: true,
            form_data: None,
            body: None,
            query: None,
            options: None,
        }
    }

    #[tokio::test]
    async fn test_sends_json_body_and_query() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/incidents"))
            .and(query_param("draft", "true"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"name": "Flood"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
            .mount(&mock_server)
            .await;

        let mut request = descriptor(HttpMethod::Post, format!("{}/incidents", mock_server.uri()));
        request.body = Some(RequestBody::Json(json!({"name": "Flood"})));
        request.query = Some(QueryParams::new().with("draft", "true"));

        let transport = ReqwestTransport::new().unwrap();
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status_code, 201);
        assert_eq!(response.status, 201);
        assert_eq!(response.body, json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_repeated_query_keys_are_all_sent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/incidents"))
            .and(query_param("tag", "flood"))
            .and(query_param("tag", "river"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut request = descriptor(HttpMethod::Get, format!("{}/incidents", mock_server.uri()));
        request.query = Some(QueryParams::new().with("tag", "flood").with("tag", "river"));

        let transport = ReqwestTransport::new().unwrap();
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_sends_raw_body_untouched() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/blob"))
            .and(body_bytes(vec![0_u8, 159, 146, 150]))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let mut request = descriptor(HttpMethod::Patch, format!("{}/blob", mock_server.uri()));
        request.json = false;
        request.body = Some(RequestBody::Raw(vec![0, 159, 146, 150]));

        let response = ReqwestTransport::new().unwrap().send(request).await.unwrap();
        assert_eq!(response.status_code, 204);
        assert_eq!(response.body, json!(null));
    }

    #[tokio::test]
    async fn test_sends_multipart_form() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header_regex("content-type", "^multipart/form-data"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut request = descriptor(HttpMethod::Post, format!("{}/upload", mock_server.uri()));
        request.form_data = Some(
            FormData::new()
                .with("caption", "scene")
                .with("photo", FormFile::new("scene.jpg", vec![1, 2, 3])),
        );

        ReqwestTransport::new().unwrap().send(request).await.unwrap();

        let received = mock_server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&received[0].body).to_string();
        assert!(body.contains("name=\"file\""));
        assert!(body.contains("name=\"caption\""));
    }

    #[tokio::test]
    async fn test_rejects_unsuccessful_response_by_default() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "nope"})))
            .mount(&mock_server)
            .await;

        let request = descriptor(HttpMethod::Get, format!("{}/logs/9", mock_server.uri()));
        let result = ReqwestTransport::new().unwrap().send(request).await;

        match result {
            Err(HttpError::Response(error)) => {
                assert_eq!(error.code, 404);
                assert_eq!(error.response.body, json!({"error": "nope"}));
            }
            other => panic!("Expected Response error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_returns_unsuccessful_response_when_not_rejecting() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
            .mount(&mock_server)
            .await;

        let request = descriptor(HttpMethod::Delete, format!("{}/units/1", mock_server.uri()));
        let transport = ReqwestTransport::new().unwrap().reject_unsuccessful(false);
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status_code, 409);
        assert_eq!(response.body, json!("conflict"));
    }

    #[tokio::test]
    async fn test_timeout_is_applied() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&mock_server)
            .await;

        let mut request = descriptor(HttpMethod::Get, format!("{}/slow", mock_server.uri()));
        request.options = Some(TransportOptions {
            timeout: Some(Duration::from_millis(50)),
        });

        let result = ReqwestTransport::new().unwrap().send(request).await;
        assert!(matches!(result, Err(HttpError::Network(_))));
    }

    #[tokio::test]
    async fn test_network_error_is_surfaced() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let request = descriptor(HttpMethod::Get, "http://127.0.0.1:9/".to_string());
        let result = ReqwestTransport::new().unwrap().send(request).await;
        assert!(matches!(result, Err(HttpError::Network(_))));
    }
}
