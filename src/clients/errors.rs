//! HTTP-specific error types for the ODSS client.
//!
//! - [`HttpResponseError`]: a non-2xx response rejected by the transport
//! - [`InvalidHttpRequestError`]: a request refused before anything was sent
//! - [`HttpError`]: unified error type encompassing all HTTP-related errors
//!
//! Errors reach the caller exactly as the transport produced them. The
//! client neither retries nor translates them.
//!
//! # Example
//!
//! ```rust,ignore
//! use odss_client::HttpError;
//!
//! match client.incidents().get(None, Default::default()).await {
//!     Ok(response) => println!("{}", response.body),
//!     Err(HttpError::Response(e)) => println!("API error {}: {}", e.code, e.response.body),
//!     Err(HttpError::InvalidRequest(e)) => println!("Invalid request: {e}"),
//!     Err(HttpError::Network(e)) => println!("Network error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::http_request::HttpMethod;
use crate::clients::http_response::ResponseEnvelope;

/// Error returned when the transport rejects a non-successful response.
///
/// The complete response is kept so callers can inspect headers and body.
#[derive(Debug, Error)]
#[error("{code} - {}", .response.body)]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The full response.
    pub response: ResponseEnvelope,
}

impl From<ResponseEnvelope> for HttpResponseError {
    fn from(response: ResponseEnvelope) -> Self {
        Self {
            code: response.status_code,
            response,
        }
    }
}

/// Error returned when a request is refused before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The resource does not support the requested method.
    #[error("Method {method} is not supported by {path}.")]
    MethodNotAllowed {
        /// The method that was requested.
        method: HttpMethod,
        /// The resource path.
        path: String,
    },

    /// The resource has no such child, or is not a collection.
    #[error("Resource {path} has no sub-resource '{segment}'.")]
    UnknownResource {
        /// The path of the parent resource.
        path: String,
        /// The requested segment.
        segment: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// The request was refused before being sent.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpError>();
};
