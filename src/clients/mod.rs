//! HTTP plumbing for the ODSS client.
//!
//! # Overview
//!
//! - [`HttpClient`]: the request composer
//! - [`RequestOptions`]: per-call overrides of the client defaults
//! - [`RequestDescriptor`]: a fully assembled request
//! - [`ResponseEnvelope`]: status, headers, and body of a response
//! - [`Signer`]: hook that augments a request before dispatch
//! - [`Transport`] and [`ReqwestTransport`]: the network boundary
//! - [`HttpError`]: errors surfaced by requests
//!
//! The composer performs no retries and no error translation. Whatever the
//! transport returns reaches the caller unchanged.

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod options;
mod signer;
mod transport;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{compose_request, HttpClient};
pub use http_request::{
    FormData, FormFile, FormValue, HeaderMapping, HttpMethod, Query, QueryParams, RequestBody,
    RequestDescriptor, TransportOptions,
};
pub use http_response::ResponseEnvelope;
pub use options::RequestOptions;
pub use signer::Signer;
pub use transport::{BoxFuture, ReqwestTransport, Transport};
