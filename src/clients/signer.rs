//! Request signing.

use crate::clients::http_request::RequestDescriptor;

/// Augments an outgoing request before it is dispatched.
///
/// A signer receives the fully assembled [`RequestDescriptor`] and returns
/// the descriptor that is actually sent. It is the extension point used to
/// attach authentication, for example an OAuth2 bearer token
/// (see [`Token`](crate::auth::oauth2::Token)).
///
/// Closures with the matching signature are signers too:
///
/// ```rust
/// use std::sync::Arc;
/// use odss_client::{RequestOptions, Signer, RequestDescriptor};
///
/// let signer = |request: RequestDescriptor| request.with_header("X-Api-Key", "secret");
/// let options = RequestOptions::new().signer(Arc::new(signer));
/// assert!(options.signer.is_some());
/// ```
pub trait Signer: Send + Sync {
    /// Returns the request to dispatch in place of `request`.
    fn sign(&self, request: RequestDescriptor) -> RequestDescriptor;
}

impl<F> Signer for F
where
    F: Fn(RequestDescriptor) -> RequestDescriptor + Send + Sync,
{
    fn sign(&self, request: RequestDescriptor) -> RequestDescriptor {
        self(request)
    }
}
