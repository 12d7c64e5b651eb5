//! OAuth2 access tokens.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::auth::oauth2::OAuthError;
use crate::clients::{RequestDescriptor, Signer};

// Anything longer than a century is treated as no expiry.
const MAX_EXPIRES_IN: i64 = 100 * 365 * 24 * 60 * 60;

/// An access token issued by the authorization server.
///
/// A `Token` is a [`Signer`]: handing it to a client or to a single call
/// attaches `Authorization: Bearer <access_token>` to outgoing requests.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use odss_client::auth::oauth2::Token;
/// use odss_client::ClientConfig;
///
/// let token = Token::new("abc", "Bearer");
/// let config = ClientConfig::builder().signer(Arc::new(token)).build();
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    access_token: String,
    token_type: String,
    refresh_token: Option<String>,
    scope: Option<String>,
    expires: Option<DateTime<Utc>>,
    data: Value,
}

impl Token {
    /// Creates a token without refresh token or expiry.
    #[must_use]
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            refresh_token: None,
            scope: None,
            expires: None,
            data: Value::Null,
        }
    }

    /// Builds a token from a token endpoint response or redirect parameters.
    ///
    /// `expires_in` is accepted as a number or a numeric string.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MissingField`] if `access_token` is absent.
    pub fn from_response(data: Map<String, Value>) -> Result<Self, OAuthError> {
        let text = |key: &str| data.get(key).and_then(value_to_string);

        let access_token = text("access_token").ok_or(OAuthError::MissingField {
            field: "access_token",
        })?;
        let expires = data
            .get("expires_in")
            .and_then(|value| match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .filter(|seconds| seconds.abs() <= MAX_EXPIRES_IN)
            .map(|seconds| Utc::now() + Duration::seconds(seconds));

        let token_type = text("token_type").unwrap_or_else(|| "Bearer".to_string());
        let refresh_token = text("refresh_token");
        let scope = text("scope");

        Ok(Self {
            access_token,
            token_type,
            refresh_token,
            scope,
            expires,
            data: Value::Object(data),
        })
    }

    /// Returns the access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the token type, usually `Bearer`.
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Returns the refresh token, if one was issued.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns the granted scope, if reported.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Returns when the token expires, if known.
    #[must_use]
    pub const fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Returns the raw response the token was built from.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Sets the expiry `duration` from now.
    #[must_use]
    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.expires = Some(Utc::now() + duration);
        self
    }

    /// Returns `true` if the token has a known expiry in the past.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| expires <= Utc::now())
    }
}

impl Signer for Token {
    fn sign(&self, request: RequestDescriptor) -> RequestDescriptor {
        request.with_header("Authorization", format!("Bearer {}", self.access_token))
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
