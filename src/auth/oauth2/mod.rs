//! OAuth2 token acquisition for the ODSS API.
//!
//! The ODSS API is protected by Azure AD. [`oauth2_0`] builds an
//! [`OAuth2Client`] from the scheme defaults merged with caller-supplied
//! settings. The client exposes one flow per grant:
//!
//! - [`OAuth2Client::code`]: authorization code grant
//! - [`OAuth2Client::owner`]: resource owner password grant
//! - [`OAuth2Client::credentials`]: client credentials grant
//! - [`OAuth2Client::token`]: implicit grant
//!
//! Every flow yields a [`Token`], which signs requests with a bearer header.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use odss_client::auth::oauth2::{oauth2_0, OAuth2Settings};
//! use odss_client::{ClientConfig, ClientId, ClientSecret, OdssClient};
//!
//! let oauth = oauth2_0(
//!     OAuth2Settings::builder()
//!         .client_id(ClientId::new("my-app")?)
//!         .client_secret(ClientSecret::new("s3cret")?),
//! )?;
//!
//! let token = oauth.credentials().get_token().await?;
//! let client = OdssClient::new(ClientConfig::builder().signer(Arc::new(token)).build())?;
//! ```

mod error;
mod flows;
mod state;
mod token;

pub use error::OAuthError;
pub use flows::{CodeFlow, CredentialsFlow, OwnerFlow, TokenFlow};
pub use token::Token;

use std::fmt;

use base64::prelude::*;
use serde_json::{Map, Value};

use crate::clients::HttpError;
use crate::config::{ClientId, ClientSecret};
use crate::error::ConfigError;

/// Default token endpoint.
pub const DEFAULT_ACCESS_TOKEN_URI: &str =
    "https://login.microsoftonline.com/redcross.no/oauth2/token";

/// Default authorization endpoint.
pub const DEFAULT_AUTHORIZATION_URI: &str =
    "https://login.microsoftonline.com/redcross.no/oauth2/v2.0/authorize";

/// OAuth2 grant types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantType {
    /// `authorization_code`
    AuthorizationCode,
    /// `password`
    Password,
    /// `client_credentials`
    ClientCredentials,
    /// `implicit`
    Implicit,
}

impl GrantType {
    /// All grants the ODSS scheme supports.
    pub const ALL: [Self; 4] = [
        Self::AuthorizationCode,
        Self::Password,
        Self::ClientCredentials,
        Self::Implicit,
    ];

    /// Returns the grant name as used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::Implicit => "implicit",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for an [`OAuth2Client`].
#[derive(Clone, Debug)]
pub struct OAuth2Settings {
    client_id: ClientId,
    client_secret: Option<ClientSecret>,
    access_token_uri: String,
    authorization_uri: String,
    redirect_uri: Option<String>,
    scopes: Vec<String>,
    authorization_grants: Vec<GrantType>,
    state: Option<String>,
}

impl OAuth2Settings {
    /// Creates a builder pre-filled with the ODSS scheme defaults.
    #[must_use]
    pub fn builder() -> OAuth2SettingsBuilder {
        OAuth2SettingsBuilder::new()
    }

    /// Returns the client ID.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the client secret, if configured.
    #[must_use]
    pub const fn client_secret(&self) -> Option<&ClientSecret> {
        self.client_secret.as_ref()
    }

    /// Returns the token endpoint.
    #[must_use]
    pub fn access_token_uri(&self) -> &str {
        &self.access_token_uri
    }

    /// Returns the authorization endpoint.
    #[must_use]
    pub fn authorization_uri(&self) -> &str {
        &self.authorization_uri
    }

    /// Returns the redirect URI, if configured.
    #[must_use]
    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    /// Returns the requested scopes.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Returns the grants this client is expected to use.
    #[must_use]
    pub fn authorization_grants(&self) -> &[GrantType] {
        &self.authorization_grants
    }

    /// Returns the fixed state, if configured.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }
}

/// Builder for [`OAuth2Settings`].
///
/// # Defaults
///
/// - `access_token_uri`: [`DEFAULT_ACCESS_TOKEN_URI`]
/// - `authorization_uri`: [`DEFAULT_AUTHORIZATION_URI`]
/// - `authorization_grants`: every [`GrantType`]
/// - `client_secret`, `redirect_uri`, `state`: unset
/// - `scopes`: empty
///
/// `client_id` is required.
#[derive(Debug)]
pub struct OAuth2SettingsBuilder {
    client_id: Option<ClientId>,
    client_secret: Option<ClientSecret>,
    access_token_uri: String,
    authorization_uri: String,
    redirect_uri: Option<String>,
    scopes: Vec<String>,
    authorization_grants: Vec<GrantType>,
    state: Option<String>,
}

impl Default for OAuth2SettingsBuilder {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            access_token_uri: DEFAULT_ACCESS_TOKEN_URI.to_string(),
            authorization_uri: DEFAULT_AUTHORIZATION_URI.to_string(),
            redirect_uri: None,
            scopes: Vec::new(),
            authorization_grants: GrantType::ALL.to_vec(),
            state: None,
        }
    }
}

impl OAuth2SettingsBuilder {
    /// Creates a builder with the scheme defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the client ID (required).
    #[must_use]
    pub fn client_id(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    /// Sets the client secret.
    #[must_use]
    pub fn client_secret(mut self, client_secret: ClientSecret) -> Self {
        self.client_secret = Some(client_secret);
        self
    }

    /// Overrides the token endpoint.
    #[must_use]
    pub fn access_token_uri(mut self, uri: impl Into<String>) -> Self {
        self.access_token_uri = uri.into();
        self
    }

    /// Overrides the authorization endpoint.
    #[must_use]
    pub fn authorization_uri(mut self, uri: impl Into<String>) -> Self {
        self.authorization_uri = uri.into();
        self
    }

    /// Sets the redirect URI.
    #[must_use]
    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the grants the client is expected to use.
    #[must_use]
    pub fn authorization_grants(mut self, grants: impl Into<Vec<GrantType>>) -> Self {
        self.authorization_grants = grants.into();
        self
    }

    /// Fixes the state sent with authorization redirects.
    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if no client ID was set,
    /// or [`ConfigError::InvalidUri`] if an endpoint is not an absolute URI.
    pub fn build(self) -> Result<OAuth2Settings, ConfigError> {
        let client_id = self
            .client_id
            .ok_or(ConfigError::MissingRequiredField { field: "client_id" })?;

        validate_uri("access_token_uri", &self.access_token_uri)?;
        validate_uri("authorization_uri", &self.authorization_uri)?;
        if let Some(redirect_uri) = &self.redirect_uri {
            validate_uri("redirect_uri", redirect_uri)?;
        }

        Ok(OAuth2Settings {
            client_id,
            client_secret: self.client_secret,
            access_token_uri: self.access_token_uri,
            authorization_uri: self.authorization_uri,
            redirect_uri: self.redirect_uri,
            scopes: self.scopes,
            authorization_grants: self.authorization_grants,
            state: self.state,
        })
    }
}

fn validate_uri(field: &'static str, uri: &str) -> Result<(), ConfigError> {
    url::Url::parse(uri)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidUri {
            field,
            uri: uri.to_string(),
        })
}

/// Builds an [`OAuth2Client`] from the ODSS scheme defaults overlaid with
/// `overrides`.
///
/// # Errors
///
/// Returns [`OAuthError::Config`] if the settings are incomplete or invalid,
/// or [`OAuthError::Http`] if the HTTP client cannot be created.
pub fn oauth2_0(overrides: OAuth2SettingsBuilder) -> Result<OAuth2Client, OAuthError> {
    OAuth2Client::new(overrides.build()?)
}

/// Talks to the authorization server.
#[derive(Clone, Debug)]
pub struct OAuth2Client {
    settings: OAuth2Settings,
    http: reqwest::Client,
}

// Verify OAuth2Client is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuth2Client>();
};

impl OAuth2Client {
    /// Creates a client for `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Http`] if the HTTP client cannot be created.
    pub fn new(settings: OAuth2Settings) -> Result<Self, OAuthError> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(HttpError::from)?;
        Ok(Self { settings, http })
    }

    /// Returns the settings.
    #[must_use]
    pub const fn settings(&self) -> &OAuth2Settings {
        &self.settings
    }

    /// The authorization code flow.
    #[must_use]
    pub const fn code(&self) -> CodeFlow<'_> {
        CodeFlow::new(self)
    }

    /// The resource owner password flow.
    #[must_use]
    pub const fn owner(&self) -> OwnerFlow<'_> {
        OwnerFlow::new(self)
    }

    /// The client credentials flow.
    #[must_use]
    pub const fn credentials(&self) -> CredentialsFlow<'_> {
        CredentialsFlow::new(self)
    }

    /// The implicit flow.
    #[must_use]
    pub const fn token(&self) -> TokenFlow<'_> {
        TokenFlow::new(self)
    }

    /// Exchanges the refresh token of `token` for a new token.
    ///
    /// A refresh token missing from the response is carried over from
    /// `token`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::NoRefreshToken`] if `token` has none, or any
    /// error of the token request.
    pub async fn refresh(&self, token: &Token) -> Result<Token, OAuthError> {
        let refresh_token = token.refresh_token().ok_or(OAuthError::NoRefreshToken)?;

        let mut data = self
            .request_token(vec![
                ("grant_type", "refresh_token".to_string()),
                ("refresh_token", refresh_token.to_string()),
            ])
            .await?;
        data.entry("refresh_token")
            .or_insert_with(|| Value::String(refresh_token.to_string()));

        Token::from_response(data)
    }

    pub(crate) fn check_grant(&self, grant: GrantType) {
        if !self.settings.authorization_grants.contains(&grant) {
            tracing::warn!(
                "OAuth2 flow '{}' used but not listed in authorization grants {:?}",
                grant,
                self.settings.authorization_grants
            );
        }
    }

    pub(crate) fn scope(&self) -> Option<String> {
        if self.settings.scopes.is_empty() {
            None
        } else {
            Some(self.settings.scopes.join(" "))
        }
    }

    /// Posts `params` to the token endpoint and returns the response fields.
    pub(crate) async fn request_token(
        &self,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<Map<String, Value>, OAuthError> {
        let mut req_builder = self
            .http
            .post(&self.settings.access_token_uri)
            .header(reqwest::header::ACCEPT, "application/json, application/x-www-form-urlencoded");

        match &self.settings.client_secret {
            Some(secret) => {
                let credentials = format!("{}:{}", self.settings.client_id.as_ref(), secret.as_ref());
                req_builder = req_builder.header(
                    reqwest::header::AUTHORIZATION,
                    format!("Basic {}", BASE64_STANDARD.encode(credentials)),
                );
            }
            None => params.push(("client_id", self.settings.client_id.as_ref().to_string())),
        }

        let response = req_builder
            .form(&params)
            .send()
            .await
            .map_err(HttpError::from)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(HttpError::from)?;
        let data = parse_token_body(&body);

        if let Some(error) = data.get("error").and_then(Value::as_str) {
            return Err(OAuthError::TokenRequestFailed {
                status,
                error: error.to_string(),
                description: data
                    .get("error_description")
                    .and_then(Value::as_str)
                    .map(String::from),
            });
        }
        if !(200..300).contains(&status) {
            return Err(OAuthError::TokenRequestFailed {
                status,
                error: body,
                description: None,
            });
        }

        Ok(data)
    }
}

/// Parses a token endpoint body, either JSON or form encoded.
fn parse_token_body(body: &str) -> Map<String, Value> {
    if let Ok(Value::Object(map)) = serde_json::from_str(body) {
        return map;
    }
    url::form_urlencoded::parse(body.as_bytes())
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> OAuth2SettingsBuilder {
        OAuth2Settings::builder()
            .client_id(ClientId::new("app").unwrap())
            .client_secret(ClientSecret::new("secret").unwrap())
            .access_token_uri(format!("{}/token", server.uri()))
    }

    #[test]
    fn test_builder_defaults() {
        let settings = OAuth2Settings::builder()
            .client_id(ClientId::new("app").unwrap())
            .build()
            .unwrap();

        assert_eq!(settings.access_token_uri(), DEFAULT_ACCESS_TOKEN_URI);
        assert_eq!(settings.authorization_uri(), DEFAULT_AUTHORIZATION_URI);
        assert_eq!(settings.authorization_grants(), &GrantType::ALL);
        assert!(settings.client_secret().is_none());
        assert!(settings.scopes().is_empty());
    }

    #[test]
    fn test_builder_requires_client_id() {
        let result = OAuth2Settings::builder().build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "client_id" })
        ));
    }

    #[test]
    fn test_builder_rejects_relative_uri() {
        let result = OAuth2Settings::builder()
            .client_id(ClientId::new("app").unwrap())
            .access_token_uri("/token")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidUri {
                field: "access_token_uri",
                ..
            })
        ));
    }

    #[test]
    fn test_grant_type_names() {
        let names: Vec<&str> = GrantType::ALL.iter().map(GrantType::as_str).collect();
        assert_eq!(
            names,
            vec!["authorization_code", "password", "client_credentials", "implicit"]
        );
    }

    #[test]
    fn test_parse_token_body_accepts_form_encoding() {
        let data = parse_token_body("access_token=abc&token_type=bearer");
        assert_eq!(data.get("access_token"), Some(&json!("abc")));
        assert_eq!(data.get("token_type"), Some(&json!("bearer")));
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("authorization", "Basic YXBwOnNlY3JldA=="))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=old-refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "new-access",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let client = oauth2_0(settings(&server)).unwrap();
        let old = Token::from_response(
            json!({"access_token": "old", "refresh_token": "old-refresh"})
                .as_object()
                .unwrap()
                .clone(),
        )
        .unwrap();

        let token = client.refresh(&old).await.unwrap();
        assert_eq!(token.access_token(), "new-access");
        assert_eq!(token.refresh_token(), Some("old-refresh"));
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let server = MockServer::start().await;
        let client = oauth2_0(settings(&server)).unwrap();

        let result = client.refresh(&Token::new("abc", "Bearer")).await;
        assert!(matches!(result, Err(OAuthError::NoRefreshToken)));
    }

    #[tokio::test]
    async fn test_error_response_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "expired"
            })))
            .mount(&server)
            .await;

        let client = oauth2_0(settings(&server)).unwrap();
        let result = client.credentials().get_token().await;

        match result {
            Err(OAuthError::TokenRequestFailed {
                status,
                error,
                description,
            }) => {
                assert_eq!(status, 400);
                assert_eq!(error, "invalid_grant");
                assert_eq!(description.as_deref(), Some("expired"));
            }
            other => panic!("Expected TokenRequestFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_failure_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = oauth2_0(settings(&server)).unwrap();
        let result = client.credentials().get_token().await;

        assert!(matches!(
            result,
            Err(OAuthError::TokenRequestFailed { status: 503, ref error, .. }) if error == "unavailable"
        ));
    }

    #[tokio::test]
    async fn test_public_client_sends_client_id_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("client_id=app"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = oauth2_0(
            OAuth2Settings::builder()
                .client_id(ClientId::new("app").unwrap())
                .access_token_uri(format!("{}/token", server.uri())),
        )
        .unwrap();

        let token = client.credentials().get_token().await.unwrap();
        assert_eq!(token.access_token(), "abc");
    }
}
