//! The OAuth2 grant flows.

use serde_json::{Map, Value};

use crate::auth::oauth2::state::{random_state, verify_state};
use crate::auth::oauth2::{GrantType, OAuth2Client, OAuthError, Token};

/// Authorization code grant.
#[derive(Clone, Copy, Debug)]
pub struct CodeFlow<'a> {
    client: &'a OAuth2Client,
}

impl<'a> CodeFlow<'a> {
    pub(crate) const fn new(client: &'a OAuth2Client) -> Self {
        Self { client }
    }

    /// Returns the URI to send the user to.
    ///
    /// Uses `state` if given, then the configured state, and otherwise a
    /// random one.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Config`] if the authorization URI is invalid.
    pub fn authorization_uri(&self, state: Option<&str>) -> Result<String, OAuthError> {
        self.client.check_grant(GrantType::AuthorizationCode);
        authorization_uri(self.client, "code", state)
    }

    /// Exchanges an authorization `code` for a token.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError`] if the token request fails.
    pub async fn get_token(&self, code: &str) -> Result<Token, OAuthError> {
        self.client.check_grant(GrantType::AuthorizationCode);

        let mut params = vec![
            ("grant_type", GrantType::AuthorizationCode.as_str().to_string()),
            ("code", code.to_string()),
        ];
        if let Some(redirect_uri) = self.client.settings().redirect_uri() {
            params.push(("redirect_uri", redirect_uri.to_string()));
        }

        Token::from_response(self.client.request_token(params).await?)
    }

    /// Reads the code from the redirect `uri` and exchanges it for a token.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::AuthorizationDenied`] if the redirect carries an
    /// error, [`OAuthError::StateMismatch`] if its state differs from
    /// `expected_state`, or [`OAuthError::InvalidRedirect`] if it has no code.
    pub async fn get_token_from_redirect(
        &self,
        uri: &str,
        expected_state: Option<&str>,
    ) -> Result<Token, OAuthError> {
        let url = parse_redirect(uri)?;
        let params = to_map(url.query_pairs());
        check_redirect(&params, expected_state)?;

        let code = params
            .get("code")
            .and_then(Value::as_str)
            .ok_or_else(|| OAuthError::InvalidRedirect {
                reason: "missing 'code' parameter".to_string(),
            })?;
        self.get_token(code).await
    }
}

/// Resource owner password grant.
#[derive(Clone, Copy, Debug)]
pub struct OwnerFlow<'a> {
    client: &'a OAuth2Client,
}

impl<'a> OwnerFlow<'a> {
    pub(crate) const fn new(client: &'a OAuth2Client) -> Self {
        Self { client }
    }

    /// Exchanges user credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError`] if the token request fails.
    pub async fn get_token(&self, username: &str, password: &str) -> Result<Token, OAuthError> {
        self.client.check_grant(GrantType::Password);

        let mut params = vec![
            ("grant_type", GrantType::Password.as_str().to_string()),
            ("username", username.to_string()),
            ("password", password.to_string()),
        ];
        if let Some(scope) = self.client.scope() {
            params.push(("scope", scope));
        }

        Token::from_response(self.client.request_token(params).await?)
    }
}

/// Client credentials grant.
#[derive(Clone, Copy, Debug)]
pub struct CredentialsFlow<'a> {
    client: &'a OAuth2Client,
}

impl<'a> CredentialsFlow<'a> {
    pub(crate) const fn new(client: &'a OAuth2Client) -> Self {
        Self { client }
    }

    /// Requests a token for the client itself.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError`] if the token request fails.
    pub async fn get_token(&self) -> Result<Token, OAuthError> {
        self.client.check_grant(GrantType::ClientCredentials);

        let mut params = vec![(
            "grant_type",
            GrantType::ClientCredentials.as_str().to_string(),
        )];
        if let Some(scope) = self.client.scope() {
            params.push(("scope", scope));
        }

        Token::from_response(self.client.request_token(params).await?)
    }
}

/// Implicit grant.
#[derive(Clone, Copy, Debug)]
pub struct TokenFlow<'a> {
    client: &'a OAuth2Client,
}

impl<'a> TokenFlow<'a> {
    pub(crate) const fn new(client: &'a OAuth2Client) -> Self {
        Self { client }
    }

    /// Returns the URI to send the user to.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Config`] if the authorization URI is invalid.
    pub fn authorization_uri(&self, state: Option<&str>) -> Result<String, OAuthError> {
        self.client.check_grant(GrantType::Implicit);
        authorization_uri(self.client, "token", state)
    }

    /// Reads the token from the fragment of the redirect `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::AuthorizationDenied`] if the redirect carries an
    /// error, [`OAuthError::StateMismatch`] if its state differs from
    /// `expected_state`, or [`OAuthError::MissingField`] if it has no token.
    pub fn get_token(&self, uri: &str, expected_state: Option<&str>) -> Result<Token, OAuthError> {
        self.client.check_grant(GrantType::Implicit);

        let url = parse_redirect(uri)?;
        let fragment = url.fragment().unwrap_or_default();
        let params = to_map(url::form_urlencoded::parse(fragment.as_bytes()));
        check_redirect(&params, expected_state)?;

        Token::from_response(params)
    }
}

fn authorization_uri(
    client: &OAuth2Client,
    response_type: &str,
    state: Option<&str>,
) -> Result<String, OAuthError> {
    let settings = client.settings();
    let mut url = url::Url::parse(settings.authorization_uri()).map_err(|_| {
        crate::error::ConfigError::InvalidUri {
            field: "authorization_uri",
            uri: settings.authorization_uri().to_string(),
        }
    })?;

    let state = state
        .or_else(|| settings.state())
        .map_or_else(random_state, String::from);

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("client_id", settings.client_id().as_ref());
        if let Some(redirect_uri) = settings.redirect_uri() {
            query.append_pair("redirect_uri", redirect_uri);
        }
        query.append_pair("response_type", response_type);
        query.append_pair("state", &state);
        if let Some(scope) = client.scope() {
            query.append_pair("scope", &scope);
        }
    }

    Ok(url.into())
}

fn parse_redirect(uri: &str) -> Result<url::Url, OAuthError> {
    url::Url::parse(uri).map_err(|e| OAuthError::InvalidRedirect {
        reason: e.to_string(),
    })
}

fn to_map<'a, I>(pairs: I) -> Map<String, Value>
where
    I: Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
{
    pairs
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect()
}

fn check_redirect(
    params: &Map<String, Value>,
    expected_state: Option<&str>,
) -> Result<(), OAuthError> {
    if let Some(error) = params.get("error").and_then(Value::as_str) {
        return Err(OAuthError::AuthorizationDenied {
            error: error.to_string(),
            description: params
                .get("error_description")
                .and_then(Value::as_str)
                .map(String::from),
        });
    }
    verify_state(expected_state, params.get("state").and_then(Value::as_str))
}
