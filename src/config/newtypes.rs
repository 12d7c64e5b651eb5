//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use crate::template::{expand, UriParameters};
use std::fmt;

/// A validated base URI template.
///
/// The template may contain `{name}` placeholders anywhere, including the
/// scheme and host, which are resolved against the base URI parameters on
/// every request. Only an empty template is rejected.
///
/// # Example
///
/// ```rust
/// use odss_client::BaseUri;
/// use odss_client::template::UriParameters;
///
/// let uri = BaseUri::new("https://api.example.org/v{version}/").unwrap();
/// let params = UriParameters::new().with("version", 2);
/// assert_eq!(uri.resolve(&params), "https://api.example.org/v2/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUri(pub(super) String);

impl BaseUri {
    /// Creates a new validated base URI template.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUri`] if the template is empty.
    pub fn new(uri: impl Into<String>) -> Result<Self, ConfigError> {
        let uri = uri.into();
        let trimmed = uri.trim();

        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBaseUri);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Expands the template with the given parameters.
    #[must_use]
    pub fn resolve(&self, params: &UriParameters) -> String {
        expand(&self.0, params)
    }
}

impl AsRef<str> for BaseUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated OAuth2 client ID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new validated client ID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientId`] if the ID is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ConfigError::EmptyClientId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated OAuth2 client secret.
///
/// The `Debug` implementation masks the secret value, displaying only
/// `ClientSecret(*****)`.
///
/// # Example
///
/// ```rust
/// use odss_client::ClientSecret;
///
/// let secret = ClientSecret::new("s3cr3t").unwrap();
/// assert_eq!(format!("{:?}", secret), "ClientSecret(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Creates a new validated client secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientSecret`] if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptyClientSecret);
        }
        Ok(Self(secret))
    }
}

impl AsRef<str> for ClientSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(*****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_uri_accepts_templates() {
        let uri = BaseUri::new("https://api.redcross.no/odss/rest/api/v{version}").unwrap();
        assert_eq!(uri.as_ref(), "https://api.redcross.no/odss/rest/api/v{version}");
    }

    #[test]
    fn test_base_uri_trims_whitespace() {
        let uri = BaseUri::new("  http://localhost:8080/  ").unwrap();
        assert_eq!(uri.as_ref(), "http://localhost:8080/");
    }

    #[test]
    fn test_base_uri_rejects_empty() {
        assert!(matches!(BaseUri::new("   "), Err(ConfigError::EmptyBaseUri)));
    }

    #[test]
    fn test_base_uri_accepts_templated_scheme_and_host() {
        let uri = BaseUri::new("{scheme}://{host}/odss/rest/api/v{version}").unwrap();
        let params = UriParameters::new()
            .with("scheme", "http")
            .with("host", "localhost")
            .with("version", 1);
        assert_eq!(uri.resolve(&params), "http://localhost/odss/rest/api/v1");
        assert!(BaseUri::new("/odss/rest").is_ok());
    }

    #[test]
    fn test_base_uri_resolve_with_missing_parameter() {
        let uri = BaseUri::new("https://api.example.org/v{version}").unwrap();
        assert_eq!(uri.resolve(&UriParameters::new()), "https://api.example.org/v");
    }

    #[test]
    fn test_client_id_rejects_empty() {
        assert!(matches!(ClientId::new(""), Err(ConfigError::EmptyClientId)));
        assert_eq!(ClientId::new("app").unwrap().as_ref(), "app");
    }

    #[test]
    fn test_client_secret_is_masked() {
        let secret = ClientSecret::new("very-secret").unwrap();
        assert_eq!(format!("{secret:?}"), "ClientSecret(*****)");
        assert_eq!(secret.as_ref(), "very-secret");
        assert!(matches!(
            ClientSecret::new(""),
            Err(ConfigError::EmptyClientSecret)
        ));
    }
}
